//! Text normalization for headers, categorical values, and drug names.

use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::debug;

/// Variants that annotators used for combined study designs. The strongest
/// design listed wins.
static BUILTIN_SYNONYMS: &[(&str, &str)] = &[
    ("in_vitro_in_vivo", "in_vivo"),
    ("in_vivo_in_vitro", "in_vivo"),
    ("in_vivo_in_vitro_clinical_trial", "in_vivo"),
    ("clinical_observational_study", "clinical_observational"),
];

/// Normalizes a column header: trim, lowercase, and replace spaces, `-`, `/`
/// and parentheses with `_`.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '-' | '/' | '(' | ')' => '_',
            c => c,
        })
        .collect()
}

/// Relaxed header form: repeated `_` collapsed and edge `_` stripped.
pub fn relax_header(header: &str) -> String {
    collapse_underscores(header).trim_matches('_').to_string()
}

/// Trims and lowercases a value, turning every run of whitespace, `/` and `_`
/// into a single `_`. Synonyms are not applied here.
pub fn clean_token(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_separator = false;

    for c in lowered.chars() {
        if c.is_whitespace() || c == '/' || c == '_' {
            if !in_separator {
                out.push('_');
            }
            in_separator = true;
        } else {
            out.push(c);
            in_separator = false;
        }
    }

    out
}

/// Cleans a drug name: everything from the first `/` on is dropped (unless the
/// name starts with it), then the rest is trimmed and lowercased.
pub fn clean_name(name: &str) -> String {
    let kept = match name.find('/') {
        Some(stop) if stop > 0 => &name[..stop],
        _ => name,
    };
    kept.trim().to_lowercase()
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push(c);
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out
}

/// Maps cleaned variant spellings onto their canonical category value.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: HashMap<String, String>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SynonymTable {
    /// Creates a table holding the built-in study design synonyms.
    pub fn new() -> Self {
        Self {
            entries: BUILTIN_SYNONYMS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Loads extra synonyms from a JSON object file and merges them over the
    /// built-in entries:
    /// ```json
    /// { "in vitro + in vivo": "in_vivo", "observational": "clinical_observational" }
    /// ```
    pub fn with_file(mut self, path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read synonym file '{path}'"))?;
        let extra: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("synonym file '{path}' is not a JSON object of strings"))?;

        debug!(path, entries = extra.len(), "Merging synonym file");
        for (variant, canonical) in extra {
            self.insert(&variant, &canonical);
        }
        Ok(self)
    }

    /// Adds one synonym; both sides are cleaned first.
    pub fn insert(&mut self, variant: &str, canonical: &str) {
        self.entries
            .insert(clean_token(variant), clean_token(canonical));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cleans a categorical value and folds it onto its canonical spelling.
    pub fn clean_value(&self, value: &str) -> String {
        let token = clean_token(value);
        match self.entries.get(&token) {
            Some(canonical) => canonical.clone(),
            None => token,
        }
    }
}
