pub mod analyzers;
pub mod loader;
pub mod normalize;
pub mod output;
