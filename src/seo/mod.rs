pub mod meta;

// Re-export commonly used functions
pub use meta::build_meta;
