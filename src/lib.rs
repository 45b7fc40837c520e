// Tue Jan 15 2026 - Alex

pub mod config;
pub mod memory;
pub mod output;
pub mod pattern;
pub mod utils;

pub use config::Config;
pub use memory::MappedFile;
pub use output::JsonSerializer;
pub use pattern::{MultiPattern, PatternError, PatternFile, ScanMatch};
