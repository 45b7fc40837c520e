// Tue Jan 13 2026 - Alex

pub mod compiler;
pub mod error;
pub mod escape;
pub mod file;
pub mod matcher;
pub mod multi;
pub mod namespace;
pub mod parser;

pub use compiler::{CompositePattern, SubPattern};
pub use error::PatternError;
pub use file::{PatternEntry, PatternFile};
pub use matcher::{Matches, ScanMatch};
pub use multi::MultiPattern;
pub use namespace::{GroupNamespace, UserGroup};
pub use parser::{PatternParser, Syntax};

use crate::config::Config;

pub fn load_patterns<P: AsRef<std::path::Path>>(
    path: P,
    config: &Config,
) -> Result<MultiPattern, PatternError> {
    PatternFile::from_path(path)?.to_multi_pattern(config)
}

/// Compiles `patterns` and collects every match in `haystack`.
pub fn scan_all(patterns: &mut MultiPattern, haystack: &[u8]) -> Result<Vec<ScanMatch>, PatternError> {
    patterns.match_all(haystack)?.collect()
}
