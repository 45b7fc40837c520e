// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Out of bounds: {start:#x}..{end:#x} not within {len:#x} bytes")]
    OutOfBounds { start: usize, end: usize, len: usize },
}
