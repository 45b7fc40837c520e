// Tue Jan 13 2026 - Alex

use crate::memory::MemoryError;
use memmap2::Mmap;
use std::fs::File;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// A read-only view of a whole file. Zero-length files are not mapped.
pub struct MappedFile {
    mmap: Option<Mmap>,
    path: PathBuf,
}

impl MappedFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();

        // Safety: the mapping is read-only; another process truncating the
        // file while we scan is outside what we can defend against.
        let mmap = if len == 0 {
            None
        } else {
            Some(unsafe { Mmap::map(&file) }?)
        };

        log::debug!("mapped {} ({} bytes)", path.display(), len);
        Ok(Self { mmap, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.mmap.as_ref().map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    pub fn slice(&self, range: Range<usize>) -> Result<&[u8], MemoryError> {
        self.as_slice()
            .get(range.clone())
            .ok_or(MemoryError::OutOfBounds {
                start: range.start,
                end: range.end,
                len: self.len(),
            })
    }
}

impl AsRef<[u8]> for MappedFile {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(tag: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("binsig-mmap-{}-{}", tag, std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_map_and_slice() {
        let path = temp_file("slice", &[1, 2, 3, 4]);
        let mapped = MappedFile::open(&path).unwrap();
        assert_eq!(mapped.len(), 4);
        assert_eq!(mapped.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(mapped.slice(1..3).unwrap(), &[2, 3]);
        assert!(matches!(mapped.slice(3..9), Err(MemoryError::OutOfBounds { .. })));
        drop(mapped);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_empty_file() {
        let path = temp_file("empty", &[]);
        let mapped = MappedFile::open(&path).unwrap();
        assert!(mapped.is_empty());
        assert_eq!(mapped.as_slice(), &[] as &[u8]);
        drop(mapped);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let err = MappedFile::open("/definitely/not/here.bin").err().unwrap();
        assert!(matches!(err, MemoryError::Io(_)));
    }
}
