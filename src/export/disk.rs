//! Storage seam: where a finished export lands.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::SheetResult;

/// Free-form options forwarded to the disk adapter (visibility, mime type,
/// whatever the backing store understands).
pub type DiskOptions = HashMap<String, String>;

/// Write-side storage adapter.
pub trait Disk: Send + Sync {
    fn put(&self, path: &Path, contents: &[u8], options: &DiskOptions) -> SheetResult<()>;
}

/// Local filesystem disk rooted at a base directory. Parent directories of
/// the target path are created as needed.
#[derive(Debug, Clone)]
pub struct LocalDisk {
    root: PathBuf,
}

impl LocalDisk {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Disk for LocalDisk {
    fn put(&self, path: &Path, contents: &[u8], _options: &DiskOptions) -> SheetResult<()> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_disk_creates_parent_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let disk = LocalDisk::new(dir.path());

        disk.put(
            Path::new("nested/out/report.xlsx"),
            b"bytes",
            &DiskOptions::new(),
        )
        .unwrap();

        let written = std::fs::read(dir.path().join("nested/out/report.xlsx")).unwrap();
        assert_eq!(written, b"bytes");
    }
}
