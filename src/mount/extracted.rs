//! Mount source over content extracted into a scratch directory.
//!
//! The built-in archive backends unpack their entries into a private
//! tempdir and serve the resulting tree; the directory is removed when the
//! mount source is dropped.

use tempfile::TempDir;

use crate::error::Result;
use crate::mount::{DirEntry, FileInfo, FolderMountSource, MountSource, ReadSeek};

/// Tempdir-backed read-only tree
pub struct ExtractedMountSource {
    tree: FolderMountSource,
    // Held for its Drop; deleting the scratch dir invalidates `tree`.
    _dir: TempDir,
}

impl ExtractedMountSource {
    pub(crate) fn new(dir: TempDir) -> Result<Self> {
        let tree = FolderMountSource::new(dir.path())?;
        Ok(Self { tree, _dir: dir })
    }
}

impl MountSource for ExtractedMountSource {
    fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        self.tree.list(path)
    }

    fn metadata(&self, path: &str) -> Result<Option<FileInfo>> {
        self.tree.metadata(path)
    }

    fn open(&self, path: &str) -> Result<Box<dyn ReadSeek>> {
        self.tree.open(path)
    }
}
