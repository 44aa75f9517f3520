//! Mount source exposing one logical file.
//!
//! Used as the fallback when a split join was prepared but no backend
//! recognized the joined payload: the shard group is still served as a
//! single opaque file under its reconstructed name.

use crate::error::Result;
use crate::join::JoinedReader;
use crate::mount::{trim_mount_path, DirEntry, FileInfo, FileKind, MountSource, ReadSeek};
use crate::split::SplitGroup;

/// Single opaque file at the mount root
pub struct SingleFileMountSource {
    name: String,
    group: SplitGroup,
    size: u64,
}

impl SingleFileMountSource {
    /// Expose a joined shard group as one file named `name`
    pub fn new(name: impl Into<String>, group: SplitGroup) -> Self {
        let size = group.total_size();
        Self {
            name: name.into(),
            group,
            size,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    fn root_info(&self) -> FileInfo {
        FileInfo {
            size: 0,
            kind: FileKind::Directory,
            mtime: None,
        }
    }

    fn file_info(&self) -> FileInfo {
        FileInfo {
            size: self.size,
            kind: FileKind::File,
            mtime: self
                .group
                .first()
                .metadata()
                .ok()
                .and_then(|meta| meta.modified().ok()),
        }
    }
}

impl MountSource for SingleFileMountSource {
    fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        if trim_mount_path(path).is_empty() {
            Ok(vec![DirEntry {
                name: self.name.clone(),
                kind: FileKind::File,
            }])
        } else {
            Ok(Vec::new())
        }
    }

    fn metadata(&self, path: &str) -> Result<Option<FileInfo>> {
        let path = trim_mount_path(path);
        if path.is_empty() {
            Ok(Some(self.root_info()))
        } else if path == self.name {
            Ok(Some(self.file_info()))
        } else {
            Ok(None)
        }
    }

    fn open(&self, path: &str) -> Result<Box<dyn ReadSeek>> {
        if trim_mount_path(path) == self.name {
            // Fresh reader per call so concurrent readers get their own cursor.
            Ok(Box::new(JoinedReader::new(&self.group)))
        } else {
            Err(crate::error::ResolveError::NotFound {
                path: path.into(),
            })
        }
    }
}
