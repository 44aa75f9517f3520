//! Remote filesystem collaborator contract.
//!
//! Transport adapters (secure-shell, WebDAV, Dropbox, generic URL
//! resolvers) hand back an implementation of [`RemoteFilesystem`]; the
//! resolver only classifies and forwards. Wire protocols live entirely on
//! the other side of this trait.

use std::sync::Arc;

use crate::error::{ResolveError, Result};
use crate::mount::{trim_mount_path, DirEntry, FileInfo, MountSource, ReadSeek};

/// Metadata reported by a remote filesystem
#[derive(Debug, Clone)]
pub struct RemoteInfo {
    pub size: u64,
    pub is_dir: bool,
    /// Content-type when the transport reports one (hypertext does)
    pub content_type: Option<String>,
}

/// Minimal filesystem surface a transport adapter must provide
pub trait RemoteFilesystem: Send + Sync {
    /// Whether `path` exists on the remote
    fn exists(&self, path: &str) -> Result<bool>;

    /// Directory check; must return `Ok(false)` for missing paths
    fn is_dir(&self, path: &str) -> Result<bool>;

    fn metadata(&self, path: &str) -> Result<RemoteInfo>;

    fn list(&self, path: &str) -> Result<Vec<DirEntry>>;

    /// Open a seekable view; transports without random access should fail
    /// here rather than on the first read
    fn open(&self, path: &str) -> Result<Box<dyn ReadSeek>>;
}

/// Mount source delegating to a remote filesystem rooted at `base`
pub struct RemoteMountSource {
    fs: Arc<dyn RemoteFilesystem>,
    base: String,
    url: String,
}

impl RemoteMountSource {
    pub fn new(fs: Arc<dyn RemoteFilesystem>, base: impl Into<String>, url: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            fs,
            url: url.into(),
        }
    }

    fn full_path(&self, path: &str) -> String {
        let rel = trim_mount_path(path);
        if rel.is_empty() {
            self.base.clone()
        } else if self.base.is_empty() {
            rel.to_string()
        } else {
            format!("{}/{}", self.base, rel)
        }
    }

    /// Wrap collaborator failures with the originating URL
    fn wrap<T>(&self, result: Result<T>) -> Result<T> {
        result.map_err(|err| match err {
            err @ (ResolveError::Transport { .. } | ResolveError::RemoteNotFound { .. }) => err,
            other => ResolveError::transport(self.url.clone(), other),
        })
    }
}

impl MountSource for RemoteMountSource {
    fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        let full = self.full_path(path);
        self.wrap(self.fs.list(&full))
    }

    fn metadata(&self, path: &str) -> Result<Option<FileInfo>> {
        let full = self.full_path(path);
        if !self.wrap(self.fs.exists(&full))? {
            return Ok(None);
        }
        let info = self.wrap(self.fs.metadata(&full))?;
        Ok(Some(FileInfo {
            size: info.size,
            kind: if info.is_dir {
                crate::mount::FileKind::Directory
            } else {
                crate::mount::FileKind::File
            },
            mtime: None,
        }))
    }

    fn open(&self, path: &str) -> Result<Box<dyn ReadSeek>> {
        let full = self.full_path(path);
        self.wrap(self.fs.open(&full))
    }
}
