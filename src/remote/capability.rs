//! Capability registry for optional transport integrations.
//!
//! Each optional integration (repository snapshots, secure-shell, WebDAV,
//! cloud storage, generic URL resolution) is recorded once at start-up as
//! either a bound adapter or an explicit "unavailable" sentinel. Dispatch
//! checks availability up front and fails with a remediation message,
//! instead of deferring the failure to an arbitrary call site.

use std::sync::Arc;

use once_cell::sync::Lazy;
use url::Url;

use crate::config::Config;
use crate::error::{ResolveError, Result};
use crate::remote::fs::RemoteFilesystem;
use crate::remote::Resolved;

/// Components of a `git://[repository:][reference@]path` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTarget {
    /// Repository location; the adapter's default when absent
    pub repository: Option<String>,
    /// Branch, tag, or commit; the adapter's HEAD when absent
    pub reference: Option<String>,
    /// Path inside the repository tree; may be empty for the root
    pub path: String,
}

/// Repository-snapshot adapter behind the `git` scheme
pub trait GitAdapter: Send + Sync {
    fn open(&self, target: &GitTarget, config: &Config) -> Result<Resolved>;
}

/// Secure-shell adapter; declares which schemes it answers for
pub trait SshAdapter: Send + Sync {
    fn schemes(&self) -> &[&str];
    fn connect(&self, url: &Url, config: &Config) -> Result<Arc<dyn RemoteFilesystem>>;
}

/// WebDAV client constructor, called after the HTTPS probe decided the
/// transport protocol
pub trait WebdavAdapter: Send + Sync {
    fn connect(
        &self,
        base_url: &str,
        auth: Option<(String, String)>,
    ) -> Result<Arc<dyn RemoteFilesystem>>;
}

/// Dropbox client constructor
pub trait DropboxAdapter: Send + Sync {
    fn connect(&self, token: &str) -> Result<Arc<dyn RemoteFilesystem>>;
}

/// Generic URL-to-filesystem resolution for every remaining scheme
pub trait UrlAdapter: Send + Sync {
    fn resolve(&self, url: &Url, config: &Config) -> Result<(Arc<dyn RemoteFilesystem>, String)>;
}

/// Optional-integration table, populated once and immutable thereafter
#[derive(Default, Clone)]
pub struct Capabilities {
    git: Option<Arc<dyn GitAdapter>>,
    ssh: Option<Arc<dyn SshAdapter>>,
    webdav: Option<Arc<dyn WebdavAdapter>>,
    dropbox: Option<Arc<dyn DropboxAdapter>>,
    generic: Option<Arc<dyn UrlAdapter>>,
}

impl Capabilities {
    /// Every optional integration marked unavailable
    pub fn none() -> Self {
        Self::default()
    }

    /// The process-wide default capability set.
    ///
    /// Integrations compiled into the binary get bound here exactly once.
    /// This crate ships scheme-classification glue only, so the default
    /// set records every transport integration as unavailable; embedders
    /// register their adapters and pass the result to the `_in` entry
    /// points.
    pub fn detect() -> &'static Capabilities {
        static DETECTED: Lazy<Capabilities> = Lazy::new(Capabilities::none);
        &DETECTED
    }

    pub fn with_git(mut self, adapter: Arc<dyn GitAdapter>) -> Self {
        self.git = Some(adapter);
        self
    }

    pub fn with_ssh(mut self, adapter: Arc<dyn SshAdapter>) -> Self {
        self.ssh = Some(adapter);
        self
    }

    pub fn with_webdav(mut self, adapter: Arc<dyn WebdavAdapter>) -> Self {
        self.webdav = Some(adapter);
        self
    }

    pub fn with_dropbox(mut self, adapter: Arc<dyn DropboxAdapter>) -> Self {
        self.dropbox = Some(adapter);
        self
    }

    pub fn with_generic(mut self, adapter: Arc<dyn UrlAdapter>) -> Self {
        self.generic = Some(adapter);
        self
    }

    /// Schemes the secure-shell adapter answers for; empty when unavailable
    pub fn ssh_schemes(&self) -> &[&str] {
        self.ssh
            .as_deref()
            .map(|adapter| adapter.schemes())
            .unwrap_or(&[])
    }

    pub(crate) fn require_git(&self) -> Result<&dyn GitAdapter> {
        self.git.as_deref().ok_or_else(|| {
            ResolveError::configuration(
                "git repository mounting",
                "detected a git:// URL but no git adapter is registered; \
                 enable one via Capabilities::with_git",
            )
        })
    }

    pub(crate) fn require_ssh(&self) -> Result<&dyn SshAdapter> {
        self.ssh.as_deref().ok_or_else(|| {
            ResolveError::configuration(
                "secure-shell mounting",
                "no secure-shell adapter is registered; enable one via Capabilities::with_ssh",
            )
        })
    }

    pub(crate) fn require_webdav(&self) -> Result<&dyn WebdavAdapter> {
        self.webdav.as_deref().ok_or_else(|| {
            ResolveError::configuration(
                "WebDAV client",
                "register a WebDAV client via Capabilities::with_webdav to mount webdav:// URLs",
            )
        })
    }

    pub(crate) fn require_dropbox(&self) -> Result<&dyn DropboxAdapter> {
        self.dropbox.as_deref().ok_or_else(|| {
            ResolveError::configuration(
                "Dropbox client",
                "register a Dropbox client via Capabilities::with_dropbox to mount dropbox:// URLs",
            )
        })
    }

    pub(crate) fn require_generic(&self) -> Result<&dyn UrlAdapter> {
        self.generic.as_deref().ok_or_else(|| {
            ResolveError::configuration(
                "generic remote filesystem resolution",
                "no URL resolver is registered for this scheme; \
                 enable one via Capabilities::with_generic",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_capabilities_fail_with_remediation() {
        let caps = Capabilities::none();
        assert!(caps.ssh_schemes().is_empty());

        let err = caps.require_git().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("git"));
        assert!(err.contains("with_git"));

        assert!(matches!(
            caps.require_generic(),
            Err(ResolveError::Configuration { .. })
        ));
    }
}
