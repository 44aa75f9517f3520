use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Unified error type for source resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    // Capability errors
    #[error("{capability} is not available: {remediation}")]
    Configuration {
        capability: &'static str,
        remediation: String,
    },

    // Missing sources
    #[error("mount source does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("opening URL {url} failed because path {path} does not exist on remote")]
    RemoteNotFound { url: String, path: String },

    // Trial exhaustion
    #[error("source to open ({source_name}) has unrecognized format")]
    UnrecognizedFormat { source_name: String },

    // Remote failures, wrapped with the originating URL
    #[error("remote operation on {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // Malformed input
    #[error("invalid URL {url}: {reason}")]
    Url { url: String, reason: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ResolveError {
    /// Capability error with a remediation hint
    pub fn configuration(capability: &'static str, remediation: impl Into<String>) -> Self {
        ResolveError::Configuration {
            capability,
            remediation: remediation.into(),
        }
    }

    /// Remote failure wrapped with the URL it originated from
    pub fn transport(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ResolveError::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolveError::Url {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "zip")]
impl From<zip::result::ZipError> for ResolveError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(err) => ResolveError::Io(err),
            other => ResolveError::Io(io::Error::new(io::ErrorKind::InvalidData, other)),
        }
    }
}
