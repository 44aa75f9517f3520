//! URL classification and resolution.
//!
//! A URI is classified by its transport scheme and resolved to one of
//! three shapes: a plain local path, an open seekable stream, or a
//! finished mount source. Scheme adapters are optional integrations
//! looked up in the [`Capabilities`] registry; this module is the glue
//! that parses, probes, and classifies, never the transport itself.

mod capability;
mod dropbox;
mod fs;
mod git;
mod ssh;
#[cfg(feature = "webdav")]
mod webdav;

pub use capability::{
    Capabilities, DropboxAdapter, GitAdapter, GitTarget, SshAdapter, UrlAdapter, WebdavAdapter,
};
pub use fs::{RemoteFilesystem, RemoteInfo, RemoteMountSource};

use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::config::Config;
use crate::error::{ResolveError, Result};
use crate::mount::{MountSource, ReadSeek};

/// Outcome of URL resolution
pub enum Resolved {
    /// A `file://` URL rewritten to its local path
    LocalPath(PathBuf),
    /// A remote file opened as a seekable stream
    Stream(Box<dyn ReadSeek>),
    /// A directory-like remote resolved to a finished mount source
    Mount(Box<dyn MountSource>),
}

/// Classify a URI by scheme and resolve it.
///
/// Fails with [`ResolveError::Url`] when no `scheme://` prefix is present.
/// `file://` never touches the network or any capability.
pub fn resolve_url(url: &str, caps: &Capabilities, config: &Config) -> Result<Resolved> {
    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(ResolveError::invalid_url(url, "expected a scheme:// prefix"));
    };

    if config.debug_verbosity() >= 3 {
        tracing::debug!(url, scheme, "trying to open URL");
    }

    match scheme {
        "file" => Ok(Resolved::LocalPath(PathBuf::from(rest))),
        "git" => git::resolve(rest, caps, config),
        _ if caps.ssh_schemes().contains(&scheme) => ssh::resolve(url, caps, config),
        "webdav" => {
            #[cfg(feature = "webdav")]
            {
                let (fs, path) = webdav::resolve(rest, caps)?;
                finish_remote(fs, path, url, false, config)
            }
            #[cfg(not(feature = "webdav"))]
            {
                Err(ResolveError::configuration(
                    "WebDAV support",
                    "rebuild with the `webdav` cargo feature to mount webdav:// URLs",
                ))
            }
        }
        "dropbox" => {
            let (fs, path) = dropbox::resolve(rest, caps)?;
            finish_remote(fs, path, url, false, config)
        }
        _ => {
            let adapter = caps.require_generic()?;
            let parsed =
                Url::parse(url).map_err(|err| ResolveError::invalid_url(url, err.to_string()))?;
            let (fs, path) = adapter.resolve(&parsed, config)?;
            let hypertext = matches!(scheme, "http" | "https");
            finish_remote(fs, path, url, hypertext, config)
        }
    }
}

/// Classify a resolved filesystem+path pair and open it.
///
/// Directory semantics win when ambiguous, except for hypertext: there a
/// lone HTML document is indistinguishable from a listing, so a directory
/// requires both the `text/html` content-type and the resolver's explicit
/// directory report. The heuristic can be disabled per call via the
/// `html_directory_listing` config key.
fn finish_remote(
    fs: Arc<dyn RemoteFilesystem>,
    path: String,
    url: &str,
    hypertext: bool,
    config: &Config,
) -> Result<Resolved> {
    let directory = if hypertext {
        config.html_directory_listing()
            && fs.metadata(&path)?.content_type.as_deref() == Some("text/html")
            && fs.is_dir(&path)?
    } else {
        fs.is_dir(&path)?
    };
    if directory {
        return Ok(Resolved::Mount(Box::new(RemoteMountSource::new(
            fs, path, url,
        ))));
    }

    if !fs.exists(&path)? {
        return Err(ResolveError::RemoteNotFound {
            url: url.to_string(),
            path,
        });
    }

    let mut stream = fs.open(&path)?;
    seek_probe(stream.as_mut()).map_err(|err| ResolveError::transport(url, err))?;
    Ok(Resolved::Stream(stream))
}

/// One-byte seek→read→rewind probe.
///
/// Confirms random access actually works (an HTTP server without range
/// support fails here) instead of deferring the failure to the first real
/// read of some backend.
pub(crate) fn seek_probe(stream: &mut dyn ReadSeek) -> std::io::Result<()> {
    stream.seek(SeekFrom::Start(1))?;
    let mut byte = [0u8; 1];
    let _ = stream.read(&mut byte)?;
    stream.seek(SeekFrom::Start(0))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_file_url_is_rewritten_without_capabilities() {
        let resolved =
            resolve_url("file:///tmp/archive.tar", &Capabilities::none(), &Config::new()).unwrap();
        match resolved {
            Resolved::LocalPath(path) => assert_eq!(path, PathBuf::from("/tmp/archive.tar")),
            _ => panic!("expected a local path"),
        }
    }

    #[test]
    fn test_bare_path_is_rejected() {
        let err = resolve_url("/tmp/archive.tar", &Capabilities::none(), &Config::new());
        assert!(matches!(err, Err(ResolveError::Url { .. })));
    }

    #[test]
    fn test_unknown_scheme_without_generic_capability() {
        let err = resolve_url("s3://bucket/key", &Capabilities::none(), &Config::new());
        assert!(matches!(err, Err(ResolveError::Configuration { .. })));
    }

    #[test]
    fn test_seek_probe_rewinds() {
        let mut cursor = Cursor::new(b"abcdef".to_vec());
        seek_probe(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_seek_probe_tolerates_empty_stream() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        seek_probe(&mut cursor).unwrap();
    }
}
