//! Secure-shell scheme glue.
//!
//! The adapter declares which schemes it answers for (typically `ssh`,
//! `sftp`, `scp`); this glue normalizes the remote path and classifies
//! file vs directory. One leading slash is stripped so relative paths
//! work: `ssh://host/relative/path` vs `ssh://host//absolute/path`.

use url::Url;

use crate::config::Config;
use crate::error::{ResolveError, Result};
use crate::remote::fs::RemoteMountSource;
use crate::remote::{seek_probe, Capabilities, Resolved};

pub(crate) fn resolve(url_str: &str, caps: &Capabilities, config: &Config) -> Result<Resolved> {
    let adapter = caps.require_ssh()?;
    let parsed = Url::parse(url_str)
        .map_err(|err| ResolveError::invalid_url(url_str, err.to_string()))?;
    let fs = adapter.connect(&parsed, config)?;

    let mut path = parsed.path();
    if let Some(stripped) = path.strip_prefix('/') {
        path = stripped;
    }
    let path = if path.is_empty() { "." } else { path };

    if !fs.exists(path)? {
        return Err(ResolveError::RemoteNotFound {
            url: url_str.to_string(),
            path: path.to_string(),
        });
    }

    if fs.is_dir(path)? {
        Ok(Resolved::Mount(Box::new(RemoteMountSource::new(
            fs, path, url_str,
        ))))
    } else {
        let mut stream = fs.open(path)?;
        seek_probe(stream.as_mut()).map_err(|err| ResolveError::transport(url_str, err))?;
        Ok(Resolved::Stream(stream))
    }
}
