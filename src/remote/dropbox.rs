//! `dropbox://` scheme glue.
//!
//! The Dropbox API wants every path to start with a slash and rejects
//! trailing slashes, so both are fixed up here instead of in every caller.
//! The access token comes from the environment; there is no way to carry
//! it in the URL itself.

use std::env;
use std::sync::Arc;

use crate::error::{ResolveError, Result};
use crate::remote::capability::Capabilities;
use crate::remote::fs::RemoteFilesystem;

const TOKEN_VAR: &str = "DROPBOX_TOKEN";

/// Force a leading slash, strip trailing ones; the root becomes `""`
pub(crate) fn normalize_path(raw: &str) -> String {
    let mut path = raw.to_string();
    if !path.is_empty() && !path.starts_with('/') {
        path.insert(0, '/');
    }
    while path.ends_with('/') {
        path.pop();
    }
    path
}

pub(crate) fn resolve(
    rest: &str,
    caps: &Capabilities,
) -> Result<(Arc<dyn RemoteFilesystem>, String)> {
    let adapter = caps.require_dropbox()?;

    let token = env::var(TOKEN_VAR).ok().filter(|token| !token.is_empty());
    let Some(token) = token else {
        return Err(ResolveError::configuration(
            "Dropbox access token",
            format!("set the {TOKEN_VAR} environment variable to mount dropbox:// URLs"),
        ));
    };

    let fs = adapter.connect(&token)?;
    Ok((fs, normalize_path(rest)))
}
