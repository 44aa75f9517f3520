//! `webdav://` scheme glue.
//!
//! WebDAV URLs carry no transport protocol, so before constructing the
//! client we probe whether the host answers HTTPS with a short timed HEAD
//! request and fall back to HTTP otherwise. Credentials come from the URI
//! or, for characters the URI form cannot carry, from the `WEBDAV_USER` /
//! `WEBDAV_PASSWORD` environment variables, in that precedence.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ResolveError, Result};
use crate::remote::capability::Capabilities;
use crate::remote::fs::RemoteFilesystem;

const USER_VAR: &str = "WEBDAV_USER";
const PASSWORD_VAR: &str = "WEBDAV_PASSWORD";

const HTTPS_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// `[user:password@]host[:port][/path]`
static WEBDAV_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:([^:/]*):([^@/]*)@)?([^/]*)(.*)$").expect("webdav URI pattern"));

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct WebdavLocation {
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub path: String,
}

pub(crate) fn parse_location(rest: &str) -> Result<WebdavLocation> {
    let captures = WEBDAV_URI.captures(rest).ok_or_else(|| {
        ResolveError::invalid_url(
            format!("webdav://{rest}"),
            format!(
                "expected webdav://[user:password@]host[:port][/path]; if your user name or \
                 password contains special characters such as ':/@', use the {USER_VAR} and \
                 {PASSWORD_VAR} environment variables instead"
            ),
        )
    })?;

    let host = captures
        .get(3)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    if host.is_empty() {
        return Err(ResolveError::invalid_url(
            format!("webdav://{rest}"),
            "missing host",
        ));
    }

    Ok(WebdavLocation {
        username: captures.get(1).map(|m| m.as_str().to_string()),
        password: captures.get(2).map(|m| m.as_str().to_string()),
        host,
        path: captures
            .get(4)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    })
}

/// Credentials from the URI, falling back to the environment per field
fn resolve_auth(location: &WebdavLocation) -> Option<(String, String)> {
    let username = location
        .username
        .clone()
        .or_else(|| env::var(USER_VAR).ok());
    let password = location
        .password
        .clone()
        .or_else(|| env::var(PASSWORD_VAR).ok());
    match (username, password) {
        (Some(username), Some(password)) => Some((username, password)),
        _ => None,
    }
}

/// Short timed HEAD request; any answer counts, any failure means HTTP
fn https_answers(host: &str) -> bool {
    let client = match reqwest::blocking::Client::builder()
        .timeout(HTTPS_PROBE_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            tracing::warn!(error = %err, "could not build HTTPS probe client");
            return false;
        }
    };
    match client.head(format!("https://{host}/")).send() {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(host, error = %err, "WebDAV host does not answer HTTPS, using HTTP");
            false
        }
    }
}

pub(crate) fn resolve(
    rest: &str,
    caps: &Capabilities,
) -> Result<(Arc<dyn RemoteFilesystem>, String)> {
    let adapter = caps.require_webdav()?;
    let location = parse_location(rest)?;
    let auth = resolve_auth(&location);

    let protocol = if https_answers(&location.host) {
        "https"
    } else {
        "http"
    };
    let fs = adapter.connect(&format!("{protocol}://{}", location.host), auth)?;
    Ok((fs, location.path))
}
