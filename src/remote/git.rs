//! `git://` scheme glue.
//!
//! Parses `git://[repository_path:][reference@]path_inside` and hands the
//! components to the registered repository-snapshot adapter. The adapter
//! decides directory-vs-file semantics for the path inside the tree.

use crate::config::Config;
use crate::error::Result;
use crate::remote::capability::{Capabilities, GitTarget};
use crate::remote::Resolved;

/// Split the part after `git://` into repository, reference, and path
pub(crate) fn parse_target(rest: &str) -> GitTarget {
    let (repository, remainder) = match rest.split_once(':') {
        Some((repository, remainder)) => (Some(repository.to_string()), remainder),
        None => (None, rest),
    };
    let (reference, path) = match remainder.split_once('@') {
        Some((reference, path)) => (Some(reference.to_string()), path),
        None => (None, remainder),
    };
    GitTarget {
        repository,
        reference,
        path: path.to_string(),
    }
}

pub(crate) fn resolve(rest: &str, caps: &Capabilities, config: &Config) -> Result<Resolved> {
    let adapter = caps.require_git()?;
    adapter.open(&parse_target(rest), config)
}
