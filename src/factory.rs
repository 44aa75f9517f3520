//! The trial engine: turn an opaque source into a mount source.
//!
//! A source is a local path, an open seekable stream, or a URL. URLs are
//! resolved first; paths are checked for existence, directories short-
//! circuit, and split archives are joined. What remains runs through an
//! ordered trial of backend probes: explicit priority first, extension
//! hints second, the full registry as a deterministic catch-all. A probe
//! declining, by returning nothing or by failing, is routine control
//! flow; only exhausting every candidate is an error.

use std::collections::HashSet;
use std::io::Seek;
use std::path::{Path, PathBuf};

use crate::backend::{normalize_backend_id, ProbeSource, Registry};
use crate::config::{keys, Config};
use crate::error::{ResolveError, Result};
use crate::join::JoinedReader;
use crate::mount::{FolderMountSource, MountSource, ReadSeek, SingleFileMountSource};
use crate::remote::{resolve_url, Capabilities, Resolved};
use crate::split::SplitGroup;

/// An opaque reference to something that may be mountable
pub enum Source {
    Path(PathBuf),
    Stream(Box<dyn ReadSeek>),
    Url(String),
}

impl Source {
    /// Wrap an open seekable stream
    pub fn from_stream(stream: impl ReadSeek + 'static) -> Self {
        Source::Stream(Box::new(stream))
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        if value.contains("://") {
            Source::Url(value.to_string())
        } else {
            Source::Path(PathBuf::from(value))
        }
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Source::from(value.as_str())
    }
}

impl From<&Path> for Source {
    fn from(value: &Path) -> Self {
        Source::Path(value.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(value: PathBuf) -> Self {
        Source::Path(value)
    }
}

impl From<Box<dyn ReadSeek>> for Source {
    fn from(value: Box<dyn ReadSeek>) -> Self {
        Source::Stream(value)
    }
}

/// Local shape of a source once URLs are out of the picture
enum Opened {
    Path(PathBuf),
    Stream(Box<dyn ReadSeek>),
}

/// Resolve a source against the built-in registry and the process-wide
/// capability set.
pub fn open_mount_source(
    source: impl Into<Source>,
    config: &Config,
) -> Result<Box<dyn MountSource>> {
    open_mount_source_in(
        Registry::builtin(),
        Capabilities::detect(),
        source.into(),
        config,
    )
}

/// Resolve a source against an explicit registry and capability set.
///
/// The trial is synchronous; a stream source must not be resolved
/// concurrently by another call, since probing moves its read position.
pub fn open_mount_source_in(
    registry: &Registry,
    caps: &Capabilities,
    source: Source,
    config: &Config,
) -> Result<Box<dyn MountSource>> {
    let mut config = config.clone();

    let (mut opened, source_display) = match source {
        Source::Url(url) => match resolve_url(&url, caps, &config)? {
            // A directory-like URL is already a finished mount source;
            // the backend trial never runs.
            Resolved::Mount(mount) => return Ok(mount),
            Resolved::LocalPath(path) => {
                let display = path.display().to_string();
                (Opened::Path(path), display)
            }
            Resolved::Stream(stream) => {
                // Carry the URL as the logical name so backends can derive
                // properly named index/cache files for anonymous streams.
                if config.source_name().is_none() {
                    config = config.with(keys::SOURCE_NAME, url.clone());
                }
                (Opened::Stream(stream), url)
            }
        },
        Source::Path(path) => {
            let display = path.display().to_string();
            (Opened::Path(path), display)
        }
        Source::Stream(stream) => {
            let display = config.source_name().unwrap_or("<stream>").to_string();
            (Opened::Stream(stream), display)
        }
    };

    let mut split_group: Option<SplitGroup> = None;
    let mut extension_candidates: Vec<&'static str> = Vec::new();

    if let Opened::Path(path) = &opened {
        if !path.exists() {
            return Err(ResolveError::NotFound { path: path.clone() });
        }
        if path.is_dir() {
            // Archive-backend trial never applies to directories.
            return Ok(Box::new(FolderMountSource::new(path)?));
        }

        if let Some(group) = SplitGroup::detect(path)? {
            split_group = Some(group);
        } else if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            extension_candidates = registry.matching(name);
        }
    }

    if let Some(group) = &split_group {
        // Index files default to sitting next to the first shard, unless
        // the caller already chose a location.
        if config.index_file_path().is_none() {
            let mut index = group.first().as_os_str().to_owned();
            index.push(".index");
            config = config.with(keys::INDEX_FILE_PATH, index.to_string_lossy().into_owned());
        }
        tracing::debug!(
            parts = group.parts.len(),
            name = %group.logical_name,
            "joining split archive"
        );
        opened = Opened::Stream(Box::new(JoinedReader::new(group)));
    }

    // Candidate order: explicit priority always wins, extension matches
    // precede the catch-all, registration order breaks the remaining ties.
    let mut candidates: Vec<String> = config.priority_backends();
    candidates.extend(extension_candidates.iter().map(|id| id.to_string()));
    candidates.extend(registry.ids().map(|id| id.to_string()));

    let verbosity = config.debug_verbosity();
    let mut tried: HashSet<&str> = HashSet::new();

    for candidate in &candidates {
        let id = normalize_backend_id(candidate);
        if !tried.insert(id) {
            continue;
        }
        let Some(backend) = registry.get(id) else {
            tracing::debug!(backend = id, "skipping unknown backend");
            continue;
        };
        if verbosity >= 3 {
            tracing::debug!(backend = id, source = %source_display, "trying backend");
        }

        let attempt = match &mut opened {
            Opened::Path(path) => (backend.probe)(&mut ProbeSource::Path(path), &config),
            Opened::Stream(stream) => {
                (backend.probe)(&mut ProbeSource::Stream(stream.as_mut()), &config)
            }
        };

        match attempt {
            Ok(Some(mount)) => {
                if verbosity >= 2 {
                    tracing::debug!(backend = id, source = %source_display, "opened source");
                }
                return Ok(mount);
            }
            Ok(None) => {}
            // A probe failing is a decline, not a fault of the trial.
            Err(err) => {
                tracing::debug!(backend = id, error = %err, "backend declined source");
            }
        }

        // The next candidate expects an unconsumed stream.
        if let Opened::Stream(stream) = &mut opened {
            if let Err(err) = stream.rewind() {
                tracing::warn!(error = %err, "rewinding source after probe failed");
            }
        }
    }

    if let Some(group) = split_group {
        // No backend recognized the joined payload; still expose the
        // shard group as a single opaque file rather than failing.
        tracing::debug!(
            name = %group.logical_name,
            "no backend matched; exposing joined shards as a single file"
        );
        return Ok(Box::new(SingleFileMountSource::new(
            group.logical_name.clone(),
            group,
        )));
    }

    Err(ResolveError::UnrecognizedFormat {
        source_name: source_display,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_classification_from_str() {
        assert!(matches!(Source::from("a/b.tar"), Source::Path(_)));
        assert!(matches!(Source::from("file:///a/b.tar"), Source::Url(_)));
        assert!(matches!(
            Source::from("https://host/x.zip".to_string()),
            Source::Url(_)
        ));
    }

    #[test]
    fn test_missing_path_fails_fast() {
        let err = open_mount_source("definitely/not/here.tar", &Config::new());
        assert!(matches!(err, Err(ResolveError::NotFound { .. })));
    }

    #[test]
    fn test_directory_source_returns_folder_mount() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.txt"), b"x").unwrap();

        let mount = open_mount_source(dir.path(), &Config::new()).unwrap();
        let entries = mount.list("").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "x.txt");
    }
}
