//! Backend descriptors and the registry driving the trial loop.
//!
//! A backend is a format reader behind a fixed contract: a probe that
//! either claims a source by returning a mount source, or declines it.
//! The registry is a declarative table, immutable once built, so adding or
//! removing a backend never touches the trial control flow. The built-in
//! table is assembled once per process from the compiled-in features.

#[cfg(feature = "tar")]
pub mod tar;
#[cfg(feature = "zip")]
pub mod zip;

use std::io::{Read, Seek};
use std::path::Path;

use once_cell::sync::Lazy;

use crate::config::Config;
use crate::error::Result;
use crate::mount::{MountSource, ReadSeek};

/// Input handed to a backend probe: a local path or a seekable stream
pub enum ProbeSource<'a> {
    Path(&'a Path),
    Stream(&'a mut dyn ReadSeek),
}

impl ProbeSource<'_> {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ProbeSource::Path(path) => Some(path),
            ProbeSource::Stream(_) => None,
        }
    }

    /// Read up to `len` leading bytes without consuming the source.
    ///
    /// Path sources are opened and dropped again; stream sources are read
    /// and rewound. The returned buffer is shorter than `len` only when
    /// the source itself is.
    pub fn peek_header(&mut self, len: usize) -> Result<Vec<u8>> {
        match self {
            ProbeSource::Path(path) => {
                let mut file = std::fs::File::open(path)?;
                Ok(read_up_to(&mut file, len)?)
            }
            ProbeSource::Stream(stream) => {
                let header = read_up_to(stream, len)?;
                stream.rewind()?;
                Ok(header)
            }
        }
    }
}

fn read_up_to(reader: &mut (impl Read + ?Sized), len: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let count = reader.read(&mut buf[filled..])?;
        if count == 0 {
            break;
        }
        filled += count;
    }
    buf.truncate(filled);
    Ok(buf)
}

/// Probe signature: claim the source with a mount source, decline with
/// `Ok(None)`, or fail (the trial loop treats failure as a decline)
pub type ProbeFn = fn(&mut ProbeSource<'_>, &Config) -> Result<Option<Box<dyn MountSource>>>;

/// One registered backend: id, probe, and extension hints tried first
#[derive(Clone, Copy)]
pub struct Backend {
    pub id: &'static str,
    pub probe: ProbeFn,
    /// Lowercase suffixes (without the leading dot) this backend is
    /// prioritized for
    pub extensions: &'static [&'static str],
}

/// Immutable backend table; iteration order is registration order
pub struct Registry {
    backends: Vec<Backend>,
}

pub struct RegistryBuilder {
    backends: Vec<Backend>,
}

impl RegistryBuilder {
    pub fn register(mut self, backend: Backend) -> Self {
        debug_assert!(
            !self.backends.iter().any(|b| b.id == backend.id),
            "duplicate backend id: {}",
            backend.id
        );
        self.backends.push(backend);
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            backends: self.backends,
        }
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            backends: Vec::new(),
        }
    }

    /// The compiled-in backend table, assembled once per process
    pub fn builtin() -> &'static Registry {
        static BUILTIN: Lazy<Registry> = Lazy::new(|| {
            let builder = Registry::builder();
            #[cfg(feature = "tar")]
            let builder = builder.register(Backend {
                id: tar::ID,
                probe: tar::probe,
                extensions: tar::EXTENSIONS,
            });
            #[cfg(feature = "zip")]
            let builder = builder.register(Backend {
                id: zip::ID,
                probe: zip::probe,
                extensions: zip::EXTENSIONS,
            });
            builder.build()
        });
        &BUILTIN
    }

    pub fn get(&self, id: &str) -> Option<&Backend> {
        self.backends.iter().find(|backend| backend.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.backends.iter().map(|backend| backend.id)
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    /// Ids whose extension hints match `file_name`, in registration order
    pub fn matching(&self, file_name: &str) -> Vec<&'static str> {
        self.backends
            .iter()
            .filter(|backend| matches_extension(file_name, backend.extensions))
            .map(|backend| backend.id)
            .collect()
    }
}

/// Case-insensitive exact dot-suffix match, never a substring test
pub fn matches_extension(file_name: &str, extensions: &[&str]) -> bool {
    let name = file_name.to_ascii_lowercase();
    extensions.iter().any(|ext| {
        let ext = ext.to_ascii_lowercase();
        name.len() > ext.len() + 1 && name.ends_with(&format!(".{ext}"))
    })
}

/// Compression sub-variant ids are owned by the structural tar backend
const TAR_CODEC_ALIASES: &[&str] = &["gzip", "gz", "bzip2", "bz2", "xz", "lzma", "zstd", "zst"];

/// Map a caller-supplied id naming a compression codec to the backend that
/// actually owns that container
pub fn normalize_backend_id(id: &str) -> &str {
    if TAR_CODEC_ALIASES.contains(&id) {
        "tar"
    } else {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_: &mut ProbeSource<'_>, _: &Config) -> Result<Option<Box<dyn MountSource>>> {
        Ok(None)
    }

    #[test]
    fn test_extension_matching_is_exact_suffix() {
        assert!(matches_extension("archive.tar.gz", &["tar.gz"]));
        assert!(matches_extension("ARCHIVE.TAR.GZ", &["tar.gz"]));
        assert!(matches_extension("a.zip", &["zip"]));
        // Substring or bare-name hits must not match.
        assert!(!matches_extension("zip", &["zip"]));
        assert!(!matches_extension("notatar.gz2", &["gz"]));
        assert!(!matches_extension("archive.tgz", &["gz"]));
    }

    #[test]
    fn test_registry_preserves_registration_order() {
        let registry = Registry::builder()
            .register(Backend {
                id: "alpha",
                probe: never,
                extensions: &["a"],
            })
            .register(Backend {
                id: "beta",
                probe: never,
                extensions: &["a", "b"],
            })
            .build();

        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["alpha", "beta"]);
        assert_eq!(registry.matching("x.a"), vec!["alpha", "beta"]);
        assert_eq!(registry.matching("x.b"), vec!["beta"]);
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("gamma").is_none());
    }

    #[test]
    fn test_codec_aliases_normalize_to_tar() {
        assert_eq!(normalize_backend_id("gzip"), "tar");
        assert_eq!(normalize_backend_id("zst"), "tar");
        assert_eq!(normalize_backend_id("tar"), "tar");
        assert_eq!(normalize_backend_id("zip"), "zip");
        assert_eq!(normalize_backend_id("unknown"), "unknown");
    }

    #[test]
    fn test_peek_header_rewinds_stream() {
        let data = b"0123456789".to_vec();
        let mut cursor = std::io::Cursor::new(data);
        let mut source = ProbeSource::Stream(&mut cursor);
        let header = source.peek_header(4).unwrap();
        assert_eq!(header, b"0123");
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_peek_header_short_source() {
        let mut cursor = std::io::Cursor::new(b"ab".to_vec());
        let mut source = ProbeSource::Stream(&mut cursor);
        let header = source.peek_header(16).unwrap();
        assert_eq!(header, b"ab");
    }
}
