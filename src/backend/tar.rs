//! Tar-family backend: plain tar plus gzip/zstd/xz compressed tar.
//!
//! The probe sniffs magic bytes before handing the stream to the `tar`
//! crate, then unpacks entries into a scratch directory and serves the
//! resulting tree. A wrong-format source declines with `Ok(None)`; a
//! right-magic-but-corrupt source fails, which the trial loop treats as a
//! decline.

use std::io::{self, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::backend::ProbeSource;
use crate::config::Config;
use crate::error::Result;
use crate::mount::{ExtractedMountSource, MountSource};

pub const ID: &str = "tar";

/// Extension hints, including bare codec suffixes the tar backend owns
pub const EXTENSIONS: &[&str] = &[
    "tar", "tar.gz", "tgz", "tar.zst", "tzst", "tar.xz", "txz", "gz", "zst", "xz",
];

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];
const XZ_MAGIC: &[u8] = &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];
const USTAR_MAGIC_OFFSET: usize = 257;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Codec {
    Plain,
    Gzip,
    Zstd,
    Xz,
}

/// Sniff the outer codec from a header buffer.
///
/// Plain tar requires the ustar magic, so at least 262 header bytes.
fn sniff(header: &[u8]) -> Option<Codec> {
    if header.starts_with(GZIP_MAGIC) {
        return Some(Codec::Gzip);
    }
    if header.starts_with(ZSTD_MAGIC) {
        return Some(Codec::Zstd);
    }
    if header.starts_with(XZ_MAGIC) {
        return Some(Codec::Xz);
    }
    if header.len() >= USTAR_MAGIC_OFFSET + 5
        && &header[USTAR_MAGIC_OFFSET..USTAR_MAGIC_OFFSET + 5] == b"ustar"
    {
        return Some(Codec::Plain);
    }
    None
}

fn decoder<'r>(codec: Codec, reader: Box<dyn Read + 'r>) -> Result<Box<dyn Read + 'r>> {
    match codec {
        Codec::Plain => Ok(reader),
        Codec::Gzip => Ok(Box::new(GzDecoder::new(reader))),
        #[cfg(feature = "zstd")]
        Codec::Zstd => Ok(Box::new(zstd::stream::read::Decoder::new(reader)?)),
        #[cfg(not(feature = "zstd"))]
        Codec::Zstd => Err(crate::error::ResolveError::configuration(
            "zstd decompression",
            "rebuild with the `zstd` cargo feature to open zstd-compressed tar archives",
        )),
        #[cfg(feature = "xz")]
        Codec::Xz => Ok(Box::new(xz2::read::XzDecoder::new(reader))),
        #[cfg(not(feature = "xz"))]
        Codec::Xz => Err(crate::error::ResolveError::configuration(
            "xz decompression",
            "rebuild with the `xz` cargo feature to open xz-compressed tar archives",
        )),
    }
}

/// Probe a source as a (possibly compressed) tar archive
pub fn probe(
    source: &mut ProbeSource<'_>,
    _config: &Config,
) -> Result<Option<Box<dyn MountSource>>> {
    let header = source.peek_header(512)?;
    let Some(codec) = sniff(&header) else {
        return Ok(None);
    };

    let dir = tempfile::tempdir()?;
    match source {
        ProbeSource::Path(path) => {
            let file = std::fs::File::open(path)?;
            unpack(codec, Box::new(file), dir.path())?;
        }
        ProbeSource::Stream(stream) => {
            unpack(codec, Box::new(&mut **stream), dir.path())?;
        }
    }
    Ok(Some(Box::new(ExtractedMountSource::new(dir)?)))
}

fn unpack(codec: Codec, reader: Box<dyn Read + '_>, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(decoder(codec, reader)?);
    let mut unpacked = 0usize;
    for entry in archive.entries()? {
        let mut entry = entry?;
        // unpack_in refuses entry paths that would escape `dest`.
        if entry.unpack_in(dest)? {
            unpacked += 1;
        }
    }
    if unpacked == 0 {
        // A compressed stream with zero tar entries is a bare compressed
        // file, not a tar archive; let the next candidate have it.
        return Err(io::Error::new(io::ErrorKind::InvalidData, "no tar entries").into());
    }
    Ok(())
}
