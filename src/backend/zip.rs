//! Zip backend.
//!
//! Magic check first, then the `zip` crate parses the central directory
//! and entries are unpacked into a scratch directory.

use std::io::{Read, Seek};
use std::path::Path;

use crate::backend::ProbeSource;
use crate::config::Config;
use crate::error::Result;
use crate::mount::{ExtractedMountSource, MountSource};

pub const ID: &str = "zip";

pub const EXTENSIONS: &[&str] = &["zip", "jar"];

/// Local-file-header magic, plus the end-of-central-directory magic an
/// empty zip starts with
fn is_zip_magic(header: &[u8]) -> bool {
    header.starts_with(b"PK\x03\x04") || header.starts_with(b"PK\x05\x06")
}

/// Probe a source as a zip archive
pub fn probe(
    source: &mut ProbeSource<'_>,
    _config: &Config,
) -> Result<Option<Box<dyn MountSource>>> {
    let header = source.peek_header(4)?;
    if !is_zip_magic(&header) {
        return Ok(None);
    }

    let dir = tempfile::tempdir()?;
    match source {
        ProbeSource::Path(path) => {
            let file = std::fs::File::open(path)?;
            unpack(file, dir.path())?;
        }
        ProbeSource::Stream(stream) => {
            unpack(&mut **stream, dir.path())?;
        }
    }
    Ok(Some(Box::new(ExtractedMountSource::new(dir)?)))
}

fn unpack<R: Read + Seek>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(reader)?;
    // extract() sanitizes entry names against escaping `dest`.
    archive.extract(dest)?;
    Ok(())
}
