//! One continuous stream over an ordered shard list.
//!
//! [`JoinedReader`] presents the shards of a [`SplitGroup`] as a single
//! seekable byte-stream. Shards are opened lazily, exactly one at a time:
//! a read crossing a shard boundary advances to the next shard, and a seek
//! opens only the shard owning the target offset, closing whichever shard
//! was open before. A read returns fewer bytes than requested only at true
//! end-of-stream.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;

use crate::split::SplitGroup;

struct Shard {
    path: PathBuf,
    start: u64,
    size: u64,
}

/// Lazily-opened seekable stream over ordered shards
pub struct JoinedReader {
    shards: Vec<Shard>,
    total: u64,
    pos: u64,
    open_shard: Option<(usize, File)>,
}

impl JoinedReader {
    pub fn new(group: &SplitGroup) -> Self {
        Self::from_parts(group.parts.clone())
    }

    /// Build from explicit `(path, size)` pairs in join order
    pub fn from_parts(parts: Vec<(PathBuf, u64)>) -> Self {
        let mut shards = Vec::with_capacity(parts.len());
        let mut start = 0u64;
        for (path, size) in parts {
            shards.push(Shard { path, start, size });
            start += size;
        }
        Self {
            shards,
            total: start,
            pos: 0,
            open_shard: None,
        }
    }

    /// Logical size of the joined stream
    pub fn total_size(&self) -> u64 {
        self.total
    }

    /// Index of the shard owning `pos`, `None` at or past end-of-stream
    fn shard_index(&self, pos: u64) -> Option<usize> {
        if pos >= self.total {
            return None;
        }
        let next = self.shards.partition_point(|shard| shard.start <= pos);
        Some(next - 1)
    }
}

impl Read for JoinedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            let Some(index) = self.shard_index(self.pos) else {
                break; // true end-of-stream
            };
            let shard = &self.shards[index];
            let offset_in_shard = self.pos - shard.start;

            // Open the owning shard, closing the previous one.
            match &self.open_shard {
                Some((open_index, _)) if *open_index == index => {}
                _ => {
                    let mut file = File::open(&shard.path)?;
                    file.seek(SeekFrom::Start(offset_in_shard))?;
                    self.open_shard = Some((index, file));
                }
            }
            let Some((_, file)) = self.open_shard.as_mut() else {
                break;
            };

            let remaining_in_shard = (shard.size - offset_in_shard) as usize;
            let want = remaining_in_shard.min(buf.len() - written);
            let count = file.read(&mut buf[written..written + want])?;
            if count == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "shard {} is shorter than its recorded size",
                        shard.path.display()
                    ),
                ));
            }
            written += count;
            self.pos += count as u64;
        }
        Ok(written)
    }
}

impl Seek for JoinedReader {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let new_pos = match target {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.pos) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(self.total) + i128::from(delta),
        };
        if new_pos < 0 || new_pos > i128::from(u64::MAX) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            ));
        }
        self.pos = new_pos as u64;

        // Drop the open shard if the cursor left it; the owning shard is
        // opened lazily on the next read.
        if let Some(open_index) = self.open_shard.as_ref().map(|(index, _)| *index) {
            if self.shard_index(self.pos) != Some(open_index) {
                self.open_shard = None;
            } else {
                let shard = &self.shards[open_index];
                let offset_in_shard = self.pos - shard.start;
                if let Some((_, file)) = self.open_shard.as_mut() {
                    file.seek(SeekFrom::Start(offset_in_shard))?;
                }
            }
        }
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn shard(dir: &Path, name: &str, data: &[u8]) -> (PathBuf, u64) {
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        (path, data.len() as u64)
    }

    fn sample_reader(dir: &Path) -> JoinedReader {
        let parts = vec![
            shard(dir, "p.001", b"hello "),
            shard(dir, "p.002", b"joined "),
            shard(dir, "p.003", b"world"),
        ];
        JoinedReader::from_parts(parts)
    }

    #[test]
    fn test_read_crosses_shard_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = sample_reader(dir.path());

        let mut all = String::new();
        reader.read_to_string(&mut all).unwrap();
        assert_eq!(all, "hello joined world");
    }

    #[test]
    fn test_short_read_only_at_end_of_stream() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = sample_reader(dir.path());

        // A buffer spanning all three shards must fill completely in one call.
        let mut buf = [0u8; 18];
        assert_eq!(reader.read(&mut buf).unwrap(), 18);
        assert_eq!(&buf, b"hello joined world");
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_seek_lands_in_owning_shard() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = sample_reader(dir.path());

        reader.seek(SeekFrom::Start(6)).unwrap();
        let mut buf = [0u8; 6];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"joined");

        reader.seek(SeekFrom::End(-5)).unwrap();
        let mut tail = String::new();
        reader.read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "world");

        reader.seek(SeekFrom::Start(4)).unwrap();
        reader.seek(SeekFrom::Current(9)).unwrap();
        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "orld");
    }

    #[test]
    fn test_seek_before_start_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = sample_reader(dir.path());
        assert!(reader.seek(SeekFrom::Current(-1)).is_err());
        assert!(reader.seek(SeekFrom::End(-100)).is_err());
    }

    #[test]
    fn test_seek_past_end_reads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = sample_reader(dir.path());
        reader.seek(SeekFrom::Start(1000)).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_rewind_after_partial_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = sample_reader(dir.path());

        let mut buf = [0u8; 10];
        reader.read_exact(&mut buf).unwrap();
        reader.rewind().unwrap();
        let mut all = String::new();
        reader.read_to_string(&mut all).unwrap();
        assert_eq!(all, "hello joined world");
    }

    #[test]
    fn test_truncated_shard_is_unexpected_eof() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = shard(dir.path(), "t.001", b"abc");
        // Recorded size exceeds what is on disk.
        let mut reader = JoinedReader::from_parts(vec![(path, 10)]);
        let mut buf = [0u8; 10];
        let err = reader.read_exact(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_empty_part_list() {
        let mut reader = JoinedReader::from_parts(Vec::new());
        assert_eq!(reader.total_size(), 0);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }
}
