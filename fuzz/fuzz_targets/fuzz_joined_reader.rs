#![no_main]

use arcmount_rs::JoinedReader;
use libfuzzer_sys::fuzz_target;
use std::io::{Read, Seek, SeekFrom};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    // First byte picks the shard count, the rest is the payload.
    let shard_count = (data[0] % 4) as usize + 1;
    let payload = &data[1..];

    let dir = match tempfile::tempdir() {
        Ok(d) => d,
        Err(_) => return,
    };

    let chunk = payload.len().div_ceil(shard_count);
    let mut parts = Vec::new();
    for (index, piece) in payload.chunks(chunk.max(1)).enumerate() {
        let path = dir.path().join(format!("shard.{index:03}"));
        if std::fs::write(&path, piece).is_err() {
            return;
        }
        parts.push((path, piece.len() as u64));
    }

    let mut reader = JoinedReader::from_parts(parts);

    // Reading everything back must reproduce the payload exactly.
    let mut joined = Vec::new();
    if reader.read_to_end(&mut joined).is_err() {
        return;
    }
    assert_eq!(joined, payload);

    // Seeks derived from the payload bytes must never panic, and reads
    // after a seek must match the payload slice at that offset.
    let offset = (data[1] as u64 * 7 + data[2] as u64) % (payload.len() as u64 + 1);
    if reader.seek(SeekFrom::Start(offset)).is_err() {
        return;
    }
    let mut tail = Vec::new();
    if reader.read_to_end(&mut tail).is_err() {
        return;
    }
    assert_eq!(tail, &payload[offset as usize..]);
});
