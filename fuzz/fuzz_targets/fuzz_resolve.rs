#![no_main]

use arcmount_rs::{open_mount_source, Config};
use libfuzzer_sys::fuzz_target;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Write fuzz data to a temporary file with an archive-looking name so
    // the extension hints kick in.
    let dir = match tempfile::tempdir() {
        Ok(d) => d,
        Err(_) => return,
    };
    let path = dir.path().join("fuzzed.tar.gz");
    let mut file = match std::fs::File::create(&path) {
        Ok(f) => f,
        Err(_) => return,
    };
    if file.write_all(data).is_err() || file.flush().is_err() {
        return;
    }
    drop(file);

    // Resolution must never panic, whatever the bytes are.
    let mount = match open_mount_source(path.as_path(), &Config::new()) {
        Ok(m) => m,
        Err(_) => return, // Expected for invalid data
    };

    // Walking the resolved mount must never panic either.
    if let Ok(entries) = mount.list("/") {
        for entry in entries.iter().take(64) {
            let _ = mount.metadata(&entry.name);
            if let Ok(mut reader) = mount.open(&entry.name) {
                let mut buf = [0u8; 4096];
                let _ = std::io::Read::read(&mut reader, &mut buf);
            }
        }
    }
    let _ = mount.metadata("");
    let _ = mount.metadata("../../../etc/passwd");
});
