//! End-to-end resolution through the built-in registry.

#![cfg(all(feature = "tar", feature = "zip"))]

use std::io::{Read, Write};

use arcmount_rs::{open_mount_source, Config, MountSource, ResolveError};
use flate2::write::GzEncoder;
use flate2::Compression;
use zip::write::SimpleFileOptions;

fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_resolve_tar_gz_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.tar.gz");
    std::fs::write(
        &path,
        gzip(&tar_bytes(&[
            ("hello.txt", b"hello"),
            ("sub/data.bin", b"\x01\x02\x03"),
        ])),
    )
    .unwrap();

    let mount = open_mount_source(path.as_path(), &Config::new()).unwrap();

    let names: Vec<_> = mount
        .list("/")
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert!(names.contains(&"hello.txt".to_string()));
    assert!(names.contains(&"sub".to_string()));

    let mut content = String::new();
    mount
        .open("hello.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "hello");

    let info = mount.metadata("sub/data.bin").unwrap().unwrap();
    assert_eq!(info.size, 3);
}

#[test]
fn test_resolve_zip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.zip");
    std::fs::write(&path, zip_bytes(&[("readme.md", b"# readme")])).unwrap();

    let mount = open_mount_source(path.as_path(), &Config::new()).unwrap();
    let mut content = String::new();
    mount
        .open("readme.md")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "# readme");
}

#[test]
fn test_resolve_archive_with_misleading_name() {
    // A zip named .tar.gz: the extension hint sends tar first, which
    // declines on magic, and the catch-all still finds zip.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actually-a-zip.tar.gz");
    std::fs::write(&path, zip_bytes(&[("inner.txt", b"surprise")])).unwrap();

    let mount = open_mount_source(path.as_path(), &Config::new()).unwrap();
    assert!(mount.metadata("inner.txt").unwrap().is_some());
}

#[test]
fn test_resolve_stream_source() {
    let data = tar_bytes(&[("from-stream.txt", b"streamed")]);
    let source = arcmount_rs::Source::from_stream(std::io::Cursor::new(data));

    let mount = open_mount_source(source, &Config::new()).unwrap();
    assert!(mount.metadata("from-stream.txt").unwrap().is_some());
}

#[test]
fn test_directory_is_mounted_without_backend_trial() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested/file.txt"), b"x").unwrap();

    let mount = open_mount_source(dir.path(), &Config::new()).unwrap();
    let entries = mount.list("nested").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "file.txt");
}

#[test]
fn test_missing_source_is_not_found() {
    let err = open_mount_source("no/such/file.tar", &Config::new())
        .err()
        .unwrap();
    assert!(matches!(err, ResolveError::NotFound { .. }));
}

#[test]
fn test_unrecognized_format_names_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.dat");
    std::fs::write(&path, [0xde, 0xad, 0xbe, 0xef].repeat(64)).unwrap();

    let err = open_mount_source(path.as_path(), &Config::new())
        .err()
        .unwrap();
    match err {
        ResolveError::UnrecognizedFormat { source_name } => {
            assert!(source_name.contains("noise.dat"));
        }
        other => panic!("expected UnrecognizedFormat, got {other}"),
    }
}

#[test]
fn test_unknown_priority_backend_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.tar");
    std::fs::write(&path, tar_bytes(&[("ok.txt", b"fine")])).unwrap();

    // An unregistered id in the priority list is logged and skipped; the
    // extension-matched candidate still wins.
    let config = Config::new().set(
        "priority_backends",
        serde_json::json!(["definitely-not-registered"]),
    );
    let mount = open_mount_source(path.as_path(), &config).unwrap();
    assert!(mount.metadata("ok.txt").unwrap().is_some());
}

#[test]
fn test_compression_alias_in_priority_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.bin");
    std::fs::write(&path, gzip(&tar_bytes(&[("aliased.txt", b"y")]))).unwrap();

    // "gzip" names a compression sub-variant; it is normalized to the tar
    // backend which owns the container.
    let config = Config::new().set("priority_backends", serde_json::json!(["gzip"]));
    let mount = open_mount_source(path.as_path(), &config).unwrap();
    assert!(mount.metadata("aliased.txt").unwrap().is_some());
}
