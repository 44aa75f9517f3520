//! Directory-backed mount source.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{ResolveError, Result};
use crate::mount::{trim_mount_path, DirEntry, FileInfo, FileKind, MountSource, ReadSeek};

/// Mount source serving a local directory tree as-is
pub struct FolderMountSource {
    root: PathBuf,
}

impl FolderMountSource {
    /// Open a directory as a mount source.
    ///
    /// The root is canonicalized so later symlink shenanigans under a
    /// relative path cannot move it; a literal `.` is kept as-is.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let root = if path == Path::new(".") {
            path.to_path_buf()
        } else {
            path.canonicalize()?
        };
        if !root.is_dir() {
            return Err(ResolveError::NotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a mount path under the root, rejecting traversal above it
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        let mut depth: usize = 0;
        for component in Path::new(trim_mount_path(path)).components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    if depth == 0 {
                        return Err(ResolveError::Io(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            format!("path escapes mount root: {path}"),
                        )));
                    }
                    resolved.pop();
                    depth -= 1;
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(ResolveError::Io(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("absolute component in mount path: {path}"),
                    )));
                }
            }
        }
        Ok(resolved)
    }
}

fn kind_of(file_type: fs::FileType) -> FileKind {
    if file_type.is_dir() {
        FileKind::Directory
    } else if file_type.is_symlink() {
        FileKind::Symlink
    } else {
        FileKind::File
    }
}

impl MountSource for FolderMountSource {
    fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        let dir = self.resolve(path)?;
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: kind_of(entry.file_type()?),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn metadata(&self, path: &str) -> Result<Option<FileInfo>> {
        let target = self.resolve(path)?;
        match fs::symlink_metadata(&target) {
            Ok(meta) => Ok(Some(FileInfo {
                size: meta.len(),
                kind: kind_of(meta.file_type()),
                mtime: meta.modified().ok(),
            })),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn open(&self, path: &str) -> Result<Box<dyn ReadSeek>> {
        let target = self.resolve(path)?;
        let file = fs::File::open(target)?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        fs::write(dir.path().join("sub/b.txt"), b"beta").unwrap();
        dir
    }

    #[test]
    fn test_list_and_metadata() {
        let dir = sample_tree();
        let mount = FolderMountSource::new(dir.path()).unwrap();

        let names: Vec<_> = mount
            .list("")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.txt", "sub"]);

        let info = mount.metadata("a.txt").unwrap().unwrap();
        assert_eq!(info.size, 5);
        assert_eq!(info.kind, FileKind::File);

        let info = mount.metadata("/sub").unwrap().unwrap();
        assert!(info.kind.is_dir());

        assert!(mount.metadata("missing").unwrap().is_none());
    }

    #[test]
    fn test_open_reads_content() {
        let dir = sample_tree();
        let mount = FolderMountSource::new(dir.path()).unwrap();

        let mut data = String::new();
        mount
            .open("sub/b.txt")
            .unwrap()
            .read_to_string(&mut data)
            .unwrap();
        assert_eq!(data, "beta");
    }

    #[test]
    fn test_traversal_above_root_rejected() {
        let dir = sample_tree();
        let mount = FolderMountSource::new(dir.path()).unwrap();

        assert!(mount.open("../escape").is_err());
        // Dotdot that stays inside the root is fine.
        assert!(mount.metadata("sub/../a.txt").unwrap().is_some());
    }

    #[test]
    fn test_new_rejects_files_and_missing_paths() {
        let dir = sample_tree();
        assert!(FolderMountSource::new(dir.path().join("a.txt")).is_err());
        assert!(FolderMountSource::new(dir.path().join("nope")).is_err());
    }
}
