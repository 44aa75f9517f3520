//! arcmount-rs: resolve archives, folders, and remote URLs into uniform
//! read-only mount sources
//!
//! Given an opaque reference (an open byte-stream, a local path, or a
//! remote URI), this library decides which format backend or transport
//! adapter can interpret it and exposes the result as a [`MountSource`]:
//! list directories, fetch metadata, open readable views. Multi-part
//! archives are detected and transparently joined; competing backends are
//! tried in a deterministic order, and a failed attempt never disturbs the
//! stream position the next attempt sees.
//!
//! # Example
//!
//! ```no_run
//! use arcmount_rs::{open_mount_source, Config, MountSource};
//!
//! let mount = open_mount_source("backup.tar.gz", &Config::new())?;
//! for entry in mount.list("/")? {
//!     println!("{}", entry.name);
//! }
//! let reader = mount.open("etc/hosts")?;
//! # drop(reader);
//! # Ok::<(), arcmount_rs::ResolveError>(())
//! ```

// Core modules
pub mod backend;
pub mod config;
pub mod error;
pub mod factory;
pub mod join;
pub mod mount;
pub mod remote;
pub mod split;

// Re-export commonly used types
pub use backend::{Backend, ProbeFn, ProbeSource, Registry};
pub use config::Config;
pub use error::{ResolveError, Result};
pub use factory::{open_mount_source, open_mount_source_in, Source};
pub use join::JoinedReader;
pub use mount::{
    DirEntry, FileInfo, FileKind, FolderMountSource, MountSource, ReadSeek, SingleFileMountSource,
};
pub use remote::{resolve_url, Capabilities, RemoteFilesystem, RemoteMountSource, Resolved};
pub use split::SplitGroup;
