//! 文件系统门面
//!
//! The glob engine only needs a handful of read-only primitives; they are
//! captured by [`FileSystem`] so the walker can run against the real disk
//! ([`LocalFileSystem`]) or any instrumented stand-in.

mod local;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::FsResult;

pub use local::LocalFileSystem;

/// One immediate child of a listed directory.
///
/// `is_directory` and `is_symlink` describe the entry itself, without
/// following links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub name: OsString,
    pub is_directory: bool,
    pub is_symlink: bool,
}

impl ChildEntry {
    pub fn new(name: impl Into<OsString>, is_directory: bool, is_symlink: bool) -> Self {
        Self {
            name: name.into(),
            is_directory,
            is_symlink,
        }
    }
}

/// Minimal async filesystem surface consumed by the directory walker.
#[async_trait]
pub trait FileSystem: Send + Sync + 'static {
    /// Whether `path` exists, following symlinks.
    async fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory, following symlinks.
    async fn is_directory(&self, path: &Path) -> bool;

    /// Immediate children of a directory, in no particular order.
    async fn list_children(&self, path: &Path) -> FsResult<Vec<ChildEntry>>;

    /// Final destination of a symlink.
    ///
    /// Fails with `NotASymlink` when `path` is not a link, and with
    /// `NotFound` when the destination is absent.
    async fn resolve_symlink(&self, path: &Path) -> FsResult<PathBuf>;

    /// Canonical form of an existing path with every link resolved.
    async fn canonicalize(&self, path: &Path) -> FsResult<PathBuf>;
}
