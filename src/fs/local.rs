//! Local disk implementation of the facade, plus the thin async wrappers
//! (touch, move, copy, replace, ...) that sit around the glob engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use walkdir::WalkDir;

use super::{ChildEntry, FileSystem};
use crate::errors::{ensure_absolute, FsError, FsResult};
use crate::finder::{FindOptions, Finder, GlobStream};

/// The real filesystem, accessed through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }

    /// Search `directory` for paths matching any `include` glob and no
    /// `exclude` glob. See [`Finder`] for details.
    pub fn glob(
        &self,
        directory: &Path,
        include: &[String],
        exclude: &[String],
        skip_hidden_files: bool,
    ) -> FsResult<GlobStream> {
        let options = FindOptions::new().with_skip_hidden_files(skip_hidden_files);
        Finder::new(Arc::new(*self), options).glob(directory, include, exclude)
    }

    /// Create an empty file if nothing exists at `path` yet.
    pub async fn touch(&self, path: &Path) -> FsResult<()> {
        ensure_absolute(path)?;
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| FsError::from_io(e, path))?;
        Ok(())
    }

    pub async fn create_directory(&self, path: &Path, recursive: bool) -> FsResult<()> {
        ensure_absolute(path)?;
        let result = if recursive {
            tokio::fs::create_dir_all(path).await
        } else {
            tokio::fs::create_dir(path).await
        };
        result.map_err(|e| FsError::from_io(e, path))
    }

    pub async fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        ensure_absolute(path)?;
        tokio::fs::read(path).await.map_err(|e| FsError::from_io(e, path))
    }

    pub async fn read_text(&self, path: &Path) -> FsResult<String> {
        ensure_absolute(path)?;
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FsError::from_io(e, path))
    }

    pub async fn write_file(&self, path: &Path, contents: &[u8]) -> FsResult<()> {
        ensure_absolute(path)?;
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| FsError::from_io(e, path))
    }

    pub async fn write_text(&self, path: &Path, text: &str) -> FsResult<()> {
        self.write_file(path, text.as_bytes()).await
    }

    /// Remove a file, symlink or whole directory tree. Absent paths are fine.
    pub async fn remove(&self, path: &Path) -> FsResult<()> {
        ensure_absolute(path)?;
        let metadata = match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(FsError::from_io(e, path)),
        };
        let result = if metadata.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };
        result.map_err(|e| FsError::from_io(e, path))
    }

    /// Move `from` to `to`. The destination must not exist.
    pub async fn move_item(&self, from: &Path, to: &Path) -> FsResult<()> {
        ensure_absolute(from)?;
        ensure_absolute(to)?;
        if !entry_exists(from).await {
            return Err(FsError::NotFound(from.to_path_buf()));
        }
        if entry_exists(to).await {
            return Err(FsError::AlreadyExists(to.to_path_buf()));
        }
        match tokio::fs::rename(from, to).await {
            Ok(()) => Ok(()),
            Err(rename_err) if crosses_devices(&rename_err) => {
                debug!("rename {} -> {} crosses devices, copying instead", from.display(), to.display());
                self.move_by_copy(from, to).await
            }
            Err(rename_err) => Err(FsError::from_io(rename_err, from)),
        }
    }

    /// Copy then remove the source. A failed copy leaves nothing at `to`.
    async fn move_by_copy(&self, from: &Path, to: &Path) -> FsResult<()> {
        if let Err(copy_err) = self.copy(from, to).await {
            if let Err(cleanup_err) = self.remove(to).await {
                warn!("could not clean up partial copy at {}: {}", to.display(), cleanup_err);
            }
            return Err(copy_err);
        }
        self.remove(from).await
    }

    /// Copy a file, or a directory tree, to a destination that must not exist.
    ///
    /// Symlinks inside a copied tree are recreated rather than followed.
    pub async fn copy(&self, from: &Path, to: &Path) -> FsResult<()> {
        ensure_absolute(from)?;
        ensure_absolute(to)?;
        if !entry_exists(from).await {
            return Err(FsError::NotFound(from.to_path_buf()));
        }
        if entry_exists(to).await {
            return Err(FsError::AlreadyExists(to.to_path_buf()));
        }
        let (from, to) = (from.to_path_buf(), to.to_path_buf());
        tokio::task::spawn_blocking(move || copy_tree(&from, &to))
            .await
            .map_err(|e| FsError::TaskFailed(e.to_string()))?
    }

    /// Replace whatever is at `to` with a copy of `with`.
    pub async fn replace(&self, to: &Path, with: &Path) -> FsResult<()> {
        ensure_absolute(to)?;
        ensure_absolute(with)?;
        if !entry_exists(with).await {
            return Err(FsError::NotFound(with.to_path_buf()));
        }
        self.remove(to).await?;
        self.copy(with, to).await
    }

    /// Create `link` pointing at `target`. Relative targets are kept relative.
    pub async fn create_symbolic_link(&self, link: &Path, target: &Path) -> FsResult<()> {
        ensure_absolute(link)?;
        #[cfg(unix)]
        let result = tokio::fs::symlink(target, link).await;
        #[cfg(windows)]
        let result = {
            let resolved = link.parent().map(|p| p.join(target)).unwrap_or_else(|| target.to_path_buf());
            if self.is_directory(&resolved).await {
                tokio::fs::symlink_dir(target, link).await
            } else {
                tokio::fs::symlink_file(target, link).await
            }
        };
        result.map_err(|e| FsError::from_io(e, link))
    }

    /// Canonical path when `path` exists, `path` unchanged otherwise.
    pub async fn resolve_symlinks(&self, path: &Path) -> FsResult<PathBuf> {
        ensure_absolute(path)?;
        match tokio::fs::canonicalize(path).await {
            Ok(resolved) => Ok(resolved),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(path.to_path_buf()),
            Err(e) => Err(FsError::from_io(e, path)),
        }
    }

    pub async fn file_size(&self, path: &Path) -> FsResult<u64> {
        ensure_absolute(path)?;
        tokio::fs::metadata(path)
            .await
            .map(|m| m.len())
            .map_err(|e| FsError::from_io(e, path))
    }

    pub fn current_working_directory(&self) -> FsResult<PathBuf> {
        std::env::current_dir().map_err(|e| FsError::from_io(e, "."))
    }

    /// First `ancestor/relative` that exists, checking `from` and then each parent.
    pub async fn locate_traversing_up(&self, from: &Path, relative: &Path) -> FsResult<Option<PathBuf>> {
        ensure_absolute(from)?;
        for ancestor in from.ancestors() {
            let candidate = ancestor.join(relative);
            if self.exists(&candidate).await {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn is_directory(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn list_children(&self, path: &Path) -> FsResult<Vec<ChildEntry>> {
        let mut reader = tokio::fs::read_dir(path)
            .await
            .map_err(|e| FsError::from_io(e, path))?;
        let mut children = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| FsError::from_io(e, path))?
        {
            match entry.file_type().await {
                Ok(file_type) => children.push(ChildEntry::new(
                    entry.file_name(),
                    file_type.is_dir(),
                    file_type.is_symlink(),
                )),
                Err(err) => debug!("skipping {}: {}", entry.path().display(), err),
            }
        }
        Ok(children)
    }

    async fn resolve_symlink(&self, path: &Path) -> FsResult<PathBuf> {
        let metadata = tokio::fs::symlink_metadata(path)
            .await
            .map_err(|e| FsError::from_io(e, path))?;
        if !metadata.file_type().is_symlink() {
            return Err(FsError::NotASymlink(path.to_path_buf()));
        }
        tokio::fs::canonicalize(path)
            .await
            .map_err(|e| FsError::from_io(e, path))
    }

    async fn canonicalize(&self, path: &Path) -> FsResult<PathBuf> {
        tokio::fs::canonicalize(path)
            .await
            .map_err(|e| FsError::from_io(e, path))
    }
}

/// `EXDEV` on unix, `ERROR_NOT_SAME_DEVICE` on windows.
fn crosses_devices(err: &std::io::Error) -> bool {
    #[cfg(unix)]
    const CROSS_DEVICE: i32 = 18;
    #[cfg(windows)]
    const CROSS_DEVICE: i32 = 17;
    #[cfg(any(unix, windows))]
    return err.raw_os_error() == Some(CROSS_DEVICE);
    #[cfg(not(any(unix, windows)))]
    return false;
}

/// Whether anything, including a dangling symlink, lives at `path`.
async fn entry_exists(path: &Path) -> bool {
    tokio::fs::symlink_metadata(path).await.is_ok()
}

fn copy_tree(from: &Path, to: &Path) -> FsResult<()> {
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            match e.into_io_error() {
                Some(io_err) => FsError::from_io(io_err, path),
                None => FsError::TaskFailed(format!("walking {}", path.display())),
            }
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or_else(|_| Path::new(""));
        let target = if relative.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(relative)
        };
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| FsError::from_io(e, &target))?;
        } else if file_type.is_symlink() {
            let link_target = std::fs::read_link(entry.path()).map_err(|e| FsError::from_io(e, entry.path()))?;
            copy_symlink(&link_target, &target)?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| FsError::from_io(e, entry.path()))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link_target: &Path, at: &Path) -> FsResult<()> {
    std::os::unix::fs::symlink(link_target, at).map_err(|e| FsError::from_io(e, at))
}

#[cfg(windows)]
fn copy_symlink(link_target: &Path, at: &Path) -> FsResult<()> {
    let resolved = at.parent().map(|p| p.join(link_target)).unwrap_or_else(|| link_target.to_path_buf());
    let result = if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(link_target, at)
    } else {
        std::os::windows::fs::symlink_file(link_target, at)
    };
    result.map_err(|e| FsError::from_io(e, at))
}
