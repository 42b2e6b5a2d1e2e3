//! 目录遍历
//!
//! One task per directory: list it, classify and match each child, emit
//! results straight into the shared channel, then walk the surviving
//! subdirectories and wait for all of them before reporting completion.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use log::{debug, error, warn};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use super::concurrency::TraversalStrategy;
use super::filter::PatternSet;
use crate::errors::{FsError, FsResult};
use crate::fs::{ChildEntry, FileSystem};

/// State shared read-only by every directory task of one search.
pub(crate) struct WalkContext<F: FileSystem> {
    pub fs: Arc<F>,
    pub patterns: PatternSet,
    pub strategy: TraversalStrategy,
    pub reads: Semaphore,
    pub sender: mpsc::UnboundedSender<FsResult<PathBuf>>,
}

/// Canonical directories on the current descent path, innermost first.
#[derive(Debug)]
pub(crate) struct Ancestry {
    real: PathBuf,
    parent: Option<Arc<Ancestry>>,
}

impl Ancestry {
    pub fn root(real: PathBuf) -> Arc<Self> {
        Arc::new(Self { real, parent: None })
    }

    pub fn child(self: &Arc<Self>, real: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            real,
            parent: Some(Arc::clone(self)),
        })
    }

    pub fn real(&self) -> &Path {
        &self.real
    }

    /// Following a link to `destination` would revisit a directory on this
    /// path when `destination` is one of them or contains one of them.
    pub fn would_cycle(&self, destination: &Path) -> bool {
        let mut node = Some(self);
        while let Some(current) = node {
            if current.real.starts_with(destination) {
                return true;
            }
            node = current.parent.as_deref();
        }
        false
    }
}

/// One directory scheduled for listing.
pub(crate) struct DirectoryTask {
    pub path: PathBuf,
    /// Relative path from the search base, empty or ending in `/`.
    pub relative: String,
    pub ancestry: Arc<Ancestry>,
}

/// Walk the whole search: fast-forward through the constant prefix shared
/// by every include pattern, then descend from there.
pub(crate) async fn walk<F: FileSystem>(ctx: Arc<WalkContext<F>>, base: PathBuf) -> FsResult<()> {
    let base_real = ctx.fs.canonicalize(&base).await?;
    if !ctx.fs.is_directory(&base_real).await {
        return Err(FsError::NotADirectory(base));
    }

    let mut task = DirectoryTask {
        path: base,
        relative: String::new(),
        ancestry: Ancestry::root(base_real),
    };

    let prefix = ctx.patterns.start_prefix().to_string();
    for component in prefix.split('/').filter(|c| !c.is_empty()) {
        match fast_forward(&ctx, task, component).await? {
            Some(next) => task = next,
            None => return Ok(()),
        }
    }
    if !task.relative.is_empty() {
        debug!("Fast-forwarded to {}", task.path.display());
    }

    walk_directory(ctx, task).await
}

/// Step into `component` exactly as a full walk would have reached it, or
/// report that nothing below it can be a result.
async fn fast_forward<F: FileSystem>(
    ctx: &WalkContext<F>,
    parent: DirectoryTask,
    component: &str,
) -> FsResult<Option<DirectoryTask>> {
    if ctx.patterns.skips_name(component) {
        return Ok(None);
    }
    let relative = format!("{}{}", parent.relative, component);
    if ctx.patterns.is_excluded(&relative) {
        return Ok(None);
    }

    let path = parent.path.join(component);
    let real = match ctx.fs.canonicalize(&path).await {
        Ok(real) => real,
        Err(err) if err.is_not_found() => return Ok(None),
        Err(err) => return Err(err),
    };
    if !ctx.fs.is_directory(&real).await {
        warn!("{} is not a directory, nothing to search", path.display());
        return Ok(None);
    }
    if parent.ancestry.would_cycle(&real) {
        debug!("Not following {}: cycles back to {}", path.display(), real.display());
        return Ok(None);
    }

    Ok(Some(DirectoryTask {
        path,
        relative: relative + "/",
        ancestry: parent.ancestry.child(real),
    }))
}

/// Walk one directory and, transitively, every subdirectory worth visiting.
pub(crate) fn walk_directory<F: FileSystem>(
    ctx: Arc<WalkContext<F>>,
    task: DirectoryTask,
) -> BoxFuture<'static, FsResult<()>> {
    async move {
        if ctx.sender.is_closed() {
            return Ok(());
        }

        let listing = {
            let _permit = ctx
                .reads
                .acquire()
                .await
                .map_err(|e| FsError::TaskFailed(e.to_string()))?;
            ctx.fs.list_children(&task.path).await
        };
        let children = match listing {
            Ok(children) => children,
            Err(err) if err.is_not_found() && !task.relative.is_empty() => {
                debug!("{} vanished before it could be listed", task.path.display());
                return Ok(());
            }
            Err(err) => {
                error!("Error reading directory {}: {}", task.path.display(), err);
                return Err(err);
            }
        };

        let mut subdirectories = Vec::new();
        for child in children {
            let Some(name) = child.name.to_str() else {
                debug!("Skipping non UTF-8 entry in {}", task.path.display());
                continue;
            };
            if ctx.patterns.skips_name(name) {
                continue;
            }

            let relative = format!("{}{}", task.relative, name);
            let verdict = ctx.patterns.evaluate(&relative);
            if !verdict.matches && verdict.skip_descendants {
                continue;
            }

            let path = task.path.join(name);
            let Some(kind) = classify(ctx.fs.as_ref(), &child, &path, task.ancestry.real()).await else {
                continue;
            };

            if verdict.matches && ctx.sender.send(Ok(path.clone())).is_err() {
                // nobody is listening any more
                return Ok(());
            }

            if let EntryKind::Directory { real, via_symlink } = kind {
                if verdict.skip_descendants {
                    continue;
                }
                if via_symlink && task.ancestry.would_cycle(&real) {
                    debug!("Not following {}: cycles back to {}", path.display(), real.display());
                    continue;
                }
                subdirectories.push(DirectoryTask {
                    path,
                    relative: relative + "/",
                    ancestry: task.ancestry.child(real),
                });
            }
        }

        match ctx.strategy {
            TraversalStrategy::Sequential => {
                for subdirectory in subdirectories {
                    walk_directory(Arc::clone(&ctx), subdirectory).await?;
                }
            }
            TraversalStrategy::Parallel => {
                let mut tasks = JoinSet::new();
                for subdirectory in subdirectories {
                    tasks.spawn(walk_directory(Arc::clone(&ctx), subdirectory));
                }
                // returning early drops the set, which aborts the remaining siblings
                while let Some(joined) = tasks.join_next().await {
                    match joined {
                        Ok(result) => result?,
                        Err(join_err) if join_err.is_cancelled() => {}
                        Err(join_err) => return Err(FsError::TaskFailed(join_err.to_string())),
                    }
                }
            }
        }
        Ok(())
    }
    .boxed()
}

enum EntryKind {
    Other,
    Directory { real: PathBuf, via_symlink: bool },
}

/// Decide what a child really is, following symlinks. `None` means the
/// entry should be skipped (dangling link, vanished target).
async fn classify<F: FileSystem>(
    fs: &F,
    child: &ChildEntry,
    path: &Path,
    parent_real: &Path,
) -> Option<EntryKind> {
    if !child.is_symlink {
        return Some(if child.is_directory {
            EntryKind::Directory {
                real: parent_real.join(&child.name),
                via_symlink: false,
            }
        } else {
            EntryKind::Other
        });
    }

    match fs.resolve_symlink(path).await {
        Ok(destination) => Some(if fs.is_directory(&destination).await {
            EntryKind::Directory {
                real: destination,
                via_symlink: true,
            }
        } else {
            EntryKind::Other
        }),
        Err(err) => {
            debug!("Skipping {}: {}", path.display(), err);
            None
        }
    }
}
