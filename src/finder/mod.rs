//! 文件查找模块
//!
//! 这个模块提供了基于 glob 模式的并发目录搜索，
//! 包括模式过滤、符号链接安全遍历以及结果流。

mod concurrency;
pub mod filter;
pub mod options;
mod stream;
mod walker;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use tokio::sync::{mpsc, Semaphore};

use crate::errors::{ensure_absolute, FsResult};
use crate::fs::FileSystem;

pub use self::concurrency::{ConcurrencyConfig, TraversalStrategy};
pub use self::filter::{PatternSet, BUILTIN_EXCLUDES};
pub use self::options::FindOptions;
pub use self::stream::GlobStream;

use self::walker::WalkContext;

/// 文件查找器
///
/// Runs glob searches over any [`FileSystem`]. Results arrive as an
/// unordered [`GlobStream`]; collect and sort them when order matters.
#[derive(Debug)]
pub struct Finder<F: FileSystem> {
    fs: Arc<F>,
    options: FindOptions,
}

impl<F: FileSystem> Finder<F> {
    /// 创建新的文件查找器实例
    pub fn new(fs: Arc<F>, options: FindOptions) -> Self {
        Self { fs, options }
    }

    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    /// Compile `include`/`exclude` globs and search `directory`.
    ///
    /// Pattern errors and relative directories are reported here, before any
    /// traversal starts. Must be called from within a Tokio runtime.
    pub fn glob(&self, directory: &Path, include: &[String], exclude: &[String]) -> FsResult<GlobStream> {
        ensure_absolute(directory)?;
        let patterns = PatternSet::compile(
            include,
            exclude,
            self.options.pattern_options(),
            self.options.skip_hidden_files,
        )?;
        Ok(self.search(directory, patterns))
    }

    /// Search `directory` with already-compiled patterns.
    pub fn search(&self, directory: &Path, patterns: PatternSet) -> GlobStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        let base = directory.to_path_buf();

        info!("Starting search in {}", base.display());
        debug!("Patterns: {}", patterns.description());

        let ctx = Arc::new(WalkContext {
            fs: Arc::clone(&self.fs),
            patterns,
            strategy: self.options.concurrency.strategy,
            reads: Semaphore::new(self.options.concurrency.max_concurrent_reads),
            sender,
        });

        let task = tokio::spawn(async move {
            let start_time = Instant::now();
            let sender = ctx.sender.clone();
            let outcome = walker::walk(ctx, base.clone()).await;
            match outcome {
                Ok(()) => info!("Search in {} finished in {:.2?}", base.display(), start_time.elapsed()),
                Err(err) => {
                    let _ = sender.send(Err(err));
                }
            }
        });

        GlobStream::new(receiver, task)
    }
}

impl<F: FileSystem> Clone for Finder<F> {
    fn clone(&self) -> Self {
        Self {
            fs: Arc::clone(&self.fs),
            options: self.options.clone(),
        }
    }
}

/// Convenience: collect every match of one search, sorted.
pub async fn find_sorted<F: FileSystem>(
    finder: &Finder<F>,
    directory: &Path,
    include: &[String],
    exclude: &[String],
) -> FsResult<Vec<PathBuf>> {
    finder.glob(directory, include, exclude)?.collect_sorted().await
}
