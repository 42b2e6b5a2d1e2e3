//! 异步文件系统门面与并发 glob 搜索库
//!
//! 本库提供了跨平台的文件系统操作和高性能的 glob 搜索功能，支持：
//! - 基于 Tokio 的并发目录遍历
//! - Shell 风格的模式：`*`、`**`、`?`、`[...]`、`{a,b}`
//! - 安全的符号链接跟随（祖先循环检测）
//! - 包含/排除模式与隐藏文件过滤
//! - touch、move、copy、replace 等常用异步操作
//!
//! ## 使用场景
//!
//! - 在项目中查找特定类型的源文件
//! - 构建自动化工具链
//! - 需要可取消、流式结果的大目录扫描
//!
//! # 示例
//!
//! 基本用法：
//! ```no_run
//! use std::path::Path;
//! use futures::StreamExt;
//!
//! # async fn run() -> Result<(), rust_fsglob::errors::FsError> {
//! let include = vec!["Sources/**/*.{swift,cpp}".to_string()];
//! let exclude = vec!["**/Generated".to_string()];
//!
//! // 结果无序，按需排序
//! let mut stream = rust_fsglob::glob(Path::new("/work/project"), &include, &exclude, true)?;
//! while let Some(path) = stream.next().await {
//!     println!("找到文件: {}", path?.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! 更多用法请参考各模块文档。

pub mod cli;
pub mod errors;
pub mod finder;
pub mod fs;
pub mod glob;

use std::path::Path;

// Re-export main types for convenience
pub use errors::{FsError, FsResult};
pub use finder::{FindOptions, Finder, GlobStream, TraversalStrategy};
pub use fs::{FileSystem, LocalFileSystem};

/// Search `directory` on the local disk for every path matching any
/// `include` glob and no `exclude` glob.
///
/// Must be called from within a Tokio runtime.
pub fn glob(
    directory: &Path,
    include: &[String],
    exclude: &[String],
    skip_hidden_files: bool,
) -> FsResult<GlobStream> {
    LocalFileSystem::new().glob(directory, include, exclude, skip_hidden_files)
}
