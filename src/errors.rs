use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use crate::glob::PatternError;

/// Result type for operations that can produce FsError
pub type FsResult<T> = Result<T, FsError>;

/// rust-fsglob 的自定义错误类型
#[derive(Debug, Error)]
pub enum FsError {
    /// 文件未找到
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// 权限不足
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// 目标已存在
    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// 不是目录
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// 不是符号链接
    #[error("not a symbolic link: {}", .0.display())]
    NotASymlink(PathBuf),

    /// 需要绝对路径
    #[error("invalid path (expected an absolute path): {}", .0.display())]
    InvalidPath(PathBuf),

    /// 文件系统错误（其他IO错误）
    #[error("filesystem error at {}: {source}", path.display())]
    Io {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// 模式语法错误
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// 遍历任务异常结束
    #[error("traversal task failed: {0}")]
    TaskFailed(String),
}

impl FsError {
    /// Map an I/O error raised while operating on `path` onto a typed variant.
    pub fn from_io(err: io::Error, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path),
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path),
            _ => FsError::Io { source: err, path },
        }
    }

    /// True for errors caused by an entry disappearing underneath us.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }
}

/// Reject relative paths at the facade boundary.
pub(crate) fn ensure_absolute(path: &Path) -> FsResult<()> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(FsError::InvalidPath(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        // 测试文件系统错误的显示格式
        let io_error = io::Error::new(io::ErrorKind::Other, "disk on fire");
        let err = FsError::Io {
            source: io_error,
            path: PathBuf::from("/test/path"),
        };
        assert_eq!(err.to_string(), "filesystem error at /test/path: disk on fire");
    }

    #[test]
    fn test_invalid_path_display() {
        let err = FsError::InvalidPath(PathBuf::from("relative/path"));
        assert_eq!(
            err.to_string(),
            "invalid path (expected an absolute path): relative/path"
        );
    }

    #[test]
    fn test_from_io_maps_kinds() {
        let err = FsError::from_io(io::Error::from(io::ErrorKind::NotFound), "/a");
        assert!(matches!(err, FsError::NotFound(ref p) if p == Path::new("/a")));
        assert!(err.is_not_found());

        let err = FsError::from_io(io::Error::from(io::ErrorKind::PermissionDenied), "/b");
        assert!(matches!(err, FsError::PermissionDenied(_)));

        let err = FsError::from_io(io::Error::from(io::ErrorKind::AlreadyExists), "/c");
        assert!(matches!(err, FsError::AlreadyExists(_)));

        let err = FsError::from_io(io::Error::new(io::ErrorKind::Other, "x"), "/d");
        match err {
            FsError::Io { path, .. } => assert_eq!(path, PathBuf::from("/d")),
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_pattern_error_converts() {
        let err: FsError = PatternError::TrailingEscape.into();
        assert!(matches!(err, FsError::Pattern(PatternError::TrailingEscape)));
    }

    #[test]
    fn test_ensure_absolute() {
        assert!(ensure_absolute(Path::new("relative")).is_err());
        #[cfg(unix)]
        assert!(ensure_absolute(Path::new("/absolute")).is_ok());
    }
}
