//! rust-fsglob 的命令行接口
//!
//! 本模块提供了命令行参数解析和验证功能。

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::errors::{FsError, FsResult};
use crate::finder::options::FindOptions;
use crate::finder::{PatternSet, TraversalStrategy};

/// 默认包含模式：匹配所有条目
pub const DEFAULT_INCLUDE: &str = "**";

/// 并发 glob 搜索
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 搜索目录（默认：当前目录）
    #[arg(default_value = ".")]
    pub directory: String,

    /// 包含模式（可多次指定，默认：**）
    #[arg(short = 'i', long = "include", value_name = "PATTERN")]
    pub include: Vec<String>,

    /// 排除模式（可多次指定）
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// 包含隐藏文件
    #[arg(long)]
    pub hidden: bool,

    /// 不区分大小写匹配
    #[arg(long)]
    pub ignore_case: bool,

    /// 逐个遍历子目录
    #[arg(long, conflicts_with = "parallel")]
    pub sequential: bool,

    /// 并发遍历子目录
    #[arg(long)]
    pub parallel: bool,

    /// 排序后输出
    #[arg(long)]
    pub sort: bool,

    /// 启用调试日志
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    /// 显式指定的遍历策略，未指定时使用平台默认值
    pub fn strategy(&self) -> Option<TraversalStrategy> {
        if self.sequential {
            Some(TraversalStrategy::Sequential)
        } else if self.parallel {
            Some(TraversalStrategy::Parallel)
        } else {
            None
        }
    }

    /// 获取包含模式
    pub fn include_patterns(&self) -> Vec<String> {
        if self.include.is_empty() {
            vec![DEFAULT_INCLUDE.to_string()]
        } else {
            self.include.clone()
        }
    }

    /// 搜索目录的绝对路径
    pub fn base_directory(&self) -> FsResult<PathBuf> {
        let directory = Path::new(&self.directory);
        if directory.is_absolute() {
            return Ok(directory.to_path_buf());
        }
        let cwd = std::env::current_dir().map_err(|e| FsError::from_io(e, "."))?;
        Ok(cwd.join(directory))
    }

    /// 验证命令行参数
    pub fn validate(&self) -> FsResult<()> {
        // 验证路径
        let directory = self.base_directory()?;
        if !directory.exists() {
            return Err(FsError::NotFound(directory));
        }
        if !directory.is_dir() {
            return Err(FsError::NotADirectory(directory));
        }

        // 验证模式
        let options = FindOptions::from_cli(self);
        PatternSet::compile(
            &self.include_patterns(),
            &self.exclude,
            options.pattern_options(),
            options.skip_hidden_files,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("rust-fsglob").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_validation() {
        let cli = parse(&[".", "-i", "**/*.rs", "-e", "target"]);
        assert!(cli.validate().is_ok());
        assert_eq!(cli.include_patterns(), vec!["**/*.rs".to_string()]);
        assert_eq!(cli.exclude, vec!["target".to_string()]);
    }

    #[test]
    fn test_cli_invalid_path() {
        let cli = parse(&["non_existent_path"]);
        assert!(matches!(cli.validate(), Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_cli_invalid_pattern() {
        let cli = parse(&[".", "-i", "[abc"]);
        assert!(matches!(cli.validate(), Err(FsError::Pattern(_))));

        let cli = parse(&[".", "-e", "{a,b"]);
        assert!(matches!(cli.validate(), Err(FsError::Pattern(_))));
    }

    #[test]
    fn test_cli_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let cli = parse(&[]);
        assert_eq!(cli.directory, ".");
        assert_eq!(cli.include_patterns(), vec![DEFAULT_INCLUDE.to_string()]);
        assert_eq!(cli.strategy(), None);
        assert!(cli.base_directory()?.is_absolute());

        let options = FindOptions::from_cli(&cli);
        assert!(options.skip_hidden_files);
        assert!(options.case_sensitive);
        Ok(())
    }

    #[test]
    fn test_cli_options() {
        let cli = parse(&["--hidden", "--ignore-case", "--sequential"]);
        assert_eq!(cli.strategy(), Some(TraversalStrategy::Sequential));

        let options = FindOptions::from_cli(&cli);
        assert!(!options.skip_hidden_files);
        assert!(!options.case_sensitive);
        assert_eq!(options.concurrency.strategy, TraversalStrategy::Sequential);
    }

    #[test]
    fn test_cli_conflicting_strategies() {
        let result = Cli::try_parse_from(["rust-fsglob", "--sequential", "--parallel"]);
        assert!(result.is_err());
    }
}
