use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use log::{debug, info};

use rust_fsglob::cli::Cli;
use rust_fsglob::finder::{options::FindOptions, Finder};
use rust_fsglob::fs::LocalFileSystem;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();

    // 初始化日志
    env_logger::Builder::new()
        .filter_level(if cli.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    info!("开始运行 rust-fsglob");
    let start_time = Instant::now();

    cli.validate().with_context(|| "命令行参数无效")?;
    let directory = cli.base_directory()?;
    let include = cli.include_patterns();
    debug!("在路径中搜索: {}", directory.display());

    // 创建查找器
    let finder = Finder::new(Arc::new(LocalFileSystem::new()), FindOptions::from_cli(&cli));
    let mut stream = finder
        .glob(&directory, &include, &cli.exclude)
        .with_context(|| format!("无法在 {} 中搜索", directory.display()))?;

    // 打印结果；出错时先输出已找到的部分结果
    let mut results = Vec::new();
    let mut failure = None;
    while let Some(item) = stream.next().await {
        match item {
            Ok(path) if cli.sort => results.push(path),
            Ok(path) => {
                println!("{}", path.display());
                results.push(path);
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    if cli.sort {
        results.sort();
        for path in &results {
            println!("{}", path.display());
        }
    }

    if let Some(err) = failure {
        return Err(err).with_context(|| format!("搜索 {} 失败", directory.display()));
    }

    let elapsed = start_time.elapsed();
    info!("搜索完成，找到 {} 项，耗时 {:.2?}", results.len(), elapsed);

    Ok(())
}
