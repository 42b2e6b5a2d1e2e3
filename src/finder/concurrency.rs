//! 遍历并发策略
//!
//! Decides whether subdirectories are walked one at a time or fanned out
//! as concurrent tasks, and how many directory reads may be in flight.

use log::debug;

/// Lower bound for the directory-read limiter.
const MIN_CONCURRENT_READS: usize = 2;

/// How a directory's subdirectories are traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalStrategy {
    /// Await each subdirectory walk before starting the next.
    Sequential,
    /// Spawn every subdirectory walk as its own task and join them all.
    Parallel,
}

impl TraversalStrategy {
    /// Per-platform default.
    ///
    /// Directory enumeration on Linux has been observed to degrade under heavy
    /// intra-process parallelism, so it walks sequentially there.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "linux") {
            TraversalStrategy::Sequential
        } else {
            TraversalStrategy::Parallel
        }
    }
}

/// 并发配置
#[derive(Debug, Clone)]
pub struct ConcurrencyConfig {
    pub strategy: TraversalStrategy,
    /// Upper bound on simultaneous `list_children` calls
    pub max_concurrent_reads: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        let cpus = num_cpus::get();
        let max_concurrent_reads = (cpus * 2).max(MIN_CONCURRENT_READS);
        debug!("Concurrency defaults - cpus: {}, max reads: {}", cpus, max_concurrent_reads);
        Self {
            strategy: TraversalStrategy::platform_default(),
            max_concurrent_reads,
        }
    }
}
