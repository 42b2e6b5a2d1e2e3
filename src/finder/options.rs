//! Options for glob searches
//!
//! This module provides options for configuring a directory search.

use crate::cli::Cli;
use crate::glob::PatternOptions;

use super::concurrency::{ConcurrencyConfig, TraversalStrategy};

/// Options for configuring a glob search
#[derive(Debug, Clone)]
pub struct FindOptions {
    /// Whether dot-prefixed entries are skipped entirely
    pub skip_hidden_files: bool,

    /// Whether patterns match case-sensitively
    pub case_sensitive: bool,

    /// How directories are scheduled and how many may be read at once
    pub concurrency: ConcurrencyConfig,
}

impl FindOptions {
    /// Create a new FindOptions with default values
    pub fn new() -> Self {
        Self {
            skip_hidden_files: true,
            case_sensitive: true,
            concurrency: ConcurrencyConfig::default(),
        }
    }

    /// Set whether hidden files are skipped
    pub fn with_skip_hidden_files(mut self, skip: bool) -> Self {
        self.skip_hidden_files = skip;
        self
    }

    /// Set whether matching is case-sensitive
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set the traversal strategy
    pub fn with_strategy(mut self, strategy: TraversalStrategy) -> Self {
        self.concurrency.strategy = strategy;
        self
    }

    /// Set the maximum number of concurrent directory reads
    pub fn with_max_concurrent_reads(mut self, max: usize) -> Self {
        self.concurrency.max_concurrent_reads = max.max(1);
        self
    }

    /// Pattern compiler options implied by these search options
    pub fn pattern_options(&self) -> PatternOptions {
        PatternOptions::new().with_case_sensitive(self.case_sensitive)
    }

    /// Create FindOptions from CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        let options = Self::new()
            .with_skip_hidden_files(!cli.hidden)
            .with_case_sensitive(!cli.ignore_case);
        match cli.strategy() {
            Some(strategy) => options.with_strategy(strategy),
            None => options,
        }
    }
}

impl Default for FindOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_options_defaults() {
        let options = FindOptions::new();
        assert!(options.skip_hidden_files);
        assert!(options.case_sensitive);
        assert_eq!(options.concurrency.strategy, TraversalStrategy::platform_default());
        assert!(options.concurrency.max_concurrent_reads >= 2);
    }

    #[test]
    fn test_find_options_builders() {
        let options = FindOptions::new()
            .with_skip_hidden_files(false)
            .with_case_sensitive(false)
            .with_strategy(TraversalStrategy::Sequential)
            .with_max_concurrent_reads(0);
        assert!(!options.skip_hidden_files);
        assert!(!options.pattern_options().case_sensitive);
        assert_eq!(options.concurrency.strategy, TraversalStrategy::Sequential);
        assert_eq!(options.concurrency.max_concurrent_reads, 1);
    }
}
