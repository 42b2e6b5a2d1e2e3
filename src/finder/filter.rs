//! Include/exclude filtering
//!
//! This module decides, for each relative path met during a walk, whether it
//! is a result and whether its subtree is worth visiting.

use crate::glob::{compile, MatchResult, Pattern, PatternError, PatternOptions};

/// Excludes applied to every search regardless of caller input.
pub const BUILTIN_EXCLUDES: [&str; 2] = ["**/.DS_Store", "**/.gitkeep"];

/// Compiled include and exclude patterns for one search.
#[derive(Debug, Clone)]
pub struct PatternSet {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    skip_hidden_files: bool,
}

impl PatternSet {
    /// Compile raw include/exclude globs, expanding brace groups.
    pub fn compile(
        include: &[String],
        exclude: &[String],
        options: PatternOptions,
        skip_hidden_files: bool,
    ) -> Result<Self, PatternError> {
        let include = compile_all(include.iter().map(String::as_str), options)?;
        let exclude = compile_all(exclude.iter().map(String::as_str), options)?;
        Self::new(include, exclude, options, skip_hidden_files)
    }

    /// Build from already-compiled patterns; the built-in excludes are added.
    pub fn new(
        include: Vec<Pattern>,
        mut exclude: Vec<Pattern>,
        options: PatternOptions,
        skip_hidden_files: bool,
    ) -> Result<Self, PatternError> {
        exclude.extend(compile_all(BUILTIN_EXCLUDES, options)?);
        Ok(Self {
            include,
            exclude,
            skip_hidden_files,
        })
    }

    pub fn include(&self) -> &[Pattern] {
        &self.include
    }

    pub fn exclude(&self) -> &[Pattern] {
        &self.exclude
    }

    /// Whether an entry with this name is dropped by the hidden-file filter.
    pub fn skips_name(&self, name: &str) -> bool {
        self.skip_hidden_files && name.starts_with('.')
    }

    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(relative_path))
    }

    /// Combined verdict: any include may match, any exclude wins and closes
    /// the subtree.
    pub fn evaluate(&self, relative_path: &str) -> MatchResult {
        if self.is_excluded(relative_path) {
            return MatchResult {
                matches: false,
                skip_descendants: true,
            };
        }
        self.include.iter().fold(
            MatchResult {
                matches: false,
                skip_descendants: true,
            },
            |acc, pattern| {
                let verdict = pattern.match_prefix(relative_path);
                MatchResult {
                    matches: acc.matches || verdict.matches,
                    skip_descendants: acc.skip_descendants && verdict.skip_descendants,
                }
            },
        )
    }

    /// Relative directory (with trailing `/`) every include pattern is
    /// anchored under, so the walk can start there directly.
    ///
    /// Empty when any include is case-insensitive: the on-disk spelling of
    /// the prefix is only known after listing.
    pub fn start_prefix(&self) -> &str {
        if self.include.iter().any(|p| !p.options().case_sensitive) {
            return "";
        }
        let mut prefixes = self.include.iter().map(Pattern::constant_directory_prefix);
        let Some(first) = prefixes.next() else {
            return "";
        };
        let common = prefixes.fold(first, |common, prefix| {
            let shared = common
                .char_indices()
                .zip(prefix.chars())
                .take_while(|((_, a), b)| a == b)
                .last()
                .map(|((i, c), _)| i + c.len_utf8())
                .unwrap_or(0);
            &common[..shared]
        });
        match common.rfind('/') {
            Some(pos) => &common[..=pos],
            None => "",
        }
    }

    /// Summary for log output
    pub fn description(&self) -> String {
        let include: Vec<&str> = self.include.iter().map(Pattern::as_str).collect();
        let exclude: Vec<&str> = self.exclude.iter().map(Pattern::as_str).collect();
        format!(
            "include any of [{}], exclude any of [{}]{}",
            include.join(", "),
            exclude.join(", "),
            if self.skip_hidden_files { ", skipping hidden files" } else { "" }
        )
    }
}

fn compile_all<'a>(
    raw: impl IntoIterator<Item = &'a str>,
    options: PatternOptions,
) -> Result<Vec<Pattern>, PatternError> {
    let mut patterns = Vec::new();
    for glob in raw {
        patterns.extend(compile(glob, options)?);
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(include: &[&str], exclude: &[&str]) -> PatternSet {
        let include: Vec<String> = include.iter().map(|s| s.to_string()).collect();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        PatternSet::compile(&include, &exclude, PatternOptions::default(), true).unwrap()
    }

    #[test]
    fn test_any_include_matches() {
        let patterns = set(&["*.{swift,cpp}"], &[]);
        assert_eq!(patterns.include().len(), 2);
        assert!(patterns.evaluate("file.swift").matches);
        assert!(patterns.evaluate("file.cpp").matches);
        assert!(!patterns.evaluate("file.js").matches);
    }

    #[test]
    fn test_exclude_wins_and_prunes() {
        let patterns = set(&["**"], &["build"]);
        let verdict = patterns.evaluate("build");
        assert!(!verdict.matches);
        assert!(verdict.skip_descendants);

        let verdict = patterns.evaluate("src");
        assert!(verdict.matches);
        assert!(!verdict.skip_descendants);
    }

    #[test]
    fn test_builtin_excludes() {
        let patterns = set(&["**"], &[]);
        assert!(patterns.is_excluded(".DS_Store"));
        assert!(patterns.is_excluded("a/b/.gitkeep"));
        assert!(!patterns.is_excluded("a/b/.gitignore"));
        assert_eq!(patterns.exclude().len(), BUILTIN_EXCLUDES.len());
    }

    #[test]
    fn test_descend_if_any_include_may_match() {
        let patterns = set(&["src/*.rs", "docs/**"], &[]);
        assert!(!patterns.evaluate("src").skip_descendants);
        assert!(!patterns.evaluate("docs").skip_descendants);
        assert!(patterns.evaluate("target").skip_descendants);
    }

    #[test]
    fn test_hidden_filter() {
        let patterns = set(&["**"], &[]);
        assert!(patterns.skips_name(".hidden"));
        assert!(!patterns.skips_name("visible"));

        let shown = PatternSet::compile(&["**".to_string()], &[], PatternOptions::default(), false).unwrap();
        assert!(!shown.skips_name(".hidden"));
    }

    #[test]
    fn test_start_prefix() {
        assert_eq!(set(&["src/lib/*.rs"], &[]).start_prefix(), "src/lib/");
        assert_eq!(set(&["Sources/{A,B}/**"], &[]).start_prefix(), "Sources/");
        assert_eq!(set(&["Sources/App/**", "Sources/Apple/*"], &[]).start_prefix(), "Sources/");
        assert_eq!(set(&["src/*.rs", "**/*.md"], &[]).start_prefix(), "");
        assert_eq!(set(&["*.rs"], &[]).start_prefix(), "");
        assert_eq!(set(&[], &[]).start_prefix(), "");
    }

    #[test]
    fn test_no_start_prefix_when_case_insensitive() {
        let options = PatternOptions::default().with_case_sensitive(false);
        let patterns = PatternSet::compile(&["SRC/*.rs".to_string()], &[], options, true).unwrap();
        assert_eq!(patterns.start_prefix(), "");
        assert!(patterns.evaluate("src/main.rs").matches);
    }

    #[test]
    fn test_description() {
        let description = set(&["*.rs"], &["target/**"]).description();
        assert!(description.contains("*.rs"));
        assert!(description.contains("target/**"));
        assert!(description.contains("**/.DS_Store"));
    }
}
