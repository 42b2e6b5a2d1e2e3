//! Segment matcher.
//!
//! Backtracking over a segment cursor and a character cursor into the
//! relative path. Component-level segments never consume `/`; a path
//! wildcard only ever resumes matching at a component boundary.

use super::pattern::{Pattern, Segment};

/// Verdict for one candidate path against one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    /// The path itself matches.
    pub matches: bool,
    /// Nothing below this path can match, so a walker need not descend.
    pub skip_descendants: bool,
}

impl Pattern {
    /// Full-path decision for a `/`-separated relative path.
    ///
    /// ```
    /// use rust_fsglob::glob::{Pattern, PatternOptions};
    ///
    /// let pattern = Pattern::new("**/*.swift", PatternOptions::default()).unwrap();
    /// assert!(pattern.matches("a/b/c.swift"));
    /// assert!(!pattern.matches("a/b/c.cpp"));
    /// ```
    pub fn matches(&self, relative_path: &str) -> bool {
        let path: Vec<char> = relative_path.chars().collect();
        self.matcher().full(0, &path)
    }

    /// Partial-path decision used while walking: does the path match, and
    /// could anything beneath it (treating it as a directory) still match?
    pub fn match_prefix(&self, relative_path: &str) -> MatchResult {
        let mut path: Vec<char> = relative_path.chars().collect();
        let matcher = self.matcher();
        let matches = matcher.full(0, &path);
        path.push('/');
        MatchResult {
            matches,
            skip_descendants: !matcher.viable(0, &path),
        }
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher {
            segments: self.segments(),
            case_sensitive: self.options().case_sensitive,
        }
    }
}

/// Free-function form of [`Pattern::matches`].
pub fn matches(pattern: &Pattern, relative_path: &str) -> bool {
    pattern.matches(relative_path)
}

/// Free-function form of [`Pattern::match_prefix`].
pub fn match_prefix(pattern: &Pattern, relative_path: &str) -> MatchResult {
    pattern.match_prefix(relative_path)
}

enum ConstantFit<'p> {
    Consumed(&'p [char]),
    PathExhausted,
    Mismatch,
}

struct Matcher<'a> {
    segments: &'a [Segment],
    case_sensitive: bool,
}

impl Matcher<'_> {
    fn full(&self, seg: usize, path: &[char]) -> bool {
        let Some(segment) = self.segments.get(seg) else {
            return path.is_empty();
        };
        let is_last = seg + 1 == self.segments.len();

        match segment {
            Segment::Constant(text) => match self.fit_constant(text, path) {
                ConstantFit::Consumed(rest) => self.full(seg + 1, rest),
                _ => false,
            },
            Segment::SingleCharacterWildcard => match path.split_first() {
                Some((&c, rest)) if c != '/' => self.full(seg + 1, rest),
                _ => false,
            },
            Segment::CharacterClass(class) => match path.split_first() {
                Some((&c, rest)) if class.matches(c, self.case_sensitive) => self.full(seg + 1, rest),
                _ => false,
            },
            Segment::ComponentWildcard => {
                let limit = component_len(path);
                if is_last {
                    return limit == path.len();
                }
                (0..=limit).any(|skip| self.full(seg + 1, &path[skip..]))
            }
            Segment::PathWildcard => {
                if is_last {
                    return true;
                }
                component_starts(path).any(|offset| self.full(seg + 1, &path[offset..]))
            }
        }
    }

    /// Whether some continuation of `path` could still match.
    fn viable(&self, seg: usize, path: &[char]) -> bool {
        if path.is_empty() {
            return seg < self.segments.len();
        }
        let Some(segment) = self.segments.get(seg) else {
            return false;
        };

        match segment {
            Segment::Constant(text) => match self.fit_constant(text, path) {
                ConstantFit::Consumed(rest) => self.viable(seg + 1, rest),
                ConstantFit::PathExhausted => true,
                ConstantFit::Mismatch => false,
            },
            Segment::SingleCharacterWildcard => match path.split_first() {
                Some((&c, rest)) if c != '/' => self.viable(seg + 1, rest),
                _ => false,
            },
            Segment::CharacterClass(class) => match path.split_first() {
                Some((&c, rest)) if class.matches(c, self.case_sensitive) => self.viable(seg + 1, rest),
                _ => false,
            },
            Segment::ComponentWildcard => {
                let limit = component_len(path);
                (0..=limit).any(|skip| self.viable(seg + 1, &path[skip..]))
            }
            Segment::PathWildcard => {
                seg + 1 == self.segments.len()
                    || component_starts(path).any(|offset| self.viable(seg + 1, &path[offset..]))
            }
        }
    }

    fn fit_constant<'p>(&self, text: &str, path: &'p [char]) -> ConstantFit<'p> {
        let mut idx = 0;
        for expected in text.chars() {
            let Some(&actual) = path.get(idx) else {
                return ConstantFit::PathExhausted;
            };
            if !self.same_char(expected, actual) {
                return ConstantFit::Mismatch;
            }
            idx += 1;
        }
        ConstantFit::Consumed(&path[idx..])
    }

    fn same_char(&self, a: char, b: char) -> bool {
        a == b || (!self.case_sensitive && a.to_lowercase().eq(b.to_lowercase()))
    }
}

/// Length of the leading component (up to, not including, the first `/`).
fn component_len(path: &[char]) -> usize {
    path.iter().position(|&c| c == '/').unwrap_or(path.len())
}

/// Offsets where a whole component begins: the start, and just past every `/`.
fn component_starts(path: &[char]) -> impl Iterator<Item = usize> + '_ {
    std::iter::once(0).chain(
        path.iter()
            .enumerate()
            .filter(|(_, &c)| c == '/')
            .map(|(i, _)| i + 1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glob::pattern::PatternOptions;

    fn pattern(raw: &str) -> Pattern {
        Pattern::new(raw, PatternOptions::default()).unwrap()
    }

    fn descends(raw: &str, dir: &str) -> bool {
        !pattern(raw).match_prefix(dir).skip_descendants
    }

    #[test]
    fn test_component_wildcard_stays_in_component() {
        let p = pattern("*.swift");
        assert!(p.matches("first.swift"));
        assert!(p.matches(".swift"));
        assert!(!p.matches("dir/first.swift"));
        assert!(!p.matches("first.swiftx"));
    }

    #[test]
    fn test_path_wildcard_any_depth() {
        let p = pattern("**/*.swift");
        assert!(p.matches("c.swift"));
        assert!(p.matches("a/c.swift"));
        assert!(p.matches("a/b/c.swift"));
        assert!(p.matches("a/b/c/d/e/f.swift"));
        assert!(!p.matches("a/b/c.cpp"));
    }

    #[test]
    fn test_pivot_pattern() {
        let p = pattern("**/Pivot/**/*.generated.swift");
        assert!(p.matches("Target/Pivot/AutoMockable.generated.swift"));
        assert!(p.matches("Pivot/AutoMockable.generated.swift"));
        assert!(p.matches("a/b/Pivot/c/d/AutoMockable.generated.swift"));
        assert!(!p.matches("Target/NonMatchingPivot/AutoMockable.generated.swift"));
        assert!(!p.matches("Target/Pivot/AutoMockable.swift"));
    }

    #[test]
    fn test_path_wildcard_alone_and_trailing() {
        let p = pattern("**");
        assert!(p.matches("first.swift"));
        assert!(p.matches("a/b/c"));

        let p = pattern("src/**");
        assert!(p.matches("src/a"));
        assert!(p.matches("src/a/b.rs"));
        assert!(!p.matches("src"));
        assert!(!p.matches("lib/a"));
    }

    #[test]
    fn test_middle_path_wildcard_matches_zero_components() {
        let p = pattern("a/**/b");
        assert!(p.matches("a/b"));
        assert!(p.matches("a/x/b"));
        assert!(p.matches("a/x/y/b"));
        assert!(!p.matches("a/xb"));
        assert!(!p.matches("ab"));
    }

    #[test]
    fn test_single_character_wildcard() {
        let p = pattern("file?.txt");
        assert!(p.matches("file1.txt"));
        assert!(!p.matches("file.txt"));
        assert!(!p.matches("file12.txt"));
        assert!(!pattern("a?b").matches("a/b"));
    }

    #[test]
    fn test_character_classes() {
        assert!(pattern("[abc].rs").matches("b.rs"));
        assert!(!pattern("[abc].rs").matches("d.rs"));
        assert!(pattern("[^abc].rs").matches("d.rs"));
        assert!(pattern("v[0-9].txt").matches("v7.txt"));
        assert!(pattern("[[:alpha:]]*").matches("readme"));
        assert!(!pattern("[[:alpha:]]*").matches("1readme"));
        assert!(!pattern("a[!x]b").matches("a/b"));
    }

    #[test]
    fn test_case_insensitive() {
        let options = PatternOptions::default().with_case_sensitive(false);
        let p = Pattern::new("*.SWIFT", options).unwrap();
        assert!(p.matches("main.swift"));
        assert!(p.matches("Main.Swift"));
        assert!(!pattern("*.SWIFT").matches("main.swift"));
    }

    #[test]
    fn test_hidden_names_are_ordinary_characters() {
        assert!(pattern(".*.swift").matches(".hidden.swift"));
        assert!(pattern("*").matches(".hidden"));
        assert!(pattern("**").matches(".git/config"));
    }

    #[test]
    fn test_matching_is_deterministic() {
        let p = pattern("**/x*/[a-z]?.rs");
        for _ in 0..3 {
            assert!(p.matches("q/xy/ab.rs"));
            assert!(!p.matches("q/yx/ab.rs"));
        }
    }

    #[test]
    fn test_free_functions() {
        let p = pattern("*.rs");
        assert!(matches(&p, "lib.rs"));
        assert_eq!(
            match_prefix(&p, "lib.rs"),
            MatchResult {
                matches: true,
                skip_descendants: true
            }
        );
    }

    // Pruning with one trailing segment.
    #[test]
    fn test_prune_single_segment() {
        assert!(!descends("*", "dir"));
        assert!(!descends("*.swift", "dir"));
        assert!(!descends("main.rs", "src"));
        assert!(descends("**", "dir"));
    }

    // Pruning with two trailing segments: `**` then a component pattern.
    #[test]
    fn test_prune_two_segments() {
        assert!(descends("**/*.ext", "dir"));
        assert!(descends("**/*.ext", "dir.ext"));
        assert!(descends("**/*", "a"));
        assert!(descends("src/*.rs", "src"));
        assert!(!descends("src/*.rs", "lib"));
        assert!(!descends("src/*.rs", "src2"));
    }

    // Pruning with three trailing segments.
    #[test]
    fn test_prune_three_segments() {
        assert!(descends("**/Pivot/*.swift", "a"));
        assert!(descends("**/Pivot/*.swift", "a/Pivot"));
        assert!(descends("a/*/b.rs", "a"));
        assert!(descends("a/*/b.rs", "a/x"));
        assert!(!descends("a/*/b.rs", "a/x/y"));
        assert!(!descends("a/*/b.rs", "b"));
        assert!(descends("a*/x/*.rs", "abc"));
        assert!(!descends("a*/x/*.rs", "abc/y"));
    }

    #[test]
    fn test_prefix_matching_partial_constant() {
        // `Sources/App` could still be reached under `Sources`
        assert!(descends("Sources/App/**", "Sources"));
        assert!(!descends("Sources/App/**", "Tests"));
        assert!(descends("Sources/App/**", "Sources/App"));
        assert!(!descends("Sources/App/**", "Sources/Lib"));
    }

    #[test]
    fn test_match_prefix_reports_both_flags() {
        let result = pattern("src/**").match_prefix("src/lib");
        assert!(result.matches);
        assert!(!result.skip_descendants);

        let result = pattern("src/*.rs").match_prefix("src");
        assert!(!result.matches);
        assert!(!result.skip_descendants);
    }

    #[test]
    fn test_agrees_with_glob_crate() {
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let patterns = ["*.rs", "src/*.rs", "**/*.rs", "a/**/b", "?x*", "[a-c]*.txt", "[!a]*", "x/*/y"];
        let paths = [
            "main.rs", "src/main.rs", "src/a/main.rs", "a/b", "a/q/b", "a/q/r/b", "ax", "zxy",
            "a/x", "b.txt", "d.txt", "x/m/y", "x/m/n/y", "xa",
        ];
        for raw in patterns {
            let ours = pattern(raw);
            let oracle = glob::Pattern::new(raw).unwrap();
            for path in paths {
                assert_eq!(
                    ours.matches(path),
                    oracle.matches_with(path, options),
                    "pattern {raw:?} against {path:?}"
                );
            }
        }
    }
}
