//! Glob pattern compiler.
//!
//! A raw glob string is first brace-expanded into one or more brace-free
//! strings, each of which is scanned left to right into a flat list of
//! [`Segment`]s. Constants keep their `/` separators; wildcards are typed.

use std::fmt;
use thiserror::Error;

use super::char_class::CharacterClass;

/// Errors raised while compiling a glob pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty pattern")]
    Empty,
    #[error("unmatched bracket at position {position}")]
    UnmatchedBracket { position: usize },
    #[error("unmatched brace at position {position}")]
    UnmatchedBrace { position: usize },
    #[error("unknown character class [:{0}:]")]
    UnknownNamedClass(String),
    #[error("path wildcard '**' at position {position} is not supported by these options")]
    PathWildcardNotAllowed { position: usize },
    #[error("invalid character range {start}-{end}")]
    InvalidRange { start: char, end: char },
    #[error("pattern ends with an unfinished escape")]
    TrailingEscape,
    #[error("brace group at position {position} must be expanded with compile()")]
    UnexpandedGroup { position: usize },
}

/// Knobs controlling how a pattern is parsed and matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternOptions {
    /// Whether `**` spanning a whole component means "any number of components".
    pub supports_path_level_wildcards: bool,
    pub case_sensitive: bool,
    /// Whether `\` escapes the following character.
    pub allow_escaping: bool,
}

impl PatternOptions {
    pub fn new() -> Self {
        Self {
            supports_path_level_wildcards: true,
            case_sensitive: true,
            allow_escaping: true,
        }
    }

    pub fn with_path_level_wildcards(mut self, enabled: bool) -> Self {
        self.supports_path_level_wildcards = enabled;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_escaping(mut self, allow_escaping: bool) -> Self {
        self.allow_escaping = allow_escaping;
        self
    }
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// One typed piece of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, possibly containing `/`.
    Constant(String),
    /// `?`
    SingleCharacterWildcard,
    /// `[...]`
    CharacterClass(CharacterClass),
    /// `*` within one component.
    ComponentWildcard,
    /// `**` as a whole component, together with the `/` that follows it.
    PathWildcard,
}

/// A compiled, brace-free glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
    options: PatternOptions,
}

impl Pattern {
    /// Compile a single brace-free glob string.
    ///
    /// Brace groups are rejected here; use [`compile`] to expand them.
    pub fn new(raw: &str, options: PatternOptions) -> Result<Self, PatternError> {
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        let chars: Vec<char> = raw.chars().collect();
        let mut builder = SegmentBuilder::default();
        let mut idx = 0;

        while idx < chars.len() {
            let c = chars[idx];
            match c {
                '*' => {
                    let run_start = idx;
                    while idx < chars.len() && chars[idx] == '*' {
                        idx += 1;
                    }
                    let run = idx - run_start;
                    let starts_component = run_start == 0 || chars[run_start - 1] == '/';
                    let ends_component = idx == chars.len() || chars[idx] == '/';

                    if run >= 2 && starts_component && ends_component {
                        if !options.supports_path_level_wildcards {
                            return Err(PatternError::PathWildcardNotAllowed { position: run_start });
                        }
                        // `**/` swallows its separator
                        if idx < chars.len() {
                            idx += 1;
                        }
                        builder.push_path_wildcard();
                    } else {
                        builder.push_component_wildcard();
                    }
                }
                '?' => {
                    builder.push(Segment::SingleCharacterWildcard);
                    idx += 1;
                }
                '[' => {
                    let (class, next) = CharacterClass::parse(&chars, idx, options.allow_escaping)?;
                    builder.push(Segment::CharacterClass(class));
                    idx = next;
                }
                ']' => return Err(PatternError::UnmatchedBracket { position: idx }),
                '{' | '}' => return Err(PatternError::UnexpandedGroup { position: idx }),
                '\\' if options.allow_escaping => {
                    let escaped = *chars.get(idx + 1).ok_or(PatternError::TrailingEscape)?;
                    builder.push_char(escaped);
                    idx += 2;
                }
                _ => {
                    builder.push_char(c);
                    idx += 1;
                }
            }
        }

        Ok(Self {
            source: raw.to_string(),
            segments: builder.finish(),
            options,
        })
    }

    /// The brace-free text this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn options(&self) -> PatternOptions {
        self.options
    }

    /// Directory part of a leading constant, e.g. `src/lib/` for `src/lib/*.rs`.
    ///
    /// Empty when the pattern starts with a wildcard or its first constant has
    /// no separator.
    pub fn constant_directory_prefix(&self) -> &str {
        match self.segments.first() {
            Some(Segment::Constant(text)) => match text.rfind('/') {
                Some(pos) => &text[..=pos],
                None => "",
            },
            _ => "",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Accumulates segments while merging adjacent constants and collapsing
/// runs of equivalent wildcards.
#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<Segment>,
}

impl SegmentBuilder {
    fn push_char(&mut self, c: char) {
        if let Some(Segment::Constant(text)) = self.segments.last_mut() {
            text.push(c);
        } else {
            self.segments.push(Segment::Constant(c.to_string()));
        }
    }

    fn push_component_wildcard(&mut self) {
        if !matches!(self.segments.last(), Some(Segment::ComponentWildcard)) {
            self.segments.push(Segment::ComponentWildcard);
        }
    }

    fn push_path_wildcard(&mut self) {
        if !matches!(self.segments.last(), Some(Segment::PathWildcard)) {
            self.segments.push(Segment::PathWildcard);
        }
    }

    fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    fn finish(self) -> Vec<Segment> {
        self.segments
    }
}

/// Compile a glob string, expanding brace groups into sibling patterns.
///
/// A path matches the glob when it matches any of the returned patterns.
pub fn compile(raw: &str, options: PatternOptions) -> Result<Vec<Pattern>, PatternError> {
    expand_braces(raw, options.allow_escaping)?
        .iter()
        .map(|expanded| Pattern::new(expanded, options))
        .collect()
}

/// Expand `{a,b}` groups, first group first, recursing into the results.
///
/// ```
/// use rust_fsglob::glob::expand_braces;
///
/// assert_eq!(expand_braces("*.{swift,cpp}", true).unwrap(), vec!["*.swift", "*.cpp"]);
/// assert_eq!(expand_braces("plain", true).unwrap(), vec!["plain"]);
/// ```
pub fn expand_braces(raw: &str, allow_escaping: bool) -> Result<Vec<String>, PatternError> {
    let chars: Vec<char> = raw.chars().collect();
    let Some((open, close)) = first_group(&chars, allow_escaping)? else {
        return Ok(vec![raw.to_string()]);
    };

    let prefix: String = chars[..open].iter().collect();
    let suffix: String = chars[close + 1..].iter().collect();

    let mut expanded = Vec::new();
    for alternative in split_alternatives(&chars[open + 1..close], allow_escaping) {
        let candidate = format!("{prefix}{alternative}{suffix}");
        expanded.extend(expand_braces(&candidate, allow_escaping)?);
    }
    Ok(expanded)
}

/// Locate the first top-level `{...}` group, validating brace balance.
fn first_group(chars: &[char], allow_escaping: bool) -> Result<Option<(usize, usize)>, PatternError> {
    let mut depth = 0usize;
    let mut open = None;
    let mut found = None;
    let mut in_class = false;
    let mut idx = 0;

    while idx < chars.len() {
        match chars[idx] {
            '\\' if allow_escaping => idx += 1,
            // braces inside a bracket expression are literal
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '{' if !in_class => {
                if depth == 0 && found.is_none() {
                    open = Some(idx);
                }
                depth += 1;
            }
            '}' if !in_class => {
                if depth == 0 {
                    return Err(PatternError::UnmatchedBrace { position: idx });
                }
                depth -= 1;
                if depth == 0 && found.is_none() {
                    found = open.map(|start| (start, idx));
                }
            }
            _ => {}
        }
        idx += 1;
    }

    if depth > 0 {
        let position = open.filter(|_| found.is_none()).unwrap_or(chars.len());
        return Err(PatternError::UnmatchedBrace { position });
    }
    Ok(found)
}

/// Split group contents on top-level commas.
fn split_alternatives(content: &[char], allow_escaping: bool) -> Vec<String> {
    let mut alternatives = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut idx = 0;

    while idx < content.len() {
        let c = content[idx];
        match c {
            '\\' if allow_escaping => {
                current.push(c);
                if let Some(&next) = content.get(idx + 1) {
                    current.push(next);
                    idx += 1;
                }
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => alternatives.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
        idx += 1;
    }
    alternatives.push(current);
    alternatives
}
