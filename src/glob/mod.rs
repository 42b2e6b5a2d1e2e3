//! Glob 模式编译与匹配
//!
//! `compile` turns a raw glob (with optional `{a,b}` groups) into one or more
//! brace-free [`Pattern`]s; [`Pattern::matches`] and [`Pattern::match_prefix`]
//! decide full and partial matches against `/`-separated relative paths.
//!
//! Supported syntax:
//! - `*` zero or more characters within one path component
//! - `**` zero or more whole path components
//! - `?` exactly one character, never `/`
//! - `[abc]`, `[a-c]`, `[!abc]`/`[^abc]`, `[[:alpha:]]`
//! - `{a,b,c}` brace alternation, expanded at compile time

mod char_class;
mod matcher;
mod pattern;

pub use char_class::{CharacterClass, NamedClass};
pub use matcher::{match_prefix, matches, MatchResult};
pub use pattern::{compile, expand_braces, Pattern, PatternError, PatternOptions, Segment};
