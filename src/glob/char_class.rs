//! Bracket expressions: `[abc]`, `[a-z]`, `[!x]`, `[[:alpha:]]`.

use super::pattern::PatternError;

/// POSIX named character classes usable inside a bracket expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedClass {
    Alpha,
    Digit,
    Alnum,
    Upper,
    Lower,
    Space,
    Blank,
    Punct,
    Xdigit,
    Word,
    Cntrl,
    Graph,
    Print,
}

impl NamedClass {
    /// Look up a class by the name written between `[:` and `:]`.
    pub fn from_name(name: &str) -> Result<Self, PatternError> {
        let class = match name {
            "alpha" => NamedClass::Alpha,
            "digit" => NamedClass::Digit,
            "alnum" => NamedClass::Alnum,
            "upper" => NamedClass::Upper,
            "lower" => NamedClass::Lower,
            "space" => NamedClass::Space,
            "blank" => NamedClass::Blank,
            "punct" => NamedClass::Punct,
            "xdigit" => NamedClass::Xdigit,
            "word" => NamedClass::Word,
            "cntrl" => NamedClass::Cntrl,
            "graph" => NamedClass::Graph,
            "print" => NamedClass::Print,
            other => return Err(PatternError::UnknownNamedClass(other.to_string())),
        };
        Ok(class)
    }

    pub fn contains(self, c: char) -> bool {
        match self {
            NamedClass::Alpha => c.is_alphabetic(),
            NamedClass::Digit => c.is_ascii_digit(),
            NamedClass::Alnum => c.is_alphanumeric(),
            NamedClass::Upper => c.is_uppercase(),
            NamedClass::Lower => c.is_lowercase(),
            NamedClass::Space => c.is_whitespace(),
            NamedClass::Blank => c == ' ' || c == '\t',
            NamedClass::Punct => c.is_ascii_punctuation(),
            NamedClass::Xdigit => c.is_ascii_hexdigit(),
            NamedClass::Word => c.is_alphanumeric() || c == '_',
            NamedClass::Cntrl => c.is_control(),
            NamedClass::Graph => !c.is_control() && !c.is_whitespace(),
            NamedClass::Print => !c.is_control(),
        }
    }
}

/// A compiled bracket expression matching exactly one character.
///
/// A class never matches the path separator, even when negated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterClass {
    pub ranges: Vec<(char, char)>,
    pub named: Vec<NamedClass>,
    pub negated: bool,
}

impl CharacterClass {
    /// Parse the bracket expression starting at `chars[start]` (which must be `[`).
    ///
    /// Returns the class and the index just past the closing `]`.
    pub(crate) fn parse(
        chars: &[char],
        start: usize,
        allow_escaping: bool,
    ) -> Result<(Self, usize), PatternError> {
        let unmatched = PatternError::UnmatchedBracket { position: start };
        let mut idx = start + 1;
        let mut negated = false;
        if matches!(chars.get(idx), Some('!') | Some('^')) {
            negated = true;
            idx += 1;
        }

        let first = idx;
        let mut ranges = Vec::new();
        let mut named = Vec::new();

        loop {
            let c = *chars.get(idx).ok_or(unmatched.clone())?;

            // `]` right after the opening bracket is a literal
            if c == ']' && idx > first {
                idx += 1;
                break;
            }

            if c == '[' && chars.get(idx + 1) == Some(&':') {
                let name_start = idx + 2;
                let name_end = find_named_close(chars, name_start).ok_or(unmatched.clone())?;
                let name: String = chars[name_start..name_end].iter().collect();
                named.push(NamedClass::from_name(&name)?);
                idx = name_end + 2;
                continue;
            }

            let (low, next) = read_class_char(chars, idx, allow_escaping)?;
            idx = next;

            // A trailing `-` before `]` is a literal dash
            if chars.get(idx) == Some(&'-') && chars.get(idx + 1).is_some_and(|&n| n != ']') {
                let (high, next) = read_class_char(chars, idx + 1, allow_escaping)?;
                if high < low {
                    return Err(PatternError::InvalidRange { start: low, end: high });
                }
                ranges.push((low, high));
                idx = next;
            } else {
                ranges.push((low, low));
            }
        }

        Ok((
            CharacterClass {
                ranges,
                named,
                negated,
            },
            idx,
        ))
    }

    /// Test a single character against the class.
    pub fn matches(&self, c: char, case_sensitive: bool) -> bool {
        if c == '/' {
            return false;
        }
        let hit = if case_sensitive {
            self.contains(c)
        } else {
            self.contains(c)
                || c.to_lowercase().any(|l| self.contains(l))
                || c.to_uppercase().any(|u| self.contains(u))
        };
        hit != self.negated
    }

    fn contains(&self, c: char) -> bool {
        self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi)
            || self.named.iter().any(|class| class.contains(c))
    }
}

fn find_named_close(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len().saturating_sub(1)).find(|&i| chars[i] == ':' && chars[i + 1] == ']')
}

fn read_class_char(
    chars: &[char],
    idx: usize,
    allow_escaping: bool,
) -> Result<(char, usize), PatternError> {
    match chars.get(idx) {
        Some('\\') if allow_escaping => match chars.get(idx + 1) {
            Some(&escaped) => Ok((escaped, idx + 2)),
            None => Err(PatternError::TrailingEscape),
        },
        Some(&c) => Ok((c, idx + 1)),
        None => Err(PatternError::UnmatchedBracket { position: idx }),
    }
}
