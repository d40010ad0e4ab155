//! Pattern flags and regex compilation.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::str::FromStr;

/// Upper bound on compiled program size; oversized patterns fail to compile
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Parsed form of a flag-letter string such as `"gi"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
    /// `g`: collect every occurrence in a leaf, not just the first
    pub global: bool,
    /// `i`
    pub ignore_case: bool,
    /// `m`: `^`/`$` match at line boundaries
    pub multi_line: bool,
    /// `s`: `.` matches line separators
    pub dot_all: bool,
    /// `u`: accepted for compatibility; matching is always by code point
    pub unicode: bool,
}

impl PatternFlags {
    pub fn global() -> Self {
        Self {
            global: true,
            ..Default::default()
        }
    }

    pub fn parse(flags: &str) -> Result<Self> {
        let mut parsed = PatternFlags::default();
        for letter in flags.chars() {
            let slot = match letter {
                'g' => &mut parsed.global,
                'i' => &mut parsed.ignore_case,
                'm' => &mut parsed.multi_line,
                's' => &mut parsed.dot_all,
                'u' => &mut parsed.unicode,
                _ => return Err(invalid_flags(flags)),
            };
            if *slot {
                return Err(invalid_flags(flags));
            }
            *slot = true;
        }
        Ok(parsed)
    }

    pub fn toggle(&mut self, letter: char) -> bool {
        let slot = match letter {
            'g' => &mut self.global,
            'i' => &mut self.ignore_case,
            'm' => &mut self.multi_line,
            's' => &mut self.dot_all,
            'u' => &mut self.unicode,
            _ => return false,
        };
        *slot = !*slot;
        true
    }
}

fn invalid_flags(flags: &str) -> Error {
    Error::Pattern(format!("Invalid flags supplied to RegExp constructor '{flags}'"))
}

impl FromStr for PatternFlags {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PatternFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters = [
            (self.global, 'g'),
            (self.ignore_case, 'i'),
            (self.multi_line, 'm'),
            (self.dot_all, 's'),
            (self.unicode, 'u'),
        ];
        for (on, letter) in letters {
            if on {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// A compiled pattern together with the flags it was built from.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    flags: PatternFlags,
}

impl CompiledPattern {
    pub fn new(pattern: &str, flags: &str) -> Result<Self> {
        Self::with_flags(pattern, PatternFlags::parse(flags)?)
    }

    pub fn with_flags(pattern: &str, flags: PatternFlags) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flags.ignore_case)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
            .map_err(|e| Error::Pattern(format!("Invalid regular expression: /{pattern}/: {e}")))?;
        Ok(Self { regex, flags })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn flags(&self) -> PatternFlags {
        self.flags
    }

    pub fn is_global(&self) -> bool {
        self.flags.global
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
