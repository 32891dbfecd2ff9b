//! Token definitions
//!
//! A token is a named regex plus a priority. Matchers are compiled once at registration
//! and always run anchored at the scan position: the pattern is wrapped as `^(?:...)` and
//! applied to the remainder of the input.
//!
//! The regex engine has no look-around, so lookahead and lookbehind are separate regexes:
//! the lookahead must match right after the token, the lookbehind must match right before
//! it (compiled as `(?:...)$` and applied to the text preceding the token).

use crate::dsl::error::GrammarError;
use regex::Regex;
use serde::Serialize;

/// Priority of ordinary pattern tokens
pub const DEFAULT_PRIORITY: i32 = 0;
/// Priority of tokens registered with lookahead or lookbehind
pub const LOOKAROUND_PRIORITY: i32 = 50;
/// Priority of keyword tokens
pub const KEYWORD_PRIORITY: i32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Pattern,
    Keyword,
    Lookaround,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub name: String,
    /// The pattern as registered (for keywords: the bare word)
    pub pattern: String,
    pub priority: i32,
    pub kind: TokenKind,
    pub lookahead: Option<String>,
    pub lookbehind: Option<String>,
    matcher: Regex,
    lookahead_matcher: Option<Regex>,
    lookbehind_matcher: Option<Regex>,
}

impl Token {
    pub fn new(name: &str, pattern: &str, priority: i32) -> Result<Self, GrammarError> {
        Ok(Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            priority,
            kind: TokenKind::Pattern,
            lookahead: None,
            lookbehind: None,
            matcher: compile(name, &format!("^(?:{})", pattern))?,
            lookahead_matcher: None,
            lookbehind_matcher: None,
        })
    }

    /// A case-insensitive exact word. Word-like keywords only match on word boundaries,
    /// so `if` does not match the start of `ifx`.
    pub fn keyword(name: &str, word: &str) -> Result<Self, GrammarError> {
        let escaped = regex::escape(word);
        let pattern = if is_word(word) {
            format!(r"(?i)^(?:{})\b", escaped)
        } else {
            format!("(?i)^(?:{})", escaped)
        };

        Ok(Self {
            name: name.to_string(),
            pattern: word.to_string(),
            priority: KEYWORD_PRIORITY,
            kind: TokenKind::Keyword,
            lookahead: None,
            lookbehind: None,
            matcher: compile(name, &pattern)?,
            lookahead_matcher: None,
            lookbehind_matcher: None,
        })
    }

    /// At least one of `lookahead` and `lookbehind` is required.
    pub fn with_lookaround(
        name: &str,
        pattern: &str,
        lookahead: Option<&str>,
        lookbehind: Option<&str>,
    ) -> Result<Self, GrammarError> {
        if lookahead.is_none() && lookbehind.is_none() {
            return Err(GrammarError::MissingLookaround(name.to_string()));
        }
        let mut token = Self::new(name, pattern, LOOKAROUND_PRIORITY)?;
        token.kind = TokenKind::Lookaround;
        if let Some(ahead) = lookahead {
            token.lookahead = Some(ahead.to_string());
            token.lookahead_matcher = Some(compile(name, &format!("^(?:{})", ahead))?);
        }
        if let Some(behind) = lookbehind {
            token.lookbehind = Some(behind.to_string());
            token.lookbehind_matcher = Some(compile(name, &format!("(?:{})$", behind))?);
        }
        Ok(token)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Try to match at byte offset `pos` of `input`, returning the end offset.
    ///
    /// Zero-length matches are rejected: a token must consume input.
    pub fn match_at(&self, input: &str, pos: usize) -> Option<usize> {
        let rest = input.get(pos..)?;
        let found = self.matcher.find(rest)?;
        if found.end() == 0 {
            return None;
        }
        let end = pos + found.end();

        if self.kind == TokenKind::Keyword && is_word(&self.pattern) {
            let preceded_by_word = input[..pos].chars().next_back().is_some_and(is_word_char);
            if preceded_by_word {
                return None;
            }
        }
        if let Some(ahead) = &self.lookahead_matcher {
            if !ahead.is_match(&input[end..]) {
                return None;
            }
        }
        if let Some(behind) = &self.lookbehind_matcher {
            if !behind.is_match(&input[..pos]) {
                return None;
            }
        }

        Some(end)
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex, GrammarError> {
    Regex::new(pattern).map_err(|e| GrammarError::InvalidPattern {
        token: name.to_string(),
        message: e.to_string(),
    })
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_word_char)
}
