//! Parse errors with source positions
//!
//! A [`ParseError`] is what every failed `parse` call returns. It behaves as a plain error
//! (its `Display` is a one-line `line L, column C: message`), and tooling can ask for the
//! multi-line [`ParseError::detailed`] rendering, which shows the surrounding source with
//! a caret under the failing column.
//!
//! Errors are built from a byte offset only; line and column are computed at construction
//! time by [`Position::from_offset`].

pub mod location;

pub use location::{line_text, Position};

use thiserror::Error;

/// Number of source lines shown before the offending line in detailed output
const CONTEXT_LINES: usize = 2;

/// What went wrong, with the data tooling may want to inspect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No token pattern matches at the offset
    Tokenize,
    /// A single token was expected where another token (or the end of input) was found
    ExpectedToken {
        expected: String,
        found: Option<String>,
    },
    /// Every alternative of a rule failed
    NoAlternative { rule: String, expected: Vec<String> },
    /// An action rejected the values of the only alternatives that matched
    Action { rule: String, action: String },
    /// The start rule matched but tokens remain
    TrailingInput,
    /// A rule references a name that is neither a token nor a rule
    UndefinedSymbol { symbol: String, rule: String },
    /// The grammar has no rules, or the configured start rule does not exist
    MissingStartRule,
    /// Nested rule invocations exceeded the configured limit
    RecursionLimit { limit: usize },
}

/// A failure to tokenize or parse, anchored to a position in the original input
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// 1-based line of `position`
    pub line: usize,
    /// 1-based column (in characters) of `position`
    pub column: usize,
    /// Byte offset into `input`
    pub position: usize,
    /// Text of the offending token, empty at end of input
    pub token: String,
    pub input: String,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        position: usize,
        token: impl Into<String>,
    ) -> Self {
        let at = Position::from_offset(input, position);
        Self {
            kind,
            message: message.into(),
            line: at.line,
            column: at.column,
            position,
            token: token.into(),
            input: input.to_string(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Render the error with its source context:
    ///
    /// ```text
    /// error: expected token THEN, got NAME 'x'
    ///  --> line 2, column 1
    ///    1 | if a
    /// >> 2 | x
    ///      | ^
    /// ```
    pub fn detailed(&self) -> String {
        let mut out = format!(
            "error: {}\n --> line {}, column {}\n",
            self.message, self.line, self.column
        );

        let first = self.line.saturating_sub(CONTEXT_LINES).max(1);
        for line_num in first..=self.line {
            let text = line_text(&self.input, line_num).unwrap_or("");
            let marker = if line_num == self.line { ">>" } else { "  " };
            out.push_str(&format!("{} {:>4} | {}\n", marker, line_num, text));
        }

        let offending = line_text(&self.input, self.line).unwrap_or("");
        let padding: String = offending
            .chars()
            .take(self.column.saturating_sub(1))
            .map(|ch| if ch == '\t' { '\t' } else { ' ' })
            .collect();
        out.push_str(&format!("{:7} | {}^\n", "", padding));

        out
    }
}

/// Describe a token for messages: `NAME 'text'`, or `end of input`.
pub(crate) fn describe_token(found: Option<(&str, &str)>) -> String {
    match found {
        Some((name, text)) => format!("{} '{}'", name, text),
        None => "end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParseError {
        ParseError::new(
            ParseErrorKind::ExpectedToken {
                expected: "VALID".into(),
                found: Some("WORD".into()),
            },
            "expected token VALID, got WORD 'invalid'",
            "line1\ninvalid",
            6,
            "invalid",
        )
    }

    #[test]
    fn test_plain_message_carries_position() {
        let err = sample();
        assert_eq!((err.line, err.column), (2, 1));
        assert_eq!(
            err.to_string(),
            "line 2, column 1: expected token VALID, got WORD 'invalid'"
        );
    }

    #[test]
    fn test_detailed_shows_line_and_caret() {
        let rendered = sample().detailed();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "error: expected token VALID, got WORD 'invalid'");
        assert_eq!(lines[1], " --> line 2, column 1");
        assert_eq!(lines[2], "      1 | line1");
        assert_eq!(lines[3], ">>    2 | invalid");
        assert_eq!(lines[4], "        | ^");
    }

    #[test]
    fn test_caret_follows_column() {
        let err = ParseError::new(ParseErrorKind::Tokenize, "bad", "ab $", 3, "$");
        let caret = err.detailed().lines().last().unwrap().to_string();
        assert_eq!(caret, "        |    ^");
    }

    #[test]
    fn test_describe_token() {
        assert_eq!(describe_token(Some(("NUM", "4"))), "NUM '4'");
        assert_eq!(describe_token(None), "end of input");
    }
}
