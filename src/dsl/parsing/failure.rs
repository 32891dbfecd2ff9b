//! Furthest-failure tracking
//!
//! Backtracking swallows individual failures: a mismatching alternative just lets the next
//! one try. To still report something useful when the whole parse fails, the parser
//! records the furthest token position at which a token was expected (and which tokens),
//! and the furthest action failure. The final error is built from those once the start
//! rule has given up.

use crate::dsl::diagnostics::{describe_token, ParseError, ParseErrorKind};
use crate::dsl::lexing::TokenMatch;

#[derive(Debug, Clone, PartialEq)]
pub struct ActionFailure {
    pub rule: String,
    pub action: String,
    pub message: String,
    /// Token position where the alternative started
    pub start: usize,
    /// Token position where the alternative ended
    pub end: usize,
}

#[derive(Debug, Default)]
pub struct FailureTracker {
    furthest: Option<usize>,
    expected: Vec<String>,
    /// Rule that recorded the first expectation at `furthest`
    rule: Option<String>,
    action: Option<ActionFailure>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token `token` was required at position `pos` while matching `rule`
    pub fn expected(&mut self, pos: usize, token: &str, rule: &str) {
        match self.furthest {
            Some(furthest) if pos < furthest => {}
            Some(furthest) if pos == furthest => {
                if !self.expected.iter().any(|t| t == token) {
                    self.expected.push(token.to_string());
                }
            }
            _ => {
                self.furthest = Some(pos);
                self.expected = vec![token.to_string()];
                self.rule = Some(rule.to_string());
            }
        }
    }

    pub fn action_failed(&mut self, failure: ActionFailure) {
        let further = self
            .action
            .as_ref()
            .map_or(true, |current| failure.end > current.end);
        if further {
            self.action = Some(failure);
        }
    }

    pub fn furthest(&self) -> Option<usize> {
        self.furthest
    }

    /// The error for a start rule that failed outright
    pub fn into_error(self, tokens: &[TokenMatch], input: &str, start_rule: &str) -> ParseError {
        if let Some(action) = &self.action {
            if self.furthest.map_or(true, |furthest| action.end >= furthest) {
                let at = offset(tokens, input, action.start);
                return ParseError::new(
                    ParseErrorKind::Action {
                        rule: action.rule.clone(),
                        action: action.action.clone(),
                    },
                    format!(
                        "action '{}' of rule '{}' failed: {}",
                        action.action, action.rule, action.message
                    ),
                    input,
                    at,
                    token_text(tokens, action.start),
                );
            }
        }

        let Some(pos) = self.furthest else {
            return ParseError::new(
                ParseErrorKind::NoAlternative {
                    rule: start_rule.to_string(),
                    expected: Vec::new(),
                },
                format!("no alternative matched for rule '{}'", start_rule),
                input,
                offset(tokens, input, 0),
                token_text(tokens, 0),
            );
        };

        let found_token = tokens.get(pos);
        let found = describe_token(found_token.map(|t| (t.kind.as_str(), t.text.as_str())));
        let at = offset(tokens, input, pos);
        let text = token_text(tokens, pos);

        if let [expected] = self.expected.as_slice() {
            return ParseError::new(
                ParseErrorKind::ExpectedToken {
                    expected: expected.clone(),
                    found: found_token.map(|t| t.kind.clone()),
                },
                format!("expected token {}, got {}", expected, found),
                input,
                at,
                text,
            );
        }

        let rule = self.rule.unwrap_or_else(|| start_rule.to_string());
        let message = format!(
            "no alternative matched for rule '{}': expected one of {}, got {}",
            rule,
            self.expected.join(", "),
            found
        );
        ParseError::new(
            ParseErrorKind::NoAlternative {
                rule,
                expected: self.expected,
            },
            message,
            input,
            at,
            text,
        )
    }

    /// The error for a start rule that matched only the first `end` tokens
    pub fn into_trailing_error(
        self,
        tokens: &[TokenMatch],
        input: &str,
        start_rule: &str,
        end: usize,
    ) -> ParseError {
        let failed_further = self.furthest.is_some_and(|furthest| furthest > end)
            || self.action.as_ref().is_some_and(|action| action.end > end);
        if failed_further {
            return self.into_error(tokens, input, start_rule);
        }

        let found = tokens
            .get(end)
            .map(|t| (t.kind.as_str(), t.text.as_str()));
        ParseError::new(
            ParseErrorKind::TrailingInput,
            format!(
                "unexpected {} after the end of '{}'",
                describe_token(found),
                start_rule
            ),
            input,
            offset(tokens, input, end),
            token_text(tokens, end),
        )
    }
}

/// Byte offset of token `pos`; past the last token, the end of the meaningful input.
pub fn offset(tokens: &[TokenMatch], input: &str, pos: usize) -> usize {
    tokens
        .get(pos)
        .map_or_else(|| input.trim_end().len(), |token| token.start)
}

fn token_text(tokens: &[TokenMatch], pos: usize) -> String {
    tokens.get(pos).map(|t| t.text.clone()).unwrap_or_default()
}
