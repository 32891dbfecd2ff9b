//! Tokenizer
//!
//!     Scans the input left to right. At each position ASCII whitespace is skipped, then
//!     every registered token is tried anchored at that position and one candidate wins:
//!
//!     1. the higher priority (keywords 90, lookaround tokens 50, plain patterns 0)
//!     2. on equal priority, the longer match
//!     3. on equal priority and length, the token registered first
//!
//!     So `if` becomes the keyword rather than an identifier, while `ifx` stays an
//!     identifier because the keyword needs a word boundary. Greedy tokens such as quoted
//!     strings beat narrower tokens of the same priority.
//!
//!     Once a token is chosen its characters are committed: there is no retokenization,
//!     whatever the parser later needs. If nothing matches, tokenizing fails at that
//!     character.

use crate::dsl::diagnostics::{ParseError, ParseErrorKind};
use crate::dsl::grammar::Grammar;
use serde::Serialize;
use std::fmt;

/// One token of the tokenizer output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenMatch {
    /// Name of the token definition that matched
    pub kind: String,
    pub text: String,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset just past the last character
    pub end: usize,
}

impl fmt::Display for TokenMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} @{}..{}", self.kind, self.text, self.start, self.end)
    }
}

/// Tokenize `input` with every token registered on `grammar`.
pub fn tokenize(grammar: &Grammar, input: &str) -> Result<Vec<TokenMatch>, ParseError> {
    let mut tokens = Vec::new();
    let mut pos = skip_whitespace(input, 0);

    while pos < input.len() {
        let (index, end) =
            best_match(grammar, input, pos).ok_or_else(|| unmatched(input, pos))?;
        let token = &grammar.tokens()[index];
        log::trace!("token {} {:?} at {}", token.name, &input[pos..end], pos);

        tokens.push(TokenMatch {
            kind: token.name.clone(),
            text: input[pos..end].to_string(),
            start: pos,
            end,
        });
        pos = skip_whitespace(input, end);
    }

    log::debug!("tokenized {} bytes into {} tokens", input.len(), tokens.len());
    Ok(tokens)
}

/// Pick the winning token at `pos`: (index into the token table, end offset)
fn best_match(grammar: &Grammar, input: &str, pos: usize) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;

    for (index, token) in grammar.tokens().iter().enumerate() {
        let Some(end) = token.match_at(input, pos) else {
            continue;
        };
        let wins = match best {
            None => true,
            Some((best_index, best_end)) => {
                let current = &grammar.tokens()[best_index];
                token.priority > current.priority
                    || (token.priority == current.priority && end > best_end)
            }
        };
        if wins {
            best = Some((index, end));
        }
    }

    best
}

fn skip_whitespace(input: &str, mut pos: usize) -> usize {
    let bytes = input.as_bytes();
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn unmatched(input: &str, pos: usize) -> ParseError {
    let ch = input[pos..].chars().next().unwrap_or_default();
    ParseError::new(
        ParseErrorKind::Tokenize,
        format!("unexpected character {:?}", ch),
        input,
        pos,
        ch.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[TokenMatch]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    fn keyword_grammar() -> Grammar {
        let mut grammar = Grammar::new();
        grammar.token("IDENT", "[a-z]+").unwrap();
        grammar.keyword("IF", "if").unwrap();
        grammar.token("NUM", "[0-9]+").unwrap();
        grammar
    }

    #[test]
    fn test_offsets_and_whitespace() {
        let tokens = tokenize(&keyword_grammar(), "  ab\t12\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                TokenMatch {
                    kind: "IDENT".into(),
                    text: "ab".into(),
                    start: 2,
                    end: 4
                },
                TokenMatch {
                    kind: "NUM".into(),
                    text: "12".into(),
                    start: 5,
                    end: 7
                },
            ]
        );
    }

    #[test]
    fn test_keyword_beats_identifier() {
        let grammar = keyword_grammar();
        assert_eq!(kinds(&tokenize(&grammar, "if").unwrap()), vec!["IF"]);
        assert_eq!(kinds(&tokenize(&grammar, "ifx").unwrap()), vec!["IDENT"]);
        assert_eq!(kinds(&tokenize(&grammar, "If x").unwrap()), vec!["IF", "IDENT"]);
    }

    #[test]
    fn test_longest_match_at_equal_priority() {
        let mut grammar = Grammar::new();
        grammar.token("EQ", "=").unwrap();
        grammar.token("EQEQ", "==").unwrap();
        assert_eq!(kinds(&tokenize(&grammar, "== =").unwrap()), vec!["EQEQ", "EQ"]);
    }

    #[test]
    fn test_earlier_token_wins_full_tie() {
        let mut grammar = Grammar::new();
        grammar.token("FIRST", "[a-z]+").unwrap();
        grammar.token("SECOND", "[a-z]+").unwrap();
        assert_eq!(kinds(&tokenize(&grammar, "abc").unwrap()), vec!["FIRST"]);
    }

    #[test]
    fn test_empty_and_blank_input() {
        let grammar = keyword_grammar();
        assert!(tokenize(&grammar, "").unwrap().is_empty());
        assert!(tokenize(&grammar, " \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_unmatched_character() {
        let err = tokenize(&keyword_grammar(), "ab\n  $x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Tokenize);
        assert_eq!(err.token, "$");
        assert_eq!(err.position, 5);
        assert_eq!((err.line, err.column), (2, 3));
        assert_eq!(err.message, "unexpected character '$'");
    }
}
