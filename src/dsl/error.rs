//! Error types shared across the crate
//!
//! Parse failures are [`ParseError`]s (see [`diagnostics`](crate::dsl::diagnostics)).
//! Grammar registration fails with [`GrammarError`], loading a grammar file with
//! [`LoaderError`](crate::dsl::loader::LoaderError). [`Error`] wraps all three for callers
//! that want a single type.

use crate::dsl::diagnostics::ParseError;
use crate::dsl::loader::LoaderError;
use thiserror::Error;

/// Errors raised while building a grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("invalid pattern for token '{token}': {message}")]
    InvalidPattern { token: String, message: String },

    #[error("token '{0}' is already defined")]
    DuplicateToken(String),

    #[error("'{0}' is already defined as a {1}")]
    NameConflict(String, &'static str),

    #[error("empty name for {0}")]
    EmptyName(&'static str),

    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    #[error("lookaround token '{0}' needs a lookahead or a lookbehind")]
    MissingLookaround(String),

    #[error("keyword token '{0}' cannot have a lookahead or a lookbehind")]
    KeywordLookaround(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Loader(#[from] LoaderError),
}

/// Whether `err` (or the error it wraps) is a [`ParseError`] carrying position data.
pub fn is_parse_error(err: &(dyn std::error::Error + 'static)) -> bool {
    find_parse_error(err).is_some()
}

/// The multi-line annotated rendering of `err`, if it carries position data.
pub fn detailed_message(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    find_parse_error(err).map(ParseError::detailed)
}

fn find_parse_error<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a ParseError> {
    if let Some(parse) = err.downcast_ref::<ParseError>() {
        return Some(parse);
    }
    if let Some(Error::Parse(parse)) = err.downcast_ref::<Error>() {
        return Some(parse);
    }
    err.source().and_then(find_parse_error)
}
