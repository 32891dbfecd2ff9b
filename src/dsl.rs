//! Main module for the grammar engine
//!
//!     Build a [`Grammar`] (or a [`Dsl`], which adds a context, functions and a parser
//!     configuration), then parse text with it:
//!
//!         tokens + rules + actions  ->  tokenize  ->  match from the start rule  ->  Value
//!
//!     Grammars can also be loaded from YAML/JSON files through [`loader`].

pub mod actions;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod lexing;
pub mod loader;
pub mod parsing;
pub mod testing;
pub mod value;

pub use actions::{ActionError, ActionScope, Context, Functions};
pub use config::ParserConfig;
pub use diagnostics::{ParseError, ParseErrorKind};
pub use engine::{Dsl, ParseResult};
pub use error::{detailed_message, is_parse_error, Error, GrammarError};
pub use grammar::{Associativity, Grammar, GrammarSnapshot};
pub use lexing::{tokenize, TokenMatch};
pub use loader::{Format, GrammarConfig, GrammarLoader, LoaderError};
pub use value::Value;
