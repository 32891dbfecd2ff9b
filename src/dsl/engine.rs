//! DSL instances
//!
//! A [`Dsl`] bundles everything needed to run a language: the grammar (tokens, rules and
//! actions), the context actions read and write, the functions actions may call, and the
//! parser configuration.
//!
//! # Examples
//!
//! ```rust,ignore
//! use dslkit::dsl::{Dsl, Value};
//!
//! let mut dsl = Dsl::new("greeting");
//! dsl.grammar_mut().keyword("HELLO", "hello")?;
//! dsl.grammar_mut().token("NAME", "[a-z]+")?;
//! dsl.grammar_mut().rule("greeting", &["HELLO", "NAME"], "greet")?;
//! dsl.grammar_mut().action("greet", |values, _scope| Ok(values[1].clone()));
//!
//! let result = dsl.parse("hello world")?;
//! assert_eq!(result.value, Value::from("world"));
//! ```
//!
//! # Context
//!
//! [`Dsl::parse`] takes `&mut self`: actions mutate the instance context, and the borrow
//! checker rules out two such parses overlapping. [`Dsl::parse_isolated`] takes `&self`
//! and runs against a copy of the context, so a shared `&Dsl` can serve parses from
//! several threads at once.

use crate::dsl::actions::{ActionError, Context, Functions, NativeFn};
use crate::dsl::config::ParserConfig;
use crate::dsl::diagnostics::ParseError;
use crate::dsl::grammar::{Grammar, GrammarSnapshot};
use crate::dsl::lexing::{self, TokenMatch};
use crate::dsl::value::Value;

/// The outcome of a successful parse
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    /// What the start rule's action produced
    pub value: Value,
    /// The text that was parsed
    pub input: String,
    /// Name of the DSL that produced the value
    pub grammar: String,
}

#[derive(Debug, Clone)]
pub struct Dsl {
    name: String,
    grammar: Grammar,
    context: Context,
    functions: Functions,
    config: ParserConfig,
}

impl Dsl {
    pub fn new(name: &str) -> Self {
        Self::with_grammar(name, Grammar::new())
    }

    pub fn with_grammar(name: &str, grammar: Grammar) -> Self {
        Self {
            name: name.to_string(),
            grammar,
            context: Context::new(),
            functions: Functions::new(),
            config: ParserConfig::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Mutable access to the grammar, for registering tokens, rules and actions
    pub fn grammar_mut(&mut self) -> &mut Grammar {
        &mut self.grammar
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ParserConfig) {
        self.config = config;
    }

    // ===== CONTEXT =====

    pub fn set_context(&mut self, name: &str, value: impl Into<Value>) {
        self.context.set(name, value);
    }

    pub fn get_context(&self, name: &str) -> Option<&Value> {
        self.context.get(name)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn clear_context(&mut self) {
        self.context.clear();
    }

    // ===== FUNCTIONS =====

    /// Register a function actions can call through their scope
    pub fn function<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.functions.register(name, f);
    }

    pub fn get_function(&self, name: &str) -> Option<&NativeFn> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> &Functions {
        &self.functions
    }

    // ===== PARSING =====

    /// Parse `input` with the instance context; actions may modify it.
    pub fn parse(&mut self, input: &str) -> Result<ParseResult, ParseError> {
        log::debug!("parsing {} bytes with '{}'", input.len(), self.name);
        let value = self
            .grammar
            .parse_with(input, &mut self.context, &self.functions, &self.config)?;
        Ok(self.result(value, input))
    }

    /// Parse `input` against a copy of the instance context, leaving the instance as it was.
    pub fn parse_isolated(&self, input: &str) -> Result<ParseResult, ParseError> {
        let mut context = self.context.clone();
        let value = self
            .grammar
            .parse_with(input, &mut context, &self.functions, &self.config)?;
        Ok(self.result(value, input))
    }

    /// Tokenize without parsing
    pub fn tokenize(&self, input: &str) -> Result<Vec<TokenMatch>, ParseError> {
        lexing::tokenize(&self.grammar, input)
    }

    pub fn snapshot(&self) -> GrammarSnapshot {
        self.grammar.snapshot()
    }

    fn result(&self, value: Value, input: &str) -> ParseResult {
        ParseResult {
            value,
            input: input.to_string(),
            grammar: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> Dsl {
        let mut dsl = Dsl::new("counter");
        let grammar = dsl.grammar_mut();
        grammar.token("TICK", r"\.").unwrap();
        grammar.one_or_more("ticks", "tick").unwrap();
        grammar.rule("tick", &["TICK"], "bump").unwrap();
        grammar.set_start("ticks").unwrap();
        grammar.action("bump", |_values, scope| {
            let count = scope.get("count").and_then(Value::as_int).unwrap_or(0) + 1;
            scope.set("count", Value::Int(count));
            Ok(Value::Int(count))
        });
        dsl
    }

    #[test]
    fn test_parse_updates_instance_context() {
        let mut dsl = counter();
        let result = dsl.parse(". . .").unwrap();

        assert_eq!(result.grammar, "counter");
        assert_eq!(result.input, ". . .");
        assert_eq!(
            result.value,
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(dsl.get_context("count"), Some(&Value::Int(3)));

        dsl.parse(".").unwrap();
        assert_eq!(dsl.get_context("count"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_parse_isolated_leaves_context_alone() {
        let mut dsl = counter();
        dsl.set_context("count", Value::Int(10));

        let result = dsl.parse_isolated(". .").unwrap();
        assert_eq!(result.value, Value::List(vec![Value::Int(11), Value::Int(12)]));
        assert_eq!(dsl.get_context("count"), Some(&Value::Int(10)));

        dsl.clear_context();
        assert!(dsl.context().is_empty());
    }

    #[test]
    fn test_functions_are_callable_from_actions() {
        let mut dsl = Dsl::new("shout");
        dsl.function("upper", |args| {
            let text = args
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| ActionError::new("expected a string"))?;
            Ok(Value::from(text.to_uppercase()))
        });
        dsl.grammar_mut().token("WORD", "[a-z]+").unwrap();
        dsl.grammar_mut().rule("shout", &["WORD"], "shout").unwrap();
        dsl.grammar_mut()
            .action("shout", |values, scope| scope.call("upper", values));

        assert!(dsl.get_function("upper").is_some());
        assert_eq!(dsl.parse("hey").unwrap().value, Value::from("HEY"));
    }

    #[test]
    fn test_tokenize_dry_run() {
        let dsl = counter();
        let tokens = dsl.tokenize(". .").unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(dsl.tokenize("x").is_err());
    }
}
