//! Grammar model and builder
//!
//!     A grammar is three name-indexed tables: tokens, rules and actions. It is built
//!     incrementally and is read-only while a parse runs, so one grammar can serve any
//!     number of sequential (or, through `&Grammar`, concurrent) parse calls.
//!
//!     Rules and tokens live in arenas (`Vec`) indexed through a name map. A rule that
//!     references another rule, or itself, only stores the name; the parser resolves it
//!     when it gets there. There are no references between rules and so no ownership
//!     cycles, however recursive the grammar is.
//!
//!     Registration order matters and is preserved:
//!     - tokens: equal priority and equal length ties go to the earlier token
//!     - alternatives: tried in registration order, the first success wins
//!     - rules: the first rule registered is the default start rule
//!
//!     Repetition is sugar over left recursion. `zero_or_more("items", "ITEM")` registers
//!
//!         items -> (empty)          $empty
//!         items -> items ITEM       $append
//!
//!     and the seed-growing resolver turns that into a loop.

pub mod rule;
pub mod snapshot;
pub mod token;

pub use rule::{Alternative, Associativity, Rule};
pub use snapshot::GrammarSnapshot;
pub use token::{Token, TokenKind, DEFAULT_PRIORITY, KEYWORD_PRIORITY, LOOKAROUND_PRIORITY};

use crate::dsl::actions::{self, Action, ActionError, ActionScope, Builtin};
use crate::dsl::error::GrammarError;
use crate::dsl::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Grammar {
    tokens: Vec<Token>,
    token_index: HashMap<String, usize>,
    rules: Vec<Rule>,
    rule_index: HashMap<String, usize>,
    actions: HashMap<String, Action>,
    start: Option<String>,
}

/// What a symbol name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Token(usize),
    Rule(usize),
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- tokens -----

    /// Register a regex token with the default priority
    pub fn token(&mut self, name: &str, pattern: &str) -> Result<(), GrammarError> {
        self.token_with_priority(name, pattern, DEFAULT_PRIORITY)
    }

    pub fn token_with_priority(
        &mut self,
        name: &str,
        pattern: &str,
        priority: i32,
    ) -> Result<(), GrammarError> {
        self.check_token_name(name)?;
        self.add_token(Token::new(name, pattern, priority)?);
        Ok(())
    }

    /// Register a case-insensitive, word-bounded keyword
    pub fn keyword(&mut self, name: &str, word: &str) -> Result<(), GrammarError> {
        self.check_token_name(name)?;
        self.add_token(Token::keyword(name, word)?);
        Ok(())
    }

    /// Register a token that only matches when followed by `lookahead` and/or
    /// preceded by `lookbehind`
    pub fn token_with_lookaround(
        &mut self,
        name: &str,
        pattern: &str,
        lookahead: Option<&str>,
        lookbehind: Option<&str>,
    ) -> Result<(), GrammarError> {
        self.check_token_name(name)?;
        self.add_token(Token::with_lookaround(
            name, pattern, lookahead, lookbehind,
        )?);
        Ok(())
    }

    /// Register a token built by hand, e.g. one combining lookaround with a custom priority
    pub fn register_token(&mut self, token: Token) -> Result<(), GrammarError> {
        self.check_token_name(&token.name)?;
        self.add_token(token);
        Ok(())
    }

    fn check_token_name(&self, name: &str) -> Result<(), GrammarError> {
        if name.is_empty() {
            return Err(GrammarError::EmptyName("token"));
        }
        if self.token_index.contains_key(name) {
            return Err(GrammarError::DuplicateToken(name.to_string()));
        }
        if self.rule_index.contains_key(name) {
            return Err(GrammarError::NameConflict(name.to_string(), "rule"));
        }
        Ok(())
    }

    fn add_token(&mut self, token: Token) {
        self.token_index.insert(token.name.clone(), self.tokens.len());
        self.tokens.push(token);
    }

    // ----- rules -----

    /// Add an alternative to `name`. Registering the same name again appends another
    /// alternative.
    pub fn rule(
        &mut self,
        name: &str,
        symbols: &[&str],
        action: &str,
    ) -> Result<(), GrammarError> {
        self.add_alternative(name, Alternative::new(symbols, action))
    }

    /// Like [`Grammar::rule`], recording precedence metadata on the alternative
    pub fn rule_with_precedence(
        &mut self,
        name: &str,
        symbols: &[&str],
        action: &str,
        precedence: i32,
        associativity: Associativity,
    ) -> Result<(), GrammarError> {
        self.add_alternative(
            name,
            Alternative::new(symbols, action).with_precedence(precedence, associativity),
        )
    }

    /// `name -> (empty) | name element`: zero or more `element`s, collected into a list
    pub fn zero_or_more(&mut self, name: &str, element: &str) -> Result<(), GrammarError> {
        self.rule(name, &[], actions::EMPTY)?;
        self.rule(name, &[name, element], actions::APPEND)
    }

    /// `name -> element | name element`: one or more `element`s, collected into a list
    pub fn one_or_more(&mut self, name: &str, element: &str) -> Result<(), GrammarError> {
        self.rule(name, &[element], actions::SINGLE)?;
        self.rule(name, &[name, element], actions::APPEND)
    }

    pub fn add_alternative(
        &mut self,
        name: &str,
        alternative: Alternative,
    ) -> Result<(), GrammarError> {
        if name.is_empty() {
            return Err(GrammarError::EmptyName("rule"));
        }
        if self.token_index.contains_key(name) {
            return Err(GrammarError::NameConflict(name.to_string(), "token"));
        }

        let index = match self.rule_index.get(name) {
            Some(&index) => index,
            None => {
                self.rule_index.insert(name.to_string(), self.rules.len());
                self.rules.push(Rule::new(name));
                self.rules.len() - 1
            }
        };
        self.rules[index].alternatives.push(alternative);
        Ok(())
    }

    /// Override the start rule. The rule must already exist.
    pub fn set_start(&mut self, name: &str) -> Result<(), GrammarError> {
        if !self.rule_index.contains_key(name) {
            return Err(GrammarError::UnknownRule(name.to_string()));
        }
        self.start = Some(name.to_string());
        Ok(())
    }

    /// The configured start rule, or the first rule registered
    pub fn start_rule(&self) -> Option<&str> {
        self.start
            .as_deref()
            .or_else(|| self.rules.first().map(|rule| rule.name.as_str()))
    }

    /// Whether the start rule was set explicitly (as opposed to defaulting)
    pub fn has_explicit_start(&self) -> bool {
        self.start.is_some()
    }

    // ----- actions -----

    /// Register (or replace) a named action
    pub fn action<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value], &mut ActionScope<'_>) -> Result<Value, ActionError>
            + Send
            + Sync
            + 'static,
    {
        self.actions.insert(name.to_string(), Action::User(Arc::new(f)));
    }

    /// Look up an action: registered actions first, then builtins
    pub fn find_action(&self, name: &str) -> Option<Action> {
        self.actions
            .get(name)
            .cloned()
            .or_else(|| Builtin::from_name(name).map(Action::Builtin))
    }

    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // ----- lookup -----

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get_token(&self, name: &str) -> Option<&Token> {
        self.token_index.get(name).map(|&i| &self.tokens[i])
    }

    pub fn get_rule(&self, name: &str) -> Option<&Rule> {
        self.rule_index.get(name).map(|&i| &self.rules[i])
    }

    pub fn rule_at(&self, index: usize) -> &Rule {
        &self.rules[index]
    }

    pub fn resolve(&self, name: &str) -> Option<Symbol> {
        if let Some(&i) = self.token_index.get(name) {
            return Some(Symbol::Token(i));
        }
        self.rule_index.get(name).map(|&i| Symbol::Rule(i))
    }

    /// Introspection view of the whole grammar
    pub fn snapshot(&self) -> GrammarSnapshot {
        GrammarSnapshot::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_defaults_to_first_rule() {
        let mut grammar = Grammar::new();
        assert_eq!(grammar.start_rule(), None);

        grammar.token("A", "a").unwrap();
        grammar.rule("first", &["A"], "").unwrap();
        grammar.rule("second", &["first"], "").unwrap();
        assert_eq!(grammar.start_rule(), Some("first"));

        grammar.set_start("second").unwrap();
        assert_eq!(grammar.start_rule(), Some("second"));
        assert!(grammar.set_start("missing").is_err());
    }

    #[test]
    fn test_repeated_rule_appends_alternatives() {
        let mut grammar = Grammar::new();
        grammar.rule("value", &["NUM"], "").unwrap();
        grammar.rule("value", &["STR"], "").unwrap();
        assert_eq!(grammar.rules().len(), 1);
        assert_eq!(grammar.get_rule("value").unwrap().alternatives.len(), 2);
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let mut grammar = Grammar::new();
        grammar.token("NUM", "[0-9]+").unwrap();
        assert_eq!(
            grammar.token("NUM", "[0-9]"),
            Err(GrammarError::DuplicateToken("NUM".into()))
        );
    }

    #[test]
    fn test_token_and_rule_names_share_namespace() {
        let mut grammar = Grammar::new();
        grammar.token("NUM", "[0-9]+").unwrap();
        assert!(matches!(
            grammar.rule("NUM", &[], ""),
            Err(GrammarError::NameConflict(_, "token"))
        ));

        grammar.rule("expr", &["NUM"], "").unwrap();
        assert!(matches!(
            grammar.keyword("expr", "expr"),
            Err(GrammarError::NameConflict(_, "rule"))
        ));
    }

    #[test]
    fn test_invalid_pattern_does_not_register() {
        let mut grammar = Grammar::new();
        assert!(grammar.token("BAD", "[").is_err());
        assert!(grammar.get_token("BAD").is_none());
    }

    #[test]
    fn test_repetition_helpers() {
        let mut grammar = Grammar::new();
        grammar.zero_or_more("xs", "X").unwrap();
        grammar.one_or_more("ys", "Y").unwrap();

        let xs = grammar.get_rule("xs").unwrap();
        assert!(xs.is_left_recursive());
        assert!(xs.alternatives[0].symbols.is_empty());
        assert_eq!(xs.alternatives[1].symbols, vec!["xs", "X"]);

        let ys = grammar.get_rule("ys").unwrap();
        assert_eq!(ys.alternatives[0].symbols, vec!["Y"]);
        assert_eq!(ys.alternatives[0].action, actions::SINGLE);
    }

    #[test]
    fn test_user_actions_shadow_builtins() {
        let mut grammar = Grammar::new();
        assert!(matches!(
            grammar.find_action(""),
            Some(Action::Builtin(Builtin::Default))
        ));
        assert!(grammar.find_action("sum").is_none());

        grammar.action("", |_values, _scope| Ok(Value::Null));
        assert!(matches!(grammar.find_action(""), Some(Action::User(_))));
    }
}
