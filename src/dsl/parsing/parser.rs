//! Recursive-descent matcher with memoization
//!
//!     The parser walks the token array top-down from the start rule. Positions are token
//!     indices passed by value, so "restoring the cursor" after a failed alternative is
//!     simply not using the position it reached.
//!
//!     For a rule at a position:
//!     1. a memo hit returns the recorded outcome (no action runs again)
//!     2. a call that re-enters an active (rule, position) frame returns that frame's
//!        in-progress seed, or fails if it has none, instead of recursing forever
//!     3. left-recursive rules go through the seed-growing resolver
//!        (see [left_recursion](super::left_recursion)); other rules try their alternatives
//!        in registration order
//!     4. the outcome is memoized, unless it was computed against an unfinished seed
//!
//!     An alternative succeeds when every symbol matches in sequence and its action
//!     accepts the collected values. Token symbols compare the token name of the current
//!     token; rule symbols recurse. An action error fails the alternative just like a
//!     mismatch.

use super::failure::{ActionFailure, FailureTracker};
use super::memo::{Matched, MemoEntry, MemoTable};
use crate::dsl::actions::{Action, ActionScope, Builtin, Context, Functions};
use crate::dsl::config::ParserConfig;
use crate::dsl::diagnostics::{ParseError, ParseErrorKind};
use crate::dsl::grammar::{Alternative, Grammar, Symbol};
use crate::dsl::lexing::TokenMatch;
use crate::dsl::value::Value;
use std::collections::HashSet;

/// Outcome of a matching step: `Ok(None)` is an ordinary, recoverable mismatch;
/// `Err` aborts the whole parse.
///
/// The error is boxed to keep every matching frame small: each nesting level of the
/// grammar costs several native stack frames, all holding a `Step`.
pub(super) type Step<T> = Result<Option<T>, Box<ParseError>>;

/// An active rule invocation
#[derive(Debug)]
pub(super) struct Frame {
    pub rule: usize,
    pub pos: usize,
    /// The best match so far while the rule's left recursion is being grown
    pub seed: Option<Matched>,
    /// Set when something inside this frame consumed an unfinished seed of an outer frame
    pub dependent: bool,
}

pub(crate) struct Parser<'a> {
    pub(super) grammar: &'a Grammar,
    pub(super) input: &'a str,
    pub(super) tokens: &'a [TokenMatch],
    config: &'a ParserConfig,
    context: &'a mut Context,
    functions: &'a Functions,
    memo: MemoTable,
    pub(super) stack: Vec<Frame>,
    failures: FailureTracker,
    warned_actions: HashSet<String>,
}

impl<'a> Parser<'a> {
    pub fn new(
        grammar: &'a Grammar,
        input: &'a str,
        tokens: &'a [TokenMatch],
        config: &'a ParserConfig,
        context: &'a mut Context,
        functions: &'a Functions,
    ) -> Self {
        Self {
            grammar,
            input,
            tokens,
            config,
            context,
            functions,
            memo: MemoTable::new(),
            stack: Vec::new(),
            failures: FailureTracker::new(),
            warned_actions: HashSet::new(),
        }
    }

    /// Match the start rule against the whole token array.
    pub fn run(mut self) -> Result<Value, ParseError> {
        let grammar = self.grammar;
        let Some(start) = grammar.start_rule() else {
            return Err(ParseError::new(
                ParseErrorKind::MissingStartRule,
                "grammar has no rules",
                self.input,
                0,
                "",
            ));
        };
        let Some(Symbol::Rule(start_index)) = grammar.resolve(start) else {
            return Err(ParseError::new(
                ParseErrorKind::MissingStartRule,
                format!("start rule '{}' is not defined", start),
                self.input,
                0,
                "",
            ));
        };

        let outcome = self.match_rule(start_index, 0).map_err(|err| *err)?;
        log::debug!(
            "parse of '{}' finished: {} memo entries, {} hits",
            start,
            self.memo.len(),
            self.memo.hits()
        );

        match outcome {
            Some(matched) if matched.end == self.tokens.len() => Ok(matched.value),
            Some(matched) => Err(self.failures.into_trailing_error(
                self.tokens,
                self.input,
                start,
                matched.end,
            )),
            None => Err(self.failures.into_error(self.tokens, self.input, start)),
        }
    }

    pub(super) fn match_rule(&mut self, rule: usize, pos: usize) -> Step<Matched> {
        if let Some(entry) = self.memo.lookup(rule, pos) {
            log::trace!("memo hit: {} at {}", self.grammar.rule_at(rule).name, pos);
            return Ok(entry.into_outcome());
        }

        if let Some(active) = self
            .stack
            .iter()
            .rposition(|frame| frame.rule == rule && frame.pos == pos)
        {
            for frame in &mut self.stack[active + 1..] {
                frame.dependent = true;
            }
            return Ok(self.stack[active].seed.clone());
        }

        if self.stack.len() >= self.config.max_depth {
            return Err(self.recursion_limit(rule, pos));
        }

        let frame = self.stack.len();
        self.stack.push(Frame {
            rule,
            pos,
            seed: None,
            dependent: false,
        });

        let grammar = self.grammar;
        let definition = grammar.rule_at(rule);
        let outcome = if definition.is_left_recursive() {
            self.grow_seed(rule, pos, frame)
        } else {
            let alternatives: Vec<&Alternative> = definition.alternatives.iter().collect();
            self.match_alternatives(rule, pos, &alternatives)
        };

        let finished = self.stack.pop();
        let outcome = outcome?;
        if !finished.is_some_and(|frame| frame.dependent) {
            self.memo.record(rule, pos, MemoEntry::from_outcome(&outcome));
        }
        Ok(outcome)
    }

    /// Try `alternatives` in order at `pos`; the first one that matches and whose action
    /// succeeds wins.
    pub(super) fn match_alternatives(
        &mut self,
        rule: usize,
        pos: usize,
        alternatives: &[&Alternative],
    ) -> Step<Matched> {
        for alternative in alternatives {
            let Some((values, end)) = self.match_sequence(rule, &alternative.symbols, pos)? else {
                continue;
            };
            if let Some(value) = self.invoke(rule, alternative, &values, pos, end) {
                return Ok(Some(Matched::new(value, end)));
            }
        }
        Ok(None)
    }

    /// Match `symbols` one after another starting at `pos`, collecting their values.
    pub(super) fn match_sequence(
        &mut self,
        rule: usize,
        symbols: &[String],
        pos: usize,
    ) -> Step<(Vec<Value>, usize)> {
        let mut values = Vec::with_capacity(symbols.len());
        let mut cursor = pos;

        for symbol in symbols {
            match self.match_symbol(rule, symbol, cursor)? {
                Some(matched) => {
                    values.push(matched.value);
                    cursor = matched.end;
                }
                None => return Ok(None),
            }
        }

        Ok(Some((values, cursor)))
    }

    fn match_symbol(&mut self, rule: usize, symbol: &str, pos: usize) -> Step<Matched> {
        match self.grammar.resolve(symbol) {
            Some(Symbol::Token(_)) => match self.tokens.get(pos) {
                Some(token) if token.kind == symbol => {
                    Ok(Some(Matched::new(Value::Str(token.text.clone()), pos + 1)))
                }
                _ => {
                    let rule_name = &self.grammar.rule_at(rule).name;
                    self.failures.expected(pos, symbol, rule_name);
                    Ok(None)
                }
            },
            Some(Symbol::Rule(index)) => self.match_rule(index, pos),
            None => Err(self.undefined_symbol(rule, symbol, pos)),
        }
    }

    #[cold]
    fn recursion_limit(&self, rule: usize, pos: usize) -> Box<ParseError> {
        let limit = self.config.max_depth;
        Box::new(ParseError::new(
            ParseErrorKind::RecursionLimit { limit },
            format!(
                "rule nesting exceeded {} levels in '{}'",
                limit,
                self.grammar.rule_at(rule).name
            ),
            self.input,
            super::failure::offset(self.tokens, self.input, pos),
            self.token_text(pos),
        ))
    }

    #[cold]
    fn undefined_symbol(&self, rule: usize, symbol: &str, pos: usize) -> Box<ParseError> {
        let rule_name = self.grammar.rule_at(rule).name.clone();
        Box::new(ParseError::new(
            ParseErrorKind::UndefinedSymbol {
                symbol: symbol.to_string(),
                rule: rule_name.clone(),
            },
            format!(
                "rule '{}' references '{}', which is neither a token nor a rule",
                rule_name, symbol
            ),
            self.input,
            super::failure::offset(self.tokens, self.input, pos),
            self.token_text(pos),
        ))
    }

    fn token_text(&self, pos: usize) -> String {
        self.tokens.get(pos).map(|t| t.text.clone()).unwrap_or_default()
    }

    /// Run the action of `alternative` over `values`. A failure is recorded for
    /// diagnostics and reported as `None`.
    pub(super) fn invoke(
        &mut self,
        rule: usize,
        alternative: &Alternative,
        values: &[Value],
        start: usize,
        end: usize,
    ) -> Option<Value> {
        let grammar = self.grammar;
        let rule_name = &grammar.rule_at(rule).name;

        let action = match grammar.find_action(&alternative.action) {
            Some(action) => action,
            None if !self.config.strict_actions => {
                if self.warned_actions.insert(alternative.action.clone()) {
                    log::warn!(
                        "action '{}' of rule '{}' is not registered, using the default action",
                        alternative.action,
                        rule_name
                    );
                }
                Action::Builtin(Builtin::Default)
            }
            None => {
                self.failures.action_failed(ActionFailure {
                    rule: rule_name.clone(),
                    action: alternative.action.clone(),
                    message: "action is not registered".to_string(),
                    start,
                    end,
                });
                return None;
            }
        };

        let mut scope = ActionScope::new(self.context, self.functions);
        match action.invoke(values, &mut scope) {
            Ok(value) => Some(value),
            Err(err) => {
                log::trace!(
                    "action '{}' of rule '{}' rejected tokens {}..{}: {}",
                    alternative.action,
                    rule_name,
                    start,
                    end,
                    err
                );
                self.failures.action_failed(ActionFailure {
                    rule: rule_name.clone(),
                    action: alternative.action.clone(),
                    message: err.message,
                    start,
                    end,
                });
                None
            }
        }
    }
}
