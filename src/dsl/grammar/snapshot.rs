//! Read-only view of a grammar for tooling
//!
//! The snapshot lists everything registered (tokens, rules with their alternatives, action
//! names) in registration order. It serializes to JSON/YAML and has a compact text form:
//!
//! ```text
//! start: list
//! tokens:
//!   COMMA        ","          pattern  0
//!   ITEM         "[a-z]+"     pattern  0
//! rules:
//!   list (left-recursive)
//!     | list COMMA item   -> $append
//!     | item              -> $single
//! ```

use super::rule::Associativity;
use super::token::TokenKind;
use super::Grammar;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrammarSnapshot {
    pub start: Option<String>,
    pub tokens: Vec<TokenInfo>,
    pub rules: Vec<RuleInfo>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenInfo {
    pub name: String,
    pub pattern: String,
    pub kind: TokenKind,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookahead: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookbehind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleInfo {
    pub name: String,
    pub left_recursive: bool,
    pub alternatives: Vec<AlternativeInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeInfo {
    pub symbols: Vec<String>,
    pub action: String,
    pub precedence: i32,
    pub associativity: Associativity,
}

impl GrammarSnapshot {
    pub fn of(grammar: &Grammar) -> Self {
        let tokens = grammar
            .tokens()
            .iter()
            .map(|token| TokenInfo {
                name: token.name.clone(),
                pattern: token.pattern.clone(),
                kind: token.kind,
                priority: token.priority,
                lookahead: token.lookahead.clone(),
                lookbehind: token.lookbehind.clone(),
            })
            .collect();

        let rules = grammar
            .rules()
            .iter()
            .map(|rule| RuleInfo {
                name: rule.name.clone(),
                left_recursive: rule.is_left_recursive(),
                alternatives: rule
                    .alternatives
                    .iter()
                    .map(|alt| AlternativeInfo {
                        symbols: alt.symbols.clone(),
                        action: alt.action.clone(),
                        precedence: alt.precedence,
                        associativity: alt.associativity,
                    })
                    .collect(),
            })
            .collect();

        Self {
            start: grammar.start_rule().map(str::to_string),
            tokens,
            rules,
            actions: grammar
                .action_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl fmt::Display for GrammarSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start.as_deref().unwrap_or("-"))?;

        writeln!(f, "tokens:")?;
        for token in &self.tokens {
            let kind = match token.kind {
                TokenKind::Pattern => "pattern",
                TokenKind::Keyword => "keyword",
                TokenKind::Lookaround => "lookaround",
            };
            write!(
                f,
                "  {:<12} {:<12} {:<10} {}",
                token.name,
                format!("{:?}", token.pattern),
                kind,
                token.priority
            )?;
            if let Some(ahead) = &token.lookahead {
                write!(f, "  (?={})", ahead)?;
            }
            if let Some(behind) = &token.lookbehind {
                write!(f, "  (?<={})", behind)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "rules:")?;
        for rule in &self.rules {
            if rule.left_recursive {
                writeln!(f, "  {} (left-recursive)", rule.name)?;
            } else {
                writeln!(f, "  {}", rule.name)?;
            }
            for alt in &rule.alternatives {
                let symbols = if alt.symbols.is_empty() {
                    "(empty)".to_string()
                } else {
                    alt.symbols.join(" ")
                };
                let action = if alt.action.is_empty() {
                    "(default)"
                } else {
                    alt.action.as_str()
                };
                writeln!(f, "    | {:<18} -> {}", symbols, action)?;
            }
        }

        if !self.actions.is_empty() {
            writeln!(f, "actions: {}", self.actions.join(", "))?;
        }
        Ok(())
    }
}
