//! Rules and their alternatives
//!
//! Symbols are plain names. Whether a symbol is a token or a rule is decided when the
//! parser reaches it, so rules can be declared in any order and reference each other
//! freely; the grammar never holds references between rules.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Associativity {
    Left,
    Right,
    #[default]
    None,
}

/// One candidate symbol sequence of a rule.
///
/// `precedence` and `associativity` are stored for tooling and grammar files; the parser
/// does not use them. Operator precedence comes from splitting levels into separate rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub symbols: Vec<String>,
    pub action: String,
    pub precedence: i32,
    pub associativity: Associativity,
}

impl Alternative {
    pub fn new(symbols: &[&str], action: &str) -> Self {
        Self {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            action: action.to_string(),
            precedence: 0,
            associativity: Associativity::None,
        }
    }

    pub fn with_precedence(mut self, precedence: i32, associativity: Associativity) -> Self {
        self.precedence = precedence;
        self.associativity = associativity;
        self
    }

    /// Whether the first symbol is `rule` itself
    pub fn is_left_recursive(&self, rule: &str) -> bool {
        self.symbols.first().is_some_and(|first| first == rule)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub alternatives: Vec<Alternative>,
}

impl Rule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alternatives: Vec::new(),
        }
    }

    pub fn is_left_recursive(&self) -> bool {
        self.alternatives
            .iter()
            .any(|alt| alt.is_left_recursive(&self.name))
    }

    /// Split alternatives into (seed, recursive), each keeping registration order.
    pub fn partition_left_recursive(&self) -> (Vec<&Alternative>, Vec<&Alternative>) {
        self.alternatives
            .iter()
            .partition(|alt| !alt.is_left_recursive(&self.name))
    }
}
