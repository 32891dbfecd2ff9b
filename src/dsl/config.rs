//! Parser configuration
//!
//! Knobs that change how a parse runs without changing the grammar.

/// Default limit on nested rule invocations. Fits a thread with the default 2 MiB stack,
/// unoptimized builds included; raise it only for parses on threads with larger stacks.
pub const DEFAULT_MAX_DEPTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Nested rule invocations allowed before the parse is aborted with a
    /// `RecursionLimit` error. Left-recursive repetition does not nest, right-recursive
    /// rules nest once per element.
    pub max_depth: usize,

    /// When set, an alternative naming an action that is neither registered nor builtin
    /// fails like an action error. When unset, the default action is used instead, which
    /// is what tooling wants for grammars loaded from files (actions are not serializable).
    pub strict_actions: bool,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strict_actions(mut self, strict: bool) -> Self {
        self.strict_actions = strict;
        self
    }

    /// Configuration for tools that parse with grammars loaded from files
    pub fn lenient() -> Self {
        Self::default().with_strict_actions(false)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_actions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.strict_actions);
        assert!(!ParserConfig::lenient().strict_actions);
    }

    #[test]
    fn test_builder_setters() {
        let config = ParserConfig::new()
            .with_max_depth(8)
            .with_strict_actions(false);
        assert_eq!(config.max_depth, 8);
        assert!(!config.strict_actions);
    }
}
