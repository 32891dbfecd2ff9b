//! Fluent assertions for parse results and errors
//!
//! ```rust,ignore
//! assert_value(&result.value)
//!     .list_len(3)
//!     .item(0, |item| {
//!         item.str("a");
//!     });
//!
//! assert_parse_error(&err).at(2, 1).message_contains("expected token");
//! ```

use crate::dsl::diagnostics::{ParseError, ParseErrorKind};
use crate::dsl::value::Value;

// ============================================================================
// Entry Points
// ============================================================================

/// Create an assertion builder for a value
pub fn assert_value(value: &Value) -> ValueAssertion<'_> {
    ValueAssertion {
        value,
        context: "value".to_string(),
    }
}

/// Create an assertion builder for a parse error
pub fn assert_parse_error(err: &ParseError) -> ParseErrorAssertion<'_> {
    ParseErrorAssertion { err }
}

// ============================================================================
// Value Assertions
// ============================================================================

pub struct ValueAssertion<'a> {
    value: &'a Value,
    /// Path from the root value, for failure messages
    context: String,
}

impl<'a> ValueAssertion<'a> {
    pub fn equals(self, expected: &Value) -> Self {
        assert_eq!(
            self.value, expected,
            "{}: expected {}, found {}",
            self.context, expected, self.value
        );
        self
    }

    pub fn null(self) -> Self {
        assert!(
            self.value.is_null(),
            "{}: expected null, found {} ({})",
            self.context,
            self.value,
            self.value.type_name()
        );
        self
    }

    pub fn int(self, expected: i64) -> Self {
        assert_eq!(
            self.value.as_int(),
            Some(expected),
            "{}: expected int {}, found {} ({})",
            self.context,
            expected,
            self.value,
            self.value.type_name()
        );
        self
    }

    pub fn float(self, expected: f64) -> Self {
        let actual = self.value.as_float();
        assert!(
            actual.is_some_and(|actual| (actual - expected).abs() < 1e-9),
            "{}: expected float {}, found {} ({})",
            self.context,
            expected,
            self.value,
            self.value.type_name()
        );
        self
    }

    pub fn str(self, expected: &str) -> Self {
        assert_eq!(
            self.value.as_str(),
            Some(expected),
            "{}: expected string {:?}, found {} ({})",
            self.context,
            expected,
            self.value,
            self.value.type_name()
        );
        self
    }

    pub fn bool(self, expected: bool) -> Self {
        assert_eq!(
            self.value.as_bool(),
            Some(expected),
            "{}: expected {}, found {}",
            self.context,
            expected,
            self.value
        );
        self
    }

    /// Assert the value is a list of `expected` items
    pub fn list_len(self, expected: usize) -> Self {
        let items = self.list();
        assert_eq!(
            items.len(),
            expected,
            "{}: expected {} items, found {}: {}",
            self.context,
            expected,
            items.len(),
            self.value
        );
        self
    }

    /// Assert on a list item by index
    pub fn item<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ValueAssertion<'a>),
    {
        let items = self.list();
        assert!(
            index < items.len(),
            "{}: item index {} out of bounds (list has {} items)",
            self.context,
            index,
            items.len()
        );
        assertion(ValueAssertion {
            value: &items[index],
            context: format!("{}[{}]", self.context, index),
        });
        self
    }

    /// Assert on a map entry by key
    pub fn key<F>(self, key: &str, assertion: F) -> Self
    where
        F: FnOnce(ValueAssertion<'a>),
    {
        let map = self.value.as_map().unwrap_or_else(|| {
            panic!(
                "{}: expected a map, found {} ({})",
                self.context,
                self.value,
                self.value.type_name()
            )
        });
        let entry = map
            .get(key)
            .unwrap_or_else(|| panic!("{}: no key {:?} in {}", self.context, key, self.value));
        assertion(ValueAssertion {
            value: entry,
            context: format!("{}.{}", self.context, key),
        });
        self
    }

    fn list(&self) -> &'a [Value] {
        self.value.as_list().unwrap_or_else(|| {
            panic!(
                "{}: expected a list, found {} ({})",
                self.context,
                self.value,
                self.value.type_name()
            )
        })
    }
}

// ============================================================================
// ParseError Assertions
// ============================================================================

pub struct ParseErrorAssertion<'a> {
    err: &'a ParseError,
}

impl<'a> ParseErrorAssertion<'a> {
    /// Assert the 1-based line and column
    pub fn at(self, line: usize, column: usize) -> Self {
        assert_eq!(
            (self.err.line, self.err.column),
            (line, column),
            "Expected error at {}:{}, found {}:{} ({})",
            line,
            column,
            self.err.line,
            self.err.column,
            self.err.message
        );
        self
    }

    pub fn position(self, expected: usize) -> Self {
        assert_eq!(
            self.err.position, expected,
            "Expected error at offset {}, found {} ({})",
            expected, self.err.position, self.err.message
        );
        self
    }

    pub fn kind(self, expected: ParseErrorKind) -> Self {
        assert_eq!(self.err.kind, expected, "Unexpected error kind: {}", self.err);
        self
    }

    pub fn token(self, expected: &str) -> Self {
        assert_eq!(
            self.err.token, expected,
            "Expected offending token {:?}, found {:?}",
            expected, self.err.token
        );
        self
    }

    pub fn message_contains(self, substring: &str) -> Self {
        assert!(
            self.err.message.contains(substring),
            "Expected error message to contain {:?}, found {:?}",
            substring,
            self.err.message
        );
        self
    }

    /// Assert the detailed rendering contains `substring`
    pub fn detailed_contains(self, substring: &str) -> Self {
        let detailed = self.err.detailed();
        assert!(
            detailed.contains(substring),
            "Expected detailed error to contain {:?}, found:\n{}",
            substring,
            detailed
        );
        self
    }
}
