//! # dslkit
//!
//! A run-time grammar engine: register regex tokens and named rules with actions, then
//! parse text into values. Left-recursive rules are supported directly, results are
//! memoized per rule and position, and failures carry line/column diagnostics.
//!
//! ## Testing
//!
//! Fluent assertions for parse results and errors live in the
//! [testing module](dsl::testing).

pub mod dsl;
