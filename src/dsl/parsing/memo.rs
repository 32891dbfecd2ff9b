//! Per-call memo table
//!
//! Keyed by (rule index, token position). An entry records the outcome of the one real
//! attempt at that rule and position: the value and end position on success, or a
//! failure. A hit reuses the value without running any action again.

use crate::dsl::value::Value;
use std::collections::HashMap;

/// A successful match: the produced value and the token position just past it
#[derive(Debug, Clone, PartialEq)]
pub struct Matched {
    pub value: Value,
    pub end: usize,
}

impl Matched {
    pub fn new(value: Value, end: usize) -> Self {
        Self { value, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemoEntry {
    Matched(Matched),
    Failed,
}

impl MemoEntry {
    pub fn from_outcome(outcome: &Option<Matched>) -> Self {
        match outcome {
            Some(matched) => MemoEntry::Matched(matched.clone()),
            None => MemoEntry::Failed,
        }
    }

    pub fn into_outcome(self) -> Option<Matched> {
        match self {
            MemoEntry::Matched(matched) => Some(matched),
            MemoEntry::Failed => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoTable {
    entries: HashMap<(usize, usize), MemoEntry>,
    hits: usize,
}

impl MemoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&mut self, rule: usize, pos: usize) -> Option<MemoEntry> {
        let entry = self.entries.get(&(rule, pos)).cloned();
        if entry.is_some() {
            self.hits += 1;
        }
        entry
    }

    pub fn record(&mut self, rule: usize, pos: usize, entry: MemoEntry) {
        self.entries.insert((rule, pos), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}
