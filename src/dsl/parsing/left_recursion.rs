//! Seed-growing resolution of direct left recursion
//!
//! A rule such as `list -> list COMMA ITEM | ITEM` cannot be matched top-down as written:
//! matching `list` starts by matching `list` at the same position. Instead:
//!
//! 1. the non-recursive alternatives are tried first; the first success is the seed
//! 2. every recursive alternative then matches its tail (all symbols after the leading
//!    self reference) from the end of the seed, with the seed value standing in for the
//!    leading symbol. The longest successful growth of the round becomes the new seed
//! 3. rounds repeat until none grows the seed any further
//!
//! While this runs, the seed sits in the rule's stack frame, so a nested call that
//! reaches the same rule at the same position gets the seed instead of recursing.
//! Each round has to end strictly further than the previous seed, which bounds the
//! number of rounds by the number of tokens.

use super::memo::Matched;
use super::parser::{Parser, Step};
use crate::dsl::grammar::Alternative;
use crate::dsl::value::Value;

impl<'a> Parser<'a> {
    /// Resolve left-recursive `rule` at `pos`; its frame is `self.stack[frame]`.
    pub(super) fn grow_seed(&mut self, rule: usize, pos: usize, frame: usize) -> Step<Matched> {
        let grammar = self.grammar;
        let definition = grammar.rule_at(rule);
        let (seeds, recursive) = definition.partition_left_recursive();

        let Some(seed) = self.match_alternatives(rule, pos, &seeds)? else {
            return Ok(None);
        };
        let mut seed_end = seed.end;
        self.stack[frame].seed = Some(seed);

        let mut rounds = 0usize;
        loop {
            let mut best_end = seed_end;
            let mut best: Option<Value> = None;

            for alternative in &recursive {
                let tail = &alternative.symbols[1..];
                let Some((values, end)) = self.match_sequence(rule, tail, seed_end)? else {
                    continue;
                };
                if end <= best_end {
                    continue;
                }
                let grown = self.apply_to_seed(rule, alternative, values, pos, end, frame);
                if let Some(value) = grown {
                    best = Some(value);
                    best_end = end;
                }
            }

            let Some(value) = best else {
                break;
            };
            rounds += 1;
            seed_end = best_end;
            self.stack[frame].seed = Some(Matched::new(value, best_end));
        }

        log::trace!(
            "grew '{}' at {} over {} rounds, ending at {}",
            definition.name,
            pos,
            rounds,
            seed_end
        );
        Ok(self.stack[frame].seed.take())
    }

    /// Invoke the action of a recursive alternative with the current seed value followed
    /// by the tail `values`. The seed is lent to the action and put back afterwards.
    fn apply_to_seed(
        &mut self,
        rule: usize,
        alternative: &Alternative,
        values: Vec<Value>,
        start: usize,
        end: usize,
        frame: usize,
    ) -> Option<Value> {
        let seed = self.stack[frame].seed.take()?;
        let seed_end = seed.end;

        let mut args = Vec::with_capacity(values.len() + 1);
        args.push(seed.value);
        args.extend(values);

        let outcome = self.invoke(rule, alternative, &args, start, end);
        let seed_value = args.swap_remove(0);
        self.stack[frame].seed = Some(Matched::new(seed_value, seed_end));
        outcome
    }
}
