//! Regex compilation to deterministic finite automata
//!
//! Overlap detection needs operations that ordinary regex engines do not
//! expose: language intersection, emptiness testing, and shortest-witness
//! extraction. This module implements the classical pipeline for a pragmatic
//! pattern subset: parse to a syntax tree, build an NFA by Thompson
//! construction, determinize by subset construction, and combine DFAs with
//! the product construction.
//!
//! Patterns are compiled with the same unanchored search semantics the rule
//! matcher uses at runtime: an implicit `.*` surrounds the pattern on each
//! side that lacks the corresponding `^`/`$` anchor. Constructs outside the
//! subset (backreferences, lookaround, mid-pattern anchors) fail with
//! [`PatternError::Unsupported`] so callers can fail closed instead of
//! approximating.

mod class;
mod dfa;
mod nfa;
mod parse;

pub use class::ByteClass;
pub use dfa::Dfa;
pub use nfa::Nfa;
pub use parse::{Pattern, PatternError};

/// Compile a rule pattern into a DFA accepting its search language.
pub fn compile(pattern: &str) -> Result<Dfa, PatternError> {
    let parsed = Pattern::parse(pattern)?;
    let nfa = Nfa::from_pattern(&parsed);
    Dfa::from_nfa(&nfa)
}
