//! First-match rule evaluation (layer 1)
//!
//! Patterns are tested with unanchored substring search, the same semantics
//! the conflict detector verifies against. The first matching rule decides
//! the outcome and stops the scan; a reject at position 2 never sees a
//! command already accepted at position 1.

use log::warn;
use regex::Regex;

use super::{Rule, RuleAction};

/// Outcome of scanning the ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Rejected { rule_id: String },
    Accepted { rule_id: String },
    NoMatch,
}

impl MatchOutcome {
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            MatchOutcome::Rejected { rule_id } | MatchOutcome::Accepted { rule_id } => {
                Some(rule_id)
            }
            MatchOutcome::NoMatch => None,
        }
    }
}

/// Evaluate a command against rules in the order given (creation time
/// ascending, as supplied by the store).
///
/// A stored pattern that no longer compiles is skipped with a warning; it
/// neither matches nor aborts the scan.
pub fn match_command(command_text: &str, rules: &[Rule]) -> MatchOutcome {
    for rule in rules {
        let regex = match Regex::new(&rule.pattern) {
            Ok(regex) => regex,
            Err(e) => {
                warn!("rule {} has an uncompilable pattern, skipping: {e}", rule.id);
                continue;
            }
        };
        if regex.is_match(command_text) {
            let rule_id = rule.id.clone();
            return match rule.action {
                RuleAction::Reject => MatchOutcome::Rejected { rule_id },
                RuleAction::Accept => MatchOutcome::Accepted { rule_id },
            };
        }
    }
    MatchOutcome::NoMatch
}
