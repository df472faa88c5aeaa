//! The escalation state machine coordinating the three layers
//!
//! Layer 1 (rules) can block outright; an accept there is advisory, not
//! absolute. Layer 2 (heuristics) executes verified-safe commands and blocks
//! critical ones nobody vouched for. Everything ambiguous — including the
//! genuine policy conflict where a rule accepted what the heuristics call
//! critical — goes to the judge, which is fail-closed.

pub mod judge;
pub mod scorer;

use log::{error, info, warn};

use crate::output::{SourceLayer, Verdict};
use crate::rules::{match_command, MatchOutcome, Rule, RuleStore};

use self::judge::Judge;

/// Sequences rule matching, risk scoring, and the contextual judge into one
/// terminal verdict per command.
///
/// Holds no mutable state; evaluations are independent and may run in
/// parallel across threads.
pub struct Gateway<S, J> {
    store: S,
    judge: J,
}

impl<S: RuleStore, J: Judge> Gateway<S, J> {
    pub fn new(store: S, judge: J) -> Self {
        Gateway { store, judge }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluate one command to a terminal verdict.
    ///
    /// Never fails: every error path is absorbed into an executed or
    /// blocked verdict with an explanatory reason.
    pub fn evaluate(&self, command_text: &str) -> Verdict {
        // Layer 1: administrator rules.
        let rules = match self.store.active_rules() {
            Ok(rules) => rules,
            Err(e) => {
                // Fail soft: no policy applies, but surface the condition
                // distinctly for monitoring.
                error!("rule store unreachable, evaluating without rules: {e}");
                Vec::new()
            }
        };

        let mut matched_rule = None;
        let mut rule_accepted = false;
        match match_command(command_text, &rules) {
            MatchOutcome::Rejected { rule_id } => {
                info!("layer 1 reject: rule {rule_id}");
                let description = rule_description(&rules, &rule_id);
                return Verdict::blocked(
                    SourceLayer::Rules,
                    0,
                    format!("Explicitly forbidden by policy: {description}"),
                    Some(rule_id),
                );
            }
            MatchOutcome::Accepted { rule_id } => {
                info!("layer 1 accept: rule {rule_id}, continuing to verification");
                matched_rule = Some(rule_id);
                rule_accepted = true;
            }
            MatchOutcome::NoMatch => {
                info!("layer 1: no rule matched");
            }
        }

        // Layer 2: heuristic risk.
        let risk = scorer::score(command_text);
        let score = risk.score;
        info!("layer 2: score {score} ({:?})", risk.decision);

        if score >= 100 {
            if rule_accepted {
                // Rule accepted, heuristics call it critical: neither layer
                // may win locally, the judge breaks the tie.
                warn!(
                    "policy conflict: rule {:?} accepted a command scored {score}, escalating",
                    matched_rule
                );
            } else {
                return Verdict::blocked(
                    SourceLayer::Guard,
                    score,
                    format!("Heuristic risk too high ({score}): {}", risk.summary()),
                    matched_rule,
                );
            }
        } else if score == 0 {
            // Verified safe always executes, whatever layer 1 found.
            return Verdict::executed(SourceLayer::Guard, 0, "Verified safe", matched_rule);
        }

        // Layer 3: contextual judge, fail-closed.
        match self.judge.judge(command_text) {
            Ok(ruling) => {
                info!("layer 3: judge ruled {:?}", ruling.status);
                Verdict {
                    status: ruling.status,
                    source_layer: SourceLayer::Judge,
                    score,
                    reason: format!("Judge verdict: {} (risk score: {score})", ruling.reason),
                    matched_rule,
                }
            }
            Err(e) => {
                error!("judge failure, failing closed: {e}");
                Verdict::blocked(
                    SourceLayer::Judge,
                    score,
                    format!("Judge unavailable, failing closed: {e}"),
                    matched_rule,
                )
            }
        }
    }
}

fn rule_description(rules: &[Rule], rule_id: &str) -> String {
    rules
        .iter()
        .find(|r| r.id == rule_id)
        .map(|r| r.description.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or("no description")
        .to_string()
}
