//! Rule overlap detection
//!
//! Two rule patterns conflict when some command matches both: which action
//! wins would then depend on creation order alone, which is how
//! contradictory policies sneak in. Candidate patterns are compiled to
//! automata over their search language and intersected against every
//! existing active pattern; a non-empty intersection is reported together
//! with its shortest witness command.
//!
//! Fail-closed rules: a candidate that cannot be compiled (invalid, or
//! outside the verifiable subset) is reported as a conflict, never admitted
//! unchecked. A *stored* pattern that cannot be compiled is skipped with a
//! warning so one malformed legacy rule cannot freeze rule authoring.

use log::warn;

use crate::automaton;
use crate::rules::Rule;

/// Result of an overlap check.
#[derive(Debug, Clone)]
pub struct ConflictOutcome {
    pub has_conflict: bool,
    pub reason: Option<String>,
}

impl ConflictOutcome {
    fn clear() -> Self {
        ConflictOutcome {
            has_conflict: false,
            reason: None,
        }
    }

    fn conflict(reason: String) -> Self {
        ConflictOutcome {
            has_conflict: true,
            reason: Some(reason),
        }
    }
}

/// Check a candidate pattern against existing active rules.
///
/// Callers gating an edit must exclude the edited rule from `existing`
/// before calling, or the rule will conflict with its own old pattern.
pub fn check_overlap(new_pattern: &str, existing: &[Rule]) -> ConflictOutcome {
    let candidate = match automaton::compile(new_pattern) {
        Ok(dfa) => dfa,
        Err(e) => {
            return ConflictOutcome::conflict(format!(
                "pattern '{new_pattern}' cannot be verified for overlap: {e}"
            ));
        }
    };

    for rule in existing {
        let stored = match automaton::compile(&rule.pattern) {
            Ok(dfa) => dfa,
            Err(e) => {
                warn!(
                    "skipping overlap check against rule {} ('{}'): {e}",
                    rule.id, rule.pattern
                );
                continue;
            }
        };

        let product = match candidate.intersect(&stored) {
            Ok(dfa) => dfa,
            Err(e) => {
                return ConflictOutcome::conflict(format!(
                    "overlap with rule {} cannot be verified: {e}",
                    rule.id
                ));
            }
        };

        if let Some(witness) = product.shortest_witness() {
            return ConflictOutcome::conflict(format!(
                "conflicts with rule {} ('{}'): both patterns match the command '{}'",
                rule.id, rule.pattern, witness
            ));
        }
    }

    ConflictOutcome::clear()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleAction;

    fn rule(id: &str, pattern: &str) -> Rule {
        Rule::new(id, pattern, RuleAction::Accept, "")
    }

    #[test]
    fn test_overlapping_prefixes_conflict() {
        let existing = [rule("rule_1", "^rm -rf /tmp")];
        let outcome = check_overlap("^rm -rf", &existing);
        assert!(outcome.has_conflict);
        let reason = outcome.reason.unwrap();
        assert!(reason.contains("rule_1"));
        assert!(reason.contains("rm -rf /tmp"));
    }

    #[test]
    fn test_disjoint_patterns_pass() {
        let existing = [rule("rule_1", "^pwd")];
        let outcome = check_overlap("^ls", &existing);
        assert!(!outcome.has_conflict);
        assert!(outcome.reason.is_none());
    }

    #[test]
    fn test_unverifiable_candidate_is_conflict() {
        let outcome = check_overlap("(unclosed", &[]);
        assert!(outcome.has_conflict);

        let outcome = check_overlap(r"(a)\1", &[rule("rule_1", "^ls")]);
        assert!(outcome.has_conflict);
        assert!(outcome.reason.unwrap().contains("cannot be verified"));
    }

    #[test]
    fn test_malformed_stored_rule_is_skipped() {
        let existing = [rule("rule_legacy", "(broken"), rule("rule_2", "^pwd")];
        let outcome = check_overlap("^ls", &existing);
        assert!(!outcome.has_conflict);
    }

    #[test]
    fn test_no_existing_rules() {
        let outcome = check_overlap("^anything.*", &[]);
        assert!(!outcome.has_conflict);
    }

    #[test]
    fn test_identical_patterns_conflict() {
        let existing = [rule("rule_1", "^systemctl restart")];
        let outcome = check_overlap("^systemctl restart", &existing);
        assert!(outcome.has_conflict);
    }
}
