//! Administrator rules: the first authorization layer
//!
//! Rules pair a regex pattern with an accept/reject action. Matching order
//! is creation time ascending and is load-bearing: the first matching rule
//! decides, so reordering changes which rule wins on ambiguous commands.

pub mod matcher;
pub mod store;

pub use matcher::{match_command, MatchOutcome};
pub use store::{MemoryRuleStore, RuleStore, StoreError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a matching rule does with the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    /// Let the command proceed to heuristic verification.
    Accept,
    /// Block the command outright.
    Reject,
}

/// An administrator-authored authorization rule.
///
/// Immutable within one evaluation; create/edit/delete go through a rule
/// store, gated by overlap checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,

    /// Regex source, matched as an unanchored substring search.
    pub pattern: String,

    pub action: RuleAction,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Drives matching order; ties keep insertion order.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        pattern: impl Into<String>,
        action: RuleAction,
        description: impl Into<String>,
    ) -> Self {
        Rule {
            id: id.into(),
            pattern: pattern.into(),
            action,
            description: description.into(),
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        assert_eq!(serde_json::to_string(&RuleAction::Accept).unwrap(), r#""accept""#);
        assert_eq!(serde_json::to_string(&RuleAction::Reject).unwrap(), r#""reject""#);
    }

    #[test]
    fn test_rule_defaults() {
        let json = r#"{"id":"rule_1","pattern":"^ls","action":"accept"}"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert!(rule.active);
        assert!(rule.description.is_empty());
    }
}
