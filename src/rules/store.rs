//! Rule storage contract and the built-in gated store
//!
//! The engine only reads rules; creation and editing go through a store
//! implementation that gates admission on overlap checking, so a
//! contradictory rule is refused before it can ever influence matching.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::conflict;

use super::Rule;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be reached; the orchestrator fails soft on this.
    #[error("rule store unreachable: {0}")]
    Unavailable(String),

    #[error("conflicting rule refused: {0}")]
    Conflict(String),

    #[error("invalid rule pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("duplicate rule id '{0}'")]
    DuplicateRule(String),

    #[error("unknown rule id '{0}'")]
    UnknownRule(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed rules file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Supplies active rules ordered by creation time ascending.
pub trait RuleStore {
    fn active_rules(&self) -> Result<Vec<Rule>, StoreError>;
}

/// TOML rules file: a list of `[[rule]]` tables. `created_at` is an
/// RFC 3339 string; omitted timestamps default to load time, and the stable
/// sort keeps file order for ties.
#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rule: Vec<Rule>,
}

/// In-memory rule store with gated admission.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: Vec<Rule>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        MemoryRuleStore { rules: Vec::new() }
    }

    /// Load and admit every rule from a TOML file, in file order. The same
    /// gating applies, so a file containing contradictory rules fails.
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let parsed: RulesFile = toml::from_str(&content)?;
        let mut store = MemoryRuleStore::new();
        for rule in parsed.rule {
            store.insert(rule)?;
        }
        Ok(store)
    }

    /// Admit a new rule. Refused if the id is taken, the pattern does not
    /// compile, or the pattern overlaps an existing active rule.
    pub fn insert(&mut self, rule: Rule) -> Result<(), StoreError> {
        if self.rules.iter().any(|r| r.id == rule.id) {
            return Err(StoreError::DuplicateRule(rule.id));
        }
        self.admit(&rule, None)?;
        self.rules.push(rule);
        Ok(())
    }

    /// Replace an existing rule, excluding it from its own overlap check.
    /// The stored creation time is kept so matching order is stable across
    /// edits.
    pub fn update(&mut self, rule: Rule) -> Result<(), StoreError> {
        let position = self
            .rules
            .iter()
            .position(|r| r.id == rule.id)
            .ok_or_else(|| StoreError::UnknownRule(rule.id.clone()))?;
        self.admit(&rule, Some(&rule.id))?;
        let created_at = self.rules[position].created_at;
        self.rules[position] = Rule { created_at, ..rule };
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let position = self
            .rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::UnknownRule(id.to_string()))?;
        self.rules.remove(position);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn admit(&self, rule: &Rule, exclude_id: Option<&str>) -> Result<(), StoreError> {
        // The runtime matcher must be able to compile it at all.
        Regex::new(&rule.pattern)?;

        let peers: Vec<Rule> = self
            .rules
            .iter()
            .filter(|r| r.active && Some(r.id.as_str()) != exclude_id)
            .cloned()
            .collect();
        let outcome = conflict::check_overlap(&rule.pattern, &peers);
        if outcome.has_conflict {
            return Err(StoreError::Conflict(
                outcome.reason.unwrap_or_else(|| "overlap detected".to_string()),
            ));
        }
        Ok(())
    }
}

impl RuleStore for MemoryRuleStore {
    fn active_rules(&self) -> Result<Vec<Rule>, StoreError> {
        let mut active: Vec<Rule> = self.rules.iter().filter(|r| r.active).cloned().collect();
        // Stable: equal timestamps keep insertion order.
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleAction;
    use std::io::Write;

    fn rule(id: &str, pattern: &str, action: RuleAction) -> Rule {
        Rule::new(id, pattern, action, "test rule")
    }

    #[test]
    fn test_insert_disjoint_rules() {
        let mut store = MemoryRuleStore::new();
        store.insert(rule("rule_ls", "^ls", RuleAction::Accept)).unwrap();
        store.insert(rule("rule_pwd", "^pwd", RuleAction::Accept)).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_conflicting_rule_refused() {
        let mut store = MemoryRuleStore::new();
        store
            .insert(rule("rule_tmp", "^rm -rf /tmp", RuleAction::Accept))
            .unwrap();
        let err = store
            .insert(rule("rule_all", "^rm -rf", RuleAction::Reject))
            .unwrap_err();
        match err {
            StoreError::Conflict(reason) => {
                assert!(reason.contains("rule_tmp"));
                assert!(reason.contains("rm -rf /tmp"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_excludes_self() {
        let mut store = MemoryRuleStore::new();
        store
            .insert(rule("rule_1", "^systemctl", RuleAction::Accept))
            .unwrap();
        // Narrowing the same rule overlaps its old pattern; excluding
        // itself makes the edit legal.
        store
            .update(rule("rule_1", "^systemctl restart", RuleAction::Accept))
            .unwrap();
        let rules = store.active_rules().unwrap();
        assert_eq!(rules[0].pattern, "^systemctl restart");
    }

    #[test]
    fn test_update_unknown_rule() {
        let mut store = MemoryRuleStore::new();
        assert!(matches!(
            store.update(rule("rule_ghost", "^ls", RuleAction::Accept)),
            Err(StoreError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_duplicate_id_refused() {
        let mut store = MemoryRuleStore::new();
        store.insert(rule("rule_1", "^ls", RuleAction::Accept)).unwrap();
        assert!(matches!(
            store.insert(rule("rule_1", "^pwd", RuleAction::Accept)),
            Err(StoreError::DuplicateRule(_))
        ));
    }

    #[test]
    fn test_invalid_pattern_refused() {
        let mut store = MemoryRuleStore::new();
        assert!(matches!(
            store.insert(rule("rule_1", "(unclosed", RuleAction::Accept)),
            Err(StoreError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_inactive_rules_ignored_by_gate_and_listing() {
        let mut store = MemoryRuleStore::new();
        let mut dormant = rule("rule_old", "^rm -rf", RuleAction::Reject);
        dormant.active = false;
        store.insert(dormant).unwrap();
        // Overlaps the inactive rule, which no longer gates.
        store
            .insert(rule("rule_new", "^rm -rf /tmp", RuleAction::Reject))
            .unwrap();

        let active = store.active_rules().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "rule_new");
    }

    #[test]
    fn test_ordering_by_created_at() {
        let mut store = MemoryRuleStore::new();
        let mut newer = rule("rule_newer", "^ls", RuleAction::Accept);
        let mut older = rule("rule_older", "^pwd", RuleAction::Accept);
        newer.created_at = chrono::Utc::now();
        older.created_at = newer.created_at - chrono::Duration::seconds(60);
        store.insert(newer).unwrap();
        store.insert(older).unwrap();

        let active = store.active_rules().unwrap();
        assert_eq!(active[0].id, "rule_older");
        assert_eq!(active[1].id, "rule_newer");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[rule]]
id = "rule_reboot"
pattern = "^sudo reboot"
action = "reject"
description = "Reboots are admin-only"

[[rule]]
id = "rule_git"
pattern = "^git status"
action = "accept"
"#
        )
        .unwrap();

        let store = MemoryRuleStore::from_file(file.path()).unwrap();
        let rules = store.active_rules().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, "rule_reboot");
        assert_eq!(rules[1].id, "rule_git");
    }

    #[test]
    fn test_from_file_rejects_conflicts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[rule]]
id = "rule_a"
pattern = "^rm -rf /tmp"
action = "accept"

[[rule]]
id = "rule_b"
pattern = "^rm -rf"
action = "reject"
"#
        )
        .unwrap();

        assert!(matches!(
            MemoryRuleStore::from_file(file.path()),
            Err(StoreError::Conflict(_))
        ));
    }
}
