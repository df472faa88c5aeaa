//! shellgate - layered authorization gateway for shell commands
//!
//! This library decides whether a submitted shell command may execute,
//! walking three layers: administrator regex rules, a heuristic risk
//! scorer, and an external contextual judge used only to break ties.
//!
//! # Features
//!
//! - **Ordered rule matching**: first-match-wins regex rules with
//!   accept/reject actions
//! - **Heuristic risk scoring**: binary, flag, and target heuristics with
//!   an auditable additive score
//! - **Escalation**: ambiguous or contradictory signals defer to an
//!   injected judge, which is fail-closed on any error
//! - **Conflict detection**: candidate rules are compiled to finite
//!   automata and intersected against existing rules, so contradictory
//!   policies are refused at authoring time with a witness command
//! - **Audit logging**: JSONL log of every verdict for the CLI surface
//!
//! # Example
//!
//! ```
//! use shellgate::{Gateway, MemoryRuleStore, UnavailableJudge};
//!
//! let store = MemoryRuleStore::new();
//! let gateway = Gateway::new(store, UnavailableJudge);
//!
//! let verdict = gateway.evaluate("ls -la");
//! assert!(verdict.is_executed());
//! ```

pub mod audit;
pub mod automaton;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod input;
pub mod output;
pub mod parser;
pub mod rules;

// Re-exports for convenience
pub use config::Config;
pub use conflict::{check_overlap, ConflictOutcome};
pub use engine::judge::{Judge, JudgeError, JudgeVerdict, UnavailableJudge};
pub use engine::scorer::{RiskDecision, RiskVerdict};
pub use engine::Gateway;
pub use input::CommandRequest;
pub use output::{CommandStatus, SourceLayer, Verdict};
pub use rules::{MatchOutcome, MemoryRuleStore, Rule, RuleAction, RuleStore, StoreError};
