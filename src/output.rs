//! Final verdict type and its JSON rendering
//!
//! A [`Verdict`] is the sole externally observable result of one command
//! evaluation. The engine never applies effects itself; persisting the
//! verdict, deducting credits, and logging are the caller's job.

use serde::{Deserialize, Serialize};

/// Terminal disposition of one command evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandStatus {
    Executed,
    Blocked,
}

/// Which layer produced the terminal verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceLayer {
    /// Administrator rules (layer 1).
    Rules,
    /// Heuristic risk scoring (layer 2).
    Guard,
    /// Contextual judge (layer 3).
    Judge,
}

/// The result of evaluating one command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub status: CommandStatus,
    pub source_layer: SourceLayer,

    /// Layer-2 risk score, carried for audit even on judge verdicts.
    pub score: u32,

    pub reason: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
}

impl Verdict {
    pub fn executed(
        source_layer: SourceLayer,
        score: u32,
        reason: impl Into<String>,
        matched_rule: Option<String>,
    ) -> Self {
        Verdict {
            status: CommandStatus::Executed,
            source_layer,
            score,
            reason: reason.into(),
            matched_rule,
        }
    }

    pub fn blocked(
        source_layer: SourceLayer,
        score: u32,
        reason: impl Into<String>,
        matched_rule: Option<String>,
    ) -> Self {
        Verdict {
            status: CommandStatus::Blocked,
            source_layer,
            score,
            reason: reason.into(),
            matched_rule,
        }
    }

    pub fn is_executed(&self) -> bool {
        self.status == CommandStatus::Executed
    }

    pub fn is_blocked(&self) -> bool {
        self.status == CommandStatus::Blocked
    }

    /// Serialize to JSON for the CLI surface.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
