//! Heuristic risk scoring (layer 2)
//!
//! A pure function of the command text: token heuristics accumulate an
//! additive score, and the score band picks the decision. Reasons are kept
//! in evaluation order so audit output reconstructs the arithmetic.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::parser::shell;

/// Risk contribution of known first tokens; unknown binaries score
/// [`DEFAULT_BINARY_RISK`].
static BINARY_RISK: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("rm", 60),
        ("dd", 100),
        ("mkfs", 100),
        ("wget", 40),
        ("curl", 40),
        ("mv", 30),
        ("chmod", 40),
        ("chown", 40),
        ("sudo", 50),
        ("nc", 50),
        ("netcat", 50),
        ("ssh", 30),
        ("scp", 30),
        ("ftp", 30),
        ("python", 50),
        ("python3", 50),
        ("perl", 50),
        ("ruby", 50),
        ("bash", 50),
        ("sh", 50),
        ("zsh", 50),
        ("ls", 0),
        ("pwd", 0),
        ("echo", 0),
        ("cat", 0),
        ("grep", 0),
        ("find", 10),
        ("whoami", 0),
        ("id", 0),
    ])
});

const DEFAULT_BINARY_RISK: u32 = 20;

/// Flags that score; `-R` marks recursion without scoring.
const RISKY_FLAGS: &[&str] = &["-f", "--force", "-r", "--recursive"];

const CRITICAL_TARGETS: &[&str] = &[
    "/", "/etc", "/var", "/boot", "/bin", "/sbin", "/usr/bin", "/usr/sbin",
];

/// Score band outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskDecision {
    /// Score 0: verified safe.
    Allow,
    /// Score 1..=99: ambiguous, needs context.
    Escalate,
    /// Score >= 100: critical.
    Block,
}

/// Scoring result for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskVerdict {
    pub decision: RiskDecision,
    pub score: u32,
    pub reasons: Vec<String>,
}

impl RiskVerdict {
    /// One-line reason text for verdicts and audit entries.
    pub fn summary(&self) -> String {
        if self.reasons.is_empty() {
            "Safe command".to_string()
        } else {
            self.reasons.join("; ")
        }
    }
}

/// Score a command. Deterministic: same text, same score, reasons, and
/// decision.
pub fn score(command_text: &str) -> RiskVerdict {
    let mut score: u32 = 0;
    let mut reasons = Vec::new();

    if shell::has_redirection(command_text) {
        score += 30;
        reasons.push("Piping/redirection detected (+30)".to_string());
    }

    // Tokenization failure is maximal risk, discarding prior accumulation.
    let tokens = match shell::tokenize(command_text) {
        Ok(tokens) => tokens,
        Err(_) => {
            return RiskVerdict {
                decision: RiskDecision::Block,
                score: 100,
                reasons: vec!["Malformed command syntax".to_string()],
            };
        }
    };

    let Some(binary) = tokens.first() else {
        return RiskVerdict {
            decision: RiskDecision::Allow,
            score: 0,
            reasons: vec!["Empty command".to_string()],
        };
    };

    let binary_score = BINARY_RISK
        .get(binary.as_str())
        .copied()
        .unwrap_or(DEFAULT_BINARY_RISK);
    score += binary_score;
    if binary_score > 0 {
        reasons.push(format!("Binary '{binary}' risk (+{binary_score})"));
    }

    let mut has_force = false;
    let mut has_recursive = false;

    for token in &tokens[1..] {
        if RISKY_FLAGS.contains(&token.as_str()) {
            score += 20;
            reasons.push(format!("Risky flag '{token}' (+20)"));
        }
        if token == "-f" || token == "--force" {
            has_force = true;
        }
        if token == "-r" || token == "-R" || token == "--recursive" {
            has_recursive = true;
        }

        // First critical-target match per token only.
        for target in CRITICAL_TARGETS {
            let is_child = token
                .strip_prefix(target)
                .is_some_and(|rest| rest.starts_with('/'));
            if token == target || is_child {
                score += 100;
                reasons.push(format!("Critical target '{token}' (+100)"));
                break;
            }
        }
    }

    if binary == "rm" && has_force && has_recursive {
        score += 50;
        reasons.push("Destructive combination 'rm -rf' (+50)".to_string());
    }

    let decision = if score >= 100 {
        RiskDecision::Block
    } else if score == 0 {
        RiskDecision::Allow
    } else {
        RiskDecision::Escalate
    };

    RiskVerdict {
        decision,
        score,
        reasons,
    }
}
