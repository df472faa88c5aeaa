//! Contextual judge contract (layer 3)
//!
//! The judge is an external collaborator (typically an LLM service) and is
//! modeled as an injected trait so tests substitute a deterministic stub.
//! Every failure mode — missing credential, transport error, timeout,
//! malformed reply — surfaces as [`JudgeError`], and the orchestrator
//! interprets any error as a block. The judge is never fail-open.

use serde::Deserialize;
use thiserror::Error;

use crate::output::CommandStatus;

#[derive(Debug, Clone, Error)]
pub enum JudgeError {
    /// No backend configured or credential missing.
    #[error("judge unavailable: {0}")]
    Unavailable(String),

    /// Network failure or bounded timeout expiry.
    #[error("judge transport failure: {0}")]
    Transport(String),

    /// The reply could not be interpreted as a ruling.
    #[error("judge returned a malformed reply: {0}")]
    MalformedReply(String),
}

/// The judge's ruling on one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeVerdict {
    pub status: CommandStatus,
    pub reason: String,
}

/// External contextual judge.
///
/// Implementations must bound their own timeout and must surface every
/// failure as an error rather than defaulting to a permissive ruling.
pub trait Judge {
    fn judge(&self, command_text: &str) -> Result<JudgeVerdict, JudgeError>;
}

/// Placeholder for deployments without a judge backend. Always fails, so
/// every escalated command is blocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableJudge;

impl Judge for UnavailableJudge {
    fn judge(&self, _command_text: &str) -> Result<JudgeVerdict, JudgeError> {
        Err(JudgeError::Unavailable(
            "no judge backend configured".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct RawReply {
    status: String,
    reason: String,
}

/// Interpret a raw judge reply.
///
/// LLM backends tend to wrap JSON in Markdown code fences; those are
/// stripped before parsing. Anything but a well-formed
/// `{"status": "EXECUTED"|"BLOCKED", "reason": ...}` object is malformed.
pub fn parse_reply(raw: &str) -> Result<JudgeVerdict, JudgeError> {
    let mut text = raw.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        text = stripped;
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped;
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }

    let reply: RawReply = serde_json::from_str(text.trim())
        .map_err(|e| JudgeError::MalformedReply(e.to_string()))?;

    let status = match reply.status.as_str() {
        "EXECUTED" => CommandStatus::Executed,
        "BLOCKED" => CommandStatus::Blocked,
        other => {
            return Err(JudgeError::MalformedReply(format!(
                "unknown status '{other}'"
            )));
        }
    };

    Ok(JudgeVerdict {
        status,
        reason: reply.reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let verdict =
            parse_reply(r#"{"status": "EXECUTED", "reason": "routine listing"}"#).unwrap();
        assert_eq!(verdict.status, CommandStatus::Executed);
        assert_eq!(verdict.reason, "routine listing");
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"status\": \"BLOCKED\", \"reason\": \"suspicious URL\"}\n```";
        let verdict = parse_reply(raw).unwrap();
        assert_eq!(verdict.status, CommandStatus::Blocked);
    }

    #[test]
    fn test_parse_bare_fence() {
        let raw = "```\n{\"status\": \"EXECUTED\", \"reason\": \"ok\"}\n```";
        assert!(parse_reply(raw).is_ok());
    }

    #[test]
    fn test_unknown_status_is_malformed() {
        let err = parse_reply(r#"{"status": "MAYBE", "reason": "shrug"}"#).unwrap_err();
        assert!(matches!(err, JudgeError::MalformedReply(_)));
    }

    #[test]
    fn test_non_json_is_malformed() {
        assert!(matches!(
            parse_reply("I think this command is fine."),
            Err(JudgeError::MalformedReply(_))
        ));
    }

    #[test]
    fn test_unavailable_judge_always_fails() {
        assert!(matches!(
            UnavailableJudge.judge("ls"),
            Err(JudgeError::Unavailable(_))
        ));
    }
}
