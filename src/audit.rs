//! JSONL audit logging
//!
//! The engine reports verdicts and never persists them; the binary records
//! each terminal verdict here, one JSON object per line, for later
//! analysis.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::output::{CommandStatus, SourceLayer, Verdict};

/// An audit log entry
#[derive(Debug, Serialize)]
pub struct AuditEntry {
    /// Timestamp of the verdict
    pub timestamp: DateTime<Utc>,

    /// Terminal status (EXECUTED or BLOCKED)
    pub status: CommandStatus,

    /// Layer that decided (RULES, GUARD, JUDGE)
    pub source_layer: SourceLayer,

    /// Layer-2 risk score
    pub score: u32,

    /// Rule that matched, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,

    /// The evaluated command, truncated for the log
    pub command: String,

    /// Reason for the verdict
    pub reason: String,
}

impl AuditEntry {
    /// Create an entry from a command and its verdict
    pub fn new(command_text: &str, verdict: &Verdict) -> Self {
        let command = if command_text.len() > 200 {
            let truncated: String = command_text.chars().take(200).collect();
            format!("{truncated}...")
        } else {
            command_text.to_string()
        };

        Self {
            timestamp: Utc::now(),
            status: verdict.status,
            source_layer: verdict.source_layer,
            score: verdict.score,
            matched_rule: verdict.matched_rule.clone(),
            command,
            reason: verdict.reason.clone(),
        }
    }
}

/// Audit logger
pub struct AuditLogger {
    writer: Option<BufWriter<File>>,
}

impl AuditLogger {
    /// Create a new audit logger appending to the given path
    pub fn new(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            OpenOptions::new()
                .create(true)
                .append(true)
                .open(p)
                .ok()
                .map(BufWriter::new)
        });

        Self { writer }
    }

    /// Log an audit entry
    pub fn log(&mut self, entry: &AuditEntry) -> Result<(), std::io::Error> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Log a verdict for a command
    pub fn log_verdict(
        &mut self,
        command_text: &str,
        verdict: &Verdict,
    ) -> Result<(), std::io::Error> {
        let entry = AuditEntry::new(command_text, verdict);
        self.log(&entry)
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }
}

/// Create a disabled logger (for when audit logging is off)
impl Default for AuditLogger {
    fn default() -> Self {
        Self { writer: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_verdict() -> Verdict {
        Verdict::blocked(
            SourceLayer::Guard,
            160,
            "Heuristic risk too high",
            Some("rule_1".to_string()),
        )
    }

    #[test]
    fn test_audit_entry_fields() {
        let entry = AuditEntry::new("rm -rf /etc", &test_verdict());
        assert_eq!(entry.status, CommandStatus::Blocked);
        assert_eq!(entry.score, 160);
        assert_eq!(entry.matched_rule, Some("rule_1".to_string()));
        assert_eq!(entry.command, "rm -rf /etc");
    }

    #[test]
    fn test_long_command_truncated() {
        let long = "x".repeat(500);
        let entry = AuditEntry::new(&long, &test_verdict());
        assert!(entry.command.len() < 250);
        assert!(entry.command.ends_with("..."));
    }

    #[test]
    fn test_audit_logger_write() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path();

        let mut logger = AuditLogger::new(Some(path));
        assert!(logger.is_enabled());

        logger.log_verdict("rm -rf /etc", &test_verdict()).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("BLOCKED"));
        assert!(content.contains("GUARD"));
        assert!(content.contains("rule_1"));
    }

    #[test]
    fn test_audit_logger_disabled() {
        let mut logger = AuditLogger::default();
        assert!(!logger.is_enabled());
        // Should not error even when disabled
        logger.log_verdict("ls", &test_verdict()).unwrap();
    }
}
