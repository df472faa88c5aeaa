//! Shell tokenization
//!
//! Splits command text into words honoring single/double quotes and escapes,
//! using shlex as the POSIX word-splitting primitive.

use thiserror::Error;

/// Malformed shell syntax: an unterminated quote or a trailing escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed shell syntax (unterminated quote or escape)")]
pub struct SyntaxError;

/// Split a command into shell words.
///
/// `shlex` returns nothing when the input cannot be split; that is surfaced
/// as [`SyntaxError`] so callers cannot confuse it with an empty command.
pub fn tokenize(command: &str) -> Result<Vec<String>, SyntaxError> {
    shlex::split(command).ok_or(SyntaxError)
}

/// True if the raw text contains piping or output redirection characters.
pub fn has_redirection(command: &str) -> bool {
    command.contains('|') || command.contains('>')
}
