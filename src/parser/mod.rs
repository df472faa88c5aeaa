//! Shell command parsing
//!
//! POSIX shell word splitting for command text. The risk scorer is the main
//! consumer; a command that cannot be split must be treated as maximal risk
//! by callers, never as an empty command.

pub mod shell;

pub use shell::{tokenize, SyntaxError};
