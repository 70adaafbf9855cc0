use colored::Colorize;
use thiserror::Error;

/// A BASIC program error: a line number plus a human-readable message.
///
/// Unlike the assembler's `ParseError` this is never fatal to the host
/// process -- a bad line in a user's BASIC program gets reported and the
/// interpreter moves on to the next line, the way the original line-number
/// editor would.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct BasicError {
    pub line: i64,
    pub message: String,
}

impl BasicError {
    pub fn new(line: i64, message: impl Into<String>) -> BasicError {
        BasicError {
            line,
            message: message.into(),
        }
    }

    /// Prints the error with its offending source line underneath,
    /// matching the assembler's row-highlighted rendering but reporting
    /// instead of panicking.
    pub fn report(&self, source_text: &str) {
        eprintln!(
            "{} {}",
            format!("line {}:", self.line).cyan().bold(),
            source_text.bright_white()
        );
        eprintln!("  {}", format!("^ {}", self.message).bright_red());
    }
}
