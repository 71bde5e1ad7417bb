// ============================================================================
// levelcast-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the level-to-animation pipeline
//
// Every failure in the pipeline is unrecoverable for the run that triggered it,
// so a single error enum is threaded through all modules. Parse failures carry
// the line number, external engine failures carry the captured diagnostics.
//
// AI-ASSISTANT-INFO: Central error type and constructors for levelcast-core

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Custom error types for levelcast
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Malformed levels log at line {line}: {message}")]
    MalformedLog { line: usize, message: String },

    #[error("Measurement category '{0}' has no samples")]
    EmptyCategory(String),

    #[error(
        "Category '{category}' is not aligned with reference category '{reference}': {detail}"
    )]
    UnalignedCategories {
        reference: String,
        category: String,
        detail: String,
    },

    #[error("Category '{category}' has a degenerate range (min == max == {value})")]
    DegenerateRange { category: String, value: f64 },

    #[error("Measurement category '{0}' not found")]
    MissingCategory(String),

    #[error("External engine '{command}' failed ({status}): {diagnostics}")]
    ExternalEngine {
        command: String,
        status: String,
        diagnostics: String,
    },

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed to wait for '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Dependency '{0}' not found on PATH")]
    DependencyNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for levelcast operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CommandStart` error for a command that could not be spawned.
pub fn command_start_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), err)
}

/// Builds a `CommandWait` error for a command whose exit status could not be read.
pub fn command_wait_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), err)
}

/// Builds an `ExternalEngine` error for a command that exited unsuccessfully.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    diagnostics: impl Into<String>,
) -> CoreError {
    CoreError::ExternalEngine {
        command: command.into(),
        status: status.to_string(),
        diagnostics: diagnostics.into(),
    }
}

/// Builds an `ExternalEngine` error for a command that exited cleanly but left
/// nothing usable behind.
pub fn engine_output_missing_error(
    command: impl Into<String>,
    diagnostics: impl Into<String>,
) -> CoreError {
    CoreError::ExternalEngine {
        command: command.into(),
        status: "no usable output".to_string(),
        diagnostics: diagnostics.into(),
    }
}

/// Builds a `MalformedLog` error at a 1-based line number.
pub(crate) fn malformed(line: usize, message: impl Into<String>) -> CoreError {
    CoreError::MalformedLog {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_log_message_includes_line() {
        let err = malformed(7, "bad value 'abc'");
        assert_eq!(
            err.to_string(),
            "Malformed levels log at line 7: bad value 'abc'"
        );
    }

    #[test]
    fn test_engine_output_missing_status() {
        let err = engine_output_missing_error("ffmpeg (measure)", "levels log is empty");
        match err {
            CoreError::ExternalEngine { status, .. } => assert_eq!(status, "no usable output"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
