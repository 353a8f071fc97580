//! Error types for external process execution.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by a [`ProcessRunner`](crate::ProcessRunner).
///
/// # Example
///
/// ```rust
/// use rustdesk_provision::ProcessError;
///
/// let error = ProcessError::Exit {
///     program: "rustdesk.exe".to_string(),
///     code: Some(1),
///     stdout: String::new(),
///     stderr: "already installed".to_string(),
/// };
/// assert_eq!(error.to_string(), "rustdesk.exe exited with code 1: already installed");
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProcessError {
    /// The program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("{program} exited with {}", describe_exit(.code, .stderr))]
    Exit {
        /// Program that failed.
        program: String,
        /// Exit code, `None` if terminated by a signal.
        code: Option<i32>,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The program did not finish within the configured limit and was killed.
    #[error("{program} timed out after {duration:?}")]
    Timeout {
        /// Program that timed out.
        program: String,
        /// Limit that was exceeded.
        duration: Duration,
    },
}

impl ProcessError {
    /// Everything the program printed, stdout followed by stderr.
    ///
    /// Empty for errors where the program never produced output.
    pub fn output_text(&self) -> String {
        match self {
            Self::Exit { stdout, stderr, .. } => format!("{stdout}\n{stderr}"),
            _ => String::new(),
        }
    }
}

fn describe_exit(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("code {code}"),
        None => "no exit code".to_string(),
    };
    let stderr = stderr.trim();
    if stderr.is_empty() {
        status
    } else {
        format!("{status}: {stderr}")
    }
}
