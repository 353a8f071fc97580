//! Error types for provisioning runs.
//!
//! Only the two fatal outcomes of a run are errors. Each carries an
//! actionable fix suggestion for the operator.

use crate::FetchError;
use std::path::PathBuf;
use thiserror::Error;

/// A provisioning run that ended early.
///
/// # Example
///
/// ```rust
/// use rustdesk_provision::ProvisionError;
/// use std::path::PathBuf;
///
/// let error = ProvisionError::NotInstalled {
///     searched: vec![PathBuf::from(r"C:\Program Files\RustDesk\rustdesk.exe")],
///     fix: "Install RustDesk manually".to_string(),
/// };
/// assert_eq!(error.to_string(), "RustDesk installation not found");
/// assert_eq!(error.fix_suggestion(), "Install RustDesk manually");
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProvisionError {
    /// The installer could not be downloaded. Nothing was installed.
    #[error("failed to download installer: {source}")]
    FetchFailed {
        /// Underlying download error.
        #[source]
        source: FetchError,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// No RustDesk executable was found after the install attempt.
    #[error("RustDesk installation not found")]
    NotInstalled {
        /// Locations that were checked, in order.
        searched: Vec<PathBuf>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },
}

impl ProvisionError {
    pub(crate) fn fetch_failed(source: FetchError) -> Self {
        let fix = match &source {
            FetchError::Status { .. } => {
                "The download server rejected the request; contact support for an updated installer link"
            }
            FetchError::Write { .. } => {
                "Run the tool from a folder you can write to, with enough free disk space"
            }
            _ => "Check your internet connection and run the tool again",
        };
        Self::FetchFailed {
            source,
            fix: fix.to_string(),
        }
    }

    pub(crate) fn not_installed(searched: Vec<PathBuf>) -> Self {
        Self::NotInstalled {
            searched,
            fix: "Run the tool again as administrator, or install RustDesk manually".to_string(),
        }
    }

    /// Get an actionable suggestion for fixing this error.
    pub fn fix_suggestion(&self) -> &str {
        match self {
            Self::FetchFailed { fix, .. } => fix,
            Self::NotInstalled { fix, .. } => fix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failed_status_fix() {
        let error = ProvisionError::fetch_failed(FetchError::Status {
            url: "https://example.com/client.exe".to_string(),
            status: 404,
        });
        assert!(error.to_string().contains("HTTP 404"));
        assert!(error.fix_suggestion().contains("installer link"));
    }

    #[test]
    fn test_fetch_failed_write_fix() {
        let error = ProvisionError::fetch_failed(FetchError::Write {
            path: PathBuf::from("client.exe"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert!(error.to_string().starts_with("failed to download installer"));
        assert!(error.fix_suggestion().contains("write"));
    }

    #[test]
    fn test_not_installed_keeps_searched_paths() {
        let searched = vec![PathBuf::from("a"), PathBuf::from("b")];
        let error = ProvisionError::not_installed(searched.clone());
        match &error {
            ProvisionError::NotInstalled { searched: got, .. } => assert_eq!(got, &searched),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!error.fix_suggestion().is_empty());
    }
}
