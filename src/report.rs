//! Operator-facing text.
//!
//! Everything the person sitting at the machine reads: the banner, one
//! line per stage, notes about tolerated failures and the closing block
//! with the connection identifier. Rendering is kept free of I/O so the
//! binary decides where it goes.

use crate::provision::{ProvisionError, ProvisionProgress, ProvisionReport, Step, OPERATOR_STEPS};
use std::fmt::Write;

const RULE: &str = "==========================================";

/// Shown instead of an identifier when none could be read.
pub const CHECK_WINDOW_NOTICE: &str = "(Check the window that just opened to see your ID)";

/// Final prompt before the process exits.
pub const PAUSE_PROMPT: &str = "Press Enter to exit...";

/// Opening banner.
pub fn banner() -> String {
    format!("\n{RULE}\n      🚀 VIRCOM REMOTE SUPPORT\n{RULE}\n")
}

/// Operator line for a progress event, if it warrants one.
///
/// # Example
///
/// ```rust
/// use rustdesk_provision::{report, ProvisionProgress, Stage};
///
/// let line = report::progress_line(&ProvisionProgress::Stage { stage: Stage::Fetching });
/// assert_eq!(line.as_deref(), Some("[1/4] Downloading optimized client..."));
/// ```
pub fn progress_line(progress: &ProvisionProgress) -> Option<String> {
    match progress {
        ProvisionProgress::Started => Some(banner()),
        ProvisionProgress::Stage { stage } => stage
            .announcement()
            .map(|text| format!("[{}/{}] {}", stage.operator_step(), OPERATOR_STEPS, text)),
        ProvisionProgress::Settling { .. } => None,
        ProvisionProgress::Warning(warning) => match warning.step {
            Step::SilentInstall => Some(format!(
                "Note: the silent install reported: {} (this is normal if it was already installed)",
                warning.message
            )),
            Step::SetCredential => Some(format!("Error setting password: {}", warning.message)),
            _ => None,
        },
    }
}

/// Closing block for a finished run.
pub fn render_outcome(outcome: &Result<ProvisionReport, ProvisionError>) -> String {
    match outcome {
        Ok(report) => render_report(report),
        Err(e) => render_error(e),
    }
}

fn render_report(report: &ProvisionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "    ✅ INSTALLATION COMPLETE");
    let _ = writeln!(out, "{RULE}\n");
    match report.connection_id.as_reported() {
        Some(id) => {
            let _ = writeln!(out, "    YOUR CONNECTION ID IS:\n");
            let _ = writeln!(out, "    👉  {id}");
        }
        None => {
            let _ = writeln!(out, "    {CHECK_WINDOW_NOTICE}");
        }
    }
    let _ = writeln!(out, "\n{RULE}");
    out
}

fn render_error(error: &ProvisionError) -> String {
    let headline = match error {
        ProvisionError::FetchFailed { source, .. } => format!("Error downloading: {source}"),
        _ => format!("Error: {error}."),
    };
    format!("{headline}\n{}\n", error.fix_suggestion())
}
