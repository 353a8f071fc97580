//! Progress reporting types for a provisioning run.

use crate::provision::{Stage, Step};
use std::time::Duration;

/// A best-effort step that failed without ending the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepWarning {
    /// The step that failed.
    pub step: Step,
    /// What went wrong.
    pub message: String,
}

/// Progress events emitted by [`Provisioner::run`](crate::Provisioner::run).
///
/// # Example
///
/// ```rust
/// use rustdesk_provision::{ProvisionProgress, Stage};
///
/// fn on_progress(progress: ProvisionProgress) {
///     match &progress {
///         ProvisionProgress::Started => println!("starting"),
///         ProvisionProgress::Stage { stage } => {
///             if let Some(line) = stage.announcement() {
///                 println!("{line}");
///             }
///         }
///         ProvisionProgress::Settling { delay, .. } => println!("waiting {delay:?}"),
///         ProvisionProgress::Warning(warning) => println!("{}", warning.message),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub enum ProvisionProgress {
    /// Console is ready, the workflow is about to begin.
    Started,

    /// A stage began.
    Stage {
        /// The stage that began.
        stage: Stage,
    },

    /// Waiting for the installer or service to settle.
    Settling {
        /// Stage whose side effects are settling.
        stage: Stage,
        /// How long the wait lasts.
        delay: Duration,
    },

    /// A best-effort step failed; the run continues.
    Warning(StepWarning),
}

impl ProvisionProgress {
    /// Stage this event belongs to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Started => None,
            Self::Stage { stage } | Self::Settling { stage, .. } => Some(*stage),
            Self::Warning(warning) => warning.step.stage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_stage() {
        assert_eq!(ProvisionProgress::Started.stage(), None);
        assert_eq!(
            ProvisionProgress::Stage {
                stage: Stage::Locating
            }
            .stage(),
            Some(Stage::Locating)
        );
        assert_eq!(
            ProvisionProgress::Settling {
                stage: Stage::Installing,
                delay: Duration::from_secs(5)
            }
            .stage(),
            Some(Stage::Installing)
        );
        assert_eq!(
            ProvisionProgress::Warning(StepWarning {
                step: Step::SetCredential,
                message: "exit 1".to_string()
            })
            .stage(),
            Some(Stage::Configuring)
        );
    }
}
