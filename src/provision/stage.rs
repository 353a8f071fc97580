//! Workflow stages and the per-step failure policy.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Number of stages announced to the operator.
pub const OPERATOR_STEPS: u8 = 4;

/// Workflow stage, in execution order.
///
/// # Example
///
/// ```rust
/// use rustdesk_provision::Stage;
///
/// let order: Vec<_> = Stage::all().collect();
/// assert_eq!(order.first(), Some(&Stage::Fetching));
/// assert_eq!(order.last(), Some(&Stage::Reporting));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum Stage {
    /// Downloading the installer.
    Fetching,
    /// Running the silent install.
    Installing,
    /// Looking for the installed executable.
    Locating,
    /// Restarting the service around the credential change.
    Configuring,
    /// Opening the window and reading the connection identifier.
    Reporting,
}

impl Stage {
    /// Iterator over all stages in execution order.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }

    /// Operator-facing step number, `1..=OPERATOR_STEPS`.
    ///
    /// Locating and configuring share step 3.
    pub fn operator_step(&self) -> u8 {
        match self {
            Self::Fetching => 1,
            Self::Installing => 2,
            Self::Locating | Self::Configuring => 3,
            Self::Reporting => 4,
        }
    }

    /// Line shown to the operator when the stage begins.
    ///
    /// `None` for stages that continue the previous announcement.
    pub fn announcement(&self) -> Option<&'static str> {
        match self {
            Self::Fetching => Some("Downloading optimized client..."),
            Self::Installing => Some("Installing service (this may take a few seconds)..."),
            Self::Locating => Some("Configuring secure access..."),
            Self::Configuring => None,
            Self::Reporting => Some("Retrieving connection ID..."),
        }
    }
}

/// How a failing step affects the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    /// The run ends.
    Fatal,
    /// Logged as a warning and reported; the run continues.
    Logged,
    /// Logged at debug level only; the run continues.
    Silent,
}

/// An external action performed by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum Step {
    /// Switch the console code page to UTF-8.
    ConsoleSetup,
    /// Download the installer.
    Fetch,
    /// Run the installer with the silent flag.
    SilentInstall,
    /// Find the installed executable.
    Locate,
    /// Stop the service.
    StopService,
    /// Apply the credential.
    SetCredential,
    /// Start the service.
    StartService,
    /// Open the interactive window.
    LaunchWindow,
    /// Ask the application for its connection identifier.
    RequestId,
}

impl Step {
    /// Failure policy for this step.
    pub fn tolerance(&self) -> Tolerance {
        match self {
            Self::Fetch | Self::Locate => Tolerance::Fatal,
            Self::SilentInstall | Self::SetCredential | Self::LaunchWindow | Self::RequestId => {
                Tolerance::Logged
            }
            Self::ConsoleSetup | Self::StopService | Self::StartService => Tolerance::Silent,
        }
    }

    /// Stage the step belongs to. `None` for setup outside the workflow.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::ConsoleSetup => None,
            Self::Fetch => Some(Stage::Fetching),
            Self::SilentInstall => Some(Stage::Installing),
            Self::Locate => Some(Stage::Locating),
            Self::StopService | Self::SetCredential | Self::StartService => {
                Some(Stage::Configuring)
            }
            Self::LaunchWindow | Self::RequestId => Some(Stage::Reporting),
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConsoleSetup => "console setup",
            Self::Fetch => "fetch",
            Self::SilentInstall => "silent install",
            Self::Locate => "locate",
            Self::StopService => "stop service",
            Self::SetCredential => "set credential",
            Self::StartService => "start service",
            Self::LaunchWindow => "launch window",
            Self::RequestId => "request id",
        }
    }
}
