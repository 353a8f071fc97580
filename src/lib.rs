//! # rustdesk-provision
//!
//! Unattended RustDesk provisioning for remote support.
//!
//! A single run downloads the RustDesk installer, installs it silently,
//! sets the permanent access password, restarts the RustDesk service and
//! reports the machine's connection ID to the person at the keyboard.
//!
//! ## Features
//!
//! - `Provisioner` running the fixed fetch → install → locate → configure → report workflow
//! - `ProvisionConfig` holding every endpoint, credential, path and delay
//! - `Fetcher`, `ProcessRunner` and `PathProbe` seams for injecting fakes
//! - `ServiceController` tolerating missing or already stopped/started services
//! - `report` module rendering the operator-facing text
//!
//! ## Example
//!
//! ```rust,no_run
//! use rustdesk_provision::{
//!     report, FsProbe, HttpFetcher, ProvisionConfig, Provisioner, SystemRunner,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let provisioner = Provisioner::new(
//!         ProvisionConfig::default(),
//!         HttpFetcher,
//!         SystemRunner::new(),
//!         FsProbe,
//!     );
//!
//!     let outcome = provisioner
//!         .run(|progress| {
//!             if let Some(line) = report::progress_line(&progress) {
//!                 println!("{line}");
//!             }
//!         })
//!         .await;
//!     print!("{}", report::render_outcome(&outcome));
//! }
//! ```

mod config;
mod fetch;
mod locate;
mod process;
mod provision;
pub mod report;
mod service;

pub use config::{
    ArtifactRef, ClientFlags, Credential, ProvisionConfig, DEFAULT_CREDENTIAL, DEFAULT_FILE_NAME,
    DEFAULT_INSTALL_PATHS, DEFAULT_SERVICE_NAME, DEFAULT_URL,
};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use locate::{locate, FsProbe, PathProbe};
pub use process::{CommandOutput, ProcessError, ProcessRunner, SystemRunner};
pub use provision::{
    ConnectionId, ProvisionError, ProvisionProgress, ProvisionReport, Provisioner, Stage, Step,
    StepWarning, Tolerance, OPERATOR_STEPS,
};
pub use service::{ServiceAction, ServiceController, ServiceManager, ServiceOutcome};
