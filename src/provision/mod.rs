//! The provisioning workflow.
//!
//! [`Provisioner::run`] walks the fixed sequence fetch → install → locate →
//! configure → report exactly once. Only two failures end a run early: the
//! installer could not be downloaded, or RustDesk could not be found after
//! the install attempt. Every other failing step is logged, surfaced as a
//! [`StepWarning`] and the run carries on.

mod errors;
mod executor;
mod progress;
mod stage;

pub use errors::ProvisionError;
pub use executor::{ConnectionId, ProvisionReport, Provisioner};
pub use progress::{ProvisionProgress, StepWarning};
pub use stage::{Stage, Step, Tolerance, OPERATOR_STEPS};
