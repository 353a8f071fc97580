//! External process execution.
//!
//! Every external command the workflow issues (the installer, the RustDesk
//! binary, the service manager, the console code page switch) goes through
//! the [`ProcessRunner`] trait. Three modes exist:
//!
//! - [`ProcessRunner::run`] starts the program, waits for it and captures
//!   its output. A non-zero exit is an error value, never a panic.
//! - [`ProcessRunner::wait`] starts the program and waits for it with
//!   output discarded. Helpers it leaves behind do not hold the call open.
//! - [`ProcessRunner::launch`] starts the program and returns immediately.
//!
//! [`SystemRunner`] is the production implementation on top of
//! `tokio::process`.

mod errors;
mod runner;

pub use errors::ProcessError;
pub use runner::{CommandOutput, ProcessRunner, SystemRunner};
