//! Blocking and fire-and-forget command execution.

use crate::ProcessError;
use std::future::Future;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Output of a command that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (always zero for a successful run on real processes).
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Output carrying only the given stdout text.
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into().into_bytes(),
            stderr: Vec::new(),
        }
    }

    /// Standard output decoded as UTF-8, invalid sequences replaced.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Executes external programs.
///
/// The production implementation is [`SystemRunner`]; test doubles can
/// return canned results without spawning anything.
#[allow(async_fn_in_trait)]
pub trait ProcessRunner {
    /// Start `program`, wait for it to exit and capture its output.
    ///
    /// Returns an error if the program cannot be started or exits
    /// unsuccessfully.
    async fn run(&self, program: &Path, args: &[&str]) -> Result<CommandOutput, ProcessError>;

    /// Start `program` and wait for it to exit, without capturing output.
    ///
    /// Returns as soon as the program itself exits, even if it left
    /// children running. A failure is [`ProcessError::Exit`] with empty
    /// output fields.
    async fn wait(&self, program: &Path, args: &[&str]) -> Result<(), ProcessError>;

    /// Start `program` without waiting for it.
    ///
    /// Returns an error only if the program cannot be started.
    fn launch(&self, program: &Path, args: &[&str]) -> Result<(), ProcessError>;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    async fn run(&self, program: &Path, args: &[&str]) -> Result<CommandOutput, ProcessError> {
        (**self).run(program, args).await
    }

    async fn wait(&self, program: &Path, args: &[&str]) -> Result<(), ProcessError> {
        (**self).wait(program, args).await
    }

    fn launch(&self, program: &Path, args: &[&str]) -> Result<(), ProcessError> {
        (**self).launch(program, args)
    }
}

/// [`ProcessRunner`] backed by `tokio::process`.
///
/// # Example
///
/// ```rust,no_run
/// use rustdesk_provision::{ProcessRunner, SystemRunner};
/// use std::path::Path;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let runner = SystemRunner::new();
///     match runner.run(Path::new("rustdesk"), &["--get-id"]).await {
///         Ok(output) => println!("id: {}", output.stdout_lossy().trim()),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Runner that waits for blocking commands as long as they take.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that kills blocking commands after `limit`.
    pub fn with_timeout(limit: Duration) -> Self {
        Self {
            timeout: Some(limit),
        }
    }

    /// Await `task`, applying the configured limit.
    async fn bounded<T>(
        &self,
        name: &str,
        task: impl Future<Output = io::Result<T>>,
    ) -> Result<T, ProcessError> {
        let result = match self.timeout {
            Some(limit) => timeout(limit, task)
                .await
                .map_err(|_| ProcessError::Timeout {
                    program: name.to_string(),
                    duration: limit,
                })?,
            None => task.await,
        };

        result.map_err(|source| ProcessError::Spawn {
            program: name.to_string(),
            source,
        })
    }
}

impl ProcessRunner for SystemRunner {
    async fn run(&self, program: &Path, args: &[&str]) -> Result<CommandOutput, ProcessError> {
        let name = program.display().to_string();
        // Arguments are not logged: the password flag carries the credential.
        debug!(program = %name, arg_count = args.len(), "running command");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Capture ends at EOF on both pipes, so any child that inherits them
        // keeps this call waiting. Use `wait` for programs that spawn helpers.
        let output = self.bounded(&name, command.output()).await?;

        if !output.status.success() {
            return Err(ProcessError::Exit {
                program: name,
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn wait(&self, program: &Path, args: &[&str]) -> Result<(), ProcessError> {
        let name = program.display().to_string();
        debug!(program = %name, arg_count = args.len(), "running command, output discarded");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let status = self.bounded(&name, command.status()).await?;
        if !status.success() {
            return Err(ProcessError::Exit {
                program: name,
                code: status.code(),
                stdout: String::new(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    fn launch(&self, program: &Path, args: &[&str]) -> Result<(), ProcessError> {
        let name = program.display().to_string();
        debug!(program = %name, arg_count = args.len(), "launching detached");

        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|source| ProcessError::Spawn {
                program: name,
                source,
            })
    }
}
