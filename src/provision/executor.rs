//! Provisioning run execution.

use crate::locate::{locate, PathProbe};
use crate::provision::{
    ProvisionError, ProvisionProgress, Stage, Step, StepWarning, Tolerance,
};
use crate::{Fetcher, ProcessRunner, ProvisionConfig, ServiceController};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Connection identifier reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionId {
    /// The identifier printed by the application.
    Reported(String),
    /// No usable identifier; the operator reads it from the opened window.
    SeeWindow,
}

impl ConnectionId {
    /// Build from the raw output of the identifier request.
    ///
    /// Surrounding whitespace is trimmed. Blank output yields
    /// [`ConnectionId::SeeWindow`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use rustdesk_provision::ConnectionId;
    ///
    /// assert_eq!(
    ///     ConnectionId::from_output("  ABC123  \n"),
    ///     ConnectionId::Reported("ABC123".to_string())
    /// );
    /// assert_eq!(ConnectionId::from_output(" \r\n"), ConnectionId::SeeWindow);
    /// ```
    pub fn from_output(output: &str) -> Self {
        let id = output.trim();
        if id.is_empty() {
            Self::SeeWindow
        } else {
            Self::Reported(id.to_string())
        }
    }

    /// The identifier, if one was reported.
    pub fn as_reported(&self) -> Option<&str> {
        match self {
            Self::Reported(id) => Some(id),
            Self::SeeWindow => None,
        }
    }
}

/// Result of a run that reached the end of the workflow.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    /// Located RustDesk executable.
    pub app_path: PathBuf,
    /// Identifier to give to the support operator.
    pub connection_id: ConnectionId,
    /// Best-effort steps that failed along the way.
    pub warnings: Vec<StepWarning>,
}

/// Runs the provisioning workflow.
///
/// Collaborators are injected: the [`Fetcher`] downloads the installer,
/// the [`ProcessRunner`] executes every external command, the
/// [`PathProbe`] answers existence checks for the install candidates.
///
/// # Example
///
/// ```rust,no_run
/// use rustdesk_provision::{FsProbe, HttpFetcher, ProvisionConfig, Provisioner, SystemRunner};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let provisioner = Provisioner::new(
///         ProvisionConfig::default(),
///         HttpFetcher,
///         SystemRunner::new(),
///         FsProbe,
///     );
///
///     match provisioner.run(|progress| println!("{:?}", progress)).await {
///         Ok(report) => println!("ID: {:?}", report.connection_id),
///         Err(e) => println!("Failed: {}. Fix: {}", e, e.fix_suggestion()),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Provisioner<F, R, P> {
    config: ProvisionConfig,
    fetcher: F,
    runner: R,
    probe: P,
    work_dir: PathBuf,
}

impl<F, R, P> Provisioner<F, R, P>
where
    F: Fetcher,
    R: ProcessRunner,
    P: PathProbe,
{
    /// Provisioner that saves the installer in the current directory.
    pub fn new(config: ProvisionConfig, fetcher: F, runner: R, probe: P) -> Self {
        Self {
            config,
            fetcher,
            runner,
            probe,
            work_dir: PathBuf::from("."),
        }
    }

    /// Save the installer in `dir` instead of the current directory.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// The configuration this provisioner runs with.
    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    /// Run the workflow once.
    ///
    /// Stages run strictly in order. The two fatal outcomes return early:
    /// a failed download (nothing after it runs) and a missing executable
    /// after the install attempt (no configuration or reporting runs).
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::FetchFailed`] if the installer cannot be downloaded
    /// - [`ProvisionError::NotInstalled`] if no install candidate exists
    pub async fn run<C>(&self, on_progress: C) -> Result<ProvisionReport, ProvisionError>
    where
        C: Fn(ProvisionProgress),
    {
        let mut run = RunLog {
            warnings: Vec::new(),
            on_progress: &on_progress,
        };

        if self.config.console_utf8 {
            if let Err(e) = self.runner.wait(Path::new("chcp"), &["65001"]).await {
                run.failed(Step::ConsoleSetup, &e);
            }
        }
        on_progress(ProvisionProgress::Started);

        // Fetching
        run.enter(Stage::Fetching);
        let artifact = self.work_dir.join(&self.config.artifact.file_name);
        if let Err(source) = self.fetcher.fetch(&self.config.artifact.url, &artifact).await {
            run.failed(Step::Fetch, &source);
            return Err(ProvisionError::fetch_failed(source));
        }

        // Installing
        run.enter(Stage::Installing);
        let installer = absolutize(&artifact);
        let flags = &self.config.flags;
        if let Err(e) = self
            .runner
            .wait(&installer, &[flags.silent_install.as_str()])
            .await
        {
            run.failed(Step::SilentInstall, &e);
        }
        run.settle(Stage::Installing, self.config.install_settle).await;

        // Locating
        run.enter(Stage::Locating);
        let Some(app) = locate(&self.config.install_paths, &self.probe) else {
            run.failed(Step::Locate, "no install candidate exists");
            return Err(ProvisionError::not_installed(
                self.config.install_paths.clone(),
            ));
        };
        info!(path = %app.display(), "RustDesk located");

        // Configuring
        run.enter(Stage::Configuring);
        let services = ServiceController::new(&self.runner, self.config.service_manager);
        let stopped = services.stop(&self.config.service_name).await;
        if !stopped.is_settled() {
            run.failed(Step::StopService, format!("{stopped:?}"));
        }
        let credential = self.config.credential.expose();
        if let Err(e) = self
            .runner
            .wait(&app, &[flags.set_password.as_str(), credential])
            .await
        {
            run.failed(Step::SetCredential, &e);
        }
        let started = services.start(&self.config.service_name).await;
        if !started.is_settled() {
            run.failed(Step::StartService, format!("{started:?}"));
        }
        run.settle(Stage::Configuring, self.config.service_settle).await;

        // Reporting
        run.enter(Stage::Reporting);
        if let Err(e) = self.runner.launch(&app, &[]) {
            run.failed(Step::LaunchWindow, &e);
        }
        let connection_id = match self.runner.run(&app, &[flags.get_id.as_str()]).await {
            Ok(output) => ConnectionId::from_output(&output.stdout_lossy()),
            Err(e) => {
                run.failed(Step::RequestId, &e);
                ConnectionId::SeeWindow
            }
        };
        info!(?connection_id, "provisioning finished");

        Ok(ProvisionReport {
            app_path: app,
            connection_id,
            warnings: run.warnings,
        })
    }
}

/// Per-run bookkeeping: progress callback and collected warnings.
struct RunLog<'a, C> {
    warnings: Vec<StepWarning>,
    on_progress: &'a C,
}

impl<C: Fn(ProvisionProgress)> RunLog<'_, C> {
    fn enter(&self, stage: Stage) {
        info!(?stage, "stage started");
        (self.on_progress)(ProvisionProgress::Stage { stage });
    }

    async fn settle(&self, stage: Stage, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        debug!(?stage, ?delay, "waiting to settle");
        (self.on_progress)(ProvisionProgress::Settling { stage, delay });
        tokio::time::sleep(delay).await;
    }

    /// Apply the step's failure policy to `message`.
    fn failed(&mut self, step: Step, message: impl Display) {
        let message = message.to_string();
        match step.tolerance() {
            Tolerance::Fatal => error!(step = step.name(), reason = %message, "step failed"),
            Tolerance::Silent => debug!(step = step.name(), reason = %message, "step failed, ignored"),
            Tolerance::Logged => {
                warn!(step = step.name(), reason = %message, "step failed, continuing");
                let warning = StepWarning { step, message };
                (self.on_progress)(ProvisionProgress::Warning(warning.clone()));
                self.warnings.push(warning);
            }
        }
    }
}

/// Resolve `path` against the current directory.
fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_trims() {
        assert_eq!(
            ConnectionId::from_output("  ABC123  \n"),
            ConnectionId::Reported("ABC123".to_string())
        );
        assert_eq!(
            ConnectionId::from_output("987654321").as_reported(),
            Some("987654321")
        );
    }

    #[test]
    fn test_connection_id_blank() {
        assert_eq!(ConnectionId::from_output(""), ConnectionId::SeeWindow);
        assert_eq!(ConnectionId::from_output("\t \r\n"), ConnectionId::SeeWindow);
        assert_eq!(ConnectionId::SeeWindow.as_reported(), None);
    }

    #[test]
    fn test_absolutize() {
        let absolute = std::env::temp_dir().join("client.exe");
        assert_eq!(absolutize(&absolute), absolute);

        let resolved = absolutize(Path::new("client.exe"));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("client.exe"));
    }
}
