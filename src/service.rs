//! OS service control through the platform service manager.

use crate::{ProcessError, ProcessRunner};
use std::path::PathBuf;
use tracing::debug;

/// Action requested from the service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceAction {
    /// Stop the service.
    Stop,
    /// Start the service.
    Start,
}

impl ServiceAction {
    /// Verb passed to the service manager.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Start => "start",
        }
    }
}

const NET_NOT_FOUND: &[&str] = &["service name is invalid", "2185"];
const NET_ALREADY: &[&str] = &["is not started", "3521", "already been started", "2182"];
const SYSTEMCTL_NOT_FOUND: &[&str] = &["not loaded", "not found", "does not exist"];
const SYSTEMCTL_ALREADY: &[&str] = &[];

/// Command-line service manager used to control services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceManager {
    /// Windows `net start|stop <name>`.
    Net,
    /// systemd `systemctl start|stop <name>`.
    Systemctl,
}

impl ServiceManager {
    /// `Net` on Windows, `Systemctl` elsewhere.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::Net
        } else {
            Self::Systemctl
        }
    }

    /// Executable name of the manager.
    pub fn program(&self) -> &'static str {
        match self {
            Self::Net => "net",
            Self::Systemctl => "systemctl",
        }
    }

    /// Map a failed manager invocation to an outcome.
    ///
    /// `net` reports NET HELPMSG 2185 for unknown services, 3521 when
    /// stopping a stopped service and 2182 when starting a running one.
    /// `systemctl` is idempotent for start/stop and only fails for unknown
    /// units.
    fn classify(&self, error: &ProcessError) -> ServiceOutcome {
        let text = error.output_text().to_lowercase();
        let (not_found, already) = match self {
            Self::Net => (NET_NOT_FOUND, NET_ALREADY),
            Self::Systemctl => (SYSTEMCTL_NOT_FOUND, SYSTEMCTL_ALREADY),
        };

        if not_found.iter().any(|needle| text.contains(needle)) {
            ServiceOutcome::NotFound
        } else if already.iter().any(|needle| text.contains(needle)) {
            ServiceOutcome::AlreadyInState
        } else {
            ServiceOutcome::Failed(error.to_string())
        }
    }
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// Result of a service action. None of these is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceOutcome {
    /// The manager performed the action.
    Done,
    /// The service was already stopped (or started).
    AlreadyInState,
    /// No such service, e.g. before the first install.
    NotFound,
    /// Any other failure, with the manager's message.
    Failed(String),
}

impl ServiceOutcome {
    /// Whether the service ended up in the requested state.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Done | Self::AlreadyInState)
    }
}

/// Stops and starts a named service.
///
/// # Example
///
/// ```rust,no_run
/// use rustdesk_provision::{ServiceController, ServiceManager, SystemRunner};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let services = ServiceController::new(SystemRunner::new(), ServiceManager::Net);
///     let outcome = services.stop("rustdesk").await;
///     println!("{:?}", outcome);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ServiceController<R> {
    runner: R,
    manager: ServiceManager,
}

impl<R: ProcessRunner> ServiceController<R> {
    /// Controller issuing commands through `runner`.
    pub fn new(runner: R, manager: ServiceManager) -> Self {
        Self { runner, manager }
    }

    /// Stop the service.
    pub async fn stop(&self, name: &str) -> ServiceOutcome {
        self.control(name, ServiceAction::Stop).await
    }

    /// Start the service.
    pub async fn start(&self, name: &str) -> ServiceOutcome {
        self.control(name, ServiceAction::Start).await
    }

    /// Apply `action` to the service. Failures are logged and returned as
    /// an outcome, never as an error.
    pub async fn control(&self, name: &str, action: ServiceAction) -> ServiceOutcome {
        let program = which::which(self.manager.program())
            .unwrap_or_else(|_| PathBuf::from(self.manager.program()));

        // Output is captured for classification. The service process is a
        // child of the service manager daemon, not of this command.
        let outcome = match self.runner.run(&program, &[action.verb(), name]).await {
            Ok(_) => ServiceOutcome::Done,
            Err(e) => self.manager.classify(&e),
        };

        if outcome != ServiceOutcome::Done {
            debug!(service = name, action = action.verb(), ?outcome, "service action not applied");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandOutput;
    use std::path::Path;
    use std::sync::Mutex;

    struct ScriptedRunner {
        result: fn() -> Result<CommandOutput, ProcessError>,
        calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
    }

    impl ScriptedRunner {
        fn new(result: fn() -> Result<CommandOutput, ProcessError>) -> Self {
            Self {
                result,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProcessRunner for ScriptedRunner {
        async fn run(&self, program: &Path, args: &[&str]) -> Result<CommandOutput, ProcessError> {
            self.calls.lock().unwrap().push((
                program.to_path_buf(),
                args.iter().map(|a| a.to_string()).collect(),
            ));
            (self.result)()
        }

        async fn wait(&self, program: &Path, args: &[&str]) -> Result<(), ProcessError> {
            self.run(program, args).await.map(|_| ())
        }

        fn launch(&self, _program: &Path, _args: &[&str]) -> Result<(), ProcessError> {
            Ok(())
        }
    }

    fn net_failure(stderr: &str) -> ProcessError {
        ProcessError::Exit {
            program: "net".to_string(),
            code: Some(2),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_verbs() {
        assert_eq!(ServiceAction::Stop.verb(), "stop");
        assert_eq!(ServiceAction::Start.verb(), "start");
    }

    #[test]
    fn test_platform_default() {
        let manager = ServiceManager::platform_default();
        if cfg!(windows) {
            assert_eq!(manager, ServiceManager::Net);
        } else {
            assert_eq!(manager, ServiceManager::Systemctl);
        }
    }

    #[test]
    fn test_classify_net_not_found() {
        let error = net_failure("The service name is invalid.\n\nMore help is available by typing NET HELPMSG 2185.");
        assert_eq!(ServiceManager::Net.classify(&error), ServiceOutcome::NotFound);
    }

    #[test]
    fn test_classify_net_already_stopped() {
        let error = net_failure("The RustDesk Service service is not started.\n\nMore help is available by typing NET HELPMSG 3521.");
        assert_eq!(
            ServiceManager::Net.classify(&error),
            ServiceOutcome::AlreadyInState
        );
    }

    #[test]
    fn test_classify_net_already_started() {
        let error = net_failure("The requested service has already been started.");
        assert_eq!(
            ServiceManager::Net.classify(&error),
            ServiceOutcome::AlreadyInState
        );
    }

    #[test]
    fn test_classify_systemctl_unknown_unit() {
        let error = ProcessError::Exit {
            program: "systemctl".to_string(),
            code: Some(5),
            stdout: String::new(),
            stderr: "Failed to stop rustdesk.service: Unit rustdesk.service not loaded.".to_string(),
        };
        assert_eq!(
            ServiceManager::Systemctl.classify(&error),
            ServiceOutcome::NotFound
        );
    }

    #[test]
    fn test_classify_other_failure() {
        let error = net_failure("System error 5 has occurred. Access is denied.");
        assert!(matches!(
            ServiceManager::Net.classify(&error),
            ServiceOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_outcome_is_settled() {
        assert!(ServiceOutcome::Done.is_settled());
        assert!(ServiceOutcome::AlreadyInState.is_settled());
        assert!(!ServiceOutcome::NotFound.is_settled());
        assert!(!ServiceOutcome::Failed("x".to_string()).is_settled());
    }

    #[tokio::test]
    async fn test_stop_passes_verb_and_name() {
        let runner = ScriptedRunner::new(|| Ok(CommandOutput::default()));
        let services = ServiceController::new(&runner, ServiceManager::Net);

        assert_eq!(services.stop("rustdesk").await, ServiceOutcome::Done);
        assert_eq!(services.start("rustdesk").await, ServiceOutcome::Done);

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].0.ends_with("net") || calls[0].0.ends_with("net.exe"));
        assert_eq!(calls[0].1, vec!["stop", "rustdesk"]);
        assert_eq!(calls[1].1, vec!["start", "rustdesk"]);
    }

    #[tokio::test]
    async fn test_missing_manager_is_not_fatal() {
        let runner = ScriptedRunner::new(|| {
            Err(ProcessError::Spawn {
                program: "net".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        });
        let services = ServiceController::new(&runner, ServiceManager::Net);
        assert!(matches!(
            services.stop("rustdesk").await,
            ServiceOutcome::Failed(_)
        ));
    }
}
