//! Command-line entry point.
//!
//! Running the binary without arguments provisions the machine with the
//! stock configuration. Every value can be overridden by a flag or the
//! matching environment variable.

use clap::Parser;
use rustdesk_provision::{
    report, ArtifactRef, Credential, FsProbe, HttpFetcher, ProvisionConfig, Provisioner,
    SystemRunner, DEFAULT_CREDENTIAL, DEFAULT_FILE_NAME, DEFAULT_SERVICE_NAME, DEFAULT_URL,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Installer download URL
    #[arg(long, env = "RUSTDESK_PROVISION_URL", default_value = DEFAULT_URL)]
    url: String,

    /// File name the installer is saved under
    #[arg(long, env = "RUSTDESK_PROVISION_FILE", default_value = DEFAULT_FILE_NAME)]
    file_name: String,

    /// Permanent password applied to RustDesk
    #[arg(
        long,
        env = "RUSTDESK_PROVISION_PASSWORD",
        default_value = DEFAULT_CREDENTIAL,
        hide_default_value = true,
        hide_env_values = true
    )]
    password: String,

    /// Service restarted around the password change
    #[arg(long, env = "RUSTDESK_PROVISION_SERVICE", default_value = DEFAULT_SERVICE_NAME)]
    service: String,

    /// RustDesk executable location to probe, in order (repeatable; replaces the defaults)
    #[arg(long = "install-path", env = "RUSTDESK_PROVISION_INSTALL_PATHS", value_delimiter = ';')]
    install_paths: Vec<PathBuf>,

    /// Seconds to wait after the silent install
    #[arg(long, env = "RUSTDESK_PROVISION_INSTALL_SETTLE_SECS", default_value_t = 5)]
    install_settle_secs: u64,

    /// Seconds to wait after restarting the service
    #[arg(long, env = "RUSTDESK_PROVISION_SERVICE_SETTLE_SECS", default_value_t = 3)]
    service_settle_secs: u64,

    /// Exit without waiting for Enter
    #[arg(long)]
    no_pause: bool,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> ProvisionConfig {
        let defaults = ProvisionConfig::default();
        ProvisionConfig {
            artifact: ArtifactRef {
                url: self.url,
                file_name: self.file_name,
            },
            credential: Credential::new(self.password),
            install_paths: if self.install_paths.is_empty() {
                defaults.install_paths
            } else {
                self.install_paths
            },
            service_name: self.service,
            install_settle: Duration::from_secs(self.install_settle_secs),
            service_settle: Duration::from_secs(self.service_settle_secs),
            ..defaults
        }
    }
}

/// Filter used when `RUST_LOG` is unset. Logs share the operator's console,
/// so they stay off unless asked for.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "off"
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn pause() {
    println!("\n{}", report::PAUSE_PROMPT);
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let no_pause = cli.no_pause;

    let provisioner = Provisioner::new(cli.into_config(), HttpFetcher, SystemRunner::new(), FsProbe);
    let outcome = provisioner
        .run(|progress| {
            if let Some(line) = report::progress_line(&progress) {
                println!("{line}");
            }
        })
        .await;
    print!("{}", report::render_outcome(&outcome));

    if !no_pause {
        pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_every_setting_has_env_fallback() {
        let command = Cli::command();
        for arg in command.get_arguments() {
            let id = arg.get_id().as_str();
            if matches!(id, "no_pause" | "verbose" | "help" | "version") {
                continue;
            }
            let env = arg.get_env().map(|e| e.to_string_lossy().into_owned());
            assert!(
                env.as_deref().is_some_and(|e| e.starts_with("RUSTDESK_PROVISION_")),
                "{id} has no environment fallback"
            );
        }
    }

    #[test]
    fn test_logging_off_unless_verbose() {
        assert_eq!(default_filter(false), "off");
        assert_eq!(default_filter(true), "debug");
    }

    #[test]
    fn test_defaults_match_stock_config() {
        let config = Cli::parse_from(["rustdesk-provision"]).into_config();
        let stock = ProvisionConfig::default();
        assert_eq!(config.artifact, stock.artifact);
        assert_eq!(config.credential, stock.credential);
        assert_eq!(config.install_paths, stock.install_paths);
        assert_eq!(config.service_name, stock.service_name);
        assert_eq!(config.install_settle, stock.install_settle);
        assert_eq!(config.service_settle, stock.service_settle);
    }

    #[test]
    fn test_overrides() {
        let config = Cli::parse_from([
            "rustdesk-provision",
            "--url",
            "http://127.0.0.1:8080/client.exe",
            "--install-path",
            "D:/Apps/RustDesk/rustdesk.exe",
            "--install-path",
            "C:/Program Files/RustDesk/rustdesk.exe",
            "--install-settle-secs",
            "0",
        ])
        .into_config();
        assert_eq!(config.artifact.url, "http://127.0.0.1:8080/client.exe");
        assert_eq!(
            config.install_paths,
            vec![
                PathBuf::from("D:/Apps/RustDesk/rustdesk.exe"),
                PathBuf::from("C:/Program Files/RustDesk/rustdesk.exe"),
            ]
        );
        assert_eq!(config.install_settle, Duration::ZERO);
    }
}
