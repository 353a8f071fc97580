//! Provisioning configuration.
//!
//! This module provides the [`ProvisionConfig`] struct that carries every
//! value the workflow needs: where to fetch the installer from, which
//! credential to arm the daemon with, where to look for the installed
//! application and how long to let the installer and service settle.
//!
//! The configuration is built once at startup and passed explicitly into
//! [`Provisioner`](crate::Provisioner). Its [`Default`] reproduces the
//! stock deployment, so a run without flags behaves like the original tool.

use crate::ServiceManager;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Installer download location used when none is configured.
pub const DEFAULT_URL: &str = "https://remoto.asistenciavircom.com/rustdesk-host%3D191.101.233.82%2Ckey%3DnWZn0wE7Gq6meimntlv0G8usBkxDjoR0%2BOTgUh76WEU%3D.exe";

/// File name the installer is saved under, relative to the working directory.
pub const DEFAULT_FILE_NAME: &str = "vircom_client.exe";

/// Permanent password set on the RustDesk daemon.
pub const DEFAULT_CREDENTIAL: &str = "Vircom2025!";

/// Name of the service the RustDesk installer registers.
pub const DEFAULT_SERVICE_NAME: &str = "rustdesk";

/// Well-known RustDesk install locations, probed in order.
pub const DEFAULT_INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\RustDesk\rustdesk.exe",
    r"C:\Program Files (x86)\RustDesk\rustdesk.exe",
];

/// Reference to the installer artifact for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    /// Source URL of the installer.
    pub url: String,
    /// Destination file name in the working directory.
    pub file_name: String,
}

impl Default for ArtifactRef {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

/// Access credential for the remote-access daemon.
///
/// The value is opaque. `Debug` is redacted so the secret cannot leak
/// through logging; use [`Credential::expose`] only where it is handed to
/// the daemon as an argument.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::new(DEFAULT_CREDENTIAL)
    }
}

/// Command-line flags understood by the installer and the RustDesk binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFlags {
    /// Flag that makes the installer run without prompts.
    pub silent_install: String,
    /// Flag that sets the permanent password (followed by the value).
    pub set_password: String,
    /// Flag that prints the connection identifier on stdout.
    pub get_id: String,
}

impl Default for ClientFlags {
    fn default() -> Self {
        Self {
            silent_install: "--silent-install".to_string(),
            set_password: "--password".to_string(),
            get_id: "--get-id".to_string(),
        }
    }
}

/// Configuration for a provisioning run.
///
/// # Example
///
/// ```rust
/// use rustdesk_provision::ProvisionConfig;
/// use std::time::Duration;
///
/// // Stock deployment
/// let config = ProvisionConfig::default();
/// assert_eq!(config.install_settle, Duration::from_secs(5));
///
/// // Faster settle delays, e.g. on a machine where RustDesk is preinstalled
/// let config = ProvisionConfig {
///     install_settle: Duration::from_secs(1),
///     service_settle: Duration::from_secs(1),
///     ..Default::default()
/// };
/// assert_eq!(config.service_name, "rustdesk");
/// ```
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Installer to fetch.
    pub artifact: ArtifactRef,

    /// Password applied to the daemon.
    pub credential: Credential,

    /// Candidate executable locations, probed in order. First match wins.
    pub install_paths: Vec<PathBuf>,

    /// OS service restarted around the credential change.
    pub service_name: String,

    /// Service manager used to stop and start `service_name`.
    ///
    /// Default: `net` on Windows, `systemctl` elsewhere
    pub service_manager: ServiceManager,

    /// Flags passed to the installer and the RustDesk binary.
    pub flags: ClientFlags,

    /// Wait after the silent install, before locating the application.
    ///
    /// Default: 5 seconds
    pub install_settle: Duration,

    /// Wait after restarting the service, before querying the identifier.
    ///
    /// Default: 3 seconds
    pub service_settle: Duration,

    /// Switch the console to UTF-8 before the run.
    ///
    /// Default: `true` on Windows, `false` elsewhere
    pub console_utf8: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            artifact: ArtifactRef::default(),
            credential: Credential::default(),
            install_paths: DEFAULT_INSTALL_PATHS.iter().map(PathBuf::from).collect(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            service_manager: ServiceManager::platform_default(),
            flags: ClientFlags::default(),
            install_settle: Duration::from_secs(5),
            service_settle: Duration::from_secs(3),
            console_utf8: cfg!(windows),
        }
    }
}
