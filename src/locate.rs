//! Installation lookup over a fixed list of candidate paths.

use std::path::{Path, PathBuf};

/// Existence check used by the locator.
///
/// [`FsProbe`] asks the filesystem. Tests substitute a probe that answers
/// for paths which cannot exist on the test host (e.g. Windows install
/// directories on Linux).
pub trait PathProbe {
    /// Whether something exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

impl<T: PathProbe + ?Sized> PathProbe for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }
}

/// Filesystem-backed [`PathProbe`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Find an installed application.
///
/// Candidates are checked in the given order and the first one that
/// exists is returned, so a 64-bit install wins over a 32-bit one when the
/// 64-bit directory is listed first.
///
/// # Returns
///
/// `Some(PathBuf)` for the first existing candidate, `None` if none exist.
///
/// # Example
///
/// ```rust
/// use rustdesk_provision::{locate, FsProbe};
/// use std::path::PathBuf;
///
/// let candidates = [PathBuf::from("/definitely/not/installed/rustdesk")];
/// assert!(locate(&candidates, &FsProbe).is_none());
/// ```
pub fn locate<P: PathProbe + ?Sized>(candidates: &[PathBuf], probe: &P) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|candidate| probe.exists(candidate))
        .cloned()
}
