//! Path confinement.
//!
//! [`ensure_within`] is the single containment check of the server. The
//! resolver applies it to every canonicalized request target, and [`Jail`]
//! applies it at startup when the process is confined with `chroot`.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JailError {
    #[error("{} is not inside {}", path.display(), root.display())]
    Escape { path: PathBuf, root: PathBuf },
    #[error("cannot resolve {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot enter jail {}: {source}", root.display())]
    Enter {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Checks that an already canonical `path` lies inside the canonical `root`.
///
/// The comparison is component-wise, so `/srv/www-private` is not inside
/// `/srv/www`.
pub fn ensure_within(root: &Path, path: &Path) -> Result<(), JailError> {
    if path.starts_with(root) {
        Ok(())
    } else {
        Err(JailError::Escape {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf, JailError> {
    std::fs::canonicalize(path).map_err(|source| JailError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

/// Like `canonicalize`, but a missing final component is allowed so that
/// files which do not exist yet (a fresh log file) can be located.
fn canonicalize_lenient(path: &Path) -> Result<PathBuf, JailError> {
    if path.exists() {
        return canonicalize(path);
    }

    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            Ok(canonicalize(parent)?.join(name))
        }
        _ => canonicalize(path),
    }
}

/// A directory the server confines itself to with `chroot`.
#[derive(Debug, Clone)]
pub struct Jail {
    root: PathBuf,
}

impl Jail {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, JailError> {
        Ok(Self {
            root: canonicalize(root.as_ref())?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rewrites `path` as seen from inside the jail.
    ///
    /// `/srv/jail/www` becomes `/www` for a jail at `/srv/jail`. Paths that
    /// resolve outside the jail are rejected.
    pub fn rebase(&self, path: &Path) -> Result<PathBuf, JailError> {
        let canonical = canonicalize_lenient(path)?;
        ensure_within(&self.root, &canonical)?;

        let inner = canonical
            .strip_prefix(&self.root)
            .map_err(|_| JailError::Escape {
                path: canonical.clone(),
                root: self.root.clone(),
            })?;
        Ok(Path::new("/").join(inner))
    }

    /// Changes the process root to the jail and moves into it.
    #[cfg(unix)]
    pub fn enter(&self) -> Result<(), JailError> {
        let enter_err = |source| JailError::Enter {
            root: self.root.clone(),
            source,
        };

        std::os::unix::fs::chroot(&self.root).map_err(enter_err)?;
        std::env::set_current_dir("/").map_err(enter_err)?;
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn enter(&self) -> Result<(), JailError> {
        Err(JailError::Enter {
            root: self.root.clone(),
            source: io::Error::new(io::ErrorKind::Unsupported, "chroot is unix-only"),
        })
    }
}
