//! Detaching from the controlling terminal.
//!
//! [`Daemon::prepare`] opens `/dev/null` and must run before any `chroot`,
//! since the jail usually has no device nodes. [`Daemon::detach`] runs after
//! logging is set up and before the async runtime starts, while the process
//! is still single-threaded.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;

use nix::libc;
use nix::sys::signal::{SigHandler, Signal, signal};
use nix::sys::stat::{Mode, umask};
use nix::unistd::{ForkResult, dup2, fork, setsid};
use thiserror::Error;

const PATH_DEVNULL: &str = "/dev/null";

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to open /dev/null: {0}")]
    NullDevice(#[source] io::Error),
    #[error("failed to fork process: {0}")]
    Fork(#[source] nix::Error),
    #[error("failed to create session: {0}")]
    Session(#[source] nix::Error),
    #[error("failed to ignore SIGHUP: {0}")]
    Signal(#[source] nix::Error),
    #[error("failed to change directory to /: {0}")]
    Chdir(#[source] io::Error),
    #[error("failed to redirect standard streams: {0}")]
    Redirect(#[source] nix::Error),
}

/// A pending daemonization holding the null device.
#[derive(Debug)]
pub struct Daemon {
    null: File,
}

impl Daemon {
    pub fn prepare() -> Result<Self, DaemonError> {
        let null = OpenOptions::new()
            .read(true)
            .write(true)
            .open(PATH_DEVNULL)
            .map_err(DaemonError::NullDevice)?;
        Ok(Self { null })
    }

    /// Double-forks into a new session, ignores SIGHUP, moves to `/` and
    /// points the standard streams at the null device.
    ///
    /// Only the final grandchild returns; both parents exit with status 0.
    pub fn detach(self) -> Result<(), DaemonError> {
        umask(Mode::empty());

        fork_and_leave_parent()?;
        setsid().map_err(DaemonError::Session)?;

        // SAFETY: installs SIG_IGN, no handler code runs.
        unsafe { signal(Signal::SIGHUP, SigHandler::SigIgn) }.map_err(DaemonError::Signal)?;

        fork_and_leave_parent()?;
        std::env::set_current_dir("/").map_err(DaemonError::Chdir)?;

        let null = self.null.as_raw_fd();
        for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
            dup2(null, fd).map_err(DaemonError::Redirect)?;
        }
        Ok(())
    }
}

fn fork_and_leave_parent() -> Result<(), DaemonError> {
    // SAFETY: called before the runtime starts, so the process has one thread.
    match unsafe { fork() }.map_err(DaemonError::Fork)? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => Ok(()),
    }
}
