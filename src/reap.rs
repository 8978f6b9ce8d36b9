//! Close every descriptor above a threshold.
use std::os::fd::RawFd;

use nix::errno::Errno;
use tracing::{debug, trace, warn};

#[mockall_double::double]
use crate::os::sys;
use crate::caps::{Capabilities, FdDir, Tier};

/// Used by brute force when the OS won't say how many descriptors a process may have
pub const OPEN_MAX: RawFd = 256;

/// Closes descriptors using the fastest strategy its [`Capabilities`] allow.
#[derive(Clone, Copy, Debug)]
pub struct Reaper {
    caps: Capabilities,
}

impl Reaper {
    pub fn new(caps: Capabilities) -> Self {
        Reaper { caps }
    }

    /// Probe the running system and build a `Reaper` for it
    pub fn detect() -> Self {
        Self::new(Capabilities::detect())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Close every descriptor numbered `lowfd` or higher.
    ///
    /// This never fails.  Descriptors that turn out to be already closed are ignored, and a
    /// strategy that doesn't work falls back to a slower one.  A negative `lowfd` is treated as 0.
    ///
    /// # Safety
    ///
    /// Objects like `File` and `OwnedFd` assume that their descriptors stay open until they drop
    /// them.  The caller must ensure that no such object owns a descriptor `>= lowfd`, for
    /// example by calling this at startup or just before `exec`.  Nor may another thread be
    /// using those descriptors.
    pub unsafe fn close_from(&self, lowfd: RawFd) {
        self.reap(lowfd);
    }

    /// Returns the tier that did the work
    pub(crate) unsafe fn reap(&self, mut lowfd: RawFd) -> Tier {
        if lowfd < 0 {
            warn!(lowfd, "negative lowfd; closing from 0 instead");
            lowfd = 0;
        }

        if self.caps.close_range {
            match sys::close_range(lowfd) {
                Ok(()) => {
                    debug!(lowfd, "closed descriptors with close_range");
                    return Tier::CloseRange;
                }
                Err(e) => debug!(lowfd, error = %e, "close_range failed"),
            }
        }

        if let Some(dir) = self.caps.fd_dir {
            match sweep_fd_dir(dir, lowfd) {
                Ok(n) => {
                    debug!(lowfd, closed = n, dir = ?dir.path(), "closed descriptors from listing");
                    return Tier::FdDir;
                }
                Err(e) => debug!(lowfd, error = %e, dir = ?dir.path(), "could not list descriptors"),
            }
        }

        let n = brute_force(lowfd);
        debug!(lowfd, closed = n, "closed descriptors by brute force");
        Tier::BruteForce
    }
}

/// Close everything in a snapshot of `dir`.  Returns how many descriptors were actually open.
///
/// The listing must be read completely before anything is closed; readdir makes no promise
/// about where iteration continues once an entry disappears.
unsafe fn sweep_fd_dir(dir: FdDir, lowfd: RawFd) -> nix::Result<usize> {
    let listing = sys::read_fd_dir(dir)?;
    let mut closed = 0;
    for fd in listing.candidates(lowfd) {
        match sys::close(fd) {
            Ok(()) => closed += 1,
            // The listing's own handle lands here, along with anything closed since the snapshot.
            Err(Errno::EBADF) => trace!(fd, handle = (fd == listing.handle), "already closed"),
            // Linux releases the descriptor even when close reports EINTR or EIO.
            Err(e) => trace!(fd, error = %e, "close failed"),
        }
    }
    Ok(closed)
}

/// The exclusive upper bound for brute force.  Not RLIMIT_NOFILE: descriptors may remain open
/// above a lowered rlimit.
fn max_fd() -> RawFd {
    match sys::open_max() {
        Ok(Some(n)) if n > 0 => RawFd::try_from(n).unwrap_or(RawFd::MAX),
        Ok(_) => OPEN_MAX,
        Err(e) => {
            debug!(error = %e, "sysconf(_SC_OPEN_MAX) failed");
            OPEN_MAX
        }
    }
}

unsafe fn brute_force(lowfd: RawFd) -> usize {
    let mut closed = 0;
    for fd in lowfd..max_fd() {
        if sys::close(fd).is_ok() {
            closed += 1;
        }
    }
    closed
}
