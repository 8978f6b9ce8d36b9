//! Detect which descriptor-closing strategies this process can use.
use std::path::Path;

use strum::{EnumString, IntoStaticStr};

#[mockall_double::double]
use crate::os::sys;

/// A closing strategy, fastest first.
#[derive(Clone, Copy, Debug, Eq, EnumString, IntoStaticStr, Ord, PartialEq, PartialOrd)]
pub enum Tier {
    /// A single kernel call closes the whole range.
    #[strum(serialize = "close-range")]
    CloseRange,
    /// Snapshot the self-fd listing, then close what it shows.
    #[strum(serialize = "fd-dir")]
    FdDir,
    /// Close every number up to the descriptor limit.
    #[strum(serialize = "brute-force")]
    BruteForce,
}

/// A pseudo-directory listing the calling process's open descriptors
#[derive(Clone, Copy, Debug, Eq, IntoStaticStr, PartialEq)]
pub enum FdDir {
    #[strum(serialize = "/proc/self/fd")]
    ProcSelfFd,
    #[strum(serialize = "/dev/fd")]
    DevFd,
}

impl FdDir {
    pub fn path(self) -> &'static Path {
        let s: &'static str = self.into();
        Path::new(s)
    }

    /// The listing this platform would use, if it has one at all
    pub fn native() -> Option<Self> {
        if cfg!(any(target_os = "linux", target_os = "android")) {
            Some(FdDir::ProcSelfFd)
        } else if cfg!(any(target_os = "macos", target_os = "ios", target_os = "freebsd")) {
            Some(FdDir::DevFd)
        } else {
            None
        }
    }
}

/// What the running kernel and mounted filesystems let us do.
///
/// Resolve it once with [`Capabilities::detect`] and hand it to
/// [`Reaper::new`](crate::Reaper::new).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Capabilities {
    /// An atomic range-close call exists and works
    pub close_range: bool,
    /// A self-fd listing is mounted
    pub fd_dir: Option<FdDir>,
}

impl Capabilities {
    pub fn detect() -> Self {
        let close_range = sys::has_close_range();
        let fd_dir = FdDir::native().filter(|&dir| sys::has_fd_dir(dir));
        let caps = Capabilities { close_range, fd_dir };
        tracing::debug!(?caps, "detected descriptor capabilities");
        caps
    }

    /// Nothing but brute force
    pub fn none() -> Self {
        Capabilities { close_range: false, fd_dir: None }
    }

    /// Disable every strategy faster than `tier`.
    pub fn starting_at(self, tier: Tier) -> Self {
        Capabilities {
            close_range: self.close_range && tier <= Tier::CloseRange,
            fd_dir: self.fd_dir.filter(|_| tier <= Tier::FdDir),
        }
    }
}
