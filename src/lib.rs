//! Close every open file descriptor from some number upward.
//!
//! Three strategies are tried in turn: an atomic range-close syscall, a snapshot of the process's
//! self-fd listing, and finally closing every number up to the descriptor limit.
use std::os::fd::RawFd;

pub mod caps;
pub mod listing;
pub mod logging;
pub mod os;
pub mod reap;

pub use caps::{Capabilities, FdDir, Tier};
pub use reap::Reaper;

/// Detect this system's capabilities and close every descriptor numbered `lowfd` or higher.
///
/// # Safety
///
/// See [`Reaper::close_from`].
pub unsafe fn closefrom(lowfd: RawFd) {
    Reaper::detect().close_from(lowfd)
}
