//! Snapshots of the self-fd listing.
use std::os::fd::RawFd;

#[mockall_double::double]
use crate::os::sys;
use crate::caps::FdDir;

/// How the listing labels an entry
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    /// How /proc/self/fd shows open descriptors
    Symlink,
    /// How fdescfs shows them, unless mounted with linrdlnk
    CharDevice,
    Directory,
    Other,
}

/// One name observed in the listing
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirEntry {
    pub name: Vec<u8>,
    /// `None` when the filesystem doesn't report entry types
    pub kind: Option<EntryKind>,
}

impl DirEntry {
    /// The descriptor this entry names, if it names one.
    pub fn fd(&self) -> Option<RawFd> {
        if matches!(self.kind, Some(EntryKind::Directory | EntryKind::Other)) {
            return None;
        }
        parse_fd(&self.name)
    }
}

/// A complete, owned copy of the listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Listing {
    /// The descriptor that was used to read the listing.  It is already closed, but its number
    /// may still be among `entries`.
    pub handle: RawFd,
    pub entries: Vec<DirEntry>,
}

impl Listing {
    /// Every descriptor `>= lowfd` named by the snapshot, in ascending order.
    pub fn candidates(&self, lowfd: RawFd) -> Vec<RawFd> {
        let mut fds = self.entries
            .iter()
            .filter_map(DirEntry::fd)
            .filter(|&fd| fd >= lowfd)
            .collect::<Vec<_>>();
        fds.sort_unstable();
        fds.dedup();
        fds
    }
}

/// Parse a descriptor number.  Only a plain run of ASCII digits that fits in a `RawFd` qualifies;
/// signs, whitespace and trailing garbage don't.
pub fn parse_fd(name: &[u8]) -> Option<RawFd> {
    if name.is_empty() || !name.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(name).ok()?.parse::<RawFd>().ok()
}

/// List the calling process's open descriptors, not counting the one used to read the listing.
pub fn open_fds(dir: FdDir) -> nix::Result<Vec<RawFd>> {
    let listing = sys::read_fd_dir(dir)?;
    let mut fds = listing.candidates(0);
    fds.retain(|&fd| fd != listing.handle);
    Ok(fds)
}
