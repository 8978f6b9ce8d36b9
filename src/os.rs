#[cfg(not(test))]
pub mod sys {
    use std::os::fd::{AsRawFd, RawFd};

    use nix::{
        dir::{Dir, Type},
        errno::Errno,
        fcntl::OFlag,
        libc::c_long,
        sys::stat::Mode,
        unistd::{self, SysconfVar},
    };

    use crate::{
        caps::FdDir,
        listing::{DirEntry, EntryKind, Listing},
    };

    /// Can the kernel close a whole descriptor range in one call?
    #[cfg(target_os = "linux")]
    pub fn has_close_range() -> bool {
        // An empty range above every possible descriptor.  Succeeds on 5.9+, ENOSYS before that.
        let ret = unsafe {
            libc::syscall(libc::SYS_close_range, libc::c_uint::MAX, libc::c_uint::MAX, 0u32)
        };
        ret == 0
    }

    #[cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "netbsd"))]
    pub fn has_close_range() -> bool {
        true
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    )))]
    pub fn has_close_range() -> bool {
        false
    }

    /// Close every descriptor numbered `lowfd` or higher in a single kernel call
    #[cfg(target_os = "linux")]
    pub unsafe fn close_range(lowfd: RawFd) -> nix::Result<()> {
        let ret = libc::syscall(
            libc::SYS_close_range,
            lowfd as libc::c_uint,
            libc::c_uint::MAX,
            0u32,
        );
        Errno::result(ret).map(drop)
    }

    #[cfg(target_os = "freebsd")]
    pub unsafe fn close_range(lowfd: RawFd) -> nix::Result<()> {
        libc::closefrom(lowfd);
        Ok(())
    }

    /// OpenBSD and NetBSD's closefrom can fail, with EINTR for example
    #[cfg(any(target_os = "openbsd", target_os = "netbsd"))]
    pub unsafe fn close_range(lowfd: RawFd) -> nix::Result<()> {
        Errno::result(libc::closefrom(lowfd)).map(drop)
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    )))]
    pub unsafe fn close_range(_lowfd: RawFd) -> nix::Result<()> {
        Err(Errno::ENOSYS)
    }

    pub unsafe fn close(fd: RawFd) -> nix::Result<()> {
        unistd::close(fd)
    }

    /// Is `dir` mounted and trustworthy?
    pub fn has_fd_dir(dir: FdDir) -> bool {
        if !dir.path().is_dir() {
            return false;
        }
        if cfg!(target_os = "freebsd") {
            // Without fdescfs, /dev/fd is a static part of devfs that only ever shows 0-2.
            use nix::sys::stat::stat;
            match (stat("/dev"), stat(dir.path())) {
                (Ok(dev), Ok(devfd)) => dev.st_dev != devfd.st_dev,
                _ => false,
            }
        } else {
            true
        }
    }

    /// Take a complete snapshot of the self-fd listing.  The directory handle is closed before
    /// returning.
    pub fn read_fd_dir(dir: FdDir) -> nix::Result<Listing> {
        let mut d = Dir::open(
            dir.path(),
            OFlag::O_RDONLY | OFlag::O_DIRECTORY | OFlag::O_CLOEXEC,
            Mode::empty(),
        )?;
        let handle = d.as_raw_fd();
        let mut entries = Vec::new();
        for ent in d.iter() {
            let ent = ent?;
            let kind = ent.file_type().map(|t| match t {
                Type::Symlink => EntryKind::Symlink,
                Type::Directory => EntryKind::Directory,
                Type::CharacterDevice => EntryKind::CharDevice,
                _ => EntryKind::Other,
            });
            entries.push(DirEntry { name: ent.file_name().to_bytes().to_vec(), kind });
        }
        Ok(Listing { handle, entries })
    }

    /// The configured descriptor limit, `None` if indeterminate
    pub fn open_max() -> nix::Result<Option<c_long>> {
        unistd::sysconf(SysconfVar::OPEN_MAX)
    }
}

#[cfg(test)]
pub use mockable::mock_sys;

/// Module-level mocks are process globals, so every test that sets expectations on them must hold
/// this lock.
#[cfg(test)]
pub static MOCK_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
