//! Resolution of targets against the running system.
//!
//! Resolution turns a [`Target`] into a descriptor a control request can be
//! issued on, enforcing the per-operation descriptor policy and validating
//! the input before any system interaction.
//!
//! ## Ownership
//!
//! - A descriptor supplied by the caller is **borrowed**: the caller keeps
//!   ownership and it is never closed here.
//! - A descriptor opened from a path is **owned**: it is opened read-only for
//!   the duration of one operation and closed on every exit path, including
//!   failures, via RAII.
//!
//! Handles are created per operation and never cached or shared.

use std::fs::File;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use crate::error::{BtrfsError, Result};
use crate::ops::Op;
use crate::target::{Target, bytes_to_path};

/// A target resolved into a usable descriptor.
#[derive(Debug)]
pub(crate) enum FsHandle {
    /// Caller-owned descriptor.
    Borrowed(RawFd),
    /// Freshly opened descriptor, closed on drop.
    Owned(OwnedFd),
}

impl FsHandle {
    pub(crate) fn as_raw_fd(&self) -> RawFd {
        match self {
            FsHandle::Borrowed(fd) => *fd,
            FsHandle::Owned(fd) => fd.as_raw_fd(),
        }
    }
}

/// Resolves `target` for `op`.
///
/// Input validation happens here, before any system call: descriptor targets
/// are checked against the per-operation policy and for range, path targets
/// are scanned for an embedded NUL byte. The scan runs after every
/// text-to-bytes conversion has already happened, since a conversion can
/// itself introduce a NUL.
pub(crate) fn resolve(target: &Target, op: Op, allow_descriptor: bool) -> Result<FsHandle> {
    match target {
        Target::Descriptor(fd) => {
            if !allow_descriptor {
                return Err(BtrfsError::DescriptorNotAllowed { operation: op });
            }
            if *fd < 0 {
                return Err(BtrfsError::DescriptorNegative(i64::from(*fd)));
            }
            log::trace!("{op}: using caller descriptor {fd}");
            Ok(FsHandle::Borrowed(*fd))
        }
        Target::Path(bytes) => {
            if bytes.contains(&0) {
                return Err(BtrfsError::EmbeddedNul(bytes_to_path(bytes)));
            }
            let path = bytes_to_path(bytes);
            let file = File::open(&path).map_err(|source| BtrfsError::Control {
                operation: op,
                path: Some(path.clone()),
                source,
            })?;
            log::trace!(
                "{op}: opened {} read-only as descriptor {}",
                path.display(),
                file.as_raw_fd()
            );
            Ok(FsHandle::Owned(file.into()))
        }
    }
}
