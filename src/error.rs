//! Error types for btrfsctl.
//!
//! All operations return `Result<T>` which aliases `Result<T, BtrfsError>`.

use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

use crate::ops::Op;

/// Errors from target resolution and filesystem control operations.
#[derive(Debug, Error)]
pub enum BtrfsError {
    /// Operation was given a descriptor target but only accepts paths.
    #[error("{operation}: expected a string, bytes, or path-like target, not a descriptor")]
    DescriptorNotAllowed {
        /// The operation that rejected the target.
        operation: Op,
    },

    /// Path cannot be represented in the platform's filesystem encoding.
    #[error("path {0:?} cannot be encoded for the platform filesystem")]
    Encoding(OsString),

    /// Raw descriptor value above the platform maximum.
    #[error("descriptor {0} is greater than maximum")]
    DescriptorOverflow(i64),

    /// Raw descriptor value below zero.
    #[error("descriptor {0} is negative")]
    DescriptorNegative(i64),

    /// Path contains an interior NUL byte.
    ///
    /// The underlying system call would silently truncate at the NUL, so the
    /// path is rejected before any system interaction.
    #[error("path {0:?} has an embedded nul byte")]
    EmbeddedNul(PathBuf),

    /// Raw transaction id below zero.
    #[error("transaction id {0} is negative")]
    InvalidTransactionId(i64),

    /// A filesystem control request failed.
    ///
    /// Carries the operation, the target path when one is known, and the OS
    /// error, so a diagnostic can be produced without re-querying the target.
    #[error("{operation} failed{}: {source}", fmt_path(.path))]
    Control {
        /// The operation that failed.
        operation: Op,
        /// Target path, if the target was not a descriptor.
        path: Option<PathBuf>,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Unexpected error.
    ///
    /// Custom [`IntoTarget`](crate::IntoTarget) conversions surface their own
    /// failures through here, unreinterpreted.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BtrfsError {
    /// Builds a [`BtrfsError::Control`] from an operation, an optional path,
    /// and a raw OS error code.
    pub fn control(operation: Op, path: Option<PathBuf>, code: i32) -> Self {
        BtrfsError::Control {
            operation,
            path,
            source: std::io::Error::from_raw_os_error(code),
        }
    }

    /// The raw OS error code, for [`BtrfsError::Control`] errors.
    pub fn os_error(&self) -> Option<i32> {
        match self {
            BtrfsError::Control { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    /// The operation this error belongs to, where one is recorded.
    pub fn operation(&self) -> Option<Op> {
        match self {
            BtrfsError::DescriptorNotAllowed { operation } => Some(*operation),
            BtrfsError::Control { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// The failing path, for [`BtrfsError::Control`] errors on path targets.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            BtrfsError::Control { path, .. } => path.as_ref(),
            _ => None,
        }
    }
}

fn fmt_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" on {}", p.display()),
        None => String::new(),
    }
}

/// Result type alias for btrfsctl operations.
pub type Result<T> = std::result::Result<T, BtrfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_error_formats_operation_and_path() {
        let err = BtrfsError::control(Op::Sync, Some(PathBuf::from("/mnt/data")), libc::ENOENT);
        let msg = err.to_string();
        assert!(msg.starts_with("sync failed on /mnt/data: "), "got: {msg}");
    }

    #[test]
    fn control_error_without_path_omits_it() {
        let err = BtrfsError::control(Op::WaitSync, None, libc::EBADF);
        let msg = err.to_string();
        assert!(msg.starts_with("wait_sync failed: "), "got: {msg}");
    }

    #[test]
    fn control_error_round_trips_os_code() {
        let err = BtrfsError::control(Op::StartSync, None, libc::ENOTTY);
        assert_eq!(err.os_error(), Some(libc::ENOTTY));
        assert_eq!(err.operation(), Some(Op::StartSync));
    }

    #[test]
    fn input_errors_carry_no_os_code() {
        assert_eq!(BtrfsError::DescriptorNegative(-1).os_error(), None);
        assert_eq!(
            BtrfsError::EmbeddedNul(PathBuf::from("bad")).os_error(),
            None
        );
    }
}
