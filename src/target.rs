//! Target references for control operations.
//!
//! A [`Target`] names the filesystem a control operation applies to: either a
//! path (stored as raw filesystem bytes) or an already-open descriptor. The
//! [`IntoTarget`] trait is the conversion seam the public operations accept,
//! covering strings, paths, byte paths, raw descriptors, and open files.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::File;
use std::os::fd::{AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::path::{Path, PathBuf};

use crate::error::{BtrfsError, Result};

/// A filesystem target for a control operation.
///
/// Exactly one variant is populated. A `Path` target owns its byte buffer;
/// a `Descriptor` target stays owned by the caller and is never closed by
/// this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A path in the platform's filesystem encoding.
    Path(Vec<u8>),
    /// An already-open descriptor, owned by the caller.
    Descriptor(RawFd),
}

impl Target {
    /// Builds a path target from anything path-shaped.
    ///
    /// # Errors
    ///
    /// [`BtrfsError::Encoding`] if the value cannot be represented in the
    /// platform's filesystem encoding.
    pub fn path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Target::Path(os_str_bytes(path.as_ref().as_os_str())?))
    }

    /// Builds a path target from raw filesystem bytes.
    pub fn bytes(path: impl Into<Vec<u8>>) -> Self {
        Target::Path(path.into())
    }

    /// Builds a descriptor target from an open descriptor.
    pub fn descriptor(fd: RawFd) -> Self {
        Target::Descriptor(fd)
    }

    /// Builds a descriptor target from a host-supplied integer.
    ///
    /// # Errors
    ///
    /// [`BtrfsError::DescriptorNegative`] for values below zero and
    /// [`BtrfsError::DescriptorOverflow`] for values above the platform's
    /// maximum representable descriptor.
    pub fn from_raw_descriptor(raw: i64) -> Result<Self> {
        if raw < 0 {
            return Err(BtrfsError::DescriptorNegative(raw));
        }
        if raw > RawFd::MAX as i64 {
            return Err(BtrfsError::DescriptorOverflow(raw));
        }
        Ok(Target::Descriptor(raw as RawFd))
    }

    /// The path this target names, if it is a path target.
    pub fn as_path(&self) -> Option<PathBuf> {
        match self {
            Target::Path(bytes) => Some(bytes_to_path(bytes)),
            Target::Descriptor(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Path(bytes) => write!(f, "path {}", String::from_utf8_lossy(bytes)),
            Target::Descriptor(fd) => write!(f, "descriptor {fd}"),
        }
    }
}

/// Conversion into a [`Target`].
///
/// Implemented for strings, paths, byte paths, raw descriptors, and borrowed
/// open files. Custom path-like types can implement it to become acceptable
/// targets; a failing conversion is propagated to the caller unchanged, not
/// reinterpreted as an unsupported-shape error.
pub trait IntoTarget {
    /// Converts `self` into a [`Target`].
    fn into_target(self) -> Result<Target>;
}

impl IntoTarget for Target {
    fn into_target(self) -> Result<Target> {
        Ok(self)
    }
}

impl IntoTarget for &Target {
    fn into_target(self) -> Result<Target> {
        Ok(self.clone())
    }
}

impl IntoTarget for &str {
    fn into_target(self) -> Result<Target> {
        Target::path(self)
    }
}

impl IntoTarget for String {
    fn into_target(self) -> Result<Target> {
        Target::path(&self)
    }
}

impl IntoTarget for &Path {
    fn into_target(self) -> Result<Target> {
        Target::path(self)
    }
}

impl IntoTarget for PathBuf {
    fn into_target(self) -> Result<Target> {
        Target::path(&self)
    }
}

impl IntoTarget for &OsStr {
    fn into_target(self) -> Result<Target> {
        Target::path(self)
    }
}

impl IntoTarget for OsString {
    fn into_target(self) -> Result<Target> {
        Target::path(&self)
    }
}

impl IntoTarget for &[u8] {
    fn into_target(self) -> Result<Target> {
        Ok(Target::bytes(self))
    }
}

impl IntoTarget for Vec<u8> {
    fn into_target(self) -> Result<Target> {
        Ok(Target::bytes(self))
    }
}

impl IntoTarget for RawFd {
    fn into_target(self) -> Result<Target> {
        Ok(Target::descriptor(self))
    }
}

impl IntoTarget for &File {
    fn into_target(self) -> Result<Target> {
        Ok(Target::descriptor(self.as_raw_fd()))
    }
}

impl IntoTarget for &OwnedFd {
    fn into_target(self) -> Result<Target> {
        Ok(Target::descriptor(self.as_raw_fd()))
    }
}

impl IntoTarget for BorrowedFd<'_> {
    fn into_target(self) -> Result<Target> {
        Ok(Target::descriptor(self.as_raw_fd()))
    }
}

#[cfg(unix)]
fn os_str_bytes(os: &OsStr) -> Result<Vec<u8>> {
    use std::os::unix::ffi::OsStrExt;
    Ok(os.as_bytes().to_vec())
}

#[cfg(not(unix))]
fn os_str_bytes(os: &OsStr) -> Result<Vec<u8>> {
    os.to_str()
        .map(|s| s.as_bytes().to_vec())
        .ok_or_else(|| BtrfsError::Encoding(os.to_os_string()))
}

#[cfg(unix)]
pub(crate) fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
pub(crate) fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_and_paths_become_path_targets() {
        assert_eq!(
            "/mnt/data".into_target().unwrap(),
            Target::Path(b"/mnt/data".to_vec())
        );
        assert_eq!(
            PathBuf::from("/mnt/data").into_target().unwrap(),
            Target::Path(b"/mnt/data".to_vec())
        );
    }

    #[test]
    fn byte_slices_become_path_targets_verbatim() {
        let raw: &[u8] = b"/mnt/\xff-not-utf8";
        assert_eq!(raw.into_target().unwrap(), Target::Path(raw.to_vec()));
    }

    #[test]
    fn integers_become_descriptor_targets() {
        assert_eq!(3.into_target().unwrap(), Target::Descriptor(3));
    }

    #[test]
    fn open_files_become_borrowed_descriptor_targets() {
        let file = tempfile::tempfile().unwrap();
        let fd = file.as_raw_fd();
        assert_eq!((&file).into_target().unwrap(), Target::Descriptor(fd));
    }

    #[test]
    fn raw_descriptor_range_is_split_into_two_errors() {
        assert!(matches!(
            Target::from_raw_descriptor(-1),
            Err(BtrfsError::DescriptorNegative(-1))
        ));
        let above_max = RawFd::MAX as i64 + 1;
        assert!(matches!(
            Target::from_raw_descriptor(above_max),
            Err(BtrfsError::DescriptorOverflow(v)) if v == above_max
        ));
    }

    #[test]
    fn raw_descriptor_bounds_are_inclusive() {
        assert_eq!(
            Target::from_raw_descriptor(0).unwrap(),
            Target::Descriptor(0)
        );
        assert_eq!(
            Target::from_raw_descriptor(RawFd::MAX as i64).unwrap(),
            Target::Descriptor(RawFd::MAX)
        );
    }

    #[test]
    fn custom_conversion_failure_propagates_unchanged() {
        struct Flaky;

        impl IntoTarget for Flaky {
            fn into_target(self) -> Result<Target> {
                Err(BtrfsError::Other(anyhow::anyhow!("config store offline")))
            }
        }

        let err = Flaky.into_target().unwrap_err();
        assert!(matches!(err, BtrfsError::Other(_)));
        assert_eq!(err.to_string(), "config store offline");
    }
}
