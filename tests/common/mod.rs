//! Shared helpers for btrfsctl integration tests.
//!
//! Resolution and error-path behavior is verified on any Linux filesystem.
//! The end-to-end sync scenarios need a real Btrfs mount and are skipped
//! unless `BTRFSCTL_TEST_MOUNT` points at one.

use std::path::PathBuf;

/// Route crate logs to the test harness output.
#[allow(unused)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Btrfs mount point for end-to-end tests, if one was provided.
#[allow(unused)]
pub fn btrfs_mount() -> Option<PathBuf> {
    std::env::var_os("BTRFSCTL_TEST_MOUNT").map(PathBuf::from)
}
