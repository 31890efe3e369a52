//! The filesystem control operations.
//!
//! Each operation resolves its target per call, issues one control request,
//! and relays the kernel's response verbatim: success, or the raw OS error
//! wrapped with the operation name and path as [`BtrfsError::Control`]. No
//! retries, no reinterpretation, no state kept between calls.

use std::fmt;

use crate::error::{BtrfsError, Result};
use crate::resolve::resolve;
use crate::sys;
use crate::target::{IntoTarget, Target};

/// A control operation, as recorded in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Blocking whole-filesystem sync.
    Sync,
    /// Asynchronous sync start.
    StartSync,
    /// Wait for a transaction to become durable.
    WaitSync,
}

impl Op {
    /// The operation's name as exposed at the API surface.
    pub fn name(self) -> &'static str {
        match self {
            Op::Sync => "sync",
            Op::StartSync => "start_sync",
            Op::WaitSync => "wait_sync",
        }
    }

    /// Whether this operation accepts an open descriptor as its target.
    ///
    /// A fixed per-operation policy, enforced by resolution. All three sync
    /// operations accept descriptors; path-only operations would say so here.
    pub fn accepts_descriptor(self) -> bool {
        match self {
            Op::Sync | Op::StartSync | Op::WaitSync => true,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque identifier of a filesystem transaction.
///
/// Assigned monotonically by the filesystem; uniqueness and ordering are the
/// filesystem's guarantees, not this crate's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    /// The filesystem's currently open transaction, in wait requests.
    pub const CURRENT: TransactionId = TransactionId(0);

    /// Builds an id from a host-supplied integer.
    ///
    /// # Errors
    ///
    /// [`BtrfsError::InvalidTransactionId`] for values below zero.
    pub fn from_raw(raw: i64) -> Result<Self> {
        if raw < 0 {
            return Err(BtrfsError::InvalidTransactionId(raw));
        }
        Ok(TransactionId(raw as u64))
    }

    /// The raw id value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for TransactionId {
    fn from(id: u64) -> Self {
        TransactionId(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Syncs the Btrfs filesystem `target` lives on.
///
/// Blocks until the filesystem reports that all pending state is durable.
/// There is no partial success: either the whole filesystem's pending state
/// reached stable storage, or an error is returned.
///
/// `target` may be a string, bytes, path-like value, or open descriptor.
pub fn sync(target: impl IntoTarget) -> Result<()> {
    let target = target.into_target()?;
    let handle = resolve(&target, Op::Sync, Op::Sync.accepts_descriptor())?;
    log::debug!("sync: forcing sync on {target}");
    sys::sync(handle.as_raw_fd()).map_err(|source| control_error(Op::Sync, &target, source))
}

/// Starts a sync on the Btrfs filesystem `target` lives on and returns the
/// transaction id assigned to it.
///
/// Does not wait for durability; pass the returned id to [`wait_sync`] to
/// block until the sync completes.
///
/// `target` may be a string, bytes, path-like value, or open descriptor.
pub fn start_sync(target: impl IntoTarget) -> Result<TransactionId> {
    let target = target.into_target()?;
    let handle = resolve(&target, Op::StartSync, Op::StartSync.accepts_descriptor())?;
    let transid = sys::start_sync(handle.as_raw_fd())
        .map_err(|source| control_error(Op::StartSync, &target, source))?;
    log::debug!("start_sync: transaction {transid} in flight on {target}");
    Ok(TransactionId(transid))
}

/// Waits for a transaction to become durable on the Btrfs filesystem
/// `target` lives on.
///
/// `transid` is a transaction id from [`start_sync`], or `None` (equivalent
/// to [`TransactionId::CURRENT`]) for the currently open transaction. Blocks
/// until the filesystem reports durability.
///
/// `target` may be a string, bytes, path-like value, or open descriptor.
pub fn wait_sync(target: impl IntoTarget, transid: impl Into<Option<TransactionId>>) -> Result<()> {
    let target = target.into_target()?;
    let transid = transid.into().unwrap_or(TransactionId::CURRENT);
    let handle = resolve(&target, Op::WaitSync, Op::WaitSync.accepts_descriptor())?;
    log::debug!("wait_sync: waiting for transaction {transid} on {target}");
    sys::wait_sync(handle.as_raw_fd(), transid.as_u64())
        .map_err(|source| control_error(Op::WaitSync, &target, source))
}

fn control_error(operation: Op, target: &Target, source: std::io::Error) -> BtrfsError {
    BtrfsError::Control {
        operation,
        path: target.as_path(),
        source,
    }
}
