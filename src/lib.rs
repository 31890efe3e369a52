#![doc = include_str!("../README.md")]

pub mod error;
pub mod ops;
pub mod qgroup;
pub mod target;

mod resolve;
mod sys;

pub use error::*;
pub use ops::{Op, TransactionId, start_sync, sync, wait_sync};
pub use qgroup::QgroupInherit;
pub use target::{IntoTarget, Target};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
