//! Background Tasks Module
//!
//! Opportunistic periodic work, exposed as spawn/abort handles so the
//! binaries control their lifecycle.
//!
//! # Tasks
//! - Expiry sweep: removes expired cache entries at an interval
//! - Periodic backup: snapshots the store at an interval

mod backup;
mod cleanup;

pub use backup::spawn_backup_task;
pub use cleanup::spawn_cleanup_task;
