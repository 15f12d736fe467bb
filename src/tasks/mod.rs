//! Background Tasks Module
//!
//! Work that runs off the caller's thread.
//!
//! # Tasks
//! - Maintenance: trims the cache to its byte budget and compacts the journal
//! - Asynchronous open: replays the journal on Tokio's blocking pool

mod maintenance;
mod open;

pub(crate) use maintenance::{spawn_maintenance_worker, MaintenanceQueue};
pub use open::PendingCache;
pub(crate) use open::spawn_open;
