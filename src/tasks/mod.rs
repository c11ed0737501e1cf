//! Background Tasks Module
//!
//! # Tasks
//! - Expiry purge: drops expired and stale-version entries at a configured interval

mod purge;

pub use purge::spawn_purge_task;
