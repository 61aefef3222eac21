//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the process.
//!
//! # Tasks
//! - Expiry Sweeper: removes time-expired cache entries at a fixed interval

mod sweeper;

pub use sweeper::spawn_sweeper_task;
