//! Refresh scheduler and notification engine.
//!
//! One process-lifetime loop per instance: fetch the catalog, alert
//! subscribers whose target came online, sweep expired subscriptions, then
//! sleep for an interval chosen from the local hour. Every step degrades to
//! a log line on failure; nothing in a tick can take the loop down.

pub mod interval;
pub mod matcher;
pub mod scheduler;
pub mod sweeper;

#[cfg(test)]
pub(crate) mod testing;

pub use interval::{AwakeWindow, PollTier};
pub use scheduler::RefreshScheduler;
