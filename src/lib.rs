//! heartfile - coalesced filesystem heartbeat for idle-aware servers

pub mod activity;
pub mod config;
pub mod error;
pub mod heartbeat;

#[cfg(test)]
pub(crate) mod test_support;

pub use activity::{ConnectionGuard, ConnectionTracker};
pub use config::HeartConfig;
pub use error::{HeartError, Result};
pub use heartbeat::{heartbeat_tick, Heart, HeartbeatScheduler};
