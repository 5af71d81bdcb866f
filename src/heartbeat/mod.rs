//! Heartbeat file liveness signal.
//!
//! [`Heart`] coalesces bursts of activity into single writes to a heartbeat
//! file; [`HeartbeatScheduler`] beats it periodically while an injected
//! activity predicate reports the server as busy. External watchers read the
//! file's modification time to decide whether the process is idle.

mod heart;
mod scheduler;
mod touch;

pub use heart::{Heart, HeartBuilder, DEFAULT_BEAT_DELAY};
pub use scheduler::{heartbeat_tick, HeartbeatScheduler};
pub use touch::{
    activity_check, default_touch, heartbeat_age, touch_file, touch_fn, ActivityCheck, Touch,
};
