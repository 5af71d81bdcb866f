//! Timer-driven activity checks.
//!
//! A single tick is split from the repeating driver so the tick's error
//! handling can be tested without waiting on real timers.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

/// Smallest period the repeating driver accepts.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Run one activity check and beat if the server is active.
///
/// `beat` is called exactly once when the predicate resolves to `true`, and
/// never when it resolves to `false` or fails. A failing predicate is logged
/// at WARN and otherwise swallowed. Returns whether `beat` was called.
pub async fn heartbeat_tick<C, Fut, B>(is_active: C, beat: B) -> bool
where
    C: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
    B: FnOnce(),
{
    match is_active().await {
        Ok(true) => {
            beat();
            true
        }
        Ok(false) => false,
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}

/// Repeating driver around [`heartbeat_tick`].
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatScheduler {
    period: Duration,
}

impl HeartbeatScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick forever. The first check happens one full period after start.
    ///
    /// This future never completes on its own; stop it by dropping it or
    /// aborting the task it runs in.
    pub async fn run<C, Fut, B>(self, is_active: C, beat: B)
    where
        C: Fn() -> Fut,
        Fut: Future<Output = anyhow::Result<bool>>,
        B: Fn(),
    {
        debug!("Heartbeat scheduler running (period={:?})", self.period);

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            heartbeat_tick(&is_active, &beat).await;
        }
    }
}
