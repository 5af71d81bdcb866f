//! The Heart: coalesced, fire-and-forget heartbeat file updates.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::scheduler::HeartbeatScheduler;
use super::touch::{default_touch, ActivityCheck, Touch};
use crate::config::{HeartConfig, DEFAULT_BEAT_DELAY_MS};
use crate::error::{HeartError, Result};

/// Coalescing window between `beat()` and the file write.
///
/// Every `beat()` issued inside this window collapses into one write.
pub const DEFAULT_BEAT_DELAY: Duration = Duration::from_millis(DEFAULT_BEAT_DELAY_MS);

/// Liveness signal backed by a file's modification time.
///
/// One `Heart` is built per process by its composition root. Dropping it
/// disposes it.
pub struct Heart {
    inner: Arc<Inner>,
}

struct Inner {
    file_path: PathBuf,
    is_active: ActivityCheck,
    touch: Touch,
    beat_delay: Duration,
    runtime: Handle,
    state: Mutex<State>,
}

struct State {
    alive: bool,
    /// Coalescing timer; `Some` while a write is scheduled but not started.
    pending: Option<JoinHandle<()>>,
    scheduler: Option<JoinHandle<()>>,
    last_beat: Option<DateTime<Utc>>,
}

/// Builder for [`Heart`].
pub struct HeartBuilder {
    file_path: PathBuf,
    is_active: ActivityCheck,
    touch: Touch,
    beat_delay: Duration,
}

impl HeartBuilder {
    /// Override the coalescing window.
    pub fn beat_delay(mut self, delay: Duration) -> Self {
        self.beat_delay = delay;
        self
    }

    /// Override the file-touch primitive.
    pub fn touch(mut self, touch: Touch) -> Self {
        self.touch = touch;
        self
    }

    /// Build the heart on the current tokio runtime.
    pub fn build(self) -> Result<Heart> {
        let runtime = Handle::try_current().map_err(|_| HeartError::NoRuntime)?;
        Ok(Heart {
            inner: Arc::new(Inner {
                file_path: self.file_path,
                is_active: self.is_active,
                touch: self.touch,
                beat_delay: self.beat_delay,
                runtime,
                state: Mutex::new(State {
                    alive: true,
                    pending: None,
                    scheduler: None,
                    last_beat: None,
                }),
            }),
        })
    }
}

impl Heart {
    /// Create a heart with the default delay and file-touch primitive.
    pub fn new(file_path: impl Into<PathBuf>, is_active: ActivityCheck) -> Result<Self> {
        Self::builder(file_path, is_active).build()
    }

    pub fn builder(file_path: impl Into<PathBuf>, is_active: ActivityCheck) -> HeartBuilder {
        HeartBuilder {
            file_path: file_path.into(),
            is_active,
            touch: default_touch(),
            beat_delay: DEFAULT_BEAT_DELAY,
        }
    }

    /// Create a heart from loaded configuration.
    pub fn from_config(config: &HeartConfig, is_active: ActivityCheck) -> Result<Self> {
        config.validate()?;
        Self::builder(config.heartbeat_path.clone(), is_active)
            .beat_delay(config.beat_delay())
            .build()
    }

    /// Schedule a heartbeat file update.
    ///
    /// Never blocks and never fails: a no-op when a write is already pending
    /// or the heart is disposed, and write failures are only logged.
    pub fn beat(&self) {
        self.inner.beat();
    }

    /// Whether `dispose()` has not yet been called.
    pub fn alive(&self) -> bool {
        self.inner.state.lock().alive
    }

    /// Stop the heart. Cancels any pending write and the scheduler.
    ///
    /// Idempotent. A write whose delay already elapsed may still complete.
    pub fn dispose(&self) {
        let mut state = self.inner.state.lock();
        if !state.alive {
            return;
        }
        state.alive = false;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        if let Some(scheduler) = state.scheduler.take() {
            scheduler.abort();
        }
        debug!("Heart disposed ({})", self.inner.file_path.display());
    }

    /// Start checking activity every `period`, beating while active.
    ///
    /// No-op if the heart is disposed or the scheduler is already running.
    pub fn start(&self, period: Duration) {
        let mut state = self.inner.state.lock();
        if !state.alive {
            return;
        }
        if state.scheduler.is_some() {
            debug!("Heartbeat scheduler already running");
            return;
        }

        let scheduler = HeartbeatScheduler::new(period);
        let inner = Arc::clone(&self.inner);
        state.scheduler = Some(self.inner.runtime.spawn(async move {
            let beater = Arc::clone(&inner);
            scheduler
                .run(move || (inner.is_active)(), move || beater.beat())
                .await;
        }));

        info!(
            "Heartbeat started (interval={:?}, file={})",
            scheduler.period(),
            self.inner.file_path.display()
        );
    }

    pub fn file_path(&self) -> &Path {
        &self.inner.file_path
    }

    /// Time of the last successful heartbeat file write.
    pub fn last_beat(&self) -> Option<DateTime<Utc>> {
        self.inner.state.lock().last_beat
    }
}

impl Drop for Heart {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Inner {
    fn beat(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if !state.alive || state.pending.is_some() {
            return;
        }
        debug!("heartbeat");
        let inner = Arc::clone(self);
        // The lock is held until `pending` is set, so the task cannot observe
        // an empty slot for its own timer.
        state.pending = Some(self.runtime.spawn(inner.fire()));
    }

    async fn fire(self: Arc<Self>) {
        tokio::time::sleep(self.beat_delay).await;

        {
            let mut state = self.state.lock();
            state.pending = None;
            if !state.alive {
                return;
            }
        }

        match (self.touch)(self.file_path.clone()).await {
            Ok(()) => {
                self.state.lock().last_beat = Some(Utc::now());
            }
            Err(e) => {
                warn!(
                    "Failed to write heartbeat file {}: {}",
                    self.file_path.display(),
                    e
                );
            }
        }
    }
}
