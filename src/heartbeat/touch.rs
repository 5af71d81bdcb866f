//! Heartbeat file primitives and injected function types.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures::future::{BoxFuture, FutureExt};

/// Injected "is the server doing meaningful work right now?" predicate.
pub type ActivityCheck = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<bool>> + Send + Sync>;

/// Injected primitive that refreshes the heartbeat file's modification time.
pub type Touch = Arc<dyn Fn(PathBuf) -> BoxFuture<'static, std::io::Result<()>> + Send + Sync>;

/// Box an async closure into an [`ActivityCheck`].
pub fn activity_check<F, Fut>(f: F) -> ActivityCheck
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Box an async closure into a [`Touch`].
pub fn touch_fn<F, Fut>(f: F) -> Touch
where
    F: Fn(PathBuf) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::io::Result<()>> + Send + 'static,
{
    Arc::new(move |path| f(path).boxed())
}

/// Default touch primitive.
///
/// Rewrites the file with the current RFC 3339 timestamp. Rewriting (rather
/// than only opening) guarantees the modification time moves forward. The
/// parent directory is not created: a missing directory is a write failure.
pub async fn touch_file(path: PathBuf) -> std::io::Result<()> {
    let stamp = format!("{}\n", chrono::Utc::now().to_rfc3339());
    tokio::fs::write(&path, stamp).await
}

/// The default [`Touch`], backed by [`touch_file`].
pub fn default_touch() -> Touch {
    touch_fn(touch_file)
}

/// How long ago the heartbeat file was last modified.
///
/// This is the quantity an external watcher compares against its idle
/// threshold. A modification time in the future reads as zero age.
pub async fn heartbeat_age(path: &Path) -> std::io::Result<Duration> {
    let modified = tokio::fs::metadata(path).await?.modified()?;
    Ok(SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO))
}
