//! Status command: report heartbeat file age the way a watcher sees it.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use heartfile::heartbeat::heartbeat_age;

use super::ConfigArgs;

pub(crate) async fn cmd_status(config_args: ConfigArgs) -> Result<()> {
    let config = config_args.resolve()?;
    let path = &config.heartbeat_path;

    let modified: DateTime<Local> = tokio::fs::metadata(path)
        .await
        .and_then(|meta| meta.modified())
        .with_context(|| format!("No heartbeat file at {}", path.display()))?
        .into();
    let age = heartbeat_age(path)
        .await
        .with_context(|| format!("Failed to stat {}", path.display()))?;

    println!("Heartbeat file: {}", path.display());
    println!("Last beat:      {}", modified.format("%Y-%m-%d %H:%M:%S"));
    println!("Age:            {}s", age.as_secs());
    if age > config.idle_threshold() {
        println!("State:          idle (no beat for over two check intervals)");
    } else {
        println!("State:          active");
    }
    Ok(())
}
