//! Serve command: a TCP echo server that keeps the heartbeat file fresh
//! while clients are connected.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use heartfile::{ConnectionGuard, ConnectionTracker, Heart};

use super::{parse_interval, ConfigArgs};

pub(crate) async fn cmd_serve(
    listen: String,
    config_args: ConfigArgs,
    beat_delay_ms: Option<u64>,
    check_interval: Option<String>,
) -> Result<()> {
    let mut config = config_args.resolve()?;
    if let Some(ms) = beat_delay_ms {
        config.beat_delay_ms = ms;
    }
    if let Some(interval) = check_interval {
        config.check_interval_secs = parse_interval(&interval)?;
    }

    let tracker = ConnectionTracker::new();
    let heart = Arc::new(
        Heart::from_config(&config, tracker.activity_check())
            .with_context(|| "Failed to create heart")?,
    );
    heart.start(config.check_interval());

    let listener = TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    info!(
        "Listening on {} (heartbeat file: {})",
        listener.local_addr()?,
        config.heartbeat_path.display()
    );

    // Startup counts as activity.
    heart.beat();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!("Connection from {}", peer);
                        heart.beat();
                        let guard = tracker.track();
                        tokio::spawn(handle_connection(stream, Arc::clone(&heart), guard));
                    }
                    Err(e) => {
                        warn!("Accept failed: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    heart.dispose();
    Ok(())
}

/// Echo bytes back, beating on every chunk received.
async fn handle_connection(mut stream: TcpStream, heart: Arc<Heart>, _guard: ConnectionGuard) {
    let mut buf = [0u8; 4096];
    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!("Read failed: {}", e);
                break;
            }
        };
        heart.beat();
        if let Err(e) = stream.write_all(&buf[..n]).await {
            debug!("Write failed: {}", e);
            break;
        }
    }
}
