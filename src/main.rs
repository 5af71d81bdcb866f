use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::ConfigArgs;

#[derive(Parser)]
#[command(name = "heartfile")]
#[command(about = "Keep a heartbeat file fresh while a server is active", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a TCP echo server that beats while clients are connected
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        listen: String,
        #[command(flatten)]
        config: ConfigArgs,
        /// Coalescing window for heartbeat writes, in milliseconds
        #[arg(long)]
        beat_delay_ms: Option<u64>,
        /// How often to check for activity (e.g. 60s, 5m)
        #[arg(long)]
        check_interval: Option<String>,
    },
    /// Show when the heartbeat file was last written
    Status {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) | None => {
            println!("heartfile {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve {
            listen,
            config,
            beat_delay_ms,
            check_interval,
        }) => {
            cli::cmd_serve(listen, config, beat_delay_ms, check_interval).await?;
        }
        Some(Commands::Status { config }) => {
            cli::cmd_status(config).await?;
        }
    }

    Ok(())
}
