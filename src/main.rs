//! Mindful Chat CLI
//!
//! Talk to the mental-health support assistant from a terminal.

use clap::Parser;
use mindful_chat::config::ConfigOverrides;
use mindful_chat::console::Console;
use mindful_chat::{ChatController, ChatGateway, ClientConfig, HealthMonitor, HttpGateway};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Mindful Chat - mental health support assistant client
#[derive(Parser, Debug)]
#[command(name = "mindful-chat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the assistant backend
    #[arg(long)]
    api_url: Option<String>,

    /// Path to a config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Seconds between backend health checks
    #[arg(long)]
    health_interval: Option<u64>,

    /// Do not poll the backend health endpoint
    #[arg(long)]
    no_health: bool,

    /// Verbose output: log gateway traffic
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            request_timeout_secs: self.timeout,
            health_interval_secs: self.health_interval,
            no_health: self.no_health,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose; logs go to stderr so they stay out of the chat
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::load(cli.config.as_deref()).await?;
    config.apply_overrides(&cli.overrides());

    let gateway: Arc<dyn ChatGateway> = Arc::new(HttpGateway::new(&config)?);
    let controller = ChatController::new(gateway.clone());
    info!(
        "Starting Mindful Chat against {} (session {})",
        config.api_url,
        controller.session_id()
    );

    let mut console = Console::new(controller, gateway.clone(), std::io::stdout());

    let monitor = if config.health_check {
        let (monitor, online) = HealthMonitor::new(gateway, config.health_interval);
        console = console.with_online_flag(online);
        Some(monitor.spawn())
    } else {
        None
    };

    console.run(BufReader::new(tokio::io::stdin())).await?;

    if let Some(handle) = monitor {
        handle.abort();
    }

    Ok(())
}
