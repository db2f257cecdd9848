// Checks that chat API endpoints are reachable

use anyhow::{bail, Context, Result};
use chatbot_errors::{ChatBotError, ProbeConfig, Prober};
use clap::Parser;
use colored::Colorize;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chatbot-probe")]
#[command(about = "Probe chat API endpoints and report normalized errors")]
struct Cli {
    /// Endpoints to probe (defaults to CHATBOT_PROBE_URLS)
    urls: Vec<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chatbot_errors=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = ProbeConfig::from_env().context("Failed to load configuration")?;
    if !cli.urls.is_empty() {
        config.urls = cli.urls;
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    let prober = Prober::new(&config).context("Failed to build HTTP client")?;
    tracing::info!(endpoints = config.urls.len(), "Probing chat endpoints");

    let mut failures = 0;
    for (url, outcome) in prober.check_all(&config.urls).await {
        match outcome {
            Ok(report) => println!(
                "{} {} ({} in {}ms)",
                "✓".bright_green(),
                url,
                report.status,
                report.elapsed.as_millis()
            ),
            Err(err) => {
                failures += 1;
                println!(
                    "{} {} [{}] {}",
                    "✗".bright_red(),
                    url,
                    category(&err).yellow(),
                    err
                );
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} endpoints failed", failures, config.urls.len());
    }

    Ok(())
}

fn category(err: &ChatBotError) -> &'static str {
    match err {
        ChatBotError::Client(_) => "client",
        ChatBotError::GatewayNotFound => "gateway",
        ChatBotError::Http(e) => e.kind().as_str(),
        ChatBotError::RateLimited(_) => "rate limited",
    }
}
