use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use feedrelay::config::Config;
use feedrelay::feed::FeedFetcher;
use feedrelay::output::write_envelope;
use feedrelay::transport::HttpTransport;

#[derive(Parser, Debug)]
#[command(
    name = "feedrelay",
    about = "Fetch an RSS feed through a direct-then-proxy fallback chain"
)]
struct Args {
    /// TOML config file (built-in defaults when omitted or missing)
    #[arg(long, short, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the envelope over HTTP, fetching once per GET request
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured bind port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch once and write the envelope to a JSON file
    Fetch {
        /// Override the configured output path
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    let policy = config
        .fetch_policy()
        .context("Invalid candidate configuration")?;
    let transport = HttpTransport::new().context("Failed to build HTTP client")?;
    let fetcher = FeedFetcher::new(transport, policy);

    match args.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("Invalid bind address {host}:{port}"))?;

            feedrelay::web::serve(addr, &config.server.path, fetcher)
                .await
                .context("HTTP server failed")?;
        }
        Command::Fetch { output } => {
            let output = output.unwrap_or(config.output_path);
            let envelope = fetcher.fetch().await;

            write_envelope(&output, &envelope)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "Wrote {} (success={})",
                output.display(),
                envelope.is_success()
            );
        }
    }

    Ok(())
}
