//! Tempbox CLI
//!
//! - `watch`: live gauge in the terminal
//! - `chart`: print the history series
//! - `export`: write the history as CSV
//! - `serve`: poller plus HTTP API
//! - `config`: print a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use tempbox::api::{self, AppState};
use tempbox::export::{export_csv, parse_range, ExportError, EXPORT_FILENAME};
use tempbox::feed::FeedClient;
use tempbox::poller::{FeedState, FeedStore, Poller, PollerConfig};
use tempbox::views::{ChartView, FormatPolicy, GaugeView};
use tempbox::{config, logging, Config};

#[derive(Parser)]
#[command(name = "tempbox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Temperature dashboard for an Adafruit IO feed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/tempbox/config.toml, /etc/tempbox/config.toml, ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll periodically and print the gauge on every change
    Watch,

    /// Fetch once and print the chart series, oldest first
    Chart,

    /// Fetch once and write the history as CSV
    Export {
        /// Start of range (inclusive). Supports: 2024-01-01T10:00, 2024-01-01, RFC 3339, now-6h
        #[arg(short, long)]
        start: Option<String>,
        /// End of range (inclusive)
        #[arg(short, long)]
        end: Option<String>,
        /// Output file
        #[arg(short, long, default_value = EXPORT_FILENAME)]
        output: PathBuf,
    },

    /// Run the poller and the HTTP API
    Serve,

    /// Print a default config file
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = config::generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Wrote default config to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let loaded = Config::resolve(cli.config.as_deref()).context("Failed to load config")?;
    logging::init(&loaded.config.logging);
    loaded.report();

    let config = loaded.config;
    config.warn_incomplete();

    let policy = config.format_policy()?;
    let client = FeedClient::new(config.client_config()).context("Failed to build HTTP client")?;
    let store = Arc::new(FeedStore::new());

    match cli.command {
        Commands::Watch => {
            let poller = Poller::new(
                Arc::new(client),
                Arc::clone(&store),
                config.periodic_poller(),
                policy,
            );
            watch(poller, &config, policy).await;
        }

        Commands::Chart => {
            let snapshot = fetch_once(client, &store, config.one_shot_poller(), policy).await;
            let chart = ChartView::from_snapshot(&snapshot, &policy);

            println!("{}", chart.series);
            for (label, value) in chart.labels.iter().zip(&chart.points) {
                println!("{}\t{}", label, value);
            }
        }

        Commands::Export { start, end, output } => {
            let range = parse_range(start.as_deref(), end.as_deref(), policy.zone)?;
            let snapshot = fetch_once(client, &store, config.one_shot_poller(), policy).await;

            match export_csv(&snapshot.history, &range, policy.zone) {
                Ok(bytes) => {
                    std::fs::write(&output, &bytes)
                        .with_context(|| format!("Failed to write {:?}", output))?;
                    println!("Exported {} bytes to {:?}", bytes.len(), output);
                }
                Err(ExportError::EmptyExport) => {
                    eprintln!("{}", policy.labels().empty_export);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Serve => {
            let poller = Poller::new(
                Arc::new(client),
                Arc::clone(&store),
                config.periodic_poller(),
                policy,
            );
            let handle = poller.start();

            tracing::info!("Starting Tempbox v{}", env!("CARGO_PKG_VERSION"));
            let state = AppState::new(Arc::clone(&store), policy, config.gauge_spec());
            let result = api::serve(state, &config.bind_addr()).await;

            tracing::info!("Stopping poller...");
            handle.stop().await;
            result?;
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Single poll; exits with the user-facing message when it fails
async fn fetch_once(
    client: FeedClient,
    store: &Arc<FeedStore>,
    poller_config: PollerConfig,
    policy: FormatPolicy,
) -> Arc<tempbox::Snapshot> {
    let poller = Poller::new(Arc::new(client), Arc::clone(store), poller_config, policy);
    poller.poll_once().await;

    match store.current() {
        FeedState::Ready(snapshot) => snapshot,
        FeedState::Error(failure) => {
            eprintln!("{}", failure.message);
            eprintln!("Error: {}", failure.detail);
            std::process::exit(1);
        }
        FeedState::Loading => {
            eprintln!("{}", policy.labels().nothing_to_export);
            std::process::exit(1);
        }
    }
}

async fn watch(poller: Poller, config: &Config, policy: FormatPolicy) {
    let spec = config.gauge_spec();
    let mut watcher = poller.store().subscribe();
    let handle = poller.start();

    println!("{}", policy.labels().loading);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = watcher.changed() => match changed {
                Some(FeedState::Ready(snapshot)) => {
                    println!("{}", GaugeView::from_snapshot(&snapshot, &policy, &spec).line());
                }
                Some(FeedState::Error(failure)) => {
                    eprintln!("{}", failure.message);
                }
                Some(FeedState::Loading) => {}
                None => break,
            },
        }
    }

    handle.stop().await;
}
