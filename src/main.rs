use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use searchbot::api::HttpBackend;
use searchbot::config::CONFIG;
use searchbot::terminal::TerminalView;
use searchbot::{ControllerSettings, SearchController, SubmitOutcome};

#[derive(Parser)]
#[command(name = "searchbot", about = "Run search-and-visit jobs against a searchbot server")]
struct Cli {
    /// Server base URL (defaults to SEARCHBOT_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether the server is up
    Health,
    /// Search for a query and visit the target website's result
    Search {
        #[arg(short, long)]
        query: String,
        #[arg(short, long)]
        website: String,
        /// Seconds of simulated scrolling on the visited page
        #[arg(short, long)]
        scroll_duration: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Also picks up records from the `log` facade used by the library.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let base_url = cli.base_url.unwrap_or_else(|| CONFIG.base_url.clone());
    let backend = Arc::new(
        HttpBackend::with_timeout(base_url, CONFIG.request_timeout())
            .context("Failed to create backend client")?,
    );
    tracing::info!("using server {}", backend.base_url());

    match cli.command {
        Command::Health => {
            let view = Arc::new(TerminalView::new("", "", None));
            let controller =
                SearchController::new(backend, view, ControllerSettings::from_config());
            if controller.health_probe().check().await.is_none() {
                println!("○ offline (health check failed)");
            }
        }
        Command::Search {
            query,
            website,
            scroll_duration,
        } => {
            let view = Arc::new(TerminalView::new(&query, &website, scroll_duration));
            let controller =
                SearchController::new(backend, view.clone(), ControllerSettings::from_config());

            tokio::spawn({
                let probe = controller.health_probe();
                async move {
                    probe.check().await;
                }
            });

            match controller.submit().await {
                SubmitOutcome::Succeeded { session_id, .. } => {
                    controller.settle_animations().await;
                    for (metric, value) in view.metric_summary() {
                        tracing::debug!("{}: {}", metric.id(), value);
                    }
                    tracing::info!("session {session_id} done");
                }
                SubmitOutcome::Failed { session_id, error } => {
                    anyhow::bail!("session {session_id} failed: {error}");
                }
                SubmitOutcome::Invalid => anyhow::bail!("query and website must not be empty"),
                SubmitOutcome::Ignored => anyhow::bail!("a search is already running"),
            }
        }
    }

    Ok(())
}
