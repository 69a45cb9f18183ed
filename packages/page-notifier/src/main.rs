// Entry point: run one check of the page and exit.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use page_notifier::{extractors, run_once, Config, NtfyNotifier, RunOptions, SeenStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "page-notifier", version, about = "Notify about new Facebook page posts")]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, env = "FB_NOTIFIER_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Extract and diff only; send nothing and leave the seen-set alone
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,page_notifier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config).context("Failed to load configuration")?;
    tracing::info!(
        source = config.source.describe(),
        topic = %config.ntfy_topic,
        "Configuration loaded"
    );

    let extractor = extractors::from_config(&config).context("Failed to set up extractor")?;
    let notifier = NtfyNotifier::from_config(&config).context("Failed to set up ntfy client")?;
    let store = SeenStore::new(&config.seen_posts_file);

    let options = RunOptions {
        first_run: config.first_run,
        post_order: config.post_order,
        dry_run: cli.dry_run,
    };

    let summary = run_once(extractor.as_ref(), &notifier, &store, &options)
        .await
        .context("Run failed")?;

    tracing::info!(
        extracted = summary.extracted,
        new_posts = summary.new_posts,
        sent = summary.report.sent.len(),
        failed = summary.report.failed.len(),
        "Processed {} new posts",
        summary.new_posts
    );
    Ok(())
}
