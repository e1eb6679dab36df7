// src/main.rs — mirrors entry point

use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use mirrors::cli::{Cli, Commands};
use mirrors::core::ReviewPipeline;
use mirrors::credits::{CreditLedger, FileLedgerStore, JsonTransactionLog};
use mirrors::infra::config::Config;
use mirrors::infra::errors::MirrorsError;
use mirrors::infra::remote::fetch_remote_values;
use mirrors::infra::{logger, paths};
use mirrors::prompt::load_template;
use mirrors::provider::OpenAiReviewClient;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        match e.downcast_ref::<MirrorsError>() {
            Some(err) => {
                if let Some(raw) = err.raw_text() {
                    tracing::debug!(raw = %raw, "Undecodable review content");
                }
                eprintln!("error: {}", err.user_message());
            }
            None => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(Path::new(path))?
    } else {
        Config::load()?
    };

    // Remote values must be in place before the ledger seeds or the prompt loads.
    if let Some(remote) = config.remote.clone() {
        if let Some(values) = fetch_remote_values(&remote).await {
            config.apply_remote(values);
        }
    }

    paths::ensure_dirs().await?;

    let ledger = Arc::new(CreditLedger::initialize(
        Box::new(FileLedgerStore::open_default()),
        Box::new(JsonTransactionLog::open_default()),
        config.snaps.initial_count,
    )?);
    let template = load_template(&config.review);

    match cli.command {
        Commands::Snaps { history } => {
            mirrors::cli::snaps::show_snaps(&ledger, history);
            Ok(())
        }
        Commands::Prompt => {
            mirrors::cli::prompt::show_prompt(&template);
            Ok(())
        }
        Commands::Review { image, json } => {
            let client = OpenAiReviewClient::from_config(
                &config.provider,
                config.api_key()?,
                config.review.schema(),
            )?;
            let pipeline = ReviewPipeline::new(Arc::new(client), ledger, template);
            mirrors::cli::review::run_review(&pipeline, Path::new(&image), json).await
        }
    }
}
