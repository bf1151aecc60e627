//! # Daily News Digest
//!
//! Scrapes the day's top stories from a news homepage, summarizes each one
//! with Gemini, stores the day's digest and emails it to subscribers. The
//! same binary serves the small HTTP API subscribers sign up through.
//!
//! ## Usage
//!
//! ```sh
//! daily_news_digest run            # once a day, from cron or CI
//! daily_news_digest serve          # subscribe / unsubscribe / latest digest
//! ```
//!
//! ## Architecture
//!
//! `run` is a straight pipeline:
//! 1. **Indexing**: find top-story URLs on the homepage
//! 2. **Fetching**: download title, text and image of each story
//! 3. **Summarizing**: one Gemini call per story, fixed fallback text on failure
//! 4. **Storing**: upsert the digest under today's date
//! 5. **Mailing**: send the digest to every subscriber
//!
//! `serve` builds the shared state (pool, optional mailer) once, then hands it
//! to axum until Ctrl-C.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod db;
mod mailer;
mod models;
mod outputs;
mod pipeline;
mod repositories;
mod scrapers;
mod server;
mod summarizer;
mod utils;

use cli::{Cli, Command, RunArgs};
use mailer::{Mailer, SmtpMailer};
use outputs::json;
use scrapers::bbc::BbcScraper;
use server::AppState;
use sqlx::SqlitePool;
use summarizer::GeminiSummarizer;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if let Err(e) = dotenvy::dotenv() {
        // A missing .env is normal; anything else is worth knowing about.
        if !e.not_found() {
            eprintln!("Failed to load .env: {e}");
        }
    }

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(database_url = %args.database_url, "Parsed CLI arguments");

    let pool = db::create_pool(&args.database_url).await?;
    let mailer = SmtpMailer::from_args(&args.smtp)?;

    let result = match args.command {
        Command::Run(run_args) => run_once(run_args, &pool, mailer.as_ref()).await,
        Command::Serve(serve_args) => {
            let mailer = mailer.map(|m| Arc::new(m) as Arc<dyn Mailer>);
            let state = AppState::new(pool.clone(), mailer);
            server::serve(serve_args.bind, state).await
        }
    };

    pool.close().await;
    if let Err(ref e) = result {
        error!(error = %e, "Exiting with error");
    }
    result
}

async fn run_once(
    args: RunArgs,
    pool: &SqlitePool,
    mailer: Option<&SmtpMailer>,
) -> Result<(), Box<dyn Error>> {
    let api_key = args
        .google_api_key
        .filter(|k| !k.is_empty())
        .ok_or("GOOGLE_API_KEY not found in environment variables")?;

    // Early check: fail before scraping if the export dir is unusable
    if let Some(dir) = args.json_output_dir.as_deref() {
        ensure_writable_dir(dir).await?;
    }

    let source = BbcScraper::new(&args.news_url, args.news_limit)?;
    let summarizer = GeminiSummarizer::new(api_key, args.gemini_model)?;
    let mailer: Option<&dyn Mailer> = if args.no_email {
        info!("--no-email set; subscribers will not be mailed");
        None
    } else {
        mailer.map(|m| m as &dyn Mailer)
    };

    let date = Local::now().date_naive();
    info!(%date, news_url = %args.news_url, limit = args.news_limit, "news digest run starting");
    let report = pipeline::run(&source, &summarizer, pool, mailer, date).await?;
    info!(
        stored = report.digest.is_some(),
        emails_sent = report.emails_sent,
        emails_failed = report.emails_failed,
        "news digest run finished"
    );

    if let (Some(dir), Some(digest)) = (args.json_output_dir.as_deref(), report.digest.as_ref()) {
        if let Err(e) = json::write_digest(digest, dir).await {
            error!(error = %e, "Failed to write digest JSON");
        }
    }

    Ok(())
}
