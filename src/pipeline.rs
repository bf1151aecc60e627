//! The daily digest run: index → fetch → summarize → store → mail.
//!
//! Articles are processed one at a time. A story that fails to download is
//! skipped; a story whose summary fails keeps a fixed fallback summary
//! (see [`crate::summarizer::summarize_or_fallback`]). Only a failed homepage
//! index or a failed digest write aborts the run.

use crate::mailer::{self, Mailer};
use crate::models::{Article, Digest};
use crate::repositories::{DigestStore, SubscriberRegistry};
use crate::scrapers::ArticleSource;
use crate::summarizer::{summarize_or_fallback, Summarize};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::error::Error;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Outcome of one pipeline run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// The stored digest; `None` when the homepage had no top stories.
    pub digest: Option<Digest>,
    pub emails_sent: usize,
    pub emails_failed: usize,
}

/// Run the pipeline once for `date`.
///
/// Re-running for a date that already has a digest replaces it. Pass
/// `mailer: None` to store without sending.
#[instrument(level = "info", skip_all, fields(%date))]
pub async fn run<S, Z>(
    source: &S,
    summarizer: &Z,
    db: &SqlitePool,
    mailer: Option<&dyn Mailer>,
    date: NaiveDate,
) -> Result<RunReport, Box<dyn Error>>
where
    S: ArticleSource,
    Z: Summarize,
{
    let start_time = Instant::now();

    let urls = source.index_articles().await?;
    if urls.is_empty() {
        warn!("Homepage returned no top stories; nothing stored");
        return Ok(RunReport::default());
    }

    let scraped = source.fetch_articles(urls).await;
    let total = scraped.len();
    info!(count = total, "Articles to summarize");

    let mut articles = Vec::with_capacity(total);
    for (i, story) in scraped.into_iter().enumerate() {
        info!(index = i + 1, total, title = %story.title, "Summarizing article");
        let summary = summarize_or_fallback(summarizer, &story).await;
        articles.push(Article::from_scraped(story, summary));
    }

    let digest = Digest { date, articles };
    db.save_digest(&digest).await?;
    info!(articles = digest.articles.len(), "Digest stored");

    let (emails_sent, emails_failed) = match mailer {
        Some(mailer) => deliver_digest(db, mailer, &digest).await?,
        None => {
            warn!("Email delivery disabled; digest not emailed");
            (0, 0)
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = digest.articles.len(),
        emails_sent,
        emails_failed,
        "Pipeline complete"
    );

    Ok(RunReport {
        digest: Some(digest),
        emails_sent,
        emails_failed,
    })
}

/// Send `digest` to every subscriber. Individual failures are logged and counted.
#[instrument(level = "info", skip_all, fields(date = %digest.date))]
pub async fn deliver_digest(
    registry: &dyn SubscriberRegistry,
    mailer: &dyn Mailer,
    digest: &Digest,
) -> Result<(usize, usize), sqlx::Error> {
    let subscribers = registry.list().await?;
    info!(count = subscribers.len(), "Emailing subscribers");

    let mut sent = 0;
    let mut failed = 0;
    for subscriber in subscribers {
        let email = mailer::digest_email(&subscriber.email, digest.date, &digest.articles);
        match mailer.send(email).await {
            Ok(()) => sent += 1,
            Err(e) => {
                failed += 1;
                error!(email = %subscriber.email, error = %e, "Digest email failed");
            }
        }
    }
    Ok((sent, failed))
}
