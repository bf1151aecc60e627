//! News source scrapers for fetching the day's top stories.
//!
//! A scraper follows the same two-phase pattern as every source before it:
//!
//! 1. **Indexing**: discover top-story URLs from the homepage
//! 2. **Fetching**: download and parse title, body text and lead image of each story
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | BBC News | [`bbc`] | HTML scraping | `/news/articles/` links on the homepage |
//!
//! Failed story fetches are logged and skipped; only a failed homepage fetch
//! is an error.

use crate::models::ScrapedArticle;
use std::error::Error;

pub mod bbc;

/// Body text used when a story page had no recognizable paragraphs.
pub const NO_CONTENT_PLACEHOLDER: &str = "Could not find article content.";

/// Title used when a story page had neither `#main-heading` nor `<h1>`.
pub const NO_TITLE_PLACEHOLDER: &str = "No title found";

/// Browser-like User-Agent; news sites tend to serve bots a stripped page.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// A source of top stories.
pub trait ArticleSource {
    /// Return up to the configured number of top-story URLs, deduplicated, in page order.
    async fn index_articles(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// Fetch each URL. Stories that fail to download are dropped.
    async fn fetch_articles(&self, urls: Vec<String>) -> Vec<ScrapedArticle>;
}
