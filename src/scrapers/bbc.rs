//! BBC News top-story scraper.
//!
//! Top stories are the links on the [BBC News](https://www.bbc.com/news)
//! homepage whose path contains `/news/articles/`. Relative hrefs are
//! resolved against the homepage URL.

use super::{ArticleSource, NO_CONTENT_PLACEHOLDER, NO_TITLE_PLACEHOLDER, USER_AGENT};
use crate::models::ScrapedArticle;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use reqwest::Client;
use scraper::{Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct BbcScraper {
    client: Client,
    homepage: Url,
    limit: usize,
}

impl BbcScraper {
    /// Build a scraper for `homepage`, keeping at most `limit` stories.
    pub fn new(homepage: &str, limit: usize) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            homepage: Url::parse(homepage)?,
            limit,
        })
    }

    async fn get_html(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }

    /// Fetch a single story
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_article(&self, url: &str) -> Result<ScrapedArticle, Box<dyn Error>> {
        let body = self.get_html(url).await?;
        let article = parse_article(&body, url);
        info!(bytes = article.content.len(), "Parsed BBC article");
        Ok(article)
    }
}

impl ArticleSource for BbcScraper {
    #[instrument(level = "info", skip_all, fields(homepage = %self.homepage))]
    async fn index_articles(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let html = self.get_html(self.homepage.as_str()).await?;
        let urls = parse_top_story_urls(&html, &self.homepage, self.limit);

        info!(count = urls.len(), "Indexed BBC top-story URLs");
        debug!(urls = ?urls, "BBC URLs");
        Ok(urls)
    }

    #[instrument(level = "info", skip_all)]
    async fn fetch_articles(&self, urls: Vec<String>) -> Vec<ScrapedArticle> {
        let articles: Vec<ScrapedArticle> = stream::iter(urls)
            .then(|url: String| async move {
                match self.fetch_article(&url).await {
                    Ok(article) => {
                        debug!(%url, title = %article.title, "Fetched BBC article");
                        Some(article)
                    }
                    Err(e) => {
                        error!(error = %e, %url, "BBC fetch failed; skipping article");
                        None
                    }
                }
            })
            .filter_map(std::future::ready)
            .collect()
            .await;

        info!(count = articles.len(), "Fetched BBC article contents");
        articles
    }
}

/// Extract absolute top-story URLs from homepage HTML, first-seen order, at most `limit`.
pub fn parse_top_story_urls(html: &str, base: &Url, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"a[href*="/news/articles/"]"#).expect("static selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| match base.join(href) {
            Ok(resolved) => Some(resolved.to_string()),
            Err(e) => {
                warn!(%href, error = %e, "Skipping unresolvable link");
                None
            }
        })
        .unique()
        .take(limit)
        .collect()
}

/// Pull headline, paragraph text and `og:image` out of a story page.
pub fn parse_article(html: &str, url: &str) -> ScrapedArticle {
    let document = Html::parse_document(html);
    let main_heading = Selector::parse("#main-heading").expect("static selector");
    let h1 = Selector::parse("h1").expect("static selector");
    let paragraphs =
        Selector::parse(r#"div[data-component="text-block"] p"#).expect("static selector");
    let og_image = Selector::parse(r#"meta[property="og:image"]"#).expect("static selector");

    let title = document
        .select(&main_heading)
        .next()
        .or_else(|| document.select(&h1).next())
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE_PLACEHOLDER.to_string());

    let content = document
        .select(&paragraphs)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .join("\n");
    let content = if content.is_empty() {
        NO_CONTENT_PLACEHOLDER.to_string()
    } else {
        content
    };

    let image_url = document
        .select(&og_image)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(str::to_string);

    ScrapedArticle {
        title,
        url: url.to_string(),
        content,
        image_url,
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HOMEPAGE: &str = r#"
        <html><body>
          <a href="/news/articles/c1">One</a>
          <a href="/news/live/xyz">Live</a>
          <a href="/news/articles/c2">Two</a>
          <a href="https://www.bbc.com/news/articles/c1">One again</a>
          <a href="/news/articles/c3">Three</a>
          <a href="/sport">Sport</a>
        </body></html>
    "#;

    const STORY: &str = r#"
        <html><head>
          <meta property="og:image" content="https://ichef.bbci.co.uk/c1.jpg">
        </head><body>
          <h1 id="main-heading">  Big   news today </h1>
          <div data-component="text-block"><p>First paragraph.</p></div>
          <div data-component="image-block"><p>Caption, not body.</p></div>
          <div data-component="text-block"><p>Second   paragraph.</p><p></p></div>
        </body></html>
    "#;

    #[test]
    fn test_parse_top_story_urls_dedupes_and_limits() {
        let base = Url::parse("https://www.bbc.com/news").unwrap();

        let urls = parse_top_story_urls(HOMEPAGE, &base, 10);
        assert_eq!(
            urls,
            vec![
                "https://www.bbc.com/news/articles/c1",
                "https://www.bbc.com/news/articles/c2",
                "https://www.bbc.com/news/articles/c3",
            ]
        );

        let urls = parse_top_story_urls(HOMEPAGE, &base, 2);
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn test_parse_article() {
        let article = parse_article(STORY, "https://www.bbc.com/news/articles/c1");
        assert_eq!(article.title, "Big news today");
        assert_eq!(article.content, "First paragraph.\nSecond paragraph.");
        assert_eq!(
            article.image_url.as_deref(),
            Some("https://ichef.bbci.co.uk/c1.jpg")
        );
    }

    #[test]
    fn test_parse_article_fallbacks() {
        let article = parse_article(
            "<html><body><h1>Only h1</h1><p>loose</p></body></html>",
            "https://x/1",
        );
        assert_eq!(article.title, "Only h1");
        assert_eq!(article.content, NO_CONTENT_PLACEHOLDER);
        assert_eq!(article.image_url, None);

        let article = parse_article("<html><body></body></html>", "https://x/2");
        assert_eq!(article.title, NO_TITLE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_index_and_fetch_against_mock_site() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string(HOMEPAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/news/articles/c1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(STORY))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/news/articles/c2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let scraper = BbcScraper::new(&format!("{}/news", server.uri()), 2).unwrap();
        let urls = scraper.index_articles().await.unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].ends_with("/news/articles/c1"));

        let articles = scraper.fetch_articles(urls).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Big news today");
    }

    #[tokio::test]
    async fn test_index_fails_when_homepage_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let scraper = BbcScraper::new(&format!("{}/news", server.uri()), 5).unwrap();
        assert!(scraper.index_articles().await.is_err());
    }
}
