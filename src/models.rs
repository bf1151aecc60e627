//! Data models for scraped stories, summarized articles, digests and subscribers.
//!
//! - [`ScrapedArticle`]: raw story text as pulled off the news site
//! - [`Article`]: a summarized story as stored and emailed
//! - [`Digest`]: one day's collection of articles, keyed by date
//! - [`Subscriber`]: an email address registered for the digest
//!
//! `Subscriber` serializes `subscribedAt` in camelCase to match the JSON the
//! HTTP API has always returned; the article fields stay snake_case.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A story as scraped from the news site, before summarization.
#[derive(Debug, Clone)]
pub struct ScrapedArticle {
    /// The headline, or `"No title found"` when the page had none.
    pub title: String,
    /// The absolute URL the story was fetched from.
    pub url: String,
    /// Paragraph text of the story body, newline separated.
    pub content: String,
    /// The page's `og:image`, if it advertised one.
    pub image_url: Option<String>,
}

/// A summarized story. Immutable once written into a [`Digest`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub summary: String,
}

impl Article {
    /// Build a stored article from a scraped one and its summary.
    pub fn from_scraped(scraped: ScrapedArticle, summary: String) -> Self {
        Self {
            title: scraped.title,
            url: scraped.url,
            image_url: scraped.image_url,
            summary,
        }
    }
}

/// One calendar day's digest.
///
/// `articles` may be empty; renderers show a placeholder in that case.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Digest {
    /// Local date of the run, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            url: format!("https://www.bbc.com/news/articles/{title}"),
            image_url: None,
            summary: "Summary here".to_string(),
        }
    }

    #[test]
    fn test_digest_serializes_date_as_plain_day() {
        let digest = Digest {
            date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            articles: vec![article("a")],
        };

        let json = serde_json::to_value(&digest).unwrap();
        assert_eq!(json["date"], "2025-05-06");
        assert_eq!(json["articles"][0]["title"], "a");
        assert!(json["articles"][0].get("image_url").is_none());
    }

    #[test]
    fn test_digest_deserialization_keeps_order() {
        let json = r#"{
            "date": "2025-05-06",
            "articles": [
                {"title": "first", "url": "https://x/1", "summary": "s1"},
                {"title": "second", "url": "https://x/2", "image_url": "https://x/2.jpg", "summary": "s2"}
            ]
        }"#;

        let digest: Digest = serde_json::from_str(json).unwrap();
        assert_eq!(digest.articles.len(), 2);
        assert_eq!(digest.articles[0].title, "first");
        assert_eq!(digest.articles[0].image_url, None);
        assert_eq!(
            digest.articles[1].image_url.as_deref(),
            Some("https://x/2.jpg")
        );
    }

    #[test]
    fn test_subscriber_uses_camel_case_timestamp() {
        let subscriber = Subscriber {
            email: "a@b.com".to_string(),
            subscribed_at: DateTime::parse_from_rfc3339("2025-05-06T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let json = serde_json::to_value(&subscriber).unwrap();
        assert_eq!(json["email"], "a@b.com");
        assert!(json.get("subscribedAt").is_some());
        assert!(json.get("subscribed_at").is_none());
    }

    #[test]
    fn test_article_from_scraped() {
        let scraped = ScrapedArticle {
            title: "Headline".to_string(),
            url: "https://www.bbc.com/news/articles/abc".to_string(),
            content: "Body".to_string(),
            image_url: Some("https://ichef.bbci.co.uk/abc.jpg".to_string()),
        };

        let article = Article::from_scraped(scraped, "Short".to_string());
        assert_eq!(article.title, "Headline");
        assert_eq!(article.summary, "Short");
        assert_eq!(
            article.image_url.as_deref(),
            Some("https://ichef.bbci.co.uk/abc.jpg")
        );
    }
}
