//! Article summarization through the Gemini `generateContent` REST API.
//!
//! - [`Summarize`]: the async seam the pipeline depends on
//! - [`GeminiSummarizer`]: the production implementation
//! - [`summarize_or_fallback`]: the per-article policy the pipeline applies
//!
//! There is no retry here. A failed call yields [`SUMMARY_FAILED`] for that
//! one article and the run moves on.

use crate::models::ScrapedArticle;
use crate::scrapers::NO_CONTENT_PLACEHOLDER;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, instrument, warn};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Summary stored when the model call fails.
pub const SUMMARY_FAILED: &str = "Summary generation failed.";

/// Summary stored when there was no article text to send.
pub const SUMMARY_EMPTY_CONTENT: &str =
    "Could not generate summary because article content was empty.";

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Gemini API returned no text")]
    EmptyResponse,
}

/// Something that can turn article text into a short summary.
pub trait Summarize {
    async fn summarize(&self, content: &str) -> Result<String, SummarizeError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini client bound to one model and API key.
pub struct GeminiSummarizer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSummarizer")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiSummarizer {
    pub fn new(api_key: String, model: String) -> Result<Self, SummarizeError> {
        Self::with_base_url(api_key, model, GEMINI_API_BASE.to_string())
    }

    /// Point the client somewhere other than Google, e.g. a mock server.
    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
    ) -> Result<Self, SummarizeError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl Summarize for GeminiSummarizer {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn summarize(&self, content: &str) -> Result<String, SummarizeError> {
        let t0 = Instant::now();
        let prompt = build_prompt(content);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Api {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim();
        if text.is_empty() {
            return Err(SummarizeError::EmptyResponse);
        }

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            chars = text.len(),
            "Gemini summary generated"
        );
        Ok(text.to_string())
    }
}

fn build_prompt(content: &str) -> String {
    format!(
        "You are an expert news editor. Your task is to provide a clear, concise, \
and neutral summary of the following news article. Capture the main points \
and key information. The summary should be about 4-6 sentences long.\n\
---\n\
ARTICLE:\n\
{content}\n\
---\n\
SUMMARY:\n"
    )
}

/// Summarize one scraped story, substituting fixed text instead of failing.
///
/// Empty or placeholder content never reaches the model.
#[instrument(level = "info", skip_all, fields(url = %article.url))]
pub async fn summarize_or_fallback<S: Summarize>(summarizer: &S, article: &ScrapedArticle) -> String {
    let content = article.content.trim();
    if content.is_empty() || content == NO_CONTENT_PLACEHOLDER {
        warn!("Article content empty; not calling the model");
        return SUMMARY_EMPTY_CONTENT.to_string();
    }

    match summarizer.summarize(content).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(error = %e, "Summarization failed; using fallback text");
            SUMMARY_FAILED.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct CountingSummarizer {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Summarize for CountingSummarizer {
        async fn summarize(&self, content: &str) -> Result<String, SummarizeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SummarizeError::EmptyResponse)
            } else {
                Ok(format!("short: {content}"))
            }
        }
    }

    fn scraped(content: &str) -> ScrapedArticle {
        ScrapedArticle {
            title: "t".to_string(),
            url: "https://x/1".to_string(),
            content: content.to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_fallback_skips_model_for_empty_content() {
        let s = CountingSummarizer { calls: AtomicUsize::new(0), fail: false };

        assert_eq!(summarize_or_fallback(&s, &scraped("  ")).await, SUMMARY_EMPTY_CONTENT);
        assert_eq!(
            summarize_or_fallback(&s, &scraped(NO_CONTENT_PLACEHOLDER)).await,
            SUMMARY_EMPTY_CONTENT
        );
        assert_eq!(s.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_substitutes_on_failure() {
        let s = CountingSummarizer { calls: AtomicUsize::new(0), fail: true };
        assert_eq!(summarize_or_fallback(&s, &scraped("body")).await, SUMMARY_FAILED);
        assert_eq!(s.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_passes_summary_through() {
        let s = CountingSummarizer { calls: AtomicUsize::new(0), fail: false };
        assert_eq!(summarize_or_fallback(&s, &scraped("body")).await, "short: body");
    }

    #[tokio::test]
    async fn test_gemini_summarize_joins_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text": "  Part one."}, {"text": " Part two.  "}]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summarizer = GeminiSummarizer::with_base_url(
            "secret".to_string(),
            "gemini-test".to_string(),
            server.uri(),
        )
        .unwrap();

        let summary = summarizer.summarize("article text").await.unwrap();
        assert_eq!(summary, "Part one. Part two.");
    }

    #[tokio::test]
    async fn test_gemini_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let summarizer =
            GeminiSummarizer::with_base_url("k".to_string(), "m".to_string(), server.uri())
                .unwrap();

        match summarizer.summarize("text").await {
            Err(SummarizeError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gemini_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let summarizer =
            GeminiSummarizer::with_base_url("k".to_string(), "m".to_string(), server.uri())
                .unwrap();
        assert!(matches!(
            summarizer.summarize("text").await,
            Err(SummarizeError::EmptyResponse)
        ));
    }

    #[test]
    fn test_prompt_embeds_article() {
        let prompt = build_prompt("The article body");
        assert!(prompt.contains("ARTICLE:\nThe article body\n---"));
        assert!(prompt.ends_with("SUMMARY:\n"));
    }
}
