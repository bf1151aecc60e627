//! Digest email rendering.
//!
//! The HTML body is self-contained: every style is inline, there is no
//! `<style>` block and nothing is loaded besides article images.

use crate::models::Article;
use crate::utils::html_escape;
use std::fmt::Write;

/// Shown for articles without a usable `http(s)` image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x300?text=Daily+News";

/// Body of the empty-digest block.
pub const NO_NEWS_TEXT: &str = "No news available today";

/// The image an article card shows.
pub fn card_image_url(article: &Article) -> &str {
    match article.image_url.as_deref() {
        Some(src) if src.starts_with("http") => src,
        _ => PLACEHOLDER_IMAGE_URL,
    }
}

/// Render the HTML digest, one card per article in input order.
pub fn render_html(articles: &[Article], heading: &str, date_label: &str) -> String {
    let mut cards = String::new();

    if articles.is_empty() {
        let _ = write!(
            cards,
            r#"
        <div style="padding: 24px; text-align: center; color: #6b7280; background: #f9fafb; border-radius: 8px;">
          <p style="margin: 0; font-size: 16px;">{NO_NEWS_TEXT}</p>
        </div>"#
        );
    }

    for article in articles {
        let url = html_escape(&article.url);
        let _ = write!(
            cards,
            r#"
        <div style="margin-bottom: 24px; border: 1px solid #e5e7eb; border-radius: 8px; overflow: hidden; background: #ffffff;">
          <img src="{image}" alt="" width="600" style="display: block; width: 100%; max-height: 300px; object-fit: cover;">
          <div style="padding: 16px;">
            <h2 style="margin: 0 0 8px 0; font-size: 20px; line-height: 1.3;"><a href="{url}" style="color: #0066cc; text-decoration: none;">{title}</a></h2>
            <p style="margin: 0 0 12px 0; font-size: 15px; line-height: 1.6; color: #374151;">{summary}</p>
            <a href="{url}" style="font-size: 14px; color: #0066cc;">Read the full story</a>
          </div>
        </div>"#,
            image = html_escape(card_image_url(article)),
            url = url,
            title = html_escape(&article.title),
            summary = html_escape(&article.summary),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
  </head>
  <body style="margin: 0; padding: 0; background: #f3f4f6; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;">
    <div style="max-width: 600px; margin: 0 auto; padding: 24px;">
      <h1 style="margin: 0 0 4px 0; color: #111827; font-size: 26px;">{heading}</h1>
      <p style="margin: 0 0 24px 0; color: #6b7280; font-size: 14px;">{date_label}</p>{cards}
      <hr style="border: none; border-top: 1px solid #e5e7eb; margin: 24px 0;">
      <p style="font-size: 12px; color: #9ca3af;">This email was generated automatically by the Daily News Digest.</p>
    </div>
  </body>
</html>
"#,
        heading = html_escape(heading),
        date_label = html_escape(date_label),
    )
}

/// Plain-text alternative of [`render_html`].
pub fn render_text(articles: &[Article], heading: &str, date_label: &str) -> String {
    let mut out = format!("{heading}\n{date_label}\n\n");
    if articles.is_empty() {
        out.push_str(NO_NEWS_TEXT);
        out.push('\n');
    }
    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(out, "{}. {}\n{}\n{}\n", i + 1, article.title, article.summary, article.url);
    }
    out
}
