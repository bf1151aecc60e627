//! JSON export of a stored digest.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── 2025-05-05.json
//! └── 2025-05-06.json
//! ```
//!
//! A second run on the same day overwrites that day's file, matching the store.

use crate::models::Digest;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `digest` as pretty JSON to `{json_output_dir}/{date}.json`.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_digest(digest: &Digest, json_output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(digest)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = PathBuf::from(json_output_dir).join(format!("{}.json", digest.date));
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = digest.articles.len(), "Wrote digest JSON");

    Ok(path)
}
