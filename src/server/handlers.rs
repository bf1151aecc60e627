use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::mailer::welcome_email;
use crate::models::Digest;
use crate::repositories::{DigestStore, SubscriberRegistry};
use crate::utils::is_valid_email;

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Pull a well-formed email out of the request body, or 400.
fn require_email(payload: Result<Json<EmailRequest>, JsonRejection>) -> ApiResult<String> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected request body");
        ApiError::BadRequest("Invalid JSON body")
    })?;

    match body.email {
        Some(email) if is_valid_email(&email) => Ok(email),
        _ => Err(ApiError::BadRequest("A valid email is required")),
    }
}

/// `POST /addSubscriber`
///
/// 201 on success, whether or not the welcome email later goes out.
#[instrument(level = "info", skip_all)]
pub async fn add_subscriber(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let email = require_email(payload)?;

    // Not atomic: two identical signups racing here can both insert.
    if state.db.exists(&email).await? {
        return Err(ApiError::Conflict("Email already subscribed"));
    }
    state.db.add(&email, Utc::now()).await?;
    info!(%email, "Subscriber added");

    spawn_welcome_email(&state, email);

    Ok((
        StatusCode::CREATED,
        MessageResponse::new("Subscribed successfully"),
    ))
}

/// `POST /unsubscribeUser`
#[instrument(level = "info", skip_all)]
pub async fn unsubscribe_user(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let email = require_email(payload)?;

    if !state.db.exists(&email).await? {
        return Err(ApiError::NotFound("Email not found"));
    }
    let removed = state.db.remove(&email).await?;
    info!(%email, removed, "Subscriber removed");

    Ok(MessageResponse::new("Unsubscribed successfully"))
}

/// `GET /latestNews`
#[instrument(level = "info", skip_all)]
pub async fn latest_news(State(state): State<AppState>) -> ApiResult<Json<Digest>> {
    match state.db.latest_digest().await? {
        Some(digest) => Ok(Json(digest)),
        None => Err(ApiError::NotFound("No news found")),
    }
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Send the latest digest to a new subscriber on a detached task.
///
/// Nothing the task does can reach the HTTP response: failures (missing
/// digest store, SMTP errors) are logged and dropped. Returns `None` without
/// spawning when no mailer is configured.
pub fn spawn_welcome_email(state: &AppState, email: String) -> Option<JoinHandle<()>> {
    let Some(mailer) = state.mailer.clone() else {
        warn!(%email, "No sender credentials; welcome email skipped");
        return None;
    };
    let db = state.db.clone();

    Some(tokio::spawn(async move {
        let latest = match db.latest_digest().await {
            Ok(latest) => latest,
            Err(e) => {
                error!(%email, error = %e, "Could not load digest for welcome email");
                return;
            }
        };
        let (date, articles) = match latest {
            Some(digest) => (Some(digest.date), digest.articles),
            None => (None, Vec::new()),
        };

        match mailer.send(welcome_email(&email, date, &articles)).await {
            Ok(()) => info!(%email, "Welcome email sent"),
            Err(e) => error!(%email, error = %e, "Welcome email failed"),
        }
    }))
}
