use crate::handlers::CommandHandler;
use crate::middleware::{Localized, Outcome};
use crate::store::LanguageStore;
use crate::telegram::{ChatActions, Event, Update};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub struct AppState<S, A> {
    pub bot: Localized<S, A, CommandHandler<A>>,
    pub webhook_secret: Option<String>,
}

pub fn router<S, A>(state: AppState<S, A>) -> Router
where
    S: LanguageStore + 'static,
    A: ChatActions + 'static,
{
    Router::new()
        .route("/webhook", post(webhook::<S, A>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn health() -> &'static str {
    "ok"
}

/// Handle a Telegram webhook call.
///
/// The secret is checked before the body is looked at. Past that point the
/// call is always answered with 200, including for bodies that do not parse,
/// so Telegram does not redeliver updates the bot cannot handle.
async fn webhook<S, A>(
    State(state): State<Arc<AppState<S, A>>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode
where
    S: LanguageStore + 'static,
    A: ChatActions + 'static,
{
    if let Some(expected) = &state.webhook_secret {
        let provided = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !constant_time_compare(provided, expected) {
            warn!("Rejected webhook call with invalid secret");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Ignoring unparseable update: {}", e);
            return StatusCode::OK;
        }
    };

    let update_id = update.update_id;
    let Some(event) = Event::from_update(update) else {
        debug!("Update {} has no chat-bound payload", update_id);
        return StatusCode::OK;
    };

    match state.bot.dispatch(event).await {
        Ok(Outcome::Handled(())) => {}
        Ok(Outcome::Left) => debug!("Update {} came from a blacklisted chat", update_id),
        Err(e) => warn!(
            "Failed to handle update {}: {:#}",
            update_id,
            anyhow::Error::new(e)
        ),
    }

    StatusCode::OK
}

/// Constant-time string comparison for the webhook secret
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
