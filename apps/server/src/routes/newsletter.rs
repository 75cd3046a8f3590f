//! `POST /api/newsletter/subscribe`

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use marquee_core::sanitize::sanitize_email;

use crate::error::ApiError;
use crate::routes::Ack;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubscribeRequest {
    pub email: String,
}

pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let Json(request) = payload?;

    let email = sanitize_email(&request.email);
    if email.is_empty() {
        return Err(ApiError::validation("Valid email is required"));
    }

    let added = state.db.newsletter().subscribe(&email).await?;
    info!(added, "Newsletter subscription");

    Ok(Json(Ack::ok(if added {
        "Subscribed successfully"
    } else {
        "Already subscribed"
    })))
}
