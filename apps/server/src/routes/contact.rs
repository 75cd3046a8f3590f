//! `POST /api/contact/submit`

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::{debug, info};

use marquee_core::sanitize::{sanitize_email, sanitize_string, MAX_NAME_LEN};
use marquee_core::validation::{validate_contact_message, MAX_MESSAGE_LEN};
use marquee_core::{ContactMessage, CONTACT_LIMIT_KEY};

use crate::error::ApiError;
use crate::notify::{Channel, Notice};
use crate::routes::{client_ip, Ack};
use crate::state::AppState;

pub async fn submit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<ContactMessage>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let Json(raw) = payload?;
    let ip = client_ip(&headers, peer, state.config.trust_proxy);
    debug!(ip = %ip, "Contact submission");

    let message = ContactMessage {
        first_name: sanitize_string(&raw.first_name, MAX_NAME_LEN),
        last_name: sanitize_string(&raw.last_name, MAX_NAME_LEN),
        email: sanitize_email(&raw.email),
        message: sanitize_string(&raw.message, MAX_MESSAGE_LEN),
    };
    validate_contact_message(&message)?;

    // Rejected forms do not use up attempts.
    state.check_rate(&format!("{CONTACT_LIMIT_KEY}:{ip}")).await?;

    let id = state.db.contacts().insert(&message).await?;
    info!(id = %id, "Contact message stored");

    let mut notice = Notice::new(
        format!(
            "{} contact: {} {}",
            state.config.brand, message.first_name, message.last_name
        ),
        format!(
            "From: {} {} <{}>\n\n{}",
            message.first_name, message.last_name, message.email, message.message
        ),
    );
    notice.reply_to = Some(message.email);
    state.dispatcher.dispatch(notice, &[Channel::Email]);

    Ok(Json(Ack::ok("Message sent successfully")))
}
