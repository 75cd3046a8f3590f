//! # HTTP Routes
//!
//! ```text
//! ┌──────────────────────────────────┬────────┬──────────────────────────────┐
//! │ Path                             │ Method │ Handler                      │
//! ├──────────────────────────────────┼────────┼──────────────────────────────┤
//! │ /api/payments/submit-manual      │ POST   │ payments::submit_manual      │
//! │ /api/contact/submit              │ POST   │ contact::submit              │
//! │ /api/newsletter/subscribe        │ POST   │ newsletter::subscribe        │
//! │ /api/pricing/ticket-price        │ GET    │ pricing::ticket_price        │
//! │ /receipts/{name}                 │ GET    │ receipts::serve_receipt      │
//! │ /health                          │ GET    │ health::health               │
//! └──────────────────────────────────┴────────┴──────────────────────────────┘
//! ```
//!
//! Any other method on a known path answers 405 with a JSON error body.

pub mod contact;
pub mod health;
pub mod newsletter;
pub mod payments;
pub mod pricing;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::error::ApiError;
use crate::receipts;
use crate::state::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route(
            "/api/payments/submit-manual",
            post(payments::submit_manual).fallback(method_not_allowed),
        )
        .route(
            "/api/contact/submit",
            post(contact::submit).fallback(method_not_allowed),
        )
        .route(
            "/api/newsletter/subscribe",
            post(newsletter::subscribe).fallback(method_not_allowed),
        )
        .route(
            "/api/pricing/ticket-price",
            get(pricing::ticket_price).fallback(method_not_allowed),
        )
        .route("/receipts/{name}", get(receipts::serve_receipt))
        .route("/health", get(health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// Success body shared by the submission endpoints.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Ack {
    pub fn ok(message: &'static str) -> Self {
        Ack {
            success: true,
            message,
            reference: None,
        }
    }
}

/// Address used for per-client rate limiting.
pub(crate) fn client_ip(headers: &HeaderMap, peer: SocketAddr, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    peer.ip().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_ignores_forwarded_unless_trusted() {
        let peer: SocketAddr = "10.0.0.7:5123".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );

        assert_eq!(client_ip(&headers, peer, false), "10.0.0.7");
        assert_eq!(client_ip(&headers, peer, true), "203.0.113.9");
        assert_eq!(client_ip(&HeaderMap::new(), peer, true), "10.0.0.7");
    }
}
