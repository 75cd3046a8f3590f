//! `GET /api/pricing/ticket-price`

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    /// Major units.
    pub price: f64,
}

pub async fn ticket_price(State(state): State<Arc<AppState>>) -> Json<PriceResponse> {
    Json(PriceResponse {
        price: state.config.ticket_price.as_major_f64(),
    })
}
