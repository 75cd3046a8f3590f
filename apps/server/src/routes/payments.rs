//! # Manual Payment Submission
//!
//! `POST /api/payments/submit-manual`
//!
//! ## Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. rate limit   payment:<ip>                   ── 429 + Retry-After    │
//! │  2. read form    receipt, orderDetails, grandTotal, summary             │
//! │  3. receipt      present, ≤ 5 MiB, jpeg/png/pdf ── 400                  │
//! │  4. order        parse line items, totals agree ── 400 Invalid order    │
//! │  5. store        <receipts_dir>/<millis>_<name>                         │
//! │  6. ledger       payments row                                           │
//! │  7. notify       email ║ WhatsApp, spawned, best effort                 │
//! │  8. 200          { success, message, reference }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::{debug, error, info, warn};

use marquee_core::sanitize::sanitize_string;
use marquee_core::summary::render_order_summary;
use marquee_core::validation::{content_type_for, parse_order_details, validate_order, validate_receipt};
use marquee_core::{CoreError, Money, PAYMENT_LIMIT_KEY};
use marquee_db::NewPayment;

use crate::error::ApiError;
use crate::notify::{Channel, Notice};
use crate::receipts;
use crate::routes::{client_ip, Ack};
use crate::state::AppState;

/// Cap on the free-text summary the client sends along.
const MAX_SUMMARY_LEN: usize = 20_000;

/// An uploaded file part.
struct Upload {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl Upload {
    /// Declared MIME type, or one guessed from the file name when the
    /// client sent none or a generic one.
    fn effective_content_type(&self) -> String {
        match self.content_type.as_deref() {
            Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
            _ => content_type_for(&self.file_name).unwrap_or_default().to_string(),
        }
    }
}

#[derive(Default)]
struct PaymentForm {
    receipt: Option<Upload>,
    order_details: Option<String>,
    grand_total: Option<String>,
    summary: Option<String>,
}

impl PaymentForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut form = PaymentForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "receipt" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?.to_vec();
                    form.receipt = Some(Upload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                "orderDetails" => form.order_details = Some(field.text().await?),
                "grandTotal" => form.grand_total = Some(field.text().await?),
                "summary" => form.summary = Some(field.text().await?),
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

fn invalid_order(err: CoreError) -> ApiError {
    warn!(error = %err, "Rejected order");
    ApiError::validation("Invalid order data")
}

/// `POST /api/payments/submit-manual`
pub async fn submit_manual(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Ack>, ApiError> {
    let ip = client_ip(&headers, peer, state.config.trust_proxy);
    debug!(ip = %ip, "Manual payment submission");
    state.check_rate(&format!("{PAYMENT_LIMIT_KEY}:{ip}")).await?;

    let form = PaymentForm::read(&mut multipart).await?;

    let receipt = form
        .receipt
        .ok_or_else(|| ApiError::validation("Receipt file is required"))?;
    let content_type = receipt.effective_content_type();
    validate_receipt(receipt.bytes.len() as u64, &content_type)?;

    let items = parse_order_details(form.order_details.as_deref().unwrap_or_default())
        .map_err(invalid_order)?;
    let declared = form
        .grand_total
        .as_deref()
        .and_then(Money::parse_major)
        .ok_or_else(|| ApiError::validation("Invalid order data"))?;
    let grand_total = validate_order(&items, declared).map_err(invalid_order)?;

    let stored_name = receipts::store(
        &state.config.receipts_dir,
        &receipt.file_name,
        &receipt.bytes,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "Could not store receipt");
        ApiError::internal("Could not store receipt")
    })?;

    let rendered = render_order_summary(&state.config.brand, &items, &state.config.bank);
    let summary = form
        .summary
        .map(|s| sanitize_string(&s, MAX_SUMMARY_LEN))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| rendered.clone());

    let ticket_count: u64 = items.iter().map(|i| u64::from(i.ticket_count())).sum();
    let reply_to = items
        .first()
        .map(|i| i.contact().email.clone())
        .filter(|e| !e.is_empty());

    let record = state
        .db
        .payments()
        .insert(NewPayment {
            items,
            grand_total,
            summary,
            receipt_path: stored_name.clone(),
            receipt_content_type: content_type,
            receipt_size: receipt.bytes.len() as u64,
            client_ip: Some(ip),
        })
        .await?;

    info!(
        payment_id = %record.id,
        total = %grand_total,
        tickets = ticket_count,
        "Payment submission recorded"
    );

    let mut notice = Notice::new(
        format!(
            "{} payment: {} for {} ticket(s)",
            state.config.brand, grand_total, ticket_count
        ),
        rendered,
    );
    notice.attachment_url = Some(receipts::public_url(
        &state.config.public_base_url,
        &stored_name,
    ));
    notice.reply_to = reply_to;
    notice.payment_id = Some(record.id.clone());
    state
        .dispatcher
        .dispatch(notice, &[Channel::Email, Channel::WhatsApp]);

    Ok(Json(Ack {
        success: true,
        message: "Payment submitted successfully",
        reference: Some(record.id),
    }))
}
