//! # Checkout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(path)                                                         │
//! │     │                                                                   │
//! │     ├── read receipt file                                               │
//! │     └── submit_receipt                                                  │
//! │           ├── 1. payment limiter      (3 / 60 s)     ──► RateLimited    │
//! │           ├── 2. validate receipt     (≤ 5 MB, jpeg/png/pdf)            │
//! │           ├── 3. snapshot cart        (empty         ──► EmptyCart)     │
//! │           ├── 4. render order summary                                   │
//! │           ├── 5. POST /api/payments/submit-manual                       │
//! │           └── 6. success ─► clear cart │ failure ─► cart untouched      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use tracing::{debug, info, warn};

use marquee_core::summary::render_order_summary;
use marquee_core::validation::{content_type_for, validate_receipt};
use marquee_core::{Money, PAYMENT_LIMIT_KEY};

use crate::api::{Acknowledgement, PaymentSubmission, ReceiptUpload};
use crate::error::{StorefrontError, StorefrontResult};
use crate::Storefront;

const OCTET_STREAM: &str = "application/octet-stream";

/// Reads a receipt from disk and submits the cart with it.
pub async fn checkout(sf: &Storefront, path: &Path) -> StorefrontResult<Acknowledgement> {
    debug!(path = %path.display(), "checkout command");

    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "receipt".to_string());
    let content_type = content_type_for(&file_name)
        .unwrap_or(OCTET_STREAM)
        .to_string();

    submit_receipt(
        sf,
        ReceiptUpload {
            file_name,
            content_type,
            bytes,
        },
    )
    .await
}

/// Submits the current cart with an already-loaded receipt.
pub async fn submit_receipt(
    sf: &Storefront,
    receipt: ReceiptUpload,
) -> StorefrontResult<Acknowledgement> {
    sf.limiter.check(PAYMENT_LIMIT_KEY)?;

    validate_receipt(receipt.bytes.len() as u64, &receipt.content_type)
        .map_err(StorefrontError::Receipt)?;

    let items = sf.cart.with_cart(|cart| cart.snapshot());
    if items.is_empty() {
        return Err(StorefrontError::EmptyCart);
    }
    let grand_total: Money = items.iter().map(|i| i.total_price()).sum();
    let summary = render_order_summary(&sf.config.brand, &items, &sf.config.bank);

    info!(
        items = items.len(),
        total = %grand_total,
        receipt = %receipt.file_name,
        "Submitting payment"
    );

    let submission = PaymentSubmission {
        items,
        grand_total,
        summary,
        receipt,
    };

    match sf.api.submit_payment(submission).await {
        Ok(ack) => {
            sf.cart.with_cart_mut(|cart| cart.clear());
            info!(reference = ?ack.reference, "Payment accepted, cart cleared");
            Ok(ack)
        }
        Err(e) => {
            warn!(error = %e, "Payment submission failed, cart kept");
            Err(e.into())
        }
    }
}
