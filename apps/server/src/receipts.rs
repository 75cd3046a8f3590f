//! Receipt storage.
//!
//! Uploaded receipts land in the receipts directory as
//! `<unix millis>_<sanitized original name>` and are served back read-only at
//! `GET /receipts/{name}` so notification links resolve.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use marquee_core::sanitize::sanitize_filename;
use marquee_core::validation::content_type_for;

use crate::error::ApiError;
use crate::state::AppState;

/// Name used when the client sent no usable filename.
const FALLBACK_NAME: &str = "receipt";

/// Writes `bytes` under `dir` and returns the stored file name.
///
/// Never overwrites: a name clash within the same millisecond gets a counter.
pub async fn store(dir: &Path, original_name: &str, bytes: &[u8]) -> std::io::Result<String> {
    fs::create_dir_all(dir).await?;

    let mut safe = sanitize_filename(original_name);
    if safe.is_empty() || safe.starts_with('.') {
        safe = format!("{FALLBACK_NAME}{safe}");
    }
    let millis = Utc::now().timestamp_millis();

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{millis}_{safe}")
        } else {
            format!("{millis}_{attempt}_{safe}")
        };

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&name))
            .await
        {
            Ok(mut file) => {
                file.write_all(bytes).await?;
                file.flush().await?;
                info!(name = %name, size = bytes.len(), "Stored receipt");
                return Ok(name);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Public link for a stored receipt.
pub fn public_url(base: &str, stored_name: &str) -> String {
    format!("{}/receipts/{}", base.trim_end_matches('/'), stored_name)
}

/// `GET /receipts/{name}`
pub async fn serve_receipt(
    State(state): State<Arc<AppState>>,
    UrlPath(name): UrlPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Only names this module could have produced are looked up.
    if name.starts_with('.') || sanitize_filename(&name) != name {
        return Err(ApiError::not_found("Receipt not found"));
    }

    let path = state.config.receipts_dir.join(&name);
    let bytes = match fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ApiError::not_found("Receipt not found"))
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Could not read receipt");
            return Err(ApiError::internal("Could not read receipt"));
        }
    };

    debug!(name = %name, "Serving receipt");
    let content_type = content_type_for(&name).unwrap_or("application/octet-stream");
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
