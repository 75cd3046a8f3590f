//! Newsletter sign-up.

use tracing::debug;

use marquee_core::sanitize::sanitize_email;
use marquee_core::ValidationError;

use crate::api::Acknowledgement;
use crate::error::StorefrontResult;
use crate::Storefront;

pub async fn subscribe(sf: &Storefront, email: &str) -> StorefrontResult<Acknowledgement> {
    debug!("subscribe command");

    let email = sanitize_email(email);
    if email.is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "email".into(),
            reason: "not a valid email address".into(),
        }
        .into());
    }

    Ok(sf.api.subscribe_newsletter(&email).await?)
}
