//! Contact form submission.

use tracing::{debug, info};

use marquee_core::sanitize::{sanitize_email, sanitize_string};
use marquee_core::validation::{validate_contact_message, MAX_MESSAGE_LEN};
use marquee_core::{ContactMessage, CONTACT_LIMIT_KEY};

use crate::api::Acknowledgement;
use crate::error::StorefrontResult;
use crate::Storefront;

const MAX_NAME_FIELD_LEN: usize = 50;

/// Validates the form as typed, charges one contact attempt, then sends the
/// sanitized message.
pub async fn send_contact(
    sf: &Storefront,
    form: &ContactMessage,
) -> StorefrontResult<Acknowledgement> {
    debug!("send_contact command");

    validate_contact_message(form)?;
    sf.limiter.check(CONTACT_LIMIT_KEY)?;

    let clean = ContactMessage {
        first_name: sanitize_string(&form.first_name, MAX_NAME_FIELD_LEN),
        last_name: sanitize_string(&form.last_name, MAX_NAME_FIELD_LEN),
        email: sanitize_email(&form.email),
        message: sanitize_string(&form.message, MAX_MESSAGE_LEN),
    };

    let ack = sf.api.submit_contact(&clean).await?;
    info!("Contact message sent");
    Ok(ack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorefrontError;
    use crate::testing::session;

    fn form() -> ContactMessage {
        ContactMessage {
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            email: "Ada@Example.com".into(),
            message: "Is there parking at the venue? <b>thanks</b>".into(),
        }
    }

    #[tokio::test]
    async fn test_sends_sanitized_message() {
        let (sf, api) = session();

        let ack = send_contact(&sf, &form()).await.unwrap();
        assert_eq!(ack.message, "Message sent successfully");

        let sent = api.contacts.lock().unwrap();
        assert_eq!(sent[0].email, "ada@example.com");
        assert!(!sent[0].message.contains('<'));
    }

    #[tokio::test]
    async fn test_invalid_form_does_not_count_against_limit() {
        let (sf, api) = session();
        let mut bad = form();
        bad.message = "short".into();

        for _ in 0..5 {
            match send_contact(&sf, &bad).await {
                Err(StorefrontError::Validation(errors)) => {
                    assert_eq!(errors[0].field(), "message")
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(api.contacts.lock().unwrap().is_empty());
        send_contact(&sf, &form()).await.unwrap();
    }

    #[tokio::test]
    async fn test_fourth_message_is_limited() {
        let (sf, _api) = session();
        for _ in 0..3 {
            send_contact(&sf, &form()).await.unwrap();
        }
        assert!(matches!(
            send_contact(&sf, &form()).await,
            Err(StorefrontError::RateLimited(_))
        ));
    }
}
