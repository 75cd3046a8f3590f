//! # Validation Module
//!
//! Validation rules for the form boundaries: the ticket buyer form, the
//! contact form, receipt uploads and submitted orders.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Validation Happens                             │
//! │                                                                         │
//! │  Buyer form ───► validate_buyer ───► TicketCandidate ───► sanitizer     │
//! │                  (rejects)                                (absorbs)     │
//! │                                                                         │
//! │  Checkout ─────► validate_receipt (client AND server)                   │
//! │                                                                         │
//! │  Server ───────► parse_order_details + validate_order                   │
//! │                  (never trusts the client's totals)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form validators collect every failing field so the caller can mark all of
//! them at once. Receipt and order checks stop at the first problem.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{ContactDetails, ContactMessage, LineItem};
use crate::{MAX_TICKETS_PER_ITEM, MIN_TICKETS_PER_ITEM};

/// Largest receipt accepted (5 MiB).
pub const MAX_RECEIPT_BYTES: u64 = 5 * 1024 * 1024;

/// Receipt content types accepted by the checkout.
pub const ALLOWED_RECEIPT_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "application/pdf"];

pub const MIN_MESSAGE_LEN: usize = 10;
pub const MAX_MESSAGE_LEN: usize = 1000;

// =============================================================================
// Shape Checks
// =============================================================================

/// `local@domain.tld`: one `@`, no whitespace, a dot inside the domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    let last = domain.len() - 1;
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i < last)
}

/// 10-20 characters of digits, whitespace, `-`, `+`, `(`, `)`.
pub fn is_valid_phone(phone: &str) -> bool {
    let len = phone.chars().count();
    (10..=20).contains(&len)
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '+' | '(' | ')'))
}

/// 2-50 characters of ASCII letters, whitespace, `'`, `-`.
pub fn is_valid_name(name: &str) -> bool {
    let len = name.chars().count();
    (2..=50).contains(&len)
        && name
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '\'' | '-'))
}

// =============================================================================
// Quantity
// =============================================================================

/// Checks a requested ticket count against the per-item bounds.
pub fn validate_ticket_quantity(count: i64) -> Result<u32, ValidationError> {
    if (MIN_TICKETS_PER_ITEM as i64..=MAX_TICKETS_PER_ITEM as i64).contains(&count) {
        Ok(count as u32)
    } else {
        Err(ValidationError::OutOfRange {
            field: "ticketCount".to_string(),
            min: MIN_TICKETS_PER_ITEM as i64,
            max: MAX_TICKETS_PER_ITEM as i64,
        })
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Validates the ticket buyer form.
pub fn validate_buyer(contact: &ContactDetails) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("firstName", &contact.first_name),
        ("lastName", &contact.last_name),
    ] {
        let value = value.trim();
        if value.is_empty() {
            errors.push(ValidationError::required(field));
        } else if !is_valid_name(value) {
            errors.push(ValidationError::invalid(
                field,
                "use 2-50 letters, spaces, apostrophes or hyphens",
            ));
        }
    }

    check_email(&contact.email, &mut errors);

    for (field, value) in [("phone", &contact.phone), ("whatsapp", &contact.whatsapp)] {
        let value = value.trim();
        if value.is_empty() {
            errors.push(ValidationError::required(field));
        } else if !is_valid_phone(value) {
            errors.push(ValidationError::invalid(field, "not a valid phone number"));
        }
    }

    let location = contact.location.trim();
    if location.is_empty() {
        errors.push(ValidationError::required("location"));
    } else if location.chars().count() < 2 {
        errors.push(ValidationError::TooShort {
            field: "location".to_string(),
            min: 2,
        });
    }

    finish(errors)
}

/// Validates the contact form.
pub fn validate_contact_message(msg: &ContactMessage) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if msg.first_name.trim().is_empty() {
        errors.push(ValidationError::required("firstName"));
    }
    if msg.last_name.trim().is_empty() {
        errors.push(ValidationError::required("lastName"));
    }

    check_email(&msg.email, &mut errors);

    let message_len = msg.message.trim().chars().count();
    if message_len == 0 {
        errors.push(ValidationError::required("message"));
    } else if message_len < MIN_MESSAGE_LEN {
        errors.push(ValidationError::TooShort {
            field: "message".to_string(),
            min: MIN_MESSAGE_LEN,
        });
    } else if message_len > MAX_MESSAGE_LEN {
        errors.push(ValidationError::TooLong {
            field: "message".to_string(),
            max: MAX_MESSAGE_LEN,
        });
    }

    finish(errors)
}

fn check_email(email: &str, errors: &mut Vec<ValidationError>) {
    let email = email.trim();
    if email.is_empty() {
        errors.push(ValidationError::required("email"));
    } else if !is_valid_email(email) {
        errors.push(ValidationError::invalid("email", "not a valid email address"));
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// Validates an uploaded receipt by size and declared content type.
///
/// Content type parameters (`; charset=...`) are ignored and comparison is
/// case-insensitive.
pub fn validate_receipt(size_bytes: u64, content_type: &str) -> Result<(), ValidationError> {
    if size_bytes == 0 {
        return Err(ValidationError::required("receipt"));
    }
    if size_bytes > MAX_RECEIPT_BYTES {
        return Err(ValidationError::invalid(
            "receipt",
            "file too large, maximum size is 5MB",
        ));
    }

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ALLOWED_RECEIPT_TYPES.contains(&mime.as_str()) {
        return Err(ValidationError::NotAllowed {
            field: "receipt".to_string(),
            allowed: ALLOWED_RECEIPT_TYPES.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(())
}

/// Guesses a receipt content type from its file extension.
pub fn content_type_for(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Parses the `orderDetails` payload: a JSON array of line items.
///
/// Unlike the cart slot loader this is strict; any bad element rejects the
/// whole order.
pub fn parse_order_details(raw: &str) -> CoreResult<Vec<LineItem>> {
    serde_json::from_str(raw).map_err(|e| CoreError::MalformedOrder(e.to_string()))
}

/// Checks a submitted order and returns the recomputed grand total.
pub fn validate_order(items: &[LineItem], declared: Money) -> CoreResult<Money> {
    if items.is_empty() {
        return Err(CoreError::EmptyOrder);
    }
    if !declared.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "grandTotal".to_string(),
        }
        .into());
    }

    let computed = items
        .iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.total_price()))
        .ok_or_else(|| CoreError::InvalidLineItem("order total overflows".to_string()))?;
    if computed != declared {
        return Err(CoreError::TotalMismatch { declared, computed });
    }
    Ok(computed)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize_candidate;
    use crate::types::TicketCandidate;

    fn buyer() -> ContactDetails {
        ContactDetails {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "08012345678".into(),
            location: "Lagos".into(),
            whatsapp: "+2348012345678".into(),
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a@.b"));
        assert!(!is_valid_email("a@@b.c"));
        assert!(!is_valid_email("@b.c"));
    }

    #[test]
    fn test_ticket_quantity() {
        assert_eq!(validate_ticket_quantity(1), Ok(1));
        assert_eq!(validate_ticket_quantity(20), Ok(20));
        assert!(validate_ticket_quantity(0).is_err());
        assert!(validate_ticket_quantity(21).is_err());
    }

    #[test]
    fn test_valid_buyer() {
        assert!(validate_buyer(&buyer()).is_ok());
    }

    #[test]
    fn test_buyer_reports_every_field() {
        let contact = ContactDetails {
            first_name: "A".into(),
            email: "nope".into(),
            ..Default::default()
        };
        let errors = validate_buyer(&contact).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(
            fields,
            ["firstName", "lastName", "email", "phone", "whatsapp", "location"]
        );
    }

    #[test]
    fn test_contact_message() {
        let mut msg = ContactMessage {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            message: "Hello there, is parking available?".into(),
        };
        assert!(validate_contact_message(&msg).is_ok());

        msg.message = "short".into();
        let errors = validate_contact_message(&msg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::TooShort {
                field: "message".into(),
                min: MIN_MESSAGE_LEN
            }]
        );
    }

    #[test]
    fn test_receipt_rules() {
        assert!(validate_receipt(1024, "image/png").is_ok());
        assert!(validate_receipt(1024, "Application/PDF").is_ok());
        assert!(validate_receipt(1024, "image/jpeg; q=1").is_ok());
        assert!(validate_receipt(MAX_RECEIPT_BYTES, "image/jpg").is_ok());

        assert_eq!(
            validate_receipt(0, "image/png"),
            Err(ValidationError::required("receipt"))
        );
        assert!(validate_receipt(MAX_RECEIPT_BYTES + 1, "image/png").is_err());
        assert!(matches!(
            validate_receipt(10, "image/gif"),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("scan.JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for("r.pdf"), Some("application/pdf"));
        assert_eq!(content_type_for("r.gif"), None);
        assert_eq!(content_type_for("noext"), None);
    }

    #[test]
    fn test_validate_order() {
        let items = vec![
            sanitize_candidate(&TicketCandidate::new(2, 6499)),
            sanitize_candidate(&TicketCandidate::new(1, 6499)),
        ];

        assert_eq!(
            validate_order(&items, Money::from_major(19497)).unwrap(),
            Money::from_major(19497)
        );
        assert!(matches!(
            validate_order(&items, Money::from_major(1)),
            Err(CoreError::TotalMismatch { .. })
        ));
        assert!(matches!(
            validate_order(&[], Money::from_major(1)),
            Err(CoreError::EmptyOrder)
        ));
        assert!(matches!(
            validate_order(&items, Money::zero()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_order_details() {
        let item = sanitize_candidate(&TicketCandidate::new(3, 100));
        let raw = serde_json::to_string(&vec![item.clone()]).unwrap();
        assert_eq!(parse_order_details(&raw).unwrap(), vec![item]);

        assert!(matches!(
            parse_order_details("{\"not\":\"an array\"}"),
            Err(CoreError::MalformedOrder(_))
        ));
        assert!(parse_order_details("[{\"id\":\"x\"}]").is_err());
    }

    #[test]
    fn test_oversized_orders_are_rejected_not_panicked() {
        let raw = format!(
            r#"[{{"id":"{}","ticketCount":20,"unitPriceMinor":{}}}]"#,
            uuid::Uuid::new_v4(),
            i64::MAX / 2
        );
        assert!(matches!(
            parse_order_details(&raw),
            Err(CoreError::MalformedOrder(_))
        ));

        let dear = sanitize_candidate(&TicketCandidate::new(20, 1e16));
        let items = vec![dear.clone(), dear];
        assert!(matches!(
            validate_order(&items, Money::from_major(1)),
            Err(CoreError::InvalidLineItem(_))
        ));
    }
}
