//! # Sanitizers
//!
//! Turns untrusted input into clean values. Nothing in this module fails:
//! bad input is absorbed by defaults (for line items) or collapses to an
//! empty string (for form fields).
//!
//! ## Item Sanitizer
//! ```text
//! TicketCandidate (raw JSON values)
//!   │
//!   ├── ticketCount ──► integer prefix ──► non-numeric? 1 ──► clamp [1, 20]
//!   ├── unitPrice   ──► float prefix   ──► NaN / < 0?   0 ──► Money (kobo)
//!   ├── text fields ──► stringify (null/false/0/"" → "") ──► trim
//!   │
//!   └──► LineItem { id: fresh UUID, total = count × price }
//! ```
//!
//! The coercions deliberately mirror how a browser form would read these
//! values: `"3 tickets"` is 3, `"12.5abc"` is 12.5, `true` is not a number.

use serde_json::Value;

use crate::money::{Money, MAX_UNIT_PRICE};
use crate::types::{ContactDetails, LineItem, TicketCandidate};
use crate::validation::{is_valid_email, is_valid_name, is_valid_phone};
use crate::{MAX_TICKETS_PER_ITEM, MIN_TICKETS_PER_ITEM};

/// Longest filename kept for a stored receipt.
pub const MAX_FILENAME_LEN: usize = 100;

pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_NAME_LEN: usize = 50;

// =============================================================================
// Item Sanitizer
// =============================================================================

/// Normalizes a raw candidate into a line item with a fresh id.
pub fn sanitize_candidate(candidate: &TicketCandidate) -> LineItem {
    let ticket_count = coerce_ticket_count(&candidate.ticket_count);
    let unit_price = coerce_unit_price(&candidate.unit_price);

    let contact = ContactDetails {
        first_name: coerce_text(&candidate.first_name),
        last_name: coerce_text(&candidate.last_name),
        email: coerce_text(&candidate.email),
        phone: coerce_text(&candidate.phone),
        location: coerce_text(&candidate.location),
        whatsapp: coerce_text(&candidate.whatsapp),
    };

    LineItem::new(ticket_count, unit_price, contact)
}

/// Reads a ticket count and clamps it into 1..=20.
///
/// Anything without a leading integer reads as 1.
pub fn coerce_ticket_count(value: &Value) -> u32 {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    };

    let count = parsed.unwrap_or(MIN_TICKETS_PER_ITEM as i64);
    count.clamp(MIN_TICKETS_PER_ITEM as i64, MAX_TICKETS_PER_ITEM as i64) as u32
}

/// Reads a major-unit price. NaN, negatives and infinities read as zero;
/// prices above [`MAX_UNIT_PRICE`] read as that ceiling.
pub fn coerce_unit_price(value: &Value) -> Money {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    };

    match parsed.filter(|f| f.is_finite() && *f >= 0.0) {
        Some(major) => Money::from_major_f64(major)
            .unwrap_or(MAX_UNIT_PRICE)
            .min(MAX_UNIT_PRICE),
        None => Money::zero(),
    }
}

/// Stringifies a loose value and trims it.
///
/// `null`, `false`, `0` and `""` all become the empty string.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Leading `[+-]?digits` of a trimmed string.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = &rest[..rest.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return None;
    }

    // Anything longer than i64 still clamps to the top of the range.
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Leading decimal literal of a trimmed string (`"12.5abc"` → 12.5).
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = bytes[exp_end.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().ok()
}

// =============================================================================
// Form Field Sanitizers
// =============================================================================

/// Strips markup and inline script fragments, then truncates.
///
/// Removes `<` and `>`, every case-insensitive `javascript:` and every
/// `on<word>=` event-handler fragment.
pub fn sanitize_string(input: &str, max_len: usize) -> String {
    let chars: Vec<char> = input.trim().chars().filter(|c| *c != '<' && *c != '>').collect();
    let chars = remove_script_scheme(&chars);
    let chars = remove_event_handlers(&chars);
    chars.into_iter().take(max_len).collect()
}

fn remove_script_scheme(chars: &[char]) -> Vec<char> {
    const NEEDLE: &[char] = &['j', 'a', 'v', 'a', 's', 'c', 'r', 'i', 'p', 't', ':'];
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let window = &chars[i..(i + NEEDLE.len()).min(chars.len())];
        if window.len() == NEEDLE.len()
            && window
                .iter()
                .zip(NEEDLE)
                .all(|(c, n)| c.to_ascii_lowercase() == *n)
        {
            i += NEEDLE.len();
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn remove_event_handlers(chars: &[char]) -> Vec<char> {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let starts_on = i + 1 < chars.len()
            && chars[i].to_ascii_lowercase() == 'o'
            && chars[i + 1].to_ascii_lowercase() == 'n';
        if starts_on {
            let mut j = i + 2;
            while j < chars.len() && is_word(chars[j]) {
                j += 1;
            }
            if j > i + 2 && chars.get(j) == Some(&'=') {
                i = j + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Lowercased email, or empty when it does not look like `local@domain.tld`.
pub fn sanitize_email(email: &str) -> String {
    let cleaned = sanitize_string(email, MAX_EMAIL_LEN).to_lowercase();
    if is_valid_email(&cleaned) {
        cleaned
    } else {
        String::new()
    }
}

/// Phone number, or empty when it is not 10-20 digits/spaces/`-+()`.
pub fn sanitize_phone(phone: &str) -> String {
    let cleaned = sanitize_string(phone, MAX_PHONE_LEN);
    if is_valid_phone(&cleaned) {
        cleaned
    } else {
        String::new()
    }
}

/// Person name, or empty when it is not 2-50 letters/spaces/`'`/`-`.
pub fn sanitize_name(name: &str) -> String {
    let cleaned = sanitize_string(name, MAX_NAME_LEN);
    if is_valid_name(&cleaned) {
        cleaned
    } else {
        String::new()
    }
}

/// Filesystem-safe filename: anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ticket_count_clamps() {
        assert_eq!(coerce_ticket_count(&json!(25)), 20);
        assert_eq!(coerce_ticket_count(&json!(0)), 1);
        assert_eq!(coerce_ticket_count(&json!(-4)), 1);
        assert_eq!(coerce_ticket_count(&json!(7)), 7);
        assert_eq!(coerce_ticket_count(&json!(3.9)), 3);
    }

    #[test]
    fn test_ticket_count_non_numeric_defaults_to_one() {
        for value in [json!(null), json!("abc"), json!(""), json!(true), json!({}), json!([])] {
            assert_eq!(coerce_ticket_count(&value), 1, "{value}");
        }
    }

    #[test]
    fn test_ticket_count_reads_string_prefix() {
        assert_eq!(coerce_ticket_count(&json!(" 3 tickets")), 3);
        assert_eq!(coerce_ticket_count(&json!("15")), 15);
        assert_eq!(coerce_ticket_count(&json!("99999999999999999999999")), 20);
    }

    #[test]
    fn test_unit_price_coercion() {
        assert_eq!(coerce_unit_price(&json!(6499)), Money::from_major(6499));
        assert_eq!(coerce_unit_price(&json!("12.5abc")), Money::from_minor(1250));
        assert_eq!(coerce_unit_price(&json!(".5")), Money::from_minor(50));
        assert_eq!(coerce_unit_price(&json!("1e2")), Money::from_major(100));
        assert_eq!(coerce_unit_price(&json!(-10)), Money::zero());
        assert_eq!(coerce_unit_price(&json!("nope")), Money::zero());
        assert_eq!(coerce_unit_price(&json!(null)), Money::zero());
        assert_eq!(coerce_unit_price(&json!("Infinity")), Money::zero());
    }

    #[test]
    fn test_unit_price_ceiling() {
        assert_eq!(coerce_unit_price(&json!(1e16)), MAX_UNIT_PRICE);
        assert_eq!(coerce_unit_price(&json!(1e17)), MAX_UNIT_PRICE);
        assert_eq!(coerce_unit_price(&json!("9e300")), MAX_UNIT_PRICE);

        let item = sanitize_candidate(&TicketCandidate::new(20, 1e16));
        assert_eq!(item.total_price(), MAX_UNIT_PRICE.multiply_quantity(20));
        assert!(item.total_price().is_positive());
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(coerce_text(&json!("  Ada ")), "Ada");
        assert_eq!(coerce_text(&json!(null)), "");
        assert_eq!(coerce_text(&json!(false)), "");
        assert_eq!(coerce_text(&json!(0)), "");
        assert_eq!(coerce_text(&json!(true)), "true");
        assert_eq!(coerce_text(&json!(42)), "42");
    }

    #[test]
    fn test_sanitize_candidate() {
        let candidate = TicketCandidate::from_json(&json!({
            "ticketCount": 25,
            "unitPrice": 100,
            "firstName": "  Grace ",
            "email": null,
        }))
        .unwrap();

        let item = sanitize_candidate(&candidate);
        assert_eq!(item.ticket_count(), 20);
        assert_eq!(item.unit_price(), Money::from_major(100));
        assert_eq!(item.total_price(), Money::from_major(2000));
        assert_eq!(item.contact().first_name, "Grace");
        assert_eq!(item.contact().email, "");
    }

    #[test]
    fn test_sanitize_string_strips_markup() {
        assert_eq!(sanitize_string("  <b>hi</b> ", 100), "bhi/b");
        assert_eq!(sanitize_string("JavaScript:alert(1)", 100), "alert(1)");
        assert_eq!(sanitize_string("img onerror=boom", 100), "img boom");
        assert_eq!(sanitize_string("button=ok", 100), "button=ok");
        assert_eq!(sanitize_string("abcdef", 3), "abc");
    }

    #[test]
    fn test_sanitize_email() {
        assert_eq!(sanitize_email(" Ada@Example.COM "), "ada@example.com");
        assert_eq!(sanitize_email("not-an-email"), "");
        assert_eq!(sanitize_email("a@b"), "");
        assert_eq!(sanitize_email("a b@c.d"), "");
    }

    #[test]
    fn test_sanitize_phone_and_name() {
        assert_eq!(sanitize_phone("+234 801 234 5678"), "+234 801 234 5678");
        assert_eq!(sanitize_phone("12345"), "");
        assert_eq!(sanitize_name("O'Brien-Smith"), "O'Brien-Smith");
        assert_eq!(sanitize_name("A"), "");
        assert_eq!(sanitize_name("R2D2"), "");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my receipt (1).png"), "my_receipt__1_.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename(&"a".repeat(150)).len(), MAX_FILENAME_LEN);
    }
}
