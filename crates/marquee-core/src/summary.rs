//! Plain-text order summary attached to a manual payment submission.
//!
//! The same text is shown to the buyer before they upload a receipt and
//! forwarded verbatim to the admin notifications.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use ts_rs::TS;

use crate::money::Money;
use crate::types::LineItem;

/// Account the buyer transfers money into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
}

/// Renders the summary for `items`.
///
/// ```rust
/// use marquee_core::summary::{render_order_summary, BankDetails};
///
/// let bank = BankDetails {
///     bank_name: "Access Bank".into(),
///     account_name: "Marquee Events".into(),
///     account_number: "0123456789".into(),
/// };
/// let text = render_order_summary("Marquee", &[], &bank);
/// assert!(text.starts_with("=== MARQUEE PAYMENT NOTIFICATION ==="));
/// assert!(text.ends_with("Receipt attached."));
/// ```
pub fn render_order_summary(brand: &str, items: &[LineItem], bank: &BankDetails) -> String {
    let total_tickets: u64 = items.iter().map(|i| i.ticket_count() as u64).sum();
    let grand_total: Money = items.iter().map(LineItem::total_price).sum();

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "=== {} PAYMENT NOTIFICATION ===", brand.to_uppercase());
    let _ = writeln!(out);
    let _ = writeln!(out, "ORDER SUMMARY:");
    let _ = writeln!(out, "Total Tickets: {total_tickets}");
    let _ = writeln!(out, "Grand Total: {grand_total}");
    let _ = writeln!(out);
    let _ = writeln!(out, "CUSTOMER DETAILS:");

    for (i, item) in items.iter().enumerate() {
        let c = item.contact();
        let _ = writeln!(out);
        let _ = writeln!(out, "Ticket {}:", i + 1);
        let _ = writeln!(out, "  Name: {} {}", c.first_name, c.last_name);
        let _ = writeln!(out, "  Email: {}", c.email);
        let _ = writeln!(out, "  Phone: {}", c.phone);
        let _ = writeln!(out, "  Location: {}", c.location);
        let _ = writeln!(out, "  WhatsApp: {}", c.whatsapp);
        let _ = writeln!(out, "  Tickets: {}", item.ticket_count());
        let _ = writeln!(out, "  Amount: {}", item.total_price());
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "BANK TRANSFER DETAILS:");
    let _ = writeln!(out, "Bank: {}", bank.bank_name);
    let _ = writeln!(out, "Account: {}", bank.account_name);
    let _ = writeln!(out, "Number: {}", bank.account_number);
    let _ = writeln!(out);
    out.push_str("Receipt attached.");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize_candidate;
    use crate::types::{ContactDetails, TicketCandidate};

    #[test]
    fn test_summary_lists_every_item() {
        let contact = ContactDetails {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "08012345678".into(),
            location: "Lagos".into(),
            whatsapp: "08012345678".into(),
        };
        let items = vec![
            sanitize_candidate(&TicketCandidate::new(2, 6499).with_contact(&contact)),
            sanitize_candidate(&TicketCandidate::new(1, 6499)),
        ];
        let bank = BankDetails {
            bank_name: "Access Bank".into(),
            account_name: "Marquee Events".into(),
            account_number: "0123456789".into(),
        };

        let text = render_order_summary("Marquee", &items, &bank);

        assert!(text.contains("Total Tickets: 3\n"));
        assert!(text.contains("Grand Total: ₦19,497.00\n"));
        assert!(text.contains("Ticket 1:\n  Name: Ada Lovelace\n"));
        assert!(text.contains("  Amount: ₦12,998.00\n"));
        assert!(text.contains("Ticket 2:\n"));
        assert!(text.contains("Bank: Access Bank\nAccount: Marquee Events\nNumber: 0123456789\n"));
        assert!(text.ends_with("\n\nReceipt attached."));
    }
}
