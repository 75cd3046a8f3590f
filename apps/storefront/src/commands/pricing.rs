//! Ticket price lookup.

use tracing::debug;

use marquee_core::Money;

use crate::Storefront;

/// Current ticket price; never fails, the default stands in for the server.
pub async fn ticket_price(sf: &Storefront) -> Money {
    debug!("ticket_price command");
    sf.price.current(sf.api.as_ref()).await
}

/// Drops the cached price and asks the server again.
pub async fn refresh_price(sf: &Storefront) -> Money {
    sf.price.invalidate();
    ticket_price(sf).await
}
