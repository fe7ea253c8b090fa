//! Server-specific constants

pub const GREENLINE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Configuration property keys
pub const SERVER_ADDRESS_PROPERTY: &str = "server.address";
pub const SERVER_PORT_PROPERTY: &str = "server.port";
pub const SERVER_CONTEXT_PATH_PROPERTY: &str = "server.contextPath";
pub const DEFAULT_SERVER_PORT: u16 = 8365;

pub const DB_URL_PROPERTY: &str = "db.url";
pub const DB_MAX_CONNECTIONS_PROPERTY: &str = "db.maxConnections";

// Pagination defaults
pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 200;

// Webhook signature headers
pub const RETELL_SIGNATURE_HEADER: &str = "X-Retell-Signature";
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Tolerance window for Stripe webhook timestamps
pub const STRIPE_SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Clamp a requested page size into the allowed window
pub fn clamp_page_size(requested: Option<u64>) -> u64 {
    match requested {
        Some(0) | None => DEFAULT_PAGE_SIZE,
        Some(size) => size.min(MAX_PAGE_SIZE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(0)), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(50)), 50);
        assert_eq!(clamp_page_size(Some(10_000)), MAX_PAGE_SIZE);
    }
}
