//! Integration tests for the Medina storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p medina-integration-tests
//! ```
//!
//! Every HTTP test stands up its own `wiremock` server, so no real network
//! traffic is made and no services need to be running.
//!
//! # Test Categories
//!
//! - `catalog_client` - Catalog listing, single product, auth, caching
//! - `order_client` - Order submission and reply handling
//! - `checkout_session` - Cart to order, end to end through a session

use medina_storefront::StorefrontConfig;
use serde_json::{Value, json};

/// Access key that passes the placeholder and entropy checks.
pub const ACCESS_KEY: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

/// Configuration pointing the catalog and the order endpoint at mock servers.
///
/// Extra variables override or extend the defaults.
///
/// # Panics
///
/// Panics if the resulting configuration is invalid.
#[must_use]
pub fn config(catalog_uri: &str, order_uri: &str, extra: &[(&str, &str)]) -> StorefrontConfig {
    let api_url = format!("{catalog_uri}/api/");
    let endpoint = format!("{order_uri}/submit");
    let lookup = |key: &str| {
        if let Some((_, value)) = extra.iter().find(|(k, _)| *k == key) {
            return Some((*value).to_string());
        }
        match key {
            "CATALOG_API_URL" => Some(api_url.clone()),
            "ORDER_ENDPOINT_URL" => Some(endpoint.clone()),
            "ORDER_ACCESS_KEY" => Some(ACCESS_KEY.to_string()),
            _ => None,
        }
    };
    StorefrontConfig::from_lookup(lookup).expect("invalid test configuration")
}

/// A t-shirt with sizes S/M/L in black and white.
#[must_use]
pub fn tee_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": "Atlas Tee",
        "description": "Heavy cotton tee",
        "price": "120.00",
        "product_type": "TSHIRT",
        "available_sizes": "S, M, L",
        "images": [
            {"image": "/media/tee-black.jpg", "color": "Black"},
            {"image": "/media/tee-white.jpg", "color": "White"}
        ]
    })
}

/// A tote bag with a numeric price and no images.
#[must_use]
pub fn tote_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": "Souk Tote",
        "description": "Canvas tote bag",
        "price": 50,
        "product_type": "TOTEBAG",
        "available_sizes": null,
        "images": null
    })
}
