//! Integration tests for `CatalogClient`.
//!
//! Uses `wiremock` to stand up a local catalog API for each test.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use medina_core::{ProductId, ProductType};
use medina_integration_tests::{config, tee_json, tote_json};
use medina_storefront::{CatalogClient, CatalogError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, extra: &[(&str, &str)]) -> CatalogClient {
    let config = config(&server.uri(), "http://127.0.0.1:9", extra);
    CatalogClient::new(&config.catalog).unwrap()
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_products_accepts_paginated_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"count": 2, "results": [tee_json(1), tote_json(2)]})),
        )
        .mount(&server)
        .await;

    let products = client(&server, &[]).list_products().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].product_type, ProductType::Tshirt);
    assert_eq!(products[0].price.to_string(), "120");
    assert_eq!(products[1].price.to_string(), "50");
    assert!(products[1].images.is_empty());
}

#[tokio::test]
async fn list_products_accepts_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([tote_json(2)])))
        .mount(&server)
        .await;

    let products = client(&server, &[]).list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, ProductId::new(2));
}

#[tokio::test]
async fn list_products_skips_unparseable_prices() {
    let server = MockServer::start().await;
    let mut broken = tote_json(3);
    broken["price"] = json!("call us");
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([tee_json(1), broken])))
        .mount(&server)
        .await;

    let products = client(&server, &[]).list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, ProductId::new(1));
}

#[tokio::test]
async fn list_products_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([tee_json(1)])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, &[]);
    let first = client.list_products().await.unwrap();
    let second = client.list_products().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn invalidate_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([tee_json(1)])))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server, &[]);
    client.list_products().await.unwrap();
    client.invalidate();
    client.list_products().await.unwrap();
}

#[tokio::test]
async fn list_products_reports_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server, &[]).list_products().await.unwrap_err();
    assert!(
        matches!(err, CatalogError::Status { status: 503, .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn list_products_rejects_non_listing_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server, &[]).list_products().await.unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)), "unexpected error: {err:?}");
}

// ---------------------------------------------------------------------------
// Single product
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_fetches_one_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tee_json(1)))
        .mount(&server)
        .await;

    let client = client(&server, &[]);
    let product = client.product(ProductId::new(1)).await.unwrap();
    assert_eq!(product.title, "Atlas Tee");
    assert_eq!(product.available_sizes.as_deref(), Some("S, M, L"));

    let image = client.image_url(&product.images[0]).unwrap();
    assert_eq!(image.as_str(), format!("{}/media/tee-black.jpg", server.uri()));
}

#[tokio::test]
async fn product_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/404/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let err = client(&server, &[])
        .product(ProductId::new(404))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(id) if id == ProductId::new(404)));
}

#[tokio::test]
async fn product_with_bad_price_is_an_error() {
    let server = MockServer::start().await;
    let mut broken = tee_json(5);
    broken["price"] = json!(null);
    Mock::given(method("GET"))
        .and(path("/api/products/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(broken))
        .mount(&server)
        .await;

    let err = client(&server, &[])
        .product(ProductId::new(5))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidProduct { .. }), "unexpected error: {err:?}");
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn static_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .and(header("Authorization", "Token k9Fz2LmQ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let products = client(&server, &[("CATALOG_API_TOKEN", "k9Fz2LmQ")])
        .list_products()
        .await
        .unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn credentials_log_in_once_for_a_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"username": "shop", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "issued-42"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Token issued-42"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([tote_json(2)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Token issued-42"))
        .and(path("/api/products/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tote_json(2)))
        .mount(&server)
        .await;

    let client = client(
        &server,
        &[("CATALOG_USERNAME", "shop"), ("CATALOG_PASSWORD", "hunter22")],
    );
    assert_eq!(client.list_products().await.unwrap().len(), 1);
    assert_eq!(
        client.product(ProductId::new(2)).await.unwrap().title,
        "Souk Tote"
    );
}

#[tokio::test]
async fn refused_login_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = client(
        &server,
        &[("CATALOG_USERNAME", "shop"), ("CATALOG_PASSWORD", "wrong")],
    )
    .list_products()
    .await
    .unwrap_err();
    assert!(matches!(err, CatalogError::Login(_)), "unexpected error: {err:?}");
}
