//! Anonymous browsing: home, listing, product detail and missing pages.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use oba_integration_tests::{TestContext, product_json};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_home_shows_featured_and_recommendations() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/products/featured"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json("p1", "Copper Lamp", 25.5, 4)]
        })))
        .expect(1)
        .mount(&ctx.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/ai-recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recommendations": [product_json("p2", "Silk Scarf", 40.0, 2)]
        })))
        .mount(&ctx.backend)
        .await;

    let first = ctx.get("/").await;
    assert_eq!(first.status(), StatusCode::OK);
    let body = first.text().await.unwrap();
    assert!(body.contains("Featured Products"));
    assert!(body.contains("Copper Lamp"));
    assert!(body.contains("25.50 ₼"));
    assert!(body.contains("Silk Scarf"));

    // Featured products come from the cache on the second visit.
    let again = ctx.page("/").await;
    assert!(again.contains("Copper Lamp"));
}

#[tokio::test]
async fn test_home_survives_backend_failure() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/products/featured"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.backend)
        .await;

    let response = ctx.get("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Shop by Category"));
    assert!(!body.contains("Recommended for You"));
}

#[tokio::test]
async fn test_listing_forwards_filters_to_backend() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("search", "lamp"))
        .and(query_param("category", "home"))
        .and(query_param("minPrice", "10"))
        .and(query_param("sortBy", "price"))
        .and(query_param("sortOrder", "asc"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json("p1", "Copper Lamp", 25.5, 4)],
            "pagination": {
                "currentPage": 2,
                "totalPages": 3,
                "totalProducts": 25,
                "hasNext": true,
                "hasPrev": true
            }
        })))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let body = ctx
        .page("/products?search=lamp&category=home&minPrice=10&sort=price-asc&page=2")
        .await;

    assert!(body.contains("Copper Lamp"));
    assert!(body.contains("Showing 1 of 25 products"));
    assert!(body.contains("page=3"));
    assert!(body.contains("Clear Filters"));
}

#[tokio::test]
async fn test_listing_reports_load_failure() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&ctx.backend)
        .await;

    let response = ctx.get("/products").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Failed to load products"));
}

/// `href` of the anchor carrying `aria-label`, with askama's `&` escape undone.
fn link_for(body: &str, label: &str) -> String {
    let marker = format!("aria-label=\"{label}\"");
    let anchor_end = body.find(&marker).unwrap();
    let anchor_start = body[..anchor_end].rfind("<a href=\"").unwrap() + "<a href=\"".len();
    let href = &body[anchor_start..anchor_end];
    href[..href.find('"').unwrap()].replace("&#38;", "&")
}

#[tokio::test]
async fn test_view_toggle_switches_both_ways() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json("p1", "Copper Lamp", 25.5, 4)],
            "pagination": {"currentPage": 1, "totalPages": 1, "totalProducts": 1}
        })))
        .mount(&ctx.backend)
        .await;

    let list = ctx.page("/products?category=home&view=list").await;
    assert!(list.contains("product-grid--list"));
    assert_eq!(
        link_for(&list, "Grid view"),
        "/products?category=home&page=1"
    );
    assert_eq!(
        link_for(&list, "List view"),
        "/products?category=home&view=list&page=1"
    );

    let grid = ctx.page(&link_for(&list, "Grid view")).await;
    assert!(!grid.contains("product-grid--list"));
    assert_eq!(
        link_for(&grid, "List view"),
        "/products?category=home&view=list&page=1"
    );
}

#[tokio::test]
async fn test_product_detail_ignores_bad_image_param() {
    let ctx = TestContext::new().await;
    ctx.mock_product(&product_json("p1", "Copper Lamp", 25.5, 4))
        .await;

    for query in ["?image=abc", "?image=", "?image=-3"] {
        let response = ctx.get(&format!("/products/p1{query}")).await;
        assert_eq!(response.status(), StatusCode::OK, "{query}");
        let body = response.text().await.unwrap();
        assert!(body.contains("p1.jpg"), "{query}");
    }
}

#[tokio::test]
async fn test_product_detail_page() {
    let ctx = TestContext::new().await;
    ctx.mock_product(&product_json("p1", "Copper Lamp", 25.5, 4))
        .await;

    let response = ctx.get("/products/p1?tab=reviews").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("<h1>Copper Lamp</h1>"));
    assert!(body.contains("In Stock (4 available)"));
    assert!(body.contains("Add to Cart"));
}

#[tokio::test]
async fn test_missing_product_is_404() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/products/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Product not found"
        })))
        .mount(&ctx.backend)
        .await;

    let response = ctx.get("/products/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().contains("Product Not Found"));
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/no/such/page").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_requests_send_no_bearer_token() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/products/featured"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.backend)
        .await;

    let _ = ctx.get("/").await;
}
