//! Integration tests for the Oba storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p oba-integration-tests
//! ```
//!
//! Each test serves the real storefront router on an ephemeral port and
//! points it at a `wiremock` server standing in for the marketplace backend.
//! No external services are needed.
//!
//! # Test Categories
//!
//! - `browsing` - Home, listing, product detail, 404s
//! - `auth` - Login, registration, logout, protected pages
//! - `cart` - Cart mutations and the login gate
//! - `checkout` - Validation and order placement
//! - `game` - Drawing rounds and bonus conversion
//! - `health` - Liveness and readiness probes

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use oba_storefront::config::{ApiConfig, StorefrontConfig};
use oba_storefront::state::AppState;
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Backend token handed out by [`TestContext::mock_login`].
pub const TEST_TOKEN: &str = "test-token";

/// A 1×1 PNG as produced by `canvas.toDataURL("image/png")`.
pub const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// A running storefront and its mocked backend.
pub struct TestContext {
    /// Cookie-keeping client that does not follow redirects.
    pub client: Client,
    pub base_url: String,
    pub backend: MockServer,
}

impl TestContext {
    /// Start a mocked backend and serve the storefront against it.
    pub async fn new() -> Self {
        let backend = MockServer::start().await;

        let config = StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            api: ApiConfig::new(backend.uri()),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config).unwrap();
        let app = oba_storefront::app(state);

        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .unwrap();

        Self {
            client,
            base_url: format!("http://{addr}"),
            backend,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// GET a page and return its body.
    pub async fn page(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }

    /// Mount `/auth/login` answering with [`user_json`] and sign in.
    pub async fn login(&self) {
        self.mock_login().await;
        let response = self
            .post(
                "/login",
                &[("email", "aysel@example.az"), ("password", "secret123")],
            )
            .await;
        assert!(response.status().is_redirection(), "login did not redirect");
    }

    pub async fn mock_login(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": TEST_TOKEN,
                "user": user_json()
            })))
            .mount(&self.backend)
            .await;
    }

    /// Mount `GET /products/{id}`.
    pub async fn mock_product(&self, product: &Value) {
        let id = product["_id"].as_str().unwrap();
        Mock::given(method("GET"))
            .and(path(format!("/products/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "product": product })))
            .mount(&self.backend)
            .await;
    }
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// The account returned by the mocked backend.
#[must_use]
pub fn user_json() -> Value {
    json!({
        "_id": "u1",
        "name": "Aysel Mammadova",
        "email": "aysel@example.az",
        "phone": "+994501234567",
        "address": {"street": "Nizami 5", "city": "Baku", "zipCode": "AZ1000"},
        "preferences": {
            "notifications": {"email": true, "push": false, "sms": false},
            "privacy": {"aiRecommendations": true, "shareGameStats": true}
        }
    })
}

/// A product as the backend sends it.
#[must_use]
pub fn product_json(id: &str, name: &str, price: f64, stock: u32) -> Value {
    json!({
        "_id": id,
        "name": name,
        "description": format!("{name} description"),
        "price": price,
        "category": "home",
        "images": [{"url": format!("https://cdn.example.az/{id}.jpg")}],
        "rating": {"average": 4.5, "count": 12},
        "stock": stock,
        "tags": ["new"]
    })
}
