//! HTTP client for the marketplace REST API.

use std::sync::Arc;

use moka::future::Cache;
use oba_core::{
    Cart, DailyChallenge, Email, GameState, Preferences, Product, ProductId, ProductPage,
    ProductQuery, ProfileUpdate, User,
};
use oba_core::user::RegistrationRequest;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use super::types::{
    AuthResponse, ChallengeResponse, ConvertBonusesRequest, ConvertBonusesResponse, ErrorBody,
    FeaturedResponse, LoginRequest, PreferencesUpdate, ProductResponse, RecommendationsResponse,
    SubmitDrawingRequest, SubmitDrawingResponse, UserResponse,
};
use crate::config::ApiConfig;

const USER_AGENT: &str = concat!("oba-storefront/", env!("CARGO_PKG_VERSION"));

/// Client for the marketplace REST API.
///
/// Product listings, featured products and product details are cached.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
                cache,
            }),
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&SecretString>) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let mut builder = self.inner.client.request(method, url);
        if let Some(key) = &self.inner.api_key {
            builder = builder.header("X-Api-Key", key.expose_secret());
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }

    /// Send a request and parse the JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response_text = self.send(request).await?;

        match serde_json::from_str(&response_text) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Send a request, map error statuses and return the raw body.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let path = response.url().path().to_string();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status.is_success() {
            return Ok(response_text);
        }

        let message = ErrorBody::parse(&response_text).unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(path)),
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized(message)),
            _ => {
                if status.is_server_error() {
                    tracing::error!(
                        status = %status,
                        path = %path,
                        body = %response_text.chars().take(500).collect::<String>(),
                        "API returned non-success status"
                    );
                } else {
                    debug!(status = %status, path = %path, "API rejected request");
                }
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    // =========================================================================
    // Catalog (cached)
    // =========================================================================

    /// List products matching a catalog query.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let pairs = query.to_api_pairs();
        let cache_key = CacheKey::Products(encode_pairs(&pairs));

        if let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(*page);
        }

        let request = self.request(Method::GET, "/products", None).query(&pairs);
        let page: ProductPage = self.execute(request).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(Box::new(page.clone())))
            .await;

        Ok(page)
    }

    /// Featured products for the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Featured(products)) =
            self.inner.cache.get(&CacheKey::Featured).await
        {
            debug!("Cache hit for featured products");
            return Ok(products);
        }

        let request = self.request(Method::GET, "/products/featured", None);
        let response: FeaturedResponse = self.execute(request).await?;

        self.inner
            .cache
            .insert(
                CacheKey::Featured,
                CacheValue::Featured(response.products.clone()),
            )
            .await;

        Ok(response.products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("/products/{}", urlencoding::encode(id.as_str()));
        let request = self.request(Method::GET, &path, None);
        let response: ProductResponse = self.execute(request).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(response.product.clone())))
            .await;

        Ok(response.product)
    }

    // =========================================================================
    // Per-user calls (not cached)
    // =========================================================================

    /// Personalised recommendations; anonymous visitors get the generic set.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn ai_recommendations(
        &self,
        token: Option<&SecretString>,
    ) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, "/products/ai-recommendations", token);
        let response: RecommendationsResponse = self.execute(request).await?;
        Ok(response.recommendations)
    }

    /// Push the cart to the backend. Empty carts are not sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, cart), fields(items = cart.items().len()))]
    pub async fn sync_cart(&self, token: &SecretString, cart: &Cart) -> Result<(), ApiError> {
        let Some(payload) = cart.sync_payload() else {
            debug!("Skipping sync of empty cart");
            return Ok(());
        };
        let request = self
            .request(Method::POST, "/cart/sync", Some(token))
            .json(&payload);
        self.send(request).await?;
        Ok(())
    }

    /// Bonuses, history and whether the user may play today.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn game_state(&self, token: &SecretString) -> Result<GameState, ApiError> {
        let request = self.request(Method::GET, "/game/state", Some(token));
        self.execute(request).await
    }

    /// Today's challenge, if one is scheduled.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn daily_challenge(
        &self,
        token: &SecretString,
    ) -> Result<Option<DailyChallenge>, ApiError> {
        let request = self.request(Method::GET, "/game/daily-challenge", Some(token));
        let response: ChallengeResponse = self.execute(request).await?;
        Ok(response.challenge)
    }

    /// Submit a drawing for scoring.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, body), fields(challenge_id = %body.challenge_id))]
    pub async fn submit_drawing(
        &self,
        token: &SecretString,
        body: &SubmitDrawingRequest,
    ) -> Result<SubmitDrawingResponse, ApiError> {
        self.post_json("/game/submit-drawing", token, body).await
    }

    /// Convert bonuses into a discount.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn convert_bonuses(
        &self,
        token: &SecretString,
        bonus_amount: u32,
    ) -> Result<ConvertBonusesResponse, ApiError> {
        self.post_json(
            "/game/convert-bonuses",
            token,
            &ConvertBonusesRequest { bonus_amount },
        )
        .await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::POST, path, Some(token)).json(body);
        self.execute(request).await
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.clone(),
            password: password.to_string(),
        };
        let request = self.request(Method::POST, "/auth/login", None).json(&body);
        self.execute(request).await
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration.
    #[instrument(skip(self, body), fields(email = %body.email))]
    pub async fn register(&self, body: &RegistrationRequest) -> Result<AuthResponse, ApiError> {
        let request = self.request(Method::POST, "/auth/register", None).json(body);
        self.execute(request).await
    }

    /// The account behind a token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the token expired.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &SecretString) -> Result<User, ApiError> {
        let request = self.request(Method::GET, "/auth/me", Some(token));
        let response: UserResponse = self.execute(request).await?;
        Ok(response.user)
    }

    /// Update name, phone and address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, update))]
    pub async fn update_profile(
        &self,
        token: &SecretString,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        self.put_profile(token, update).await
    }

    /// Save notification and privacy preferences.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, preferences))]
    pub async fn update_preferences(
        &self,
        token: &SecretString,
        preferences: Preferences,
    ) -> Result<User, ApiError> {
        self.put_profile(token, &PreferencesUpdate { preferences })
            .await
    }

    async fn put_profile<B: Serialize + Sync>(
        &self,
        token: &SecretString,
        body: &B,
    ) -> Result<User, ApiError> {
        let request = self
            .request(Method::PUT, "/auth/profile", Some(token))
            .json(body);
        let response: UserResponse = self.execute(request).await?;
        Ok(response.user)
    }

    /// Backend liveness, used by the readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::GET, "/health", None)).await?;
        Ok(())
    }
}

fn encode_pairs(pairs: &[(&'static str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
