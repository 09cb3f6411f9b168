//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (backend reachable)
//!
//! # Products
//! GET  /products               - Listing with filters, sort, pagination
//! GET  /products/{id}          - Product detail (?image=N&tab=)
//!
//! # Cart (session-held)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add product (login required)
//! POST /cart/update            - Set quantity (<= 0 removes)
//! POST /cart/remove            - Remove line
//! POST /cart/clear             - Empty the cart
//! POST /cart/sync              - Push the cart to the backend
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Checkout form
//! POST /checkout               - Place order
//!
//! # Auth
//! GET  /login                  - Login page (?next=)
//! POST /login                  - Login action (rate limited)
//! GET  /register               - Registration page
//! POST /register               - Registration action (rate limited)
//! POST /logout                 - Logout action
//!
//! # Profile (requires auth)
//! GET  /profile                - Profile, game stats, settings (?tab=)
//! POST /profile                - Update profile
//! POST /profile/settings       - Save preferences
//!
//! # Drawing game (requires auth)
//! GET  /game                   - Game page
//! POST /game/start             - Start a round
//! POST /game/submit            - Submit a drawing
//! POST /game/convert           - Convert bonuses to a discount
//! POST /game/refresh           - Reset and re-fetch the daily challenge
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod game;
pub mod health;
pub mod home;
pub mod products;
pub mod profile;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user};
use crate::filters;
use crate::flash::{self, Toast};
use crate::middleware::auth::login_url;
use crate::middleware::{PageContext, auth_rate_limiter, clear_current_user};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/sync", post(cart::sync))
        .route("/count", get(cart::count))
}

/// Create the auth routes router.
///
/// Only the credential-bearing posts go through the rate limiter.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route_layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show).post(profile::update))
        .route("/settings", post(profile::update_settings))
}

/// Create the game routes router.
pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(game::show))
        .route("/start", post(game::start))
        .route("/submit", post(game::submit))
        .route("/convert", post(game::convert))
        .route("/refresh", post(game::refresh))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        .merge(auth_routes())
        .nest("/profile", profile_routes())
        .nest("/game", game_routes())
        .fallback(not_found)
}

/// Queue a toast and redirect (303) to `to`.
pub(crate) async fn redirect_with(session: &Session, toast: Toast, to: &str) -> Result<Redirect> {
    flash::push(session, toast).await?;
    Ok(Redirect::to(to))
}

/// Sign out a visitor whose token the backend rejected, sending them to
/// login with `next` as the return path.
pub(crate) async fn session_expired(session: &Session, next: &str) -> Result<Redirect> {
    tracing::info!("Backend rejected session token, signing out");
    clear_current_user(session).await?;
    clear_sentry_user();
    redirect_with(
        session,
        Toast::error("Your session has expired. Please login again."),
        &login_url(next),
    )
    .await
}

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "errors/not_found.html")]
pub struct NotFoundTemplate {
    pub ctx: PageContext,
}

/// Fallback for unknown paths.
pub async fn not_found(ctx: PageContext) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate { ctx })
}
