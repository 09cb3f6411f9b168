//! Cart route handlers.
//!
//! The cart lives in the session as a JSON blob. Mutations answer with a
//! redirect back to where the visitor came from, carrying a toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use oba_core::{Cart, CartError, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::flash::Toast;
use crate::middleware::{OptionalAuth, PageContext, RequireAuth};
use crate::middleware::auth::{login_url, safe_next};
use crate::routes::{redirect_with, session_expired};
use crate::services;
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    /// Page to return to after adding.
    pub next: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub cart: Cart,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
///
/// Anonymous visitors get a login prompt instead of the contents.
#[instrument(skip_all)]
pub async fn show(session: Session, ctx: PageContext) -> impl IntoResponse {
    let cart = if ctx.is_authenticated() {
        services::cart::load(&session).await
    } else {
        Cart::new()
    };

    CartShowTemplate { ctx, cart }
}

/// Add a product to the cart.
#[instrument(skip(state, session, current))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let product_id = ProductId::new(form.product_id);
    let default_next = format!("/products/{}", urlencoding::encode(product_id.as_str()));
    let next = safe_next(form.next.as_deref().or(Some(&default_next))).to_string();

    if current.is_none() {
        return redirect_with(
            &session,
            Toast::error("Please login to add items to cart"),
            &login_url(&next),
        )
        .await;
    }

    let product = match state.api().get_product(&product_id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!("Failed to load product {product_id} for cart: {e}");
            return redirect_with(&session, Toast::error("Failed to add item to cart"), &next)
                .await;
        }
    };

    let mut cart = services::cart::load(&session).await;
    let quantity = product.clamp_quantity(form.quantity.unwrap_or(1));

    let toast = match cart.add(&product, quantity) {
        Ok(()) => {
            services::cart::save(&session, &cart).await?;
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", product.id.as_str())]),
            );
            Toast::success(format!("{} added to cart!", product.name))
        }
        Err(e @ CartError::OutOfStock(_)) => Toast::error(e.to_string()),
        Err(e) => {
            tracing::warn!("Failed to add to cart: {e}");
            Toast::error("Failed to add item to cart")
        }
    };

    redirect_with(&session, toast, &next).await
}

/// Set the quantity of a line; zero or less removes it.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Redirect> {
    let mut cart = services::cart::load(&session).await;
    let product_id = ProductId::new(form.product_id);

    match cart.update_quantity(&product_id, form.quantity) {
        Ok(removed) => {
            services::cart::save(&session, &cart).await?;
            if removed {
                return redirect_with(&session, Toast::success("Item removed from cart"), "/cart")
                    .await;
            }
            Ok(Redirect::to("/cart"))
        }
        Err(e) => {
            tracing::debug!("Ignoring cart update: {e}");
            Ok(Redirect::to("/cart"))
        }
    }
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let mut cart = services::cart::load(&session).await;

    if cart.remove(&ProductId::new(form.product_id)).is_some() {
        services::cart::save(&session, &cart).await?;
        return redirect_with(&session, Toast::success("Item removed from cart"), "/cart").await;
    }

    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(session: Session) -> Result<Redirect> {
    services::cart::clear(&session).await?;
    redirect_with(&session, Toast::success("Cart cleared"), "/cart").await
}

/// Push the cart to the backend.
#[instrument(skip_all)]
pub async fn sync(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Redirect> {
    let cart = services::cart::load(&session).await;

    let toast = match state.api().sync_cart(&current.token(), &cart).await {
        Ok(()) => Toast::success("Cart synced"),
        Err(e) if e.is_unauthorized() => return session_expired(&session, "/cart").await,
        Err(e) => {
            tracing::warn!("Failed to sync cart: {e}");
            Toast::error("Failed to sync cart")
        }
    };

    redirect_with(&session, toast, "/cart").await
}

/// Cart count badge fragment.
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: services::cart::load(&session).await.item_count(),
    }
}
