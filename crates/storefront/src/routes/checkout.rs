//! Checkout route handlers.
//!
//! Payment is not processed here: placing an order validates the form,
//! pushes the cart to the backend and empties it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{OriginalUri, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use oba_core::{Cart, CheckoutError, CheckoutForm, PaymentMethod, User};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::flash::Toast;
use crate::middleware::{CspNonce, PageContext, RequireAuth};
use crate::routes::redirect_with;
use crate::services;
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub cart: Cart,
    pub form: CheckoutForm,
    pub errors: Vec<CheckoutError>,
    pub payment_methods: [PaymentMethod; 3],
}

impl CheckoutTemplate {
    #[must_use]
    pub fn pays_by_card(&self) -> bool {
        self.form.payment_method == PaymentMethod::Card
    }
}

/// Prefill the form from the account.
fn prefilled_form(user: &User) -> CheckoutForm {
    let mut names = user.name.trim().splitn(2, char::is_whitespace);
    CheckoutForm {
        first_name: names.next().unwrap_or_default().to_string(),
        last_name: names.next().unwrap_or_default().trim().to_string(),
        email: user.email.to_string(),
        phone: user.phone.clone().unwrap_or_default(),
        address: user.address.street.clone(),
        city: user.address.city.clone(),
        zip_code: user.address.zip_code.clone(),
        ..CheckoutForm::default()
    }
}

/// Display the checkout form.
#[instrument(skip_all)]
pub async fn show(
    session: Session,
    RequireAuth(current): RequireAuth,
    ctx: PageContext,
) -> impl IntoResponse {
    CheckoutTemplate {
        ctx,
        cart: services::cart::load(&session).await,
        form: prefilled_form(&current.user),
        errors: Vec::new(),
        payment_methods: PaymentMethod::ALL,
    }
}

/// Place the order.
///
/// Invalid forms are rendered again with every field error listed.
#[instrument(skip_all)]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    CspNonce(nonce): CspNonce,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = services::cart::load(&session).await;
    if cart.is_empty() {
        return Ok(redirect_with(&session, Toast::error("Your cart is empty."), "/cart")
            .await?
            .into_response());
    }

    if let Err(errors) = form.validate() {
        let ctx = PageContext::load(&session, nonce, uri.path().to_string()).await;
        let page = CheckoutTemplate {
            ctx,
            cart,
            form,
            errors,
            payment_methods: PaymentMethod::ALL,
        };
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    if let Err(e) = state.api().sync_cart(&current.token(), &cart).await {
        tracing::warn!("Failed to sync cart at checkout: {e}");
    }

    tracing::info!(
        items = cart.item_count(),
        total = %cart.total(),
        payment = form.payment_method.value(),
        card = form.card_last_four().as_deref().unwrap_or("-"),
        "Order placed"
    );

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("payment", form.payment_method.value())]),
    );
    services::cart::clear(&session).await?;
    Ok(
        redirect_with(&session, Toast::success("Order placed successfully!"), "/")
            .await?
            .into_response(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_prefilled_form_splits_name() {
        let user: User = serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "name": "Aysel Mammadova Aliyeva",
            "email": "aysel@example.az",
            "address": {"street": "Nizami 5", "city": "Baku", "zipCode": "AZ1000"}
        }))
        .unwrap();

        let form = prefilled_form(&user);
        assert_eq!(form.first_name, "Aysel");
        assert_eq!(form.last_name, "Mammadova Aliyeva");
        assert_eq!(form.city, "Baku");
        assert_eq!(form.payment_method, PaymentMethod::Card);
    }
}
