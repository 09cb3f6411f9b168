//! Authentication route handlers.
//!
//! Credentials go straight to the marketplace backend; the token it returns
//! is kept in the session next to the account it belongs to.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{OriginalUri, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use oba_core::{Email, RegistrationForm};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiError, types::AuthResponse};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash::Toast;
use crate::middleware::auth::safe_next;
use crate::middleware::{
    CspNonce, OptionalAuth, PageContext, clear_current_user, set_current_user,
};
use crate::models::CurrentUser;
use crate::routes::redirect_with;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Return path carried through the login page.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub next: String,
    pub email: String,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub error: Option<String>,
    pub min_password_length: usize,
}

impl RegisterTemplate {
    fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            error: None,
            min_password_length: oba_core::user::MIN_PASSWORD_LENGTH,
        }
    }
}

/// Message shown when the backend rejects a sign-in or sign-up.
fn failure_message(error: &ApiError, fallback: &str) -> String {
    error.user_message().unwrap_or(fallback).to_string()
}

/// Store the signed-in account in the session.
async fn sign_in(session: &Session, auth: AuthResponse) -> Result<()> {
    set_sentry_user(&auth.user.id, Some(auth.user.email.as_str()));
    let current = CurrentUser::new(auth.token, auth.user);
    set_current_user(session, &current).await?;
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// Already signed-in visitors go straight to `next`.
pub async fn login_page(
    Query(query): Query<NextQuery>,
    OptionalAuth(current): OptionalAuth,
    ctx: PageContext,
) -> Response {
    let next = safe_next(query.next.as_deref()).to_string();
    if current.is_some() {
        return Redirect::to(&next).into_response();
    }

    LoginTemplate {
        ctx,
        next,
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_string();

    let result = match Email::parse(&form.email) {
        Ok(email) => state
            .api()
            .login(&email, &form.password)
            .await
            .map_err(|e| {
                tracing::warn!("Login failed: {e}");
                failure_message(&e, "Login failed. Please try again.")
            }),
        Err(e) => Err(e.to_string()),
    };

    match result {
        Ok(auth) => {
            sign_in(&session, auth).await?;
            Ok(redirect_with(&session, Toast::success("Login successful!"), &next)
                .await?
                .into_response())
        }
        Err(message) => {
            let ctx = PageContext::load(&session, nonce, uri.path().to_string()).await;
            let page = LoginTemplate {
                ctx,
                next,
                email: form.email.trim().to_string(),
                error: Some(message),
            };
            Ok((StatusCode::UNAUTHORIZED, page).into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(OptionalAuth(current): OptionalAuth, ctx: PageContext) -> Response {
    if current.is_some() {
        return Redirect::to("/").into_response();
    }
    RegisterTemplate::new(ctx).into_response()
}

/// Handle registration form submission.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    let (name, email, phone) = (form.name.clone(), form.email.clone(), form.phone.clone());

    let result = match form.into_request() {
        Ok(request) => state.api().register(&request).await.map_err(|e| {
            tracing::warn!("Registration failed: {e}");
            failure_message(&e, "Registration failed. Please try again.")
        }),
        Err(e) => Err(e.to_string()),
    };

    match result {
        Ok(auth) => {
            sign_in(&session, auth).await?;
            Ok(redirect_with(&session, Toast::success("Registration successful!"), "/")
                .await?
                .into_response())
        }
        Err(message) => {
            let ctx = PageContext::load(&session, nonce, uri.path().to_string()).await;
            let page = RegisterTemplate {
                name,
                email,
                phone,
                error: Some(message),
                ..RegisterTemplate::new(ctx)
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    redirect_with(&session, Toast::info("You have been logged out"), "/").await
}
