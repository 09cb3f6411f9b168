//! Per-request data every page layout needs.

use axum::{extract::FromRequestParts, http::request::Parts};
use oba_core::User;
use tower_sessions::Session;

use crate::flash::{self, Toast};
use crate::middleware::CspNonce;
use crate::middleware::auth::request_uri;
use crate::models::{CurrentUser, keys};
use crate::services;

/// Layout context: navbar state, CSP nonce and pending toasts.
///
/// Extracting it drains the toast queue, so handlers that redirect should
/// not take a `PageContext`.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub nonce: String,
    pub path: String,
    pub user: Option<User>,
    pub cart_count: u32,
    /// Bonus balance for the navbar badge, when known.
    pub bonuses: u32,
    pub toasts: Vec<Toast>,
}

impl PageContext {
    /// Show a toast on the page being rendered.
    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether a navbar link points at the current section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.path == "/"
        } else {
            self.path.starts_with(prefix)
        }
    }
}

impl PageContext {
    /// Build the context from the session, draining queued toasts.
    ///
    /// Handlers that only sometimes render (a form post that redirects on
    /// success) call this on the render path instead of extracting.
    pub async fn load(session: &Session, nonce: String, path: String) -> Self {
        let user = session
            .get::<CurrentUser>(keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .map(|current| current.user);
        let cart_count = services::cart::load(session).await.item_count();
        let bonuses = if user.is_some() {
            services::game::snapshot(session)
                .await
                .map_or(0, |state| state.user_bonuses)
        } else {
            0
        };
        let toasts = flash::drain(session).await;

        Self {
            nonce,
            path,
            user,
            cart_count,
            bonuses,
            toasts,
        }
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CspNonce(nonce) = CspNonce::from_request_parts(parts, state).await?;
        let path = request_uri(parts).path().to_string();

        match parts.extensions.get::<Session>().cloned() {
            Some(session) => Ok(Self::load(&session, nonce, path).await),
            None => Ok(Self {
                nonce,
                path,
                ..Self::default()
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active() {
        let ctx = PageContext {
            path: "/products/p1".to_string(),
            ..PageContext::default()
        };
        assert!(ctx.is_active("/products"));
        assert!(!ctx.is_active("/"));
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_path_survives_nested_routing() {
        let (mut parts, ()) = axum::http::Request::builder()
            .uri("/?tab=orders")
            .body(())
            .unwrap()
            .into_parts();
        parts
            .extensions
            .insert(axum::extract::OriginalUri("/profile?tab=orders".parse().unwrap()));

        let ctx = PageContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.path, "/profile");
        assert!(ctx.is_active("/profile"));
        assert!(!ctx.is_active("/"));
    }
}
