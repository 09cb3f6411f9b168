//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in user in route handlers.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, Uri, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, keys};

/// Extractor that requires a signed-in user.
///
/// If the visitor is not logged in, redirects to `/login?next=<path>` so
/// they come back to the page they asked for.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(current): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", current.user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the visitor is not logged in.
pub enum AuthRejection {
    /// Redirect to login page, remembering where to return.
    RedirectToLogin(String),
    /// Session layer missing.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(next) => Redirect::to(&login_url(&next)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let current: CurrentUser = session
            .get(keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AuthRejection::RedirectToLogin(return_path(parts)))?;

        Ok(Self(current))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the visitor is not logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(current))
    }
}

/// Sign a user in, rotating the session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    current: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, current).await
}

/// Sign the user out. The cart survives, like it would in the browser.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(keys::CURRENT_USER).await?;
    session.remove_value(keys::GAME_ROUND).await?;
    session.remove_value(keys::GAME_STATE).await?;
    Ok(())
}

/// URI the visitor asked for. Nested routers strip their prefix from
/// `parts.uri`, so prefer the one recorded before routing.
pub(crate) fn request_uri(parts: &Parts) -> &Uri {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0)
}

/// Path and query of the current request.
fn return_path(parts: &Parts) -> String {
    request_uri(parts)
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string)
}

/// Login URL that returns to `next` afterwards.
#[must_use]
pub fn login_url(next: &str) -> String {
    match safe_next(Some(next)) {
        "/" => "/login".to_string(),
        next => format!("/login?next={}", urlencoding::encode(next)),
    }
}

/// Only local absolute paths are accepted as return targets.
///
/// Anything else (absolute URLs, protocol-relative `//host`, backslash
/// tricks) falls back to `/`.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.contains(['\r', '\n']) =>
        {
            path
        }
        _ => "/",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/checkout")), "/checkout");
        assert_eq!(safe_next(Some("/products?page=2")), "/products?page=2");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn test_login_url() {
        assert_eq!(login_url("/"), "/login");
        assert_eq!(login_url("/profile?tab=game"), "/login?next=%2Fprofile%3Ftab%3Dgame");
        assert_eq!(login_url("//evil"), "/login");
    }

    fn parts_for(uri: &str) -> Parts {
        axum::http::Request::builder()
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn test_return_path_uses_original_uri() {
        // What a handler nested under `/profile` sees.
        let mut parts = parts_for("/?tab=game");
        parts
            .extensions
            .insert(OriginalUri("/profile?tab=game".parse().unwrap()));
        assert_eq!(return_path(&parts), "/profile?tab=game");
        assert_eq!(
            login_url(&return_path(&parts)),
            "/login?next=%2Fprofile%3Ftab%3Dgame"
        );
    }

    #[test]
    fn test_return_path_without_original_uri() {
        assert_eq!(return_path(&parts_for("/checkout")), "/checkout");
    }

    #[tokio::test]
    async fn test_require_auth_rejects_with_nested_path() {
        let store = tower_sessions::MemoryStore::default();
        let session = Session::new(None, std::sync::Arc::new(store), None);
        let mut parts = parts_for("/");
        parts.extensions.insert(session);
        parts
            .extensions
            .insert(OriginalUri("/game".parse().unwrap()));

        let Err(rejection) = RequireAuth::from_request_parts(&mut parts, &()).await else {
            panic!("anonymous visitor was let through");
        };
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(axum::http::header::LOCATION).unwrap(),
            "/login?next=%2Fgame"
        );
    }
}
