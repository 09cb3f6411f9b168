//! Storefront middleware and request extractors.
//!
//! A request passes, outermost first:
//!
//! 1. Sentry hub and transaction (binary only)
//! 2. `TraceLayer`
//! 3. Request ID
//! 4. CSP nonce
//! 5. Security headers, which read the nonce
//! 6. Session (in-memory `tower-sessions` store)
//!
//! `POST /login` and `POST /register` also sit behind `auth_rate_limiter`.
//! [`PageContext`], [`RequireAuth`] and [`OptionalAuth`] are extractors built
//! on the session.

pub mod auth;
pub mod csp;
pub mod page;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use page::PageContext;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
