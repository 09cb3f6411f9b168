//! Session-related types.
//!
//! Everything the storefront remembers about a visitor lives in the session:
//! the signed-in account, the cart, queued toasts and game progress.

use oba_core::User;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Session-stored identity of the signed-in user.
///
/// Holds the backend token so per-user API calls can be made on the
/// visitor's behalf. Implements `Debug` manually to redact the token.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "StoredUser", into = "StoredUser")]
pub struct CurrentUser {
    token: SecretString,
    /// Account as last returned by the backend.
    pub user: User,
}

impl CurrentUser {
    #[must_use]
    pub fn new(token: String, user: User) -> Self {
        Self {
            token: SecretString::from(token),
            user,
        }
    }

    /// Bearer token for backend calls.
    #[must_use]
    pub fn token(&self) -> SecretString {
        self.token.clone()
    }
}

/// Serialized form kept in the session store.
#[derive(Serialize, Deserialize)]
struct StoredUser {
    token: String,
    user: User,
}

impl From<StoredUser> for CurrentUser {
    fn from(stored: StoredUser) -> Self {
        Self::new(stored.token, stored.user)
    }
}

impl From<CurrentUser> for StoredUser {
    fn from(current: CurrentUser) -> Self {
        Self {
            token: current.token.expose_secret().to_string(),
            user: current.user,
        }
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("token", &"[REDACTED]")
            .field("user", &self.user.id)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// The signed-in user and their token.
    pub const CURRENT_USER: &str = "current_user";

    /// Cart contents as a JSON array of line items.
    pub const CART: &str = "cart";

    /// Toasts waiting for the next rendered page.
    pub const TOASTS: &str = "toasts";

    /// The running drawing round, if any.
    pub const GAME_ROUND: &str = "game_round";

    /// Last known game state, used when the backend is unreachable.
    pub const GAME_STATE: &str = "game_state";
}
