//! Cart persistence.
//!
//! The cart is stored in the session as a plain JSON array of line items.
//! There is no versioning: a blob that no longer parses is discarded and the
//! visitor starts with an empty cart.

use oba_core::Cart;
use tower_sessions::Session;

use crate::models::keys;

/// Load the cart, discarding it if the stored blob is unreadable.
pub async fn load(session: &Session) -> Cart {
    match session.get::<Cart>(keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to load cart from session: {e}");
            if let Err(e) = session.remove_value(keys::CART).await {
                tracing::error!("Failed to remove unreadable cart: {e}");
            }
            Cart::new()
        }
    }
}

/// Persist the cart. An empty cart removes the key entirely.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    if cart.is_empty() {
        session.remove_value(keys::CART).await?;
        return Ok(());
    }
    session.insert(keys::CART, cart).await
}

/// Drop the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(keys::CART).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use oba_core::Product;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product() -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "name": "Copper cezve",
            "price": 18.5,
            "category": "home",
            "stock": 4
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let session = session();
        let mut cart = Cart::new();
        cart.add(&product(), 2).unwrap();
        save(&session, &cart).await.unwrap();

        let loaded = load(&session).await;
        assert_eq!(loaded.item_count(), 2);
        assert_eq!(loaded.items()[0].name, "Copper cezve");
    }

    #[tokio::test]
    async fn test_blob_is_plain_array() {
        let session = session();
        let mut cart = Cart::new();
        cart.add(&product(), 1).unwrap();
        save(&session, &cart).await.unwrap();

        let raw: serde_json::Value = session.get(keys::CART).await.unwrap().unwrap();
        assert!(raw.is_array());
        assert_eq!(raw[0]["_id"], "p1");
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_discarded() {
        let session = session();
        session
            .insert(keys::CART, serde_json::json!({"items": "garbage"}))
            .await
            .unwrap();

        let cart = load(&session).await;
        assert!(cart.is_empty());
        let raw: Option<serde_json::Value> = session.get(keys::CART).await.unwrap();
        assert!(raw.is_none());
    }

    #[tokio::test]
    async fn test_saving_empty_cart_removes_key() {
        let session = session();
        let mut cart = Cart::new();
        cart.add(&product(), 1).unwrap();
        save(&session, &cart).await.unwrap();

        cart.clear();
        save(&session, &cart).await.unwrap();
        let raw: Option<serde_json::Value> = session.get(keys::CART).await.unwrap();
        assert!(raw.is_none());
    }
}
