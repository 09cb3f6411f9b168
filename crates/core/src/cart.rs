//! The visitor's shopping cart.
//!
//! The cart is client-held state: it lives in the visitor's session as a JSON
//! blob and is only pushed to the backend on request (`POST /cart/sync`).
//! Each line is a snapshot of the product taken when it was added.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::product::Product;
use crate::types::{Price, ProductId};

/// Tax rate applied on top of the subtotal (18% VAT).
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Errors raised by cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("{0} is out of stock")]
    OutOfStock(String),
    #[error("product not in cart: {0}")]
    NotInCart(ProductId),
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: String,
    pub quantity: u32,
}

impl CartItem {
    fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.images.first().map(|image| image.url.clone()),
            category: product.category.clone(),
            quantity,
        }
    }

    /// Price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    #[must_use]
    pub fn image_url(&self) -> &str {
        self.image
            .as_deref()
            .unwrap_or(crate::product::PLACEHOLDER_IMAGE)
    }
}

/// Cart contents, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

/// Body of `POST /cart/sync`.
#[derive(Debug, Serialize)]
pub struct CartSyncPayload<'a> {
    pub items: &'a [CartItem],
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line accumulates; otherwise a snapshot line is appended.
    /// Adding zero units does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] when the product has no stock.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        if !product.in_stock() {
            return Err(CartError::OutOfStock(product.name.clone()));
        }
        if quantity == 0 {
            return Ok(());
        }

        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem::from_product(product, quantity)),
        }
        Ok(())
    }

    /// Remove a line. Returns the removed line, if any.
    pub fn remove(&mut self, id: &ProductId) -> Option<CartItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Set the quantity of a line; zero or less removes it.
    ///
    /// Returns `true` when the line was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] when no line has this ID.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<bool, CartError> {
        if quantity <= 0 {
            return self
                .remove(id)
                .map(|_| true)
                .ok_or_else(|| CartError::NotInCart(id.clone()));
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| CartError::NotInCart(id.clone()))?;
        item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        Ok(false)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ price × quantity, before tax.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum::<Price>().rounded()
    }

    /// Σ quantity.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    #[must_use]
    pub fn tax(&self) -> Price {
        self.subtotal().scale(TAX_RATE).rounded()
    }

    /// Subtotal plus tax. Shipping is free.
    #[must_use]
    pub fn total(&self) -> Price {
        self.subtotal()
            .scale(Decimal::ONE + TAX_RATE)
            .rounded()
    }

    /// Payload for `POST /cart/sync`, or `None` when there is nothing to sync.
    #[must_use]
    pub fn sync_payload(&self) -> Option<CartSyncPayload<'_>> {
        (!self.is_empty()).then_some(CartSyncPayload { items: &self.items })
    }
}
