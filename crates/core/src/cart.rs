//! Shopping cart lines.
//!
//! A cart holds at most one line per product id. Adding a product that is
//! already present bumps the existing line's quantity instead of appending a
//! second line; lines otherwise keep the order in which they were added.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Price;

/// Cart arithmetic that does not fit the stored number types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Merging would push a line's quantity past `i32` range.
    #[error("quantity for product {0} is out of range")]
    QuantityOverflow(String),

    /// A line subtotal or the cart total does not fit in a decimal.
    #[error("cart total is out of range")]
    TotalOverflow,
}

/// One product in a user's cart.
///
/// `name` and `price` are whatever the client sent when the line was first
/// added; they are not refreshed from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price: Price,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// `price * quantity` for this line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if the product does not fit.
    pub fn subtotal(&self) -> Result<Price, CartError> {
        self.price
            .checked_times(self.quantity)
            .ok_or(CartError::TotalOverflow)
    }
}

/// An item the client wants to put into the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    pub product_id: String,
    pub name: String,
    pub price: Price,
    pub quantity: i32,
}

/// A user's cart, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from stored lines, trusting their order.
    #[must_use]
    pub const fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// The lines currently in the cart.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consume the cart and return its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add an item, merging with an existing line for the same product.
    ///
    /// On a merge only the quantity changes; the stored name, price and
    /// `added_at` of the existing line are kept. Quantities are not capped
    /// or sign-checked.
    ///
    /// The cart is left unchanged when the result could not be totalled.
    ///
    /// # Errors
    ///
    /// Returns `CartError::QuantityOverflow` if the merged quantity leaves
    /// `i32` range and `CartError::TotalOverflow` if the new cart total does
    /// not fit in a decimal.
    pub fn add(&mut self, item: NewCartLine, now: DateTime<Utc>) -> Result<(), CartError> {
        let mut next = self.clone();
        next.merge(item, now)?;
        next.total()?;

        *self = next;
        Ok(())
    }

    fn merge(&mut self, item: NewCartLine, now: DateTime<Utc>) -> Result<(), CartError> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            line.quantity = line
                .quantity
                .checked_add(item.quantity)
                .ok_or(CartError::QuantityOverflow(item.product_id))?;
            return Ok(());
        }

        self.lines.push(CartLine {
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            added_at: now,
        });
        Ok(())
    }

    /// Sum of `price * quantity` over every line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if a subtotal or the sum does not
    /// fit in a decimal.
    pub fn total(&self) -> Result<Price, CartError> {
        let subtotals = self
            .lines
            .iter()
            .map(CartLine::subtotal)
            .collect::<Result<Vec<_>, _>>()?;

        Price::checked_sum(subtotals).ok_or(CartError::TotalOverflow)
    }

    /// Empty the cart, returning the lines it held.
    pub fn take(&mut self) -> Vec<CartLine> {
        std::mem::take(&mut self.lines)
    }
}
