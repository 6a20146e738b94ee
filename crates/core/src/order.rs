//! Orders placed from a cart.
//!
//! An order is a frozen snapshot of the cart at the moment it was placed.
//! Its lines and total never follow later catalog price changes.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartError, CartLine};
use crate::types::{OrderStatus, Price};

/// Public order reference, `ORDER_<epoch-millis>`.
///
/// Two orders placed in the same millisecond get the same reference; nothing
/// guards against that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generate the reference for an order placed at `placed_at`.
    #[must_use]
    pub fn generate(placed_at: DateTime<Utc>) -> Self {
        Self(format!("ORDER_{}", placed_at.timestamp_millis()))
    }

    /// Wrap a reference loaded from storage.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of one cart line inside an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub price: Price,
    pub quantity: i32,
}

impl From<CartLine> for OrderLine {
    fn from(line: CartLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name,
            price: line.price,
            quantity: line.quantity,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub products: Vec<OrderLine>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Place an order from everything in `cart`, leaving the cart empty.
    ///
    /// The total is computed from the same lines that become the order's
    /// products. An empty cart produces a zero-total order with no products.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if the total does not fit; the cart
    /// is left untouched.
    pub fn place(cart: &mut Cart, placed_at: DateTime<Utc>) -> Result<Self, CartError> {
        let total = cart.total()?;
        let products = cart.take().into_iter().map(OrderLine::from).collect();

        Ok(Self {
            order_id: OrderId::generate(placed_at),
            products,
            total,
            status: OrderStatus::Pending,
            created_at: placed_at,
        })
    }
}
