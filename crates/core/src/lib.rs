//! Bunny Shop Core - Shared domain library.
//!
//! This crate provides the types and rules behind the `storefront` JSON API.
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Repositories load rows, hand them to these types to apply
//! a change, and persist the result.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and statuses
//! - [`cart`] - Cart lines and the merge-on-add rule
//! - [`order`] - Turning a cart into an immutable order snapshot

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod order;
pub mod types;

pub use cart::{Cart, CartError, CartLine, NewCartLine};
pub use order::{Order, OrderId, OrderLine};
pub use types::*;
