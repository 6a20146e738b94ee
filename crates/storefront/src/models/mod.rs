//! Domain models for the storefront API.
//!
//! These are the shapes returned to clients. Cart and order types live in
//! `bunny-shop-core` together with the rules that change them.

pub mod product;
pub mod user;

pub use product::Product;
pub use user::{Address, NewUser, User};
