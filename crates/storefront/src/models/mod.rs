//! Storefront view models and session data.

pub mod cart;
pub mod session;

pub use cart::{CartLineView, CartView};
