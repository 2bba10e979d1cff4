//! Session-related types.
//!
//! Keys for the per-visitor state kept in the tower-sessions store.

/// Session keys for storefront visitor state.
pub mod keys {
    /// Cart item list (`Vec<CartItem>`).
    pub const CART: &str = "teslix_cart";

    /// Preferred interface language (`Locale`).
    pub const LANG: &str = "teslix_lang";
}
