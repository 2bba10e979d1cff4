//! Cart display data returned by the cart endpoints.

use serde::Serialize;

use teslix_core::cart::{CartManager, CartStorage};
use teslix_core::{ProductId, format_hryvnia};

/// One resolved cart line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    pub price: i64,
    pub line_total: i64,
    pub line_total_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Cart contents and derived totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: i64,
    pub total_display: String,
    pub total_count: u32,
    /// Items not (yet) found in the catalog; excluded from totals.
    pub pending: usize,
}

impl<S: CartStorage> From<&CartManager<S>> for CartView {
    fn from(cart: &CartManager<S>) -> Self {
        let items: Vec<CartLineView> = cart
            .resolved_lines()
            .into_iter()
            .map(|(item, product)| {
                let line_total = product.price.line_total(item.quantity);
                CartLineView {
                    thumbnail: product.thumbnail().map(str::to_owned),
                    product_id: item.product_id,
                    title: product.title,
                    quantity: item.quantity,
                    price: product.price.amount(),
                    line_total,
                    line_total_display: format_hryvnia(line_total),
                }
            })
            .collect();
        let totals = cart.totals();

        Self {
            pending: cart.cart().len().saturating_sub(items.len()),
            items,
            total: totals.total,
            total_display: format_hryvnia(totals.total),
            total_count: totals.total_count,
        }
    }
}
