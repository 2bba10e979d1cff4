//! Order submission.
//!
//! Submission is two-phase: the message is delivered through a [`Notifier`]
//! first, and only a confirmed delivery leads to the referenced products being
//! marked reserved through a [`ReservationStore`]. Reservation failures are
//! logged and never fail the submission.

use std::future::Future;

use thiserror::Error;
use tracing::{info, instrument, warn};

use teslix_core::cart::{CartManager, CartStorage};
use teslix_core::order::{OrderRequest, render_checkout_message};
use teslix_core::{ContactDetails, Locale, ProductId};

use crate::db::RepositoryError;

/// Delivers an order message to the shop staff.
pub trait Notifier: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn notify(&self, message: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Marks ordered products as reserved.
pub trait ReservationStore: Send + Sync {
    fn reserve(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}

/// Reasons an order is not accepted.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Missing message")]
    EmptyMessage,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("notification failed: {0}")]
    Delivery(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Outcome of an accepted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderReceipt {
    /// Products moved to `Reserved`; zero when the reservation step failed.
    pub reserved: u64,
}

/// Two-phase order submission over injected collaborators.
pub struct OrderService<'a, N, R> {
    notifier: &'a N,
    reservations: &'a R,
}

impl<'a, N: Notifier, R: ReservationStore> OrderService<'a, N, R> {
    pub const fn new(notifier: &'a N, reservations: &'a R) -> Self {
        Self {
            notifier,
            reservations,
        }
    }

    /// Deliver the message, then reserve the referenced products.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyMessage` for a blank message and
    /// `OrderError::Delivery` when the notifier fails. Nothing is reserved in
    /// either case.
    #[instrument(skip_all, fields(products = request.product_ids.len()))]
    pub async fn submit(&self, request: &OrderRequest) -> Result<OrderReceipt, OrderError> {
        if request.message.trim().is_empty() {
            return Err(OrderError::EmptyMessage);
        }

        self.notifier
            .notify(&request.message)
            .await
            .map_err(|e| OrderError::Delivery(Box::new(e)))?;

        let reserved = if request.product_ids.is_empty() {
            0
        } else {
            match self.reservations.reserve(&request.product_ids).await {
                Ok(count) => count,
                Err(e) => {
                    warn!(error = %e, "Failed to reserve products after order");
                    0
                }
            }
        };

        info!(reserved, "Order submitted");
        Ok(OrderReceipt { reserved })
    }

    /// Render the cart as a checkout message, submit it, and clear the cart
    /// once delivery is confirmed.
    ///
    /// Only items that resolve in the catalog are listed and reserved.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` when no item resolves, or any error
    /// from [`submit`](Self::submit). The cart is untouched on error.
    pub async fn checkout<S: CartStorage>(
        &self,
        cart: &mut CartManager<S>,
        locale: Locale,
        contact: &ContactDetails,
    ) -> Result<OrderReceipt, OrderError> {
        let lines = cart.resolved_lines();
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let totals = cart.totals();
        let request = OrderRequest {
            message: render_checkout_message(locale, contact, &lines, totals.total),
            product_ids: lines.iter().map(|(item, _)| item.product_id.clone()).collect(),
        };

        let receipt = self.submit(&request).await?;
        cart.clear().await;
        Ok(receipt)
    }
}
