//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Session-backed cart storage and the shared catalog store
//! - `order` - Two-phase order submission (notify, then reserve)
//! - `telegram` - Telegram Bot API client used as the order notifier

pub mod cart;
pub mod order;
pub mod telegram;

pub use cart::{CatalogStore, SessionCartStorage};
pub use order::{Notifier, OrderError, OrderReceipt, OrderService, ReservationStore};
pub use telegram::{TelegramClient, TelegramError};
