//! Teslix Core - Shared domain library.
//!
//! This crate provides the domain types and pure logic used by every Teslix
//! Parts component:
//! - `storefront` - Public-facing parts catalog, cart and order intake
//! - `admin` - Listing management and image uploads
//! - `cli` - Command-line tools for migrations, seeding and batch uploads
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no
//! network or database I/O. Collaborators such as cart storage and catalog
//! sources are traits implemented by the service crates.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, statuses, locale, contacts
//! - [`catalog`] - Product/vehicle records, drafts, snapshot and filtering
//! - [`cart`] - Cart reconciliation against the catalog
//! - [`images`] - Image intake policy and ordered selections
//! - [`order`] - Localized order and parts-lookup messages
//! - `rows` - Database row shapes (with the `postgres` feature)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod images;
pub mod order;
#[cfg(feature = "postgres")]
pub mod rows;
pub mod types;

pub use cart::{
    Cart, CartItem, CartManager, CartStorage, CartTotals, CatalogError, CatalogSource,
    StorageError,
};
pub use catalog::{
    CatalogFilter, CatalogSnapshot, Product, ProductDraft, ProductPatch, ValidationError, Vehicle,
    VehicleDraft,
};
pub use types::*;
