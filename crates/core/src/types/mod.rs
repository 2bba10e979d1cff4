//! Core types for Teslix Parts.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod locale;
pub mod price;
pub mod status;

pub use contact::{ContactDetails, Phone, PhoneError};
pub use id::*;
pub use locale::Locale;
pub use price::{Price, PriceError, format_hryvnia};
pub use status::*;
