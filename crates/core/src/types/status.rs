//! Status enums for listings.
//!
//! Values serialize as `snake_case` on the wire and in the database. The
//! Russian labels used by the first version of the site are still accepted on
//! input so older clients and exported rows keep working.

use serde::{Deserialize, Serialize};

/// Error returned when a status string is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Physical condition of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[serde(alias = "Новая", alias = "Нова")]
    New,
    #[serde(alias = "Б/У", alias = "Вживана")]
    Used,
}

impl Condition {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Used => "used",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Condition {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" | "Новая" | "Нова" => Ok(Self::New),
            "used" | "Б/У" | "Вживана" => Ok(Self::Used),
            _ => Err(ParseStatusError::new("condition", s)),
        }
    }
}

/// Stock availability of a product.
///
/// `Reserved` is entered automatically once an order referencing the product
/// has been delivered to the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[serde(alias = "В наличии", alias = "В наявності")]
    InStock,
    #[serde(alias = "На заказ", alias = "Під замовлення")]
    OnOrder,
    #[serde(alias = "Забронирован", alias = "Заброньовано")]
    Reserved,
}

impl Availability {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::OnOrder => "on_order",
            Self::Reserved => "reserved",
        }
    }

    /// Whether products in this state are shown in the public catalog.
    #[must_use]
    pub const fn is_listed(self) -> bool {
        matches!(self, Self::InStock | Self::Reserved)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Availability {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" | "В наличии" | "В наявності" => Ok(Self::InStock),
            "on_order" | "На заказ" | "Під замовлення" => Ok(Self::OnOrder),
            "reserved" | "Забронирован" | "Заброньовано" => Ok(Self::Reserved),
            _ => Err(ParseStatusError::new("availability", s)),
        }
    }
}

/// Status of a vehicle listed for parting out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    #[serde(alias = "В наличии", alias = "В наявності")]
    InStock,
    #[serde(alias = "В пути (возможно бронирование)", alias = "В дорозі")]
    InTransit,
}

impl VehicleStatus {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::InTransit => "in_transit",
        }
    }

    /// Parse a status, falling back to `InStock` for anything unrecognized.
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" | "В наличии" | "В наявності" => Ok(Self::InStock),
            "in_transit" | "В пути (возможно бронирование)" | "В дорозі" => {
                Ok(Self::InTransit)
            }
            _ => Err(ParseStatusError::new("vehicle status", s)),
        }
    }
}
