//! Catalog records: products and vehicles, their creation drafts, and the
//! read-mostly snapshot the cart resolves against.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::images::MAX_IMAGES_PER_LISTING;
use crate::types::{Availability, Condition, Price, PriceError, ProductId, VehicleId, VehicleStatus};

/// Car models the catalog is organized around.
pub const MODELS: &[&str] = &["Model 3", "Model Y", "Model X", "Model S", "Cybertruck"];

/// Part categories used as tags.
pub const CATEGORIES: &[&str] = &[
    "Кузов",
    "Оптика и электрика",
    "Подвеска и рулевое",
    "Тормозная система",
    "Охлаждение/отопление",
    "Трансмиссия/привод",
    "Салон/интерьер",
    "Стёкла/зеркала",
    "Зарядка и HV‑компоненты",
    "Шины/диски",
    "Расходники/крепёж",
];

/// Minimum accepted VIN length.
pub const MIN_VIN_LENGTH: usize = 5;

/// Resolve a URL slug such as `model-3` to its model tag.
#[must_use]
pub fn model_from_slug(slug: &str) -> Option<&'static str> {
    match slug.to_lowercase().as_str() {
        "model-3" => Some("Model 3"),
        "model-y" => Some("Model Y"),
        "model-x" => Some("Model X"),
        "model-s" => Some("Model S"),
        "cybertruck" => Some("Cybertruck"),
        _ => None,
    }
}

// =============================================================================
// Records
// =============================================================================

/// A part listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Price,
    /// Ordered image URLs; the first one is the thumbnail.
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The listing thumbnail, if any image is attached.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A vehicle listed for parting out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub vin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    pub images: Vec<String>,
    #[serde(default)]
    pub status: VehicleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Validation
// =============================================================================

/// Reasons a listing draft is rejected before anything is written.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("malformed number in field: {0}")]
    MalformedNumber(&'static str),
    #[error(transparent)]
    Price(#[from] PriceError),
    #[error("at least one image is required")]
    NoImages,
    #[error("too many images: {got} (max {max})")]
    TooManyImages { got: usize, max: usize },
    #[error("year must be a positive number")]
    InvalidYear,
    #[error("VIN must be at least {0} characters")]
    VinTooShort(usize),
}

/// A numeric form field that may arrive as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberInput {
    /// Interpret the input as an integer; `Ok(None)` for a blank string.
    fn to_i64(&self, field: &'static str) -> Result<Option<i64>, ValidationError> {
        match self {
            Self::Int(n) => Ok(Some(*n)),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(Some(*f as i64)),
            Self::Float(_) => Err(ValidationError::MalformedNumber(field)),
            Self::Text(s) if s.trim().is_empty() => Ok(None),
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ValidationError::MalformedNumber(field)),
        }
    }
}

impl From<i64> for NumberInput {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

fn required_text(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn validate_images(images: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let images: Vec<String> = images
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect();
    if images.is_empty() {
        return Err(ValidationError::NoImages);
    }
    if images.len() > MAX_IMAGES_PER_LISTING {
        return Err(ValidationError::TooManyImages {
            got: images.len(),
            max: MAX_IMAGES_PER_LISTING,
        });
    }
    Ok(images)
}

/// Deduplicate tags keeping first occurrence; blank tags are dropped.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_owned();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn parse_price(input: &NumberInput) -> Result<Price, ValidationError> {
    let amount = input
        .to_i64("price")?
        .ok_or(ValidationError::MissingField("price"))?;
    Ok(Price::new(amount)?)
}

/// Product creation payload as submitted by the admin panel.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<NumberInput>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub oem: Option<String>,
    #[serde(default)]
    pub compatibility: Option<String>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub availability: Option<Availability>,
}

/// A validated product ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub images: Vec<String>,
    pub sku: Option<String>,
    pub tags: Vec<String>,
    pub oem: Option<String>,
    pub compatibility: Option<String>,
    pub condition: Option<Condition>,
    pub availability: Option<Availability>,
}

impl ProductDraft {
    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found: missing title or
    /// description, missing/malformed/non-positive price, or an image list
    /// that is empty or longer than the listing cap.
    pub fn validate(self) -> Result<NewProduct, ValidationError> {
        let title = required_text(&self.title, "title")?;
        let description = required_text(&self.description, "description")?;
        let price = parse_price(
            self.price
                .as_ref()
                .ok_or(ValidationError::MissingField("price"))?,
        )?;
        let images = validate_images(self.images)?;

        Ok(NewProduct {
            title,
            description,
            price,
            images,
            sku: optional_text(self.sku),
            tags: normalize_tags(self.tags),
            oem: optional_text(self.oem),
            compatibility: optional_text(self.compatibility),
            condition: self.condition,
            availability: self.availability,
        })
    }
}

/// Partial product update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<NumberInput>,
    pub images: Option<Vec<String>>,
    pub sku: Option<String>,
    pub tags: Option<Vec<String>>,
    pub oem: Option<String>,
    pub compatibility: Option<String>,
    pub condition: Option<Condition>,
    pub availability: Option<Availability>,
}

impl ProductPatch {
    /// Apply the patch to an existing product, validating changed fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a provided field is invalid; the
    /// product is not modified in that case.
    pub fn apply(self, product: &Product) -> Result<Product, ValidationError> {
        let mut updated = product.clone();
        if let Some(title) = self.title {
            updated.title = required_text(&title, "title")?;
        }
        if let Some(description) = self.description {
            updated.description = required_text(&description, "description")?;
        }
        if let Some(price) = &self.price {
            updated.price = parse_price(price)?;
        }
        if let Some(images) = self.images {
            updated.images = validate_images(images)?;
        }
        if let Some(tags) = self.tags {
            updated.tags = normalize_tags(tags);
        }
        if self.sku.is_some() {
            updated.sku = optional_text(self.sku);
        }
        if self.oem.is_some() {
            updated.oem = optional_text(self.oem);
        }
        if self.compatibility.is_some() {
            updated.compatibility = optional_text(self.compatibility);
        }
        if let Some(condition) = self.condition {
            updated.condition = Some(condition);
        }
        if let Some(availability) = self.availability {
            updated.availability = Some(availability);
        }
        Ok(updated)
    }
}

/// Vehicle creation payload as submitted by the admin panel.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDraft {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    pub year: Option<NumberInput>,
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub mileage: Option<NumberInput>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A validated vehicle ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub vin: String,
    pub mileage: Option<u32>,
    pub images: Vec<String>,
    pub status: VehicleStatus,
}

impl VehicleDraft {
    /// Validate the draft.
    ///
    /// Unknown statuses normalize to [`VehicleStatus::InStock`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(self) -> Result<NewVehicle, ValidationError> {
        let make = required_text(&self.make, "make")?;
        let model = required_text(&self.model, "model")?;
        let year = self
            .year
            .as_ref()
            .ok_or(ValidationError::MissingField("year"))?
            .to_i64("year")?
            .ok_or(ValidationError::MissingField("year"))?;
        let year = u16::try_from(year)
            .ok()
            .filter(|y| *y > 0)
            .ok_or(ValidationError::InvalidYear)?;

        let vin = self.vin.trim().to_owned();
        if vin.is_empty() {
            return Err(ValidationError::MissingField("vin"));
        }
        if vin.chars().count() < MIN_VIN_LENGTH {
            return Err(ValidationError::VinTooShort(MIN_VIN_LENGTH));
        }

        let mileage = match &self.mileage {
            Some(m) => m
                .to_i64("mileage")?
                .map(|m| u32::try_from(m).map_err(|_| ValidationError::MalformedNumber("mileage")))
                .transpose()?,
            None => None,
        };

        let images = validate_images(self.images)?;

        Ok(NewVehicle {
            make,
            model,
            year,
            vin,
            mileage,
            images,
            status: VehicleStatus::normalize(self.status.as_deref()),
        })
    }
}

// =============================================================================
// Snapshot & filtering
// =============================================================================

/// An immutable view of the catalog at one point in time.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl CatalogSnapshot {
    /// Build a snapshot from a list of products. Later duplicates of an id
    /// are ignored for lookup.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let mut index = HashMap::with_capacity(products.len());
        for (i, p) in products.iter().enumerate() {
            index.entry(p.id.clone()).or_insert(i);
        }
        Self { products, index }
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).and_then(|&i| self.products.get(i))
    }

    /// Whether the snapshot contains the id.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.index.contains_key(id)
    }

    /// All products in their original order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Catalog browsing filter: model tag (or slug), category tag and free text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    pub model: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
}

impl CatalogFilter {
    /// Whether a product passes every active criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let model = self
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| model_from_slug(m).unwrap_or(m));
        if let Some(model) = model
            && !product.has_tag(model)
        {
            return false;
        }

        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty())
            && !product.has_tag(category)
        {
            return false;
        }

        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let haystack = format!(
                "{} {} {} {}",
                product.title,
                product.description,
                product.oem.as_deref().unwrap_or_default(),
                product.sku.as_deref().unwrap_or_default()
            )
            .to_lowercase();
            if !haystack.contains(&q.to_lowercase()) {
                return false;
            }
        }

        true
    }

    /// Filter products, preserving order.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

// =============================================================================
// Demo catalog
// =============================================================================

fn demo(
    id: &str,
    title: &str,
    description: &str,
    price: i64,
    image: &str,
    tags: &[&str],
    oem: Option<&str>,
    compatibility: &str,
    condition: Condition,
    availability: Availability,
) -> Option<Product> {
    Some(Product {
        id: ProductId::new(id),
        title: title.to_owned(),
        description: description.to_owned(),
        price: Price::new(price).ok()?,
        images: vec![image.to_owned()],
        sku: Some(id.to_owned()),
        tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        oem: oem.map(str::to_owned),
        compatibility: Some(compatibility.to_owned()),
        condition: Some(condition),
        availability: Some(availability),
        created_at: None,
        updated_at: None,
    })
}

/// Built-in catalog shown until the backing store answers.
#[must_use]
pub fn demo_products() -> Vec<Product> {
    [
        demo(
            "AM3F-001",
            "Амортизатор передний Model 3",
            "Оригинальный амортизатор передний для Tesla Model 3. Состояние: новый.",
            4500,
            "/demo/am3f-001.jpg",
            &["Model 3", "Подвеска и рулевое"],
            Some("1044321-00-A"),
            "Model 3 2017–2023",
            Condition::New,
            Availability::InStock,
        ),
        demo(
            "FARY-L-002",
            "Фара левая Model Y",
            "Фара LED левая, оригинал. Проверена, б/у в отличном состоянии.",
            12500,
            "/demo/fary-l-002.jpg",
            &["Model Y", "Оптика и электрика"],
            Some("1521420-00-B"),
            "Model Y 2020–2024",
            Condition::Used,
            Availability::InStock,
        ),
        demo(
            "DS19MS-003",
            "Диск колёсный 19'' Model S",
            "Литой диск 19\", цвет серебристый, совместим с Model S.",
            9800,
            "/demo/ds19ms-003.jpg",
            &["Model S", "Шины/диски"],
            None,
            "Model S 2012–2020",
            Condition::New,
            Availability::OnOrder,
        ),
        demo(
            "AMF303",
            "Задняя левая четверть",
            "Без ДТП, без дефектов.",
            45900,
            "/demo/amf303.jpg",
            &["Model S", "Кузов", "четверть", "задняя четверть"],
            None,
            "Tesla Model S 2021–2023",
            Condition::Used,
            Availability::InStock,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
