//! Core types for the Stockroom hierarchical record store.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// Number of folder levels between the root and a leaf collection.
pub const HIERARCHY_DEPTH: usize = 3;

/// LocationKey: the (category, brand, model) triple that names one leaf collection.
///
/// Keys built with [`LocationKey::new`] are validated and safe to join onto a
/// root path. Keys reconstructed by the walker from directory names go through
/// [`LocationKey::derived`] and may carry empty trailing segments when a
/// collection sits shallower than three levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationKey {
    pub level1: String,
    pub level2: String,
    pub level3: String,
}

impl LocationKey {
    /// Build a validated key. Each segment is trimmed and NFC-normalized.
    pub fn new(level1: &str, level2: &str, level3: &str) -> Result<Self, ApiError> {
        Ok(Self {
            level1: sanitize_segment("level1", level1)?,
            level2: sanitize_segment("level2", level2)?,
            level3: sanitize_segment("level3", level3)?,
        })
    }

    /// Key as observed on disk; no validation, missing levels stay empty.
    pub fn derived(segments: &[String]) -> Self {
        let at = |i: usize| segments.get(i).cloned().unwrap_or_default();
        Self {
            level1: at(0),
            level2: at(1),
            level3: at(2),
        }
    }

    pub fn segments(&self) -> [&str; HIERARCHY_DEPTH] {
        [&self.level1, &self.level2, &self.level3]
    }

    /// Directory of this key below `root`. Empty segments are skipped, so a
    /// derived key for a shallow collection maps back to the folder it came from.
    pub fn dir_under(&self, root: &Path) -> PathBuf {
        let mut dir = root.to_path_buf();
        for segment in self.segments() {
            if !segment.is_empty() {
                dir.push(segment);
            }
        }
        dir
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.level1, self.level2, self.level3)
    }
}

fn sanitize_segment(label: &str, raw: &str) -> Result<String, ApiError> {
    let segment: String = raw.trim().nfc().collect();
    if segment.is_empty() {
        return Err(ApiError::ValidationError(format!("{} cannot be empty", label)));
    }
    if segment == "." || segment == ".." {
        return Err(ApiError::ValidationError(format!(
            "{} cannot be a relative path component: {:?}",
            label, segment
        )));
    }
    if let Some(bad) = segment
        .chars()
        .find(|c| *c == '/' || *c == '\\' || c.is_control())
    {
        return Err(ApiError::ValidationError(format!(
            "{} contains forbidden character {:?}",
            label, bad
        )));
    }
    Ok(segment)
}

/// Record: one product entry as persisted in a leaf collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: u64,
    #[serde(default)]
    pub description: String,
}

impl Record {
    /// Check the record shape: non-empty id and name, finite non-negative price.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("name cannot be empty".to_string());
        }
        validate_price(self.price)
    }
}

pub(crate) fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() {
        return Err(format!("price must be a finite number, got {}", price));
    }
    if price < 0.0 {
        return Err(format!("price cannot be negative, got {}", price));
    }
    Ok(())
}

/// A record tagged with the location it was read from. The location is derived
/// from the collection's position in the tree and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedRecord {
    #[serde(flatten)]
    pub record: Record,
    #[serde(flatten)]
    pub location: LocationKey,
}

/// Fields addressable by filter and sort operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordField {
    Id,
    Name,
    Price,
    Stock,
    Description,
    Level1,
    Level2,
    Level3,
}

impl RecordField {
    pub const ALL: [RecordField; 8] = [
        RecordField::Id,
        RecordField::Name,
        RecordField::Price,
        RecordField::Stock,
        RecordField::Description,
        RecordField::Level1,
        RecordField::Level2,
        RecordField::Level3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Id => "id",
            RecordField::Name => "name",
            RecordField::Price => "price",
            RecordField::Stock => "stock",
            RecordField::Description => "description",
            RecordField::Level1 => "level1",
            RecordField::Level2 => "level2",
            RecordField::Level3 => "level3",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, RecordField::Price | RecordField::Stock)
    }

    /// String form of this field on a located record.
    pub fn text_of(&self, item: &LocatedRecord) -> String {
        match self {
            RecordField::Id => item.record.id.clone(),
            RecordField::Name => item.record.name.clone(),
            RecordField::Price => item.record.price.to_string(),
            RecordField::Stock => item.record.stock.to_string(),
            RecordField::Description => item.record.description.clone(),
            RecordField::Level1 => item.location.level1.clone(),
            RecordField::Level2 => item.location.level2.clone(),
            RecordField::Level3 => item.location.level3.clone(),
        }
    }

    /// Numeric value for price/stock, `None` for text fields.
    pub fn number_of(&self, item: &LocatedRecord) -> Option<f64> {
        match self {
            RecordField::Price => Some(item.record.price),
            RecordField::Stock => Some(item.record.stock as f64),
            _ => None,
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        RecordField::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| ApiError::InvalidField(s.to_string()))
    }
}

/// A single-field change applied by `RecordService::update`.
///
/// Only these four fields are mutable; `id` and the location are fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "lowercase")]
pub enum FieldUpdate {
    Name(String),
    Price(f64),
    Stock(u64),
    Description(String),
}

impl FieldUpdate {
    /// Names accepted by [`FieldUpdate::parse`].
    pub const FIELDS: [&'static str; 4] = ["name", "price", "stock", "description"];

    /// Coerce a textual value into the update for `field`.
    ///
    /// Price accepts any decimal form, stock accepts integers and integral
    /// decimals such as `5.0`.
    pub fn parse(field: &str, raw: &str) -> Result<Self, ApiError> {
        let value = raw.trim();
        match field.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(FieldUpdate::Name(value.to_string())),
            "price" => value
                .parse::<f64>()
                .map(FieldUpdate::Price)
                .map_err(|_| ApiError::ValidationError(format!("price is not a number: {:?}", raw))),
            "stock" => parse_stock(value)
                .map(FieldUpdate::Stock)
                .map_err(ApiError::ValidationError),
            "description" => Ok(FieldUpdate::Description(value.to_string())),
            other => Err(ApiError::InvalidField(format!(
                "{} (mutable fields: {})",
                other,
                Self::FIELDS.join(", ")
            ))),
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            FieldUpdate::Name(_) => "name",
            FieldUpdate::Price(_) => "price",
            FieldUpdate::Stock(_) => "stock",
            FieldUpdate::Description(_) => "description",
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        match self {
            FieldUpdate::Name(name) if name.trim().is_empty() => Err(ApiError::ValidationError(
                "name cannot be empty".to_string(),
            )),
            FieldUpdate::Price(price) => validate_price(*price).map_err(ApiError::ValidationError),
            _ => Ok(()),
        }
    }

    pub fn apply(&self, record: &mut Record) {
        match self {
            FieldUpdate::Name(v) => record.name = v.clone(),
            FieldUpdate::Price(v) => record.price = *v,
            FieldUpdate::Stock(v) => record.stock = *v,
            FieldUpdate::Description(v) => record.description = v.clone(),
        }
    }
}

/// Parse a stock count, tolerating an integral decimal representation.
pub(crate) fn parse_stock(raw: &str) -> Result<u64, String> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("stock is not a number: {:?}", raw))?;
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(format!("stock must be a whole number, got {:?}", raw));
    }
    if v < 0.0 {
        return Err(format!("stock cannot be negative, got {:?}", raw));
    }
    if v > u64::MAX as f64 {
        return Err(format!("stock is out of range: {:?}", raw));
    }
    Ok(v as u64)
}
