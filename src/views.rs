//! Record Views
//!
//! Filtering, ordering and aggregate statistics over the flattened record set.
//! Everything here is pure; `RecordService` supplies the records.

use crate::error::ApiError;
use crate::types::{LocatedRecord, RecordField};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Comparator prefix of a numeric criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Greater,
    Less,
    Equal,
}

/// A parsed filter criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    /// `>100`, `<5`, `=20` or a bare number (equality).
    Numeric { comparator: Comparator, threshold: f64 },
    /// Case-insensitive substring.
    Contains(String),
}

impl Criterion {
    /// Parse `raw` for `field`. Returns `None` when a numeric field is given
    /// a threshold that is not a number.
    pub fn parse(field: RecordField, raw: &str) -> Option<Self> {
        if !field.is_numeric() {
            return Some(Criterion::Contains(raw.to_lowercase()));
        }
        let raw = raw.trim();
        let (comparator, rest) = match raw.chars().next() {
            Some('>') => (Comparator::Greater, &raw[1..]),
            Some('<') => (Comparator::Less, &raw[1..]),
            Some('=') => (Comparator::Equal, &raw[1..]),
            _ => (Comparator::Equal, raw),
        };
        let threshold: f64 = rest.trim().parse().ok()?;
        Some(Criterion::Numeric {
            comparator,
            threshold,
        })
    }

    pub fn matches(&self, field: RecordField, item: &LocatedRecord) -> bool {
        match self {
            Criterion::Numeric {
                comparator,
                threshold,
            } => {
                let Some(value) = field.number_of(item) else {
                    return false;
                };
                match comparator {
                    Comparator::Greater => value > *threshold,
                    Comparator::Less => value < *threshold,
                    Comparator::Equal => value == *threshold,
                }
            }
            Criterion::Contains(needle) => field.text_of(item).to_lowercase().contains(needle),
        }
    }
}

/// Keep the records whose `field` satisfies `criterion`.
///
/// An unknown field name or an unparseable numeric threshold yields an empty
/// result rather than an error.
pub fn filter_records(records: Vec<LocatedRecord>, field: &str, criterion: &str) -> Vec<LocatedRecord> {
    let Ok(field) = field.parse::<RecordField>() else {
        tracing::debug!("Filter on unknown field {:?}", field);
        return Vec::new();
    };
    let Some(criterion) = Criterion::parse(field, criterion) else {
        tracing::debug!("Unparseable numeric criterion for {}", field);
        return Vec::new();
    };
    records
        .into_iter()
        .filter(|item| criterion.matches(field, item))
        .collect()
}

/// Fields accepted by the global sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Price,
    Stock,
    Level1,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Name,
        SortField::Price,
        SortField::Stock,
        SortField::Level1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Stock => "stock",
            SortField::Level1 => "level1",
        }
    }

    fn compare(&self, a: &LocatedRecord, b: &LocatedRecord) -> Ordering {
        match self {
            SortField::Name => a.record.name.cmp(&b.record.name),
            SortField::Price => a.record.price.total_cmp(&b.record.price),
            SortField::Stock => a.record.stock.cmp(&b.record.stock),
            SortField::Level1 => a.location.level1.cmp(&b.location.level1),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| {
                ApiError::InvalidField(format!(
                    "{} (sortable fields: name, price, stock, level1)",
                    s
                ))
            })
    }
}

/// Stable sort; records that compare equal keep their input order in either
/// direction.
pub fn sort_records(records: &mut [LocatedRecord], field: SortField, ascending: bool) {
    records.sort_by(|a, b| {
        let ord = field.compare(a, b);
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}

/// Aggregate figures over a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    /// Mean price; `0.0` when there are no records.
    pub mean_price: f64,
    pub total_stock: u64,
    pub count_by_level1: BTreeMap<String, usize>,
}

impl Statistics {
    pub fn compute(records: &[LocatedRecord]) -> Self {
        let count = records.len();
        let mean_price = if count == 0 {
            0.0
        } else {
            records.iter().map(|r| r.record.price).sum::<f64>() / count as f64
        };
        let total_stock = records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.record.stock));
        let mut count_by_level1 = BTreeMap::new();
        for item in records {
            *count_by_level1
                .entry(item.location.level1.clone())
                .or_insert(0) += 1;
        }
        Self {
            count,
            mean_price,
            total_stock,
            count_by_level1,
        }
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}
