//! Record Codec
//!
//! Converts between [`Record`] values and rows of a leaf collection file. Readers
//! locate columns by header name; writers always emit the fixed column order
//! `id,name,price,stock,description` with price at two decimal places.

use crate::error::StorageError;
use crate::types::{parse_stock, validate_price, Record};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Column names in write order.
pub const HEADER: [&str; 5] = ["id", "name", "price", "stock", "description"];

/// Non-fatal problem with a single row; the row is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWarning {
    pub source: PathBuf,
    /// 1-based line in the source file, when known.
    pub line: Option<u64>,
    pub reason: String,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.source.display(), line, self.reason),
            None => write!(f, "{}: {}", self.source.display(), self.reason),
        }
    }
}

/// Records decoded from one or more collections plus the rows that were skipped.
#[derive(Debug, Clone)]
pub struct DecodeReport<T = Record> {
    pub records: Vec<T>,
    pub warnings: Vec<RowWarning>,
}

impl<T> DecodeReport<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> Default for DecodeReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    id: usize,
    name: usize,
    price: usize,
    stock: usize,
    description: Option<usize>,
}

impl Columns {
    /// Resolve positions by header name. `description` may be absent.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, String> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| format!("missing column {:?}", name));
        Ok(Self {
            id: require("id")?,
            name: require("name")?,
            price: require("price")?,
            stock: require("stock")?,
            description: find("description"),
        })
    }
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            id: 0,
            name: 1,
            price: 2,
            stock: 3,
            description: Some(4),
        }
    }
}

/// Decode one row. Numeric fields are trimmed before parsing; `id` and `name`
/// are taken verbatim.
pub fn decode_row(columns: &Columns, row: &StringRecord) -> Result<Record, String> {
    let field = |idx: usize, name: &str| {
        row.get(idx)
            .ok_or_else(|| format!("row has no {:?} value", name))
    };

    let id = field(columns.id, "id")?;
    if id.trim().is_empty() {
        return Err("empty id".to_string());
    }
    let name = field(columns.name, "name")?;
    if name.trim().is_empty() {
        return Err("empty name".to_string());
    }

    let raw_price = field(columns.price, "price")?.trim();
    let price: f64 = raw_price
        .parse()
        .map_err(|_| format!("price is not a number: {:?}", raw_price))?;
    validate_price(price)?;

    let stock = parse_stock(field(columns.stock, "stock")?)?;

    let description = columns
        .description
        .and_then(|idx| row.get(idx))
        .unwrap_or_default();

    Ok(Record {
        id: id.to_string(),
        name: name.to_string(),
        price,
        stock,
        description: description.to_string(),
    })
}

/// The price as it reads back after encoding.
pub fn stored_price(price: f64) -> f64 {
    format!("{:.2}", price).parse().unwrap_or(price)
}

/// Encode a record in [`HEADER`] order.
pub fn encode_row(record: &Record) -> [String; 5] {
    [
        record.id.clone(),
        record.name.clone(),
        format!("{:.2}", record.price),
        record.stock.to_string(),
        record.description.clone(),
    ]
}

/// Decode a whole collection. Malformed rows become warnings; only failures
/// of the underlying reader are returned as errors.
pub fn read_collection<R: Read>(reader: R, source: &Path) -> Result<DecodeReport, StorageError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut report = DecodeReport::new();

    let headers = match rdr.headers() {
        Ok(h) => h.clone(),
        Err(e) => return Err(csv_error(source, e)),
    };
    if headers.is_empty() {
        return Ok(report);
    }
    let columns = match Columns::from_headers(&headers) {
        Ok(c) => c,
        Err(reason) => {
            report.warnings.push(RowWarning {
                source: source.to_path_buf(),
                line: Some(1),
                reason: format!("unreadable header: {}", reason),
            });
            return Ok(report);
        }
    };

    for result in rdr.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(csv_error(source, e)),
            Err(e) => {
                report.warnings.push(RowWarning {
                    source: source.to_path_buf(),
                    line: e.position().map(|p| p.line()),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        match decode_row(&columns, &row) {
            Ok(record) => report.records.push(record),
            Err(reason) => report.warnings.push(RowWarning {
                source: source.to_path_buf(),
                line: row.position().map(|p| p.line()),
                reason,
            }),
        }
    }

    Ok(report)
}

/// Write `records`, preceded by the header row when `with_header` is set.
pub fn write_collection<W: Write>(
    writer: W,
    records: &[Record],
    with_header: bool,
    source: &Path,
) -> Result<(), StorageError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    if with_header {
        wtr.write_record(HEADER).map_err(|e| csv_error(source, e))?;
    }
    for record in records {
        wtr.write_record(encode_row(record))
            .map_err(|e| csv_error(source, e))?;
    }
    wtr.flush()?;
    Ok(())
}

fn csv_error(source: &Path, err: csv::Error) -> StorageError {
    StorageError::Csv {
        path: source.to_path_buf(),
        source: err,
    }
}
