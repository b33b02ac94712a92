use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type,
};
use chrono::NaiveDate;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Columns every source file must provide, in record order.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Invoice Date",
    "Sales Order Date",
    "Platform",
    "Brand",
    "Order Status",
    "Quantity",
    "Sales Amount",
    "Cost Price",
];

/// Why a dataset could not be loaded. Fatal: no partial dataset is ever
/// produced, the caller reports the error and stops.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}, column '{column}': {message}")]
    BadCell {
        row: usize,
        column: &'static str,
        message: String,
    },
    #[error("malformed {format} input: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },
}

/// Load a sales dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the source column names
/// * `.json`    – `[{ "Invoice Date": "...", "Platform": "...", ... }, ...]`
/// * `.parquet` – columnar file with the same column names
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Load cache
// ---------------------------------------------------------------------------

/// Explicit memoization of [`load_file`], keyed by canonical path and
/// modification time. Loading is expensive and expected to run once per
/// process; the cached value is shared read-only via `Arc`.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    modified: Option<SystemTime>,
    dataset: Arc<Dataset>,
}

impl DatasetCache {
    /// Load through the cache. A changed modification time invalidates the
    /// cached dataset and reloads from disk.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let canonical = path.canonicalize().map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let modified = std::fs::metadata(&canonical)
            .and_then(|m| m.modified())
            .ok();

        if let Some(entry) = &self.entry {
            if entry.path == canonical && entry.modified == modified {
                debug!("dataset cache hit for {}", canonical.display());
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        debug!("loading dataset from {}", canonical.display());
        let dataset = Arc::new(load_file(&canonical)?);
        self.entry = Some(CacheEntry {
            path: canonical,
            modified,
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Cell parsing helpers (shared across formats)
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

fn bad_cell(row: usize, column: &'static str, message: String) -> LoadError {
    LoadError::BadCell {
        row,
        column,
        message,
    }
}

fn parse_date(raw: &str, row: usize, column: &'static str) -> Result<NaiveDate, LoadError> {
    let s = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    // Timestamp cells ("2023-05-01 00:00:00"): keep the date part.
    if let Some(date_part) = s.split([' ', 'T']).next() {
        if date_part != s {
            for fmt in DATE_FORMATS {
                if let Ok(d) = NaiveDate::parse_from_str(date_part, fmt) {
                    return Ok(d);
                }
            }
        }
    }
    Err(bad_cell(row, column, format!("'{s}' is not a calendar date")))
}

/// Currency-tolerant float parsing: strips `$` and thousands separators.
fn parse_f64(raw: &str, row: usize, column: &'static str) -> Result<f64, LoadError> {
    let s = raw.trim().trim_start_matches('$').replace(',', "");
    s.parse()
        .map_err(|_| bad_cell(row, column, format!("'{raw}' is not a number")))
}

fn parse_i64(raw: &str, row: usize, column: &'static str) -> Result<i64, LoadError> {
    let s = raw.trim().replace(',', "");
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    // Spreadsheet exports often render integers as "3.0".
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 => Ok(f as i64),
        _ => Err(bad_cell(row, column, format!("'{raw}' is not an integer"))),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn csv_error(path: &Path, err: csv::Error) -> LoadError {
    if err.is_io_error() {
        if let csv::ErrorKind::Io(io) = err.into_kind() {
            return LoadError::Io {
                path: path.to_path_buf(),
                source: io,
            };
        }
        LoadError::Malformed {
            format: "CSV",
            message: "i/o error".to_string(),
        }
    } else {
        LoadError::Malformed {
            format: "CSV",
            message: err.to_string(),
        }
    }
}

/// Locate every required column in the header, left to right.
fn column_indices(headers: &[String]) -> Result<[usize; 8], LoadError> {
    let mut indices = [0usize; 8];
    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))?;
    }
    Ok(indices)
}

fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let idx = column_indices(&headers)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.map_err(|e| LoadError::Malformed {
            format: "CSV",
            message: format!("row {row_no}: {e}"),
        })?;
        let cell = |i: usize| row.get(idx[i]).unwrap_or("");

        records.push(Record::new(
            parse_date(cell(0), row_no, "Invoice Date")?,
            parse_date(cell(1), row_no, "Sales Order Date")?,
            cell(2).trim().to_string(),
            cell(3).trim().to_string(),
            cell(4).trim().to_string(),
            parse_i64(cell(5), row_no, "Quantity")?,
            parse_f64(cell(6), row_no, "Sales Amount")?,
            parse_f64(cell(7), row_no, "Cost Price")?,
        ));
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, pandas `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Invoice Date": "2023-01-10",
///     "Sales Order Date": "2023-01-08",
///     "Platform": "Amazon",
///     "Brand": "Nike",
///     "Order Status": "Completed",
///     "Quantity": 2,
///     "Sales Amount": 100.5,
///     "Cost Price": 60.25
///   },
///   ...
/// ]
/// ```
///
/// Unlike CSV headers or the parquet footer, an empty array carries no
/// schema, so `[]` loads as an empty dataset with nothing to validate.
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| LoadError::Malformed {
        format: "JSON",
        message: e.to_string(),
    })?;
    let rows = root.as_array().ok_or(LoadError::Malformed {
        format: "JSON",
        message: "expected a top-level array of records".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or(LoadError::Malformed {
            format: "JSON",
            message: format!("row {row_no} is not an object"),
        })?;

        let field = |name: &'static str| obj.get(name).ok_or(LoadError::MissingColumn(name));

        records.push(Record::new(
            json_date(field("Invoice Date")?, row_no, "Invoice Date")?,
            json_date(field("Sales Order Date")?, row_no, "Sales Order Date")?,
            json_string(field("Platform")?, row_no, "Platform")?,
            json_string(field("Brand")?, row_no, "Brand")?,
            json_string(field("Order Status")?, row_no, "Order Status")?,
            json_i64(field("Quantity")?, row_no, "Quantity")?,
            json_f64(field("Sales Amount")?, row_no, "Sales Amount")?,
            json_f64(field("Cost Price")?, row_no, "Cost Price")?,
        ));
    }

    Ok(Dataset::from_records(records))
}

fn json_string(val: &JsonValue, row: usize, column: &'static str) -> Result<String, LoadError> {
    val.as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| bad_cell(row, column, "expected a string".to_string()))
}

fn json_date(val: &JsonValue, row: usize, column: &'static str) -> Result<NaiveDate, LoadError> {
    let s = val
        .as_str()
        .ok_or_else(|| bad_cell(row, column, "expected a date string".to_string()))?;
    parse_date(s, row, column)
}

fn json_i64(val: &JsonValue, row: usize, column: &'static str) -> Result<i64, LoadError> {
    match val {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| bad_cell(row, column, format!("'{n}' is not an integer"))),
        JsonValue::String(s) => parse_i64(s, row, column),
        other => Err(bad_cell(row, column, format!("'{other}' is not an integer"))),
    }
}

fn json_f64(val: &JsonValue, row: usize, column: &'static str) -> Result<f64, LoadError> {
    match val {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| bad_cell(row, column, format!("'{n}' is not a number"))),
        JsonValue::String(s) => parse_f64(s, row, column),
        other => Err(bad_cell(row, column, format!("'{other}' is not a number"))),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Days between 0001-01-01 (chrono's CE epoch) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date32_to_naive(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(UNIX_EPOCH_DAYS_FROM_CE + days)
}

fn parquet_error(err: parquet::errors::ParquetError) -> LoadError {
    LoadError::Malformed {
        format: "parquet",
        message: err.to_string(),
    }
}

fn arrow_error(err: arrow::error::ArrowError) -> LoadError {
    LoadError::Malformed {
        format: "parquet",
        message: err.to_string(),
    }
}

/// Load a parquet file with the required sales columns.
///
/// Dates may be stored as `Date32`/`Date64` or as strings; the numeric
/// columns accept the common integer and float widths. Works with files
/// written by both Pandas and Polars.
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_error)?;

    // The footer schema is present even with zero row groups, so a missing
    // column is caught before any rows are read.
    let file_schema = builder.schema();
    for name in REQUIRED_COLUMNS {
        if file_schema.index_of(name).is_err() {
            return Err(LoadError::MissingColumn(name));
        }
    }

    let reader = builder.build().map_err(parquet_error)?;

    let mut records = Vec::new();
    let mut row_no = 0usize;

    for batch_result in reader {
        let batch = batch_result.map_err(arrow_error)?;
        let schema = batch.schema();

        let mut cols: Vec<ArrayRef> = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for name in REQUIRED_COLUMNS {
            let idx = schema
                .index_of(name)
                .map_err(|_| LoadError::MissingColumn(name))?;
            cols.push(batch.column(idx).clone());
        }

        for row in 0..batch.num_rows() {
            records.push(Record::new(
                date_cell(&cols[0], row, row_no, "Invoice Date")?,
                date_cell(&cols[1], row, row_no, "Sales Order Date")?,
                string_cell(&cols[2], row, row_no, "Platform")?,
                string_cell(&cols[3], row, row_no, "Brand")?,
                string_cell(&cols[4], row, row_no, "Order Status")?,
                i64_cell(&cols[5], row, row_no, "Quantity")?,
                f64_cell(&cols[6], row, row_no, "Sales Amount")?,
                f64_cell(&cols[7], row, row_no, "Cost Price")?,
            ));
            row_no += 1;
        }
    }

    Ok(Dataset::from_records(records))
}

// -- Arrow cell helpers --

fn string_cell(
    col: &ArrayRef,
    row: usize,
    row_no: usize,
    column: &'static str,
) -> Result<String, LoadError> {
    if col.is_null(row) {
        return Err(bad_cell(row_no, column, "null value".to_string()));
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).trim().to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).trim().to_string()),
        other => Err(bad_cell(
            row_no,
            column,
            format!("expected a string column, got {other:?}"),
        )),
    }
}

fn date_cell(
    col: &ArrayRef,
    row: usize,
    row_no: usize,
    column: &'static str,
) -> Result<NaiveDate, LoadError> {
    if col.is_null(row) {
        return Err(bad_cell(row_no, column, "null value".to_string()));
    }
    match col.data_type() {
        DataType::Date32 => {
            let days = col.as_primitive::<Date32Type>().value(row);
            date32_to_naive(days)
                .ok_or_else(|| bad_cell(row_no, column, format!("day offset {days} out of range")))
        }
        DataType::Date64 => {
            let millis = col.as_primitive::<Date64Type>().value(row);
            // Euclidean division keeps pre-1970 timestamps on the right day.
            let days = millis.div_euclid(86_400_000) as i32;
            date32_to_naive(days)
                .ok_or_else(|| bad_cell(row_no, column, format!("timestamp {millis} out of range")))
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let s = string_cell(col, row, row_no, column)?;
            parse_date(&s, row_no, column)
        }
        other => Err(bad_cell(
            row_no,
            column,
            format!("expected a date column, got {other:?}"),
        )),
    }
}

fn i64_cell(
    col: &ArrayRef,
    row: usize,
    row_no: usize,
    column: &'static str,
) -> Result<i64, LoadError> {
    if col.is_null(row) {
        return Err(bad_cell(row_no, column, "null value".to_string()));
    }
    match col.data_type() {
        DataType::Int32 => Ok(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Ok(col.as_primitive::<Int64Type>().value(row)),
        other => Err(bad_cell(
            row_no,
            column,
            format!("expected an integer column, got {other:?}"),
        )),
    }
}

fn f64_cell(
    col: &ArrayRef,
    row: usize,
    row_no: usize,
    column: &'static str,
) -> Result<f64, LoadError> {
    if col.is_null(row) {
        return Err(bad_cell(row_no, column, "null value".to_string()));
    }
    match col.data_type() {
        DataType::Float32 => Ok(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Ok(col.as_primitive::<Float64Type>().value(row)),
        DataType::Int32 => Ok(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => Ok(col.as_primitive::<Int64Type>().value(row) as f64),
        other => Err(bad_cell(
            row_no,
            column,
            format!("expected a numeric column, got {other:?}"),
        )),
    }
}
