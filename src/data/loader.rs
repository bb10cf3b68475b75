use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::error::SchemaError;
use super::model::{Dataset, Field, Value};

// ---------------------------------------------------------------------------
// Data source contract
// ---------------------------------------------------------------------------

/// Anything that can hand over the full table as positional raw rows.
///
/// Rows follow [`Field::ALL`] order. The source makes no promise about
/// shape; [`load`] validates every row before a [`Dataset`] exists.
pub trait DataSource {
    fn fetch_all(&self) -> Result<Vec<Vec<Value>>>;

    /// Human readable origin, for log lines and the status bar.
    fn describe(&self) -> String;
}

/// Fetch every row from `source` and validate it against the schema.
pub fn load(source: &dyn DataSource) -> Result<Dataset> {
    let rows = source
        .fetch_all()
        .with_context(|| format!("fetching rows from {}", source.describe()))?;
    let dataset = Dataset::from_rows(rows)
        .with_context(|| format!("validating rows from {}", source.describe()))?;
    log::info!(
        "Loaded {} records from {}",
        dataset.len(),
        source.describe()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// File-backed source
// ---------------------------------------------------------------------------

/// A table stored in a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – 13 columns, positional
/// * `.json`    – `[[...13 cells], ...]` or `[{ "Date": ..., "Production": ..., ... }, ...]`
/// * `.csv`     – header row + 13 columns, positional
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn fetch_all(&self) -> Result<Vec<Vec<Value>>> {
        let path = self.path.as_path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "parquet" | "pq" => read_parquet(path),
            "json" => read_json(path),
            "csv" => read_csv(path),
            other => bail!("Unsupported file extension: .{other}"),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Convenience: load a dataset straight from a file path.
pub fn load_file(path: &Path) -> Result<Dataset> {
    load(&FileSource::new(path))
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// A row either in tuple form (as returned by a SQL `fetchall`) or keyed by
/// column name (the default `df.to_json(orient='records')`).
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRow {
    Tuple(Vec<JsonValue>),
    Object(Map<String, JsonValue>),
}

fn read_json(path: &Path) -> Result<Vec<Vec<Value>>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<JsonRow> =
        serde_json::from_str(&text).context("parsing JSON: expected a top-level array of rows")?;

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            JsonRow::Tuple(cells) => Ok(cells
                .iter()
                .enumerate()
                .map(|(col, cell)| json_to_value(Field::ALL.get(col).copied(), cell))
                .collect()),
            JsonRow::Object(obj) => object_to_row(i, &obj),
        })
        .collect()
}

/// Reorder an object row into field order.  A wrong key count is passed
/// through as a short/long row so the schema check reports it.
fn object_to_row(row: usize, obj: &Map<String, JsonValue>) -> Result<Vec<Value>> {
    if obj.len() != Field::COUNT {
        return Ok(obj.values().map(|cell| json_to_value(None, cell)).collect());
    }
    Field::ALL
        .iter()
        .map(|field| {
            obj.get(field.name())
                .map(|cell| json_to_value(Some(*field), cell))
                .ok_or(SchemaError::MissingField { row, field: *field })
                .map_err(anyhow::Error::from)
        })
        .collect()
}

/// `field` is the column the cell lands in, when known.  Text columns keep
/// the source spelling, so `"007"` and `7` stay distinct values.
fn json_to_value(field: Option<Field>, val: &JsonValue) -> Value {
    let text_column = field.is_some_and(Field::is_text);
    match val {
        JsonValue::String(s) if text_column => Value::Text(s.clone()),
        JsonValue::Number(n) if text_column => Value::Text(n.to_string()),
        JsonValue::String(s) => guess_value(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row, then one record per line with the 13 columns in
/// field order.  Columns are matched by position; a differing header name is
/// only worth a warning.
fn read_csv(path: &Path) -> Result<Vec<Vec<Value>>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    for (field, header) in Field::ALL.iter().zip(headers.iter()) {
        if field.name() != header.trim() {
            log::warn!(
                "CSV column {} is named '{header}', reading it as '{field}'",
                field.index()
            );
        }
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row = record
            .iter()
            .enumerate()
            .map(|(col, cell)| match Field::ALL.get(col) {
                Some(field) if field.is_text() => csv_text(cell),
                _ => guess_value(cell),
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn csv_text(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        Value::Null
    } else {
        Value::Text(s.to_string())
    }
}

fn guess_value(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    // "NaN" / "inf" stay text and fail the number check downstream.
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return Value::Float(f);
        }
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Value::Date(d);
    }
    Value::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the 13 record columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), and by the bundled `generate_sample`.
fn read_parquet(path: &Path) -> Result<Vec<Vec<Value>>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_value(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {}", rows.len()))?;
            rows.push(cells);
        }
    }

    Ok(rows)
}

// -- Parquet / Arrow helpers --

fn downcast<'a, T: 'static>(col: &'a Arc<dyn Array>) -> Result<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("column declared {:?} has a different layout", col.data_type()))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::Text(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => Value::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Value::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => Value::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => Value::Float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => Value::Float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => Value::Bool(downcast::<BooleanArray>(col)?.value(row)),
        DataType::Date32 => {
            let date = downcast::<Date32Array>(col)?
                .value_as_date(row)
                .context("date out of range")?;
            Value::Date(date)
        }
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}
