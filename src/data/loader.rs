use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{
    DeorbitRecord, DeorbitTable, ALTITUDE_KM, DECAY_TIME_YEARS, DELTA_V_MS, ESA_COMPLIANT,
    REQUIRED_COLUMNS,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied reading {}", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is missing required column(s): {}", .path.display(), .missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("{}: row {row}, column '{column}': cannot parse '{value}' as {expected}", .path.display())]
    Parse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("unsupported table format '.{extension}' for {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("malformed delimited table in {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected JSON layout in {}: {reason}", .path.display())]
    JsonLayout { path: PathBuf, reason: String },

    #[error("failed to read parquet file {}", .path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("failed to decode columns of {}", .path.display())]
    Arrow {
        path: PathBuf,
        #[source]
        source: arrow::error::ArrowError,
    },
}

impl LoadError {
    /// Map an I/O failure on `path` onto the not-found / permission taxonomy.
    fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound { path },
            io::ErrorKind::PermissionDenied => LoadError::PermissionDenied { path },
            _ => LoadError::Io { path, source: err },
        }
    }

    /// True for the "required column absent" case.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, LoadError::MissingColumns { .. })
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// On-disk table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Tsv,
    Json,
    Parquet,
}

impl TableFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Ok(TableFormat::Csv),
            "tsv" | "tab" => Ok(TableFormat::Tsv),
            "json" => Ok(TableFormat::Json),
            "parquet" | "pq" => Ok(TableFormat::Parquet),
            other => Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Overrides extension-based detection.
    pub format: Option<TableFormat>,
    /// Field delimiter for delimited text; `None` picks `,` (or tab for TSV).
    pub delimiter: Option<u8>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a deorbit table from a file. Dispatch by configured format or extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text with a header row
/// * `.tsv`          – tab-delimited text with a header row
/// * `.json`         – `[{ "Altitude_km": 400, "DeltaV_ms": 120.5, ... }, ...]`
/// * `.parquet`      – one column per field, any numeric dtype
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<DeorbitTable, LoadError> {
    let format = match options.format {
        Some(format) => format,
        None => TableFormat::from_path(path)?,
    };
    log::debug!("Loading {} as {format:?}", path.display());

    let table = match format {
        TableFormat::Csv => load_delimited(path, options.delimiter.unwrap_or(b',')),
        TableFormat::Tsv => load_delimited(path, options.delimiter.unwrap_or(b'\t')),
        TableFormat::Json => load_json(path),
        TableFormat::Parquet => load_parquet(path),
    }?;

    log::info!(
        "Loaded {} rows from {} ({} ESA compliant)",
        table.len(),
        path.display(),
        table.compliant_count()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Interpret common textual boolean encodings (case-insensitive).
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "on" | "1.0" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "off" | "0.0" => Some(false),
        _ => None,
    }
}

fn parse_f64_cell(path: &Path, row: usize, column: &str, value: &str) -> Result<f64, LoadError> {
    value.trim().parse::<f64>().map_err(|_| LoadError::Parse {
        path: path.to_path_buf(),
        row,
        column: column.to_string(),
        value: value.to_string(),
        expected: "a number",
    })
}

fn parse_bool_cell(path: &Path, row: usize, column: &str, value: &str) -> Result<bool, LoadError> {
    parse_bool(value).ok_or_else(|| LoadError::Parse {
        path: path.to_path_buf(),
        row,
        column: column.to_string(),
        value: value.to_string(),
        expected: "a boolean",
    })
}

/// Resolve the required columns against a header row, reporting every missing one.
fn locate_columns<S: AsRef<str>>(path: &Path, headers: &[S]) -> Result<[usize; 4], LoadError> {
    let mut indices = [0usize; 4];
    let mut missing = Vec::new();

    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        match headers.iter().position(|h| h.as_ref().trim() == name) {
            Some(idx) => *slot = idx,
            None => missing.push(name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(LoadError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        })
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names; one record per row. Extra columns are ignored.
fn load_delimited(path: &Path, delimiter: u8) -> Result<DeorbitTable, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::from_io(path, e))?;
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let [alt_idx, dv_idx, decay_idx, esa_idx] = locate_columns(path, &headers)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let row = i + 1;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        records.push(DeorbitRecord {
            altitude_km: parse_f64_cell(path, row, ALTITUDE_KM, cell(alt_idx))?,
            delta_v_ms: parse_f64_cell(path, row, DELTA_V_MS, cell(dv_idx))?,
            decay_time_years: parse_f64_cell(path, row, DECAY_TIME_YEARS, cell(decay_idx))?,
            esa_compliant: parse_bool_cell(path, row, ESA_COMPLIANT, cell(esa_idx))?,
        });
    }

    Ok(DeorbitTable::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented layout, the default of `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Altitude_km": 400, "DeltaV_ms": 120.5, "DecayTime_years": 1.2, "ESA_Compliant": true },
///   ...
/// ]
/// ```
///
/// The first record fixes the schema.
fn load_json(path: &Path) -> Result<DeorbitTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::from_io(path, e))?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let layout_err = |reason: String| LoadError::JsonLayout {
        path: path.to_path_buf(),
        reason,
    };

    let rows = root
        .as_array()
        .ok_or_else(|| layout_err("expected a top-level array of records".into()))?;

    if let Some(first) = rows.first() {
        let obj = first
            .as_object()
            .ok_or_else(|| layout_err("record 1 is not an object".into()))?;
        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        locate_columns(path, &keys)?;
    }

    let mut records = Vec::with_capacity(rows.len());
    for (i, value) in rows.iter().enumerate() {
        let row = i + 1;
        let obj = value
            .as_object()
            .ok_or_else(|| layout_err(format!("record {row} is not an object")))?;

        let number = |column: &str| -> Result<f64, LoadError> {
            match obj.get(column) {
                Some(JsonValue::Number(n)) => n.as_f64().ok_or_else(|| LoadError::Parse {
                    path: path.to_path_buf(),
                    row,
                    column: column.to_string(),
                    value: n.to_string(),
                    expected: "a number",
                }),
                Some(JsonValue::String(s)) => parse_f64_cell(path, row, column, s),
                other => parse_f64_cell(path, row, column, &json_cell_text(other)),
            }
        };

        let esa_compliant = match obj.get(ESA_COMPLIANT) {
            Some(JsonValue::Bool(b)) => *b,
            Some(JsonValue::String(s)) => parse_bool_cell(path, row, ESA_COMPLIANT, s)?,
            other => parse_bool_cell(path, row, ESA_COMPLIANT, &json_cell_text(other))?,
        };

        records.push(DeorbitRecord {
            altitude_km: number(ALTITUDE_KM)?,
            delta_v_ms: number(DELTA_V_MS)?,
            decay_time_years: number(DECAY_TIME_YEARS)?,
            esa_compliant,
        });
    }

    Ok(DeorbitTable::from_records(records))
}

fn json_cell_text(value: Option<&JsonValue>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Numeric columns may be any integer or float dtype and are cast to `f64`;
/// text columns are parsed cell by cell like CSV.
/// The compliance column may be boolean, integer (non-zero is compliant) or text.
fn load_parquet(path: &Path) -> Result<DeorbitTable, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::from_io(path, e))?;
    let parquet_err = |source| LoadError::Parquet {
        path: path.to_path_buf(),
        source,
    };
    let arrow_err = |source| LoadError::Arrow {
        path: path.to_path_buf(),
        source,
    };

    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let [alt_idx, dv_idx, decay_idx, esa_idx] = locate_columns(path, &names)?;

    let reader = builder.build().map_err(parquet_err)?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(arrow_err)?;
        let offset = records.len();

        let altitude = float_values(path, ALTITUDE_KM, batch.column(alt_idx), offset)?;
        let delta_v = float_values(path, DELTA_V_MS, batch.column(dv_idx), offset)?;
        let decay = float_values(path, DECAY_TIME_YEARS, batch.column(decay_idx), offset)?;
        let compliant = bool_column(batch.column(esa_idx)).map_err(arrow_err)?;

        for i in 0..batch.num_rows() {
            let row = offset + i + 1;
            records.push(DeorbitRecord {
                altitude_km: altitude[i],
                delta_v_ms: delta_v[i],
                decay_time_years: decay[i],
                esa_compliant: bool_value(path, row, &compliant, i)?,
            });
        }
    }

    Ok(DeorbitTable::from_records(records))
}

// -- Parquet / Arrow helpers --

/// One batch column as `f64`. Text cells go through [`parse_f64_cell`] so a bad
/// cell is reported with its original text; other dtypes are cast by Arrow.
fn float_values(
    path: &Path,
    column: &str,
    col: &ArrayRef,
    offset: usize,
) -> Result<Vec<f64>, LoadError> {
    let arrow_err = |source| LoadError::Arrow {
        path: path.to_path_buf(),
        source,
    };
    let null_cell = |i: usize| LoadError::Parse {
        path: path.to_path_buf(),
        row: offset + i + 1,
        column: column.to_string(),
        value: "null".into(),
        expected: "a number",
    };

    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = cast(col.as_ref(), &DataType::Utf8).map_err(arrow_err)?;
            text.as_string::<i32>()
                .iter()
                .enumerate()
                .map(|(i, cell)| match cell {
                    Some(s) => parse_f64_cell(path, offset + i + 1, column, s),
                    None => Err(null_cell(i)),
                })
                .collect()
        }
        _ => {
            let casted = cast(col.as_ref(), &DataType::Float64).map_err(arrow_err)?;
            let values = casted.as_primitive::<Float64Type>();
            (0..values.len())
                .map(|i| {
                    if values.is_null(i) {
                        Err(null_cell(i))
                    } else {
                        Ok(values.value(i))
                    }
                })
                .collect()
        }
    }
}

/// Text columns go through [`parse_bool`] so they accept the same encodings as CSV.
fn bool_column(col: &ArrayRef) -> Result<BooleanArray, arrow::error::ArrowError> {
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = cast(col.as_ref(), &DataType::Utf8)?;
            let strings = text.as_string::<i32>();
            Ok(strings.iter().map(|s| s.and_then(parse_bool)).collect())
        }
        _ => {
            let casted = cast(col.as_ref(), &DataType::Boolean)?;
            Ok(casted.as_boolean().clone())
        }
    }
}

fn bool_value(path: &Path, row: usize, values: &BooleanArray, i: usize) -> Result<bool, LoadError> {
    if values.is_null(i) {
        return Err(LoadError::Parse {
            path: path.to_path_buf(),
            row,
            column: ESA_COMPLIANT.to_string(),
            value: "null".into(),
            expected: "a boolean",
        });
    }
    Ok(values.value(i))
}
