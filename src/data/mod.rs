//! Data loading for the wine quality dataset
//!
//! Reads a delimited file with a header row, trims header whitespace,
//! selects the five predictor columns plus the target, and converts to
//! ndarray storage for the regression engine.

use crate::error::DataLoadError;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Predictor columns in canonical order
pub const FEATURE_COLUMNS: [&str; 5] = [
    "alcohol",
    "volatile acidity",
    "sulphates",
    "citric acid",
    "density",
];

/// Target column
pub const TARGET_COLUMN: &str = "quality";

/// An immutable, fully numeric dataset: N rows of five features plus target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    features: Array2<f64>,
    target: Array1<f64>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// Build a dataset from pre-validated arrays. Used by tests and callers
    /// that synthesize data; values must be finite and shapes must agree.
    pub fn from_arrays(features: Array2<f64>, target: Array1<f64>) -> Result<Self, DataLoadError> {
        if features.ncols() != FEATURE_COLUMNS.len() {
            return Err(DataLoadError::ShapeMismatch {
                expected: format!("{} feature columns", FEATURE_COLUMNS.len()),
                actual: format!("{} columns", features.ncols()),
            });
        }
        if features.nrows() != target.len() {
            return Err(DataLoadError::ShapeMismatch {
                expected: format!("{} target values", features.nrows()),
                actual: format!("{} target values", target.len()),
            });
        }
        if features.nrows() == 0 {
            return Err(DataLoadError::Empty("no observations".to_string()));
        }
        Ok(Self {
            features,
            target,
            feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn target(&self) -> &Array1<f64> {
        &self.target
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Column means of the feature matrix, canonical order
    pub fn feature_means(&self) -> Array1<f64> {
        self.features
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(self.n_features()))
    }

    pub fn target_mean(&self) -> f64 {
        self.target.mean().unwrap_or(0.0)
    }
}

/// Open the source file, retrying once on transient I/O failure
fn open_with_retry(path: &Path) -> Result<File, DataLoadError> {
    match File::open(path) {
        Ok(f) => Ok(f),
        Err(first) => {
            warn!(path = %path.display(), error = %first, "file open failed, retrying once");
            File::open(path).map_err(|source| DataLoadError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    }
}

/// Sniff the field delimiter from the header line. The UCI wine quality
/// files are semicolon-separated; everything else defaults to comma.
fn sniff_delimiter(path: &Path) -> Result<u8, DataLoadError> {
    let file = open_with_retry(path)?;
    let mut reader = BufReader::new(file);
    let mut header = String::new();
    reader
        .read_line(&mut header)
        .map_err(|source| DataLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
    Ok(if header.contains(';') { b';' } else { b',' })
}

/// Load the wine quality dataset from a delimited file.
///
/// The header row is matched after trimming surrounding whitespace from
/// column names; exactly the five predictor columns and the target are
/// selected. No side effects beyond the read — memoization lives in
/// [`crate::cache::SessionCache`].
pub fn load<P: AsRef<Path>>(path: P) -> Result<Dataset, DataLoadError> {
    let path = path.as_ref();
    let delimiter = sniff_delimiter(path)?;
    debug!(path = %path.display(), delimiter = %(delimiter as char), "reading dataset");

    let file = open_with_retry(path)?;
    let parse_opts = CsvParseOptions::default().with_separator(delimiter);
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .with_parse_options(parse_opts)
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| DataLoadError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    if df.height() == 0 {
        return Err(DataLoadError::Empty(path.display().to_string()));
    }

    // Match required columns against whitespace-trimmed header names
    let trimmed: Vec<(String, String)> = df
        .get_column_names()
        .into_iter()
        .map(|s| (s.to_string().trim().to_string(), s.to_string()))
        .collect();
    let resolve = |wanted: &str| -> Result<String, DataLoadError> {
        trimmed
            .iter()
            .find(|(t, _)| t == wanted)
            .map(|(_, actual)| actual.clone())
            .ok_or_else(|| DataLoadError::MissingColumn(wanted.to_string()))
    };

    let n = df.height();
    let mut features = Array2::zeros((n, FEATURE_COLUMNS.len()));
    for (j, wanted) in FEATURE_COLUMNS.iter().enumerate() {
        let column = numeric_column(&df, &resolve(wanted)?, wanted)?;
        for (i, v) in column.into_iter().enumerate() {
            features[[i, j]] = v;
        }
    }
    let target = Array1::from_vec(numeric_column(&df, &resolve(TARGET_COLUMN)?, TARGET_COLUMN)?);

    info!(path = %path.display(), n_rows = n, "loaded wine quality dataset");
    Dataset::from_arrays(features, target)
}

/// Extract a column as finite f64 values; null, non-numeric, or non-finite
/// cells are load errors.
fn numeric_column(df: &DataFrame, actual: &str, wanted: &str) -> Result<Vec<f64>, DataLoadError> {
    let column = df
        .column(actual)
        .map_err(|_| DataLoadError::MissingColumn(wanted.to_string()))?;
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|_| DataLoadError::UnparseableValue {
            column: wanted.to_string(),
            row: 0,
        })?;
    let ca = series.f64().map_err(|_| DataLoadError::UnparseableValue {
        column: wanted.to_string(),
        row: 0,
    })?;

    let mut out = Vec::with_capacity(ca.len());
    for (row, value) in ca.into_iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => out.push(v),
            _ => {
                return Err(DataLoadError::UnparseableValue {
                    column: wanted.to_string(),
                    row,
                })
            }
        }
    }
    Ok(out)
}
