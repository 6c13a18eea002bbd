//! # Labeled Matrix Loading and Significance Masking
//!
//! A PLS export is a semicolon-delimited table: the header holds the input
//! dimensions, the first column holds the predicted outcomes, every other cell is a
//! number. Coefficients and p-values for one element are two such tables.
//!
//! - Label-Keyed: cells are addressed by `(row label, column label)`, never by
//!   position. The order rows and columns appear in on disk carries no meaning.
//! - Strict Pairing: a coefficient table is only ever masked against a p-value table
//!   with the exact same label sets. Any disagreement is an error.

use crate::labels::normalize_label;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which side of a matrix a label lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("Failed to read table '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Table '{}' has no header row.", .path.display())]
    EmptyTable { path: PathBuf },
    #[error(
        "Table '{}' contains a non-finite or non-numeric value '{value}' at row '{row}', column '{column}'.",
        .path.display()
    )]
    MalformedCell {
        path: PathBuf,
        row: String,
        column: String,
        value: String,
    },
    #[error("The {axis} label '{label}' appears more than once after normalization.")]
    DuplicateLabel { axis: Axis, label: String },
    #[error("Row '{row}' has {found} values, but the header declares {expected} columns.")]
    RaggedRow {
        row: String,
        expected: usize,
        found: usize,
    },
    #[error(
        "The p-value matrix has no {axis} labelled '{label}' to match the coefficient matrix."
    )]
    MissingFromPValues { axis: Axis, label: String },
    #[error(
        "The coefficient matrix has no {axis} labelled '{label}' to match the p-value matrix."
    )]
    MissingFromCoefficients { axis: Axis, label: String },
}

/// A numeric table addressed by row and column labels.
///
/// Every row holds a value for every column; construction rejects anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    columns: BTreeSet<String>,
    rows: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LabeledMatrix {
    /// Builds a matrix from a header and positional rows.
    ///
    /// Labels are taken verbatim; normalization is the loader's job.
    pub fn new<C, R, L>(columns: C, rows: R) -> Result<Self, MatrixError>
    where
        C: IntoIterator<Item = L>,
        R: IntoIterator<Item = (L, Vec<f64>)>,
        L: Into<String>,
    {
        let header: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut column_set = BTreeSet::new();
        for label in &header {
            if !column_set.insert(label.clone()) {
                return Err(MatrixError::DuplicateLabel {
                    axis: Axis::Column,
                    label: label.clone(),
                });
            }
        }

        let mut labeled_rows = BTreeMap::new();
        for (label, values) in rows {
            let label: String = label.into();
            if values.len() != header.len() {
                return Err(MatrixError::RaggedRow {
                    row: label,
                    expected: header.len(),
                    found: values.len(),
                });
            }
            let cells: BTreeMap<String, f64> = header.iter().cloned().zip(values).collect();
            if labeled_rows.insert(label.clone(), cells).is_some() {
                return Err(MatrixError::DuplicateLabel {
                    axis: Axis::Row,
                    label,
                });
            }
        }

        Ok(Self {
            columns: column_set,
            rows: labeled_rows,
        })
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        self.rows.get(row)?.get(column).copied()
    }

    pub fn row_labels(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn column_labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn has_row(&self, label: &str) -> bool {
        self.rows.contains_key(label)
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.columns.contains(label)
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Applies `f` to every cell, keyed by its labels. The first error wins.
    fn try_map_cells<F>(&self, mut f: F) -> Result<Self, MatrixError>
    where
        F: FnMut(&str, &str, f64) -> Result<f64, MatrixError>,
    {
        let mut rows = BTreeMap::new();
        for (row, cells) in &self.rows {
            let mut mapped = BTreeMap::new();
            for (column, &value) in cells {
                mapped.insert(column.clone(), f(row, column, value)?);
            }
            rows.insert(row.clone(), mapped);
        }
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Checks that `self` and `reference` carry the same row and column label sets.
    fn check_aligned_with(&self, reference: &LabeledMatrix) -> Result<(), MatrixError> {
        for label in reference.row_labels() {
            if !self.has_row(label) {
                return Err(MatrixError::MissingFromCoefficients {
                    axis: Axis::Row,
                    label: label.to_string(),
                });
            }
        }
        for label in reference.column_labels() {
            if !self.has_column(label) {
                return Err(MatrixError::MissingFromCoefficients {
                    axis: Axis::Column,
                    label: label.to_string(),
                });
            }
        }
        for label in self.row_labels() {
            if !reference.has_row(label) {
                return Err(MatrixError::MissingFromPValues {
                    axis: Axis::Row,
                    label: label.to_string(),
                });
            }
        }
        for label in self.column_labels() {
            if !reference.has_column(label) {
                return Err(MatrixError::MissingFromPValues {
                    axis: Axis::Column,
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Reads one PLS table (coefficients or p-values) and normalizes its labels.
pub fn load_pls_matrix(path: &Path) -> Result<LabeledMatrix, MatrixError> {
    let csv_error = |source| MatrixError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;

    let header = reader.headers().map_err(csv_error)?.clone();
    if header.is_empty() {
        return Err(MatrixError::EmptyTable {
            path: path.to_path_buf(),
        });
    }
    // The first header cell names the index column and is not a dimension.
    let columns: Vec<String> = header.iter().skip(1).map(normalize_label).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let label = normalize_label(record.get(0).unwrap_or_default());
        let mut values = Vec::with_capacity(columns.len());
        for (column, cell) in columns.iter().zip(record.iter().skip(1)) {
            let malformed = || MatrixError::MalformedCell {
                path: path.to_path_buf(),
                row: label.clone(),
                column: column.clone(),
                value: cell.to_string(),
            };
            // `f64::from_str` accepts "NaN" and "inf"; neither is a fitted value.
            let value = cell.trim().parse::<f64>().map_err(|_| malformed())?;
            if !value.is_finite() {
                return Err(malformed());
            }
            values.push(value);
        }
        rows.push((label, values));
    }

    let matrix = LabeledMatrix::new(columns, rows)?;
    log::debug!(
        "Loaded {}x{} matrix from {}",
        matrix.nrows(),
        matrix.ncols(),
        path.display()
    );
    Ok(matrix)
}

/// Zeroes every coefficient whose p-value is not strictly below `alpha`.
///
/// The p-value matrix is the alignment reference: the result has exactly its label
/// sets, and a label present on one side only fails the whole call.
pub fn mask_by_pvalue(
    coefs: &LabeledMatrix,
    pvals: &LabeledMatrix,
    alpha: f64,
) -> Result<LabeledMatrix, MatrixError> {
    coefs.check_aligned_with(pvals)?;

    pvals.try_map_cells(|row, column, p_value| {
        let coefficient =
            coefs
                .get(row, column)
                .ok_or_else(|| MatrixError::MissingFromCoefficients {
                    axis: Axis::Column,
                    label: column.to_string(),
                })?;
        Ok(if p_value < alpha { coefficient } else { 0.0 })
    })
}
