//! CSV writers for the three per-request artifacts: the two affinity vectors and the
//! combined ranking. Rows are written in ranked order.

use crate::types::{AffinityVector, CombinedVector, ModelKind};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create output directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to flush '{}': {source}", .path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Serialize)]
struct AffinityRow {
    element: &'static str,
    score: f64,
    #[serde(rename = "pred_MIVar")]
    pred_mi_var: f64,
    #[serde(rename = "pred_MEVar")]
    pred_me_var: f64,
    #[serde(rename = "pred_amotVar")]
    pred_amot_var: f64,
}

#[derive(Serialize)]
struct CombinedRow {
    element: &'static str,
    score_hexad: f64,
    score_motiv: f64,
    s_hexad: f64,
    s_motiv: f64,
    score_final: f64,
}

fn write_rows<T: Serialize>(
    path: &Path,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), ExportError> {
    let csv_error = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ExportError::Flush {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_affinity_csv(path: &Path, vector: &AffinityVector) -> Result<(), ExportError> {
    write_rows(
        path,
        vector.iter().map(|row| AffinityRow {
            element: row.element.as_str(),
            score: row.score,
            pred_mi_var: row.prediction.mi_var,
            pred_me_var: row.prediction.me_var,
            pred_amot_var: row.prediction.amot_var,
        }),
    )
}

pub fn write_combined_csv(path: &Path, combined: &CombinedVector) -> Result<(), ExportError> {
    write_rows(
        path,
        combined.iter().map(|row| CombinedRow {
            element: row.element.as_str(),
            score_hexad: row.score_hexad,
            score_motiv: row.score_motiv,
            s_hexad: row.s_hexad,
            s_motiv: row.s_motiv,
            score_final: row.score_final,
        }),
    )
}

/// Where the artifacts of one request were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub hexad: PathBuf,
    pub motivation: PathBuf,
    pub combined: PathBuf,
}

impl ExportedFiles {
    /// `{user}_affinity_hexad.csv`, `{user}_affinity_motivation.csv` and
    /// `{user}_affinity_combined.csv` under `out_dir`.
    pub fn for_user(out_dir: &Path, user: &str) -> Self {
        Self {
            hexad: out_dir.join(affinity_file_name(user, ModelKind::Hexad)),
            motivation: out_dir.join(affinity_file_name(user, ModelKind::Motivation)),
            combined: out_dir.join(format!("{user}_affinity_combined.csv")),
        }
    }
}

fn affinity_file_name(user: &str, model: ModelKind) -> String {
    format!("{user}_affinity_{}.csv", model.artifact_suffix())
}

/// Writes all three artifacts for `user`, creating `out_dir` if needed.
pub fn export_all(
    out_dir: &Path,
    user: &str,
    hexad: &AffinityVector,
    motivation: &AffinityVector,
    combined: &CombinedVector,
) -> Result<ExportedFiles, ExportError> {
    fs::create_dir_all(out_dir).map_err(|source| ExportError::CreateDir {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let files = ExportedFiles::for_user(out_dir, user);
    write_affinity_csv(&files.hexad, hexad)?;
    write_affinity_csv(&files.motivation, motivation)?;
    write_combined_csv(&files.combined, combined)?;

    log::info!("Wrote affinity artifacts for '{user}' to {}", out_dir.display());
    Ok(files)
}
