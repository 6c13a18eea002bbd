// ========================================================================================
//
//                              THE AFFINITY VECTOR BUILDER
//
// ========================================================================================
//
// ### Purpose ###
//
// For one model folder and one profile, this module scores every catalog element by
// running load → mask → predict → score on that element's own coefficient and p-value
// tables. Elements share nothing, so the six pipelines run as independent rayon tasks
// and are gathered back in catalog order before the single, stable ranking sort.

use crate::matrix::{MatrixError, load_pls_matrix, mask_by_pvalue};
use crate::predict::{ObjectiveWeights, PredictError, objective_score, predict_variations};
use crate::types::{AffinityResult, AffinityVector, Element, Profile};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AffinityError {
    #[error("Element '{element}' in model folder '{}': {source}", .folder.display())]
    Matrix {
        element: Element,
        folder: PathBuf,
        #[source]
        source: MatrixError,
    },
    #[error("Element '{element}' in model folder '{}': {source}", .folder.display())]
    Predict {
        element: Element,
        folder: PathBuf,
        #[source]
        source: PredictError,
    },
}

impl AffinityError {
    pub fn element(&self) -> Element {
        match self {
            AffinityError::Matrix { element, .. } | AffinityError::Predict { element, .. } => {
                *element
            }
        }
    }
}

/// A directory holding one coefficient table and one p-value table per element,
/// named `{element}PathCoefs.csv` and `{element}pVals.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFolder {
    root: PathBuf,
}

impl ModelFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn coefficients_path(&self, element: Element) -> PathBuf {
        self.root.join(format!("{element}PathCoefs.csv"))
    }

    pub fn pvalues_path(&self, element: Element) -> PathBuf {
        self.root.join(format!("{element}pVals.csv"))
    }
}

/// Runs the full per-element pipeline for a single catalog element.
pub fn score_element(
    folder: &ModelFolder,
    element: Element,
    profile: &Profile,
    alpha: f64,
    weights: &ObjectiveWeights,
) -> Result<AffinityResult, AffinityError> {
    let matrix_err = |source| AffinityError::Matrix {
        element,
        folder: folder.root.clone(),
        source,
    };

    let coefs = load_pls_matrix(&folder.coefficients_path(element)).map_err(matrix_err)?;
    let pvals = load_pls_matrix(&folder.pvalues_path(element)).map_err(matrix_err)?;
    let coefs_sig = mask_by_pvalue(&coefs, &pvals, alpha).map_err(matrix_err)?;

    let prediction =
        predict_variations(&coefs_sig, profile).map_err(|source| AffinityError::Predict {
            element,
            folder: folder.root.clone(),
            source,
        })?;
    let score = objective_score(&prediction, weights);

    log::debug!(
        "{element}: score={score:.6} MIVar={:.6} MEVar={:.6} amotVar={:.6}",
        prediction.mi_var,
        prediction.me_var,
        prediction.amot_var
    );

    Ok(AffinityResult {
        element,
        score,
        prediction,
    })
}

/// Scores the whole catalog against `profile` and ranks it.
///
/// Either every element is scored or the call fails; when several elements fail,
/// the error reported is the one of the earliest element in catalog order.
pub fn affinity_vector(
    folder: &ModelFolder,
    profile: &Profile,
    alpha: f64,
    weights: &ObjectiveWeights,
) -> Result<AffinityVector, AffinityError> {
    let outcomes: Vec<Result<AffinityResult, AffinityError>> = Element::ALL
        .par_iter()
        .map(|&element| score_element(folder, element, profile, alpha, weights))
        .collect();

    let results = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;
    let vector = AffinityVector::from_results(results);

    if let Some(best) = vector.best() {
        log::info!(
            "Scored {} elements from {}; best is '{}' ({:.6})",
            vector.len(),
            folder.root.display(),
            best.element,
            best.score
        );
    }
    Ok(vector)
}
