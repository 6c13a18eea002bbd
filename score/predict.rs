//! Projection of a student profile through a significant-coefficient matrix, and
//! the scalar objective that ranks the resulting motivational variation.

use crate::labels::{AMOT_VAR, ME_VAR, MI_VAR};
use crate::matrix::LabeledMatrix;
use crate::types::{Profile, VariationPrediction};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error(
        "No common variables between the profile [{}] and the coefficient matrix columns [{}].",
        .profile_dimensions.join(", "),
        .matrix_columns.join(", ")
    )]
    NoCommonVariables {
        profile_dimensions: Vec<String>,
        matrix_columns: Vec<String>,
    },
}

/// Relative importance of each outcome in the objective. All three must be non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    pub intrinsic: f64,
    pub extrinsic: f64,
    pub amotivation: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            intrinsic: 1.0,
            extrinsic: 1.0,
            amotivation: 1.0,
        }
    }
}

/// Predicts the three motivational variations for `profile`.
///
/// Only the dimensions present both as matrix columns and in the profile take part
/// in the product. An empty intersection means the model and the profile live in
/// different spaces and is an error, not a zero prediction. Outcome rows the matrix
/// does not carry are reported as `0.0`; rows outside the three outcomes are ignored.
pub fn predict_variations(
    coefs_sig: &LabeledMatrix,
    profile: &Profile,
) -> Result<VariationPrediction, PredictError> {
    let common: Vec<&str> = coefs_sig
        .column_labels()
        .filter(|column| profile.get(column).is_some())
        .collect();

    if common.is_empty() {
        return Err(PredictError::NoCommonVariables {
            profile_dimensions: profile.dimensions().map(str::to_string).collect(),
            matrix_columns: coefs_sig.column_labels().map(str::to_string).collect(),
        });
    }

    let targets: Vec<&str> = coefs_sig.row_labels().collect();
    // Every row carries every column, so the lookups below cannot miss.
    let m = Array2::from_shape_fn((targets.len(), common.len()), |(i, j)| {
        coefs_sig.get(targets[i], common[j]).unwrap_or(0.0)
    });
    let x: Array1<f64> = common
        .iter()
        .map(|dimension| profile.get(dimension).unwrap_or(0.0))
        .collect();
    let y = m.dot(&x);

    let outcome = |label: &str| {
        targets
            .iter()
            .position(|target| *target == label)
            .map_or(0.0, |i| y[i])
    };

    Ok(VariationPrediction {
        mi_var: outcome(MI_VAR),
        me_var: outcome(ME_VAR),
        amot_var: outcome(AMOT_VAR),
    })
}

/// `w_mi·MIVar + w_me·MEVar − w_amot·amotVar`: higher is a better element.
pub fn objective_score(prediction: &VariationPrediction, weights: &ObjectiveWeights) -> f64 {
    weights.intrinsic * prediction.mi_var + weights.extrinsic * prediction.me_var
        - weights.amotivation * prediction.amot_var
}
