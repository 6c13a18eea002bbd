//! # Cross-Model Combination
//!
//! The Hexad and Motivation models produce scores on unrelated scales. Each vector is
//! min-max rescaled to `[0, 1]` on its own, then the two rescaled scores are blended
//! with caller-supplied weights. A vector without any spread carries no ranking
//! signal, and every element in it is treated as maximal (`1.0`).

use crate::types::{AffinityVector, CombinedResult, CombinedVector, Element, ModelKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Tolerances for deciding whether a vector has any spread at all.
const RELATIVE_TOLERANCE: f64 = 1e-5;
const ABSOLUTE_TOLERANCE: f64 = 1e-8;

#[derive(Error, Debug)]
pub enum CombineError {
    #[error("Element '{element}' is scored by one model but missing from the {missing_from} vector.")]
    MissingElement {
        element: Element,
        missing_from: ModelKind,
    },
    #[error("Element '{element}' appears more than once in the {model} vector.")]
    DuplicateElement { element: Element, model: ModelKind },
}

/// Weights of the two rescaled scores in the final blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub hexad: f64,
    pub motivation: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            hexad: 0.5,
            motivation: 0.5,
        }
    }
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ABSOLUTE_TOLERANCE + RELATIVE_TOLERANCE * b.abs()
}

/// Rescales `values` onto `[0, 1]`: the minimum maps to `0.0`, the maximum to `1.0`.
///
/// When the maximum and minimum are numerically equal every value maps to `1.0`.
pub fn minmax(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if is_close(max, min) {
        log::warn!(
            "All {} scores are equal ({min:.6}); rescaling every element to 1.0",
            values.len()
        );
        return vec![1.0; values.len()];
    }

    let span = max - min;
    values.iter().map(|v| (v - min) / span).collect()
}

fn index_by_element(
    vector: &AffinityVector,
    model: ModelKind,
) -> Result<BTreeMap<Element, f64>, CombineError> {
    let mut scores = BTreeMap::new();
    for row in vector.iter() {
        if scores.insert(row.element, row.score).is_some() {
            return Err(CombineError::DuplicateElement {
                element: row.element,
                model,
            });
        }
    }
    Ok(scores)
}

/// Joins two affinity vectors on element identity and blends their rescaled scores.
///
/// Both vectors must cover exactly the same elements. The join follows the Hexad
/// vector's ranking; the result is then ranked by `score_final`, ties keeping the
/// join order.
pub fn combine_affinities(
    hexad: &AffinityVector,
    motivation: &AffinityVector,
    weights: &BlendWeights,
) -> Result<CombinedVector, CombineError> {
    let hexad_scores = index_by_element(hexad, ModelKind::Hexad)?;
    let motivation_scores = index_by_element(motivation, ModelKind::Motivation)?;

    if let Some(&element) = motivation_scores
        .keys()
        .find(|element| !hexad_scores.contains_key(*element))
    {
        return Err(CombineError::MissingElement {
            element,
            missing_from: ModelKind::Hexad,
        });
    }

    let mut joined = Vec::with_capacity(hexad.len());
    for row in hexad.iter() {
        let score_motiv =
            motivation_scores
                .get(&row.element)
                .copied()
                .ok_or(CombineError::MissingElement {
                    element: row.element,
                    missing_from: ModelKind::Motivation,
                })?;
        joined.push((row.element, row.score, score_motiv));
    }

    let raw_hexad: Vec<f64> = joined.iter().map(|&(_, h, _)| h).collect();
    let raw_motiv: Vec<f64> = joined.iter().map(|&(_, _, m)| m).collect();
    let s_hexad = minmax(&raw_hexad);
    let s_motiv = minmax(&raw_motiv);

    let rows = joined
        .iter()
        .zip(s_hexad.iter().zip(&s_motiv))
        .map(
            |(&(element, score_hexad, score_motiv), (&s_hexad, &s_motiv))| CombinedResult {
                element,
                score_hexad,
                score_motiv,
                s_hexad,
                s_motiv,
                score_final: weights.hexad * s_hexad + weights.motivation * s_motiv,
            },
        )
        .collect();

    Ok(CombinedVector::from_results(rows))
}
