// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is ONLY for types that are SHARED BETWEEN FILES, not types that only are used in one file.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the fixed gamification mechanisms being ranked.
///
/// The declaration order is the catalog order. It is the tie-breaker whenever two
/// elements end up with the same score, so it must never be reordered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Avatar,
    Badges,
    Score,
    Timer,
    Progress,
    Ranking,
}

impl Element {
    /// The full catalog, in declaration order.
    pub const ALL: [Element; 6] = [
        Element::Avatar,
        Element::Badges,
        Element::Score,
        Element::Timer,
        Element::Progress,
        Element::Ranking,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Element::Avatar => "avatar",
            Element::Badges => "badges",
            Element::Score => "score",
            Element::Timer => "timer",
            Element::Progress => "progress",
            Element::Ranking => "ranking",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Element {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Element::ALL
            .into_iter()
            .find(|element| element.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                format!(
                    "Unknown gamification element '{trimmed}'. Expected one of: avatar, badges, score, timer, progress, ranking."
                )
            })
    }
}

/// The two independently fitted predictor spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Hexad,
    Motivation,
}

impl ModelKind {
    /// Name of the model folder under the data directory.
    pub fn folder_name(self) -> &'static str {
        match self {
            ModelKind::Hexad => "Hexad",
            ModelKind::Motivation => "Motivation",
        }
    }

    /// Suffix used for exported artifacts.
    pub fn artifact_suffix(self) -> &'static str {
        match self {
            ModelKind::Hexad => "hexad",
            ModelKind::Motivation => "motivation",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.folder_name())
    }
}

/// One student's scores on a fixed set of input dimensions, keyed by dimension name.
///
/// Dimension names are compared verbatim against the canonical column labels of a
/// coefficient matrix. A profile is never modified after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    values: BTreeMap<String, f64>,
}

impl Profile {
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.values.get(dimension).copied()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Predicted variation of the three motivational outcomes. Always fully populated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VariationPrediction {
    /// Intrinsic motivation variation (`MIVar`).
    pub mi_var: f64,
    /// Extrinsic motivation variation (`MEVar`).
    pub me_var: f64,
    /// Amotivation variation (`amotVar`).
    pub amot_var: f64,
}

impl VariationPrediction {
    pub fn is_finite(&self) -> bool {
        self.mi_var.is_finite() && self.me_var.is_finite() && self.amot_var.is_finite()
    }
}

/// The scored outcome for one catalog element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffinityResult {
    pub element: Element,
    pub score: f64,
    pub prediction: VariationPrediction,
}

/// Descending order on scores. `0.0` and `-0.0` compare equal so that the
/// catalog tie-break applies to them. NaN ranks after every number.
pub fn descending_score(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if a == b => Ordering::Equal,
        (false, false) => b.total_cmp(&a),
    }
}

/// A ranked list of affinity results. Rank 0 is the best recommendation.
///
/// The ordering is established once, at construction: score descending, ties broken
/// by catalog order. There are no mutating accessors; a different ranking means a
/// new vector.
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityVector {
    rows: Vec<AffinityResult>,
}

impl AffinityVector {
    pub fn from_results(mut rows: Vec<AffinityResult>) -> Self {
        rows.sort_by(|a, b| {
            descending_score(a.score, b.score).then_with(|| a.element.cmp(&b.element))
        });
        Self { rows }
    }

    pub fn rows(&self) -> &[AffinityResult] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AffinityResult> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn best(&self) -> Option<&AffinityResult> {
        self.rows.first()
    }

    pub fn get(&self, element: Element) -> Option<&AffinityResult> {
        self.rows.iter().find(|row| row.element == element)
    }
}

impl fmt::Display for AffinityVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>4}  {:<10} {:>12} {:>12} {:>12} {:>12}",
            "", "element", "score", "pred_MIVar", "pred_MEVar", "pred_amotVar"
        )?;
        for (rank, row) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{:>4}  {:<10} {:>12.6} {:>12.6} {:>12.6} {:>12.6}",
                rank,
                row.element,
                row.score,
                row.prediction.mi_var,
                row.prediction.me_var,
                row.prediction.amot_var
            )?;
        }
        Ok(())
    }
}

/// The blended outcome for one element across both models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedResult {
    pub element: Element,
    /// Raw Hexad-derived score.
    pub score_hexad: f64,
    /// Raw Motivation-derived score.
    pub score_motiv: f64,
    /// Hexad score min-max rescaled to `[0, 1]`.
    pub s_hexad: f64,
    /// Motivation score min-max rescaled to `[0, 1]`.
    pub s_motiv: f64,
    pub score_final: f64,
}

/// The final ranking, ordered by `score_final` descending.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedVector {
    rows: Vec<CombinedResult>,
}

impl CombinedVector {
    pub fn from_results(mut rows: Vec<CombinedResult>) -> Self {
        // Stable: equal final scores keep the join order.
        rows.sort_by(|a, b| descending_score(a.score_final, b.score_final));
        Self { rows }
    }

    pub fn rows(&self) -> &[CombinedResult] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CombinedResult> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The system's final recommendation.
    pub fn best(&self) -> Option<&CombinedResult> {
        self.rows.first()
    }
}

impl fmt::Display for CombinedVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>4}  {:<10} {:>12} {:>12} {:>10} {:>10} {:>12}",
            "", "element", "score_hexad", "score_motiv", "s_hexad", "s_motiv", "score_final"
        )?;
        for (rank, row) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{:>4}  {:<10} {:>12.6} {:>12.6} {:>10.6} {:>10.6} {:>12.6}",
                rank,
                row.element,
                row.score_hexad,
                row.score_motiv,
                row.s_hexad,
                row.s_motiv,
                row.score_final
            )?;
        }
        Ok(())
    }
}
