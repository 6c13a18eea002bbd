//! # Canonical Label Vocabulary
//!
//! PLS exports are not consistent about how they spell the motivational outcomes
//! and aggregates (`amotvar`, `AMOTVar`, `"MIVar "`...). Every row and column label
//! goes through [`normalize_label`] before it is used as a lookup key, so the rest
//! of the crate only ever sees the canonical spellings below.

/// Predicted intrinsic motivation variation.
pub const MI_VAR: &str = "MIVar";
/// Predicted extrinsic motivation variation.
pub const ME_VAR: &str = "MEVar";
/// Predicted amotivation variation.
pub const AMOT_VAR: &str = "amotVar";
/// Aggregated intrinsic motivation.
pub const MI: &str = "MI";
/// Aggregated extrinsic motivation.
pub const ME: &str = "ME";
/// Initial amotivation.
pub const AMOT_I: &str = "amotI";

/// Lower-cased spelling → canonical spelling. Anything absent passes through as-is.
const CANONICAL_LABELS: &[(&str, &str)] = &[
    ("amotvar", AMOT_VAR),
    ("mivar", MI_VAR),
    ("mevar", ME_VAR),
    ("amoti", AMOT_I),
    ("mi", MI),
    ("me", ME),
];

/// Maps a raw table label onto the canonical vocabulary.
///
/// Surrounding whitespace is trimmed, then surrounding double and single quotes.
/// Matching against the vocabulary is case-insensitive. Labels outside the
/// vocabulary keep their original casing and spelling.
pub fn normalize_label(raw: &str) -> String {
    let stripped = raw.trim().trim_matches('"').trim_matches('\'');
    let lowered = stripped.to_lowercase();
    CANONICAL_LABELS
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map_or_else(|| stripped.to_string(), |(_, canonical)| canonical.to_string())
}
