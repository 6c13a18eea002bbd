//! # Student Roster
//!
//! The roster is a semicolon-delimited table with one row per student, keyed by the
//! `User` column. It is only ever used as a flat lookup: find one student, then turn
//! their row into the two profiles the models consume.

use crate::labels::{AMOT_I, ME, MI};
use crate::types::Profile;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// The identifier column.
pub const USER_COLUMN: &str = "User";

/// The six Hexad player-type scores.
pub const HEXAD_COLUMNS: [&str; 6] = [
    "achiever",
    "player",
    "socialiser",
    "freeSpirit",
    "disruptor",
    "philanthropist",
];

/// Intrinsic motivation sub-scales, aggregated into `MI`.
pub const INTRINSIC_COLUMNS: [&str; 3] = ["micoI", "miacI", "mistI"];
/// Extrinsic motivation sub-scales, aggregated into `ME`.
pub const EXTRINSIC_COLUMNS: [&str; 3] = ["meidI", "meinI", "mereI"];
/// Initial amotivation, passed through as `amotI`.
pub const AMOTIVATION_COLUMN: &str = "amotI";

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Failed to read the student roster: {0}")]
    Csv(#[from] csv::Error),
    #[error("The required column '{0}' was not found in the roster. Please check spelling and case.")]
    ColumnNotFound(String),
    #[error("Unknown student: {0}")]
    UnknownStudent(String),
    #[error("Student '{user}' has a missing or non-numeric value '{value}' in column '{column}'.")]
    MalformedValue {
        user: String,
        column: String,
        value: String,
    },
}

/// One student's raw row, keyed by trimmed column name.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    user: String,
    fields: BTreeMap<String, String>,
}

impl StudentRecord {
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Parses the value of `column` as a number.
    pub fn value(&self, column: &str) -> Result<f64, RosterError> {
        let raw = self
            .fields
            .get(column)
            .ok_or_else(|| RosterError::ColumnNotFound(column.to_string()))?;
        let malformed = || RosterError::MalformedValue {
            user: self.user.clone(),
            column: column.to_string(),
            value: raw.clone(),
        };
        let value = raw.trim().parse::<f64>().map_err(|_| malformed())?;
        if !value.is_finite() {
            return Err(malformed());
        }
        Ok(value)
    }

    fn mean_of(&self, columns: &[&str]) -> Result<f64, RosterError> {
        let mut total = 0.0;
        for column in columns {
            total += self.value(column)?;
        }
        Ok(total / columns.len() as f64)
    }

    /// The student's six Hexad trait scores.
    pub fn hexad_profile(&self) -> Result<Profile, RosterError> {
        let mut pairs = Vec::with_capacity(HEXAD_COLUMNS.len());
        for column in HEXAD_COLUMNS {
            pairs.push((column, self.value(column)?));
        }
        Ok(Profile::from_pairs(pairs))
    }

    /// The student's initial motivation, aggregated to `MI`, `ME` and `amotI`.
    pub fn motivation_profile(&self) -> Result<Profile, RosterError> {
        Ok(Profile::from_pairs([
            (MI, self.mean_of(&INTRINSIC_COLUMNS)?),
            (ME, self.mean_of(&EXTRINSIC_COLUMNS)?),
            (AMOT_I, self.value(AMOTIVATION_COLUMN)?),
        ]))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    records: Vec<StudentRecord>,
}

impl Roster {
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_path(path)?;
        let roster = Self::from_csv(reader)?;
        log::info!(
            "Loaded {} students from {}",
            roster.len(),
            path.display()
        );
        Ok(roster)
    }

    pub fn from_reader<R: Read>(input: R) -> Result<Self, RosterError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(input);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, RosterError> {
        let header: Vec<String> = reader
            .headers()?
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        let user_idx = header
            .iter()
            .position(|name| name == USER_COLUMN)
            .ok_or_else(|| RosterError::ColumnNotFound(USER_COLUMN.to_string()))?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let user = row.get(user_idx).unwrap_or_default().to_string();
            // Short rows read as blank cells; only that student's lookups fail.
            let fields = header
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let cell = row.get(idx).unwrap_or_default();
                    (name.clone(), cell.to_string())
                })
                .collect();
            records.push(StudentRecord { user, fields });
        }
        Ok(Self { records })
    }

    /// The first record whose identifier equals `user`.
    pub fn find(&self, user: &str) -> Result<&StudentRecord, RosterError> {
        self.records
            .iter()
            .find(|record| record.user == user)
            .ok_or_else(|| RosterError::UnknownStudent(user.to_string()))
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.user.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const ROSTER: &str = "User ; achiever;player;socialiser;freeSpirit;disruptor;philanthropist;micoI;miacI;mistI;meidI;meinI;mereI;amotI\n\
elevebf01;4;2;3;1;0;5;5;4;6;2;3;4;1.5\n\
elevebf02;1;1;1;1;1;1;x;4;6;2;3;4;1\n\
elevebf01;9;9;9;9;9;9;9;9;9;9;9;9;9\n";

    fn roster() -> Roster {
        Roster::from_reader(ROSTER.as_bytes()).unwrap()
    }

    #[test]
    fn header_names_are_trimmed_and_first_match_wins() {
        let roster = roster();
        assert_eq!(roster.len(), 3);
        let record = roster.find("elevebf01").unwrap();
        assert_eq!(record.value("achiever").unwrap(), 4.0);
    }

    #[test]
    fn hexad_profile_reads_the_six_traits() {
        let profile = roster().find("elevebf01").unwrap().hexad_profile().unwrap();
        assert_eq!(profile.len(), 6);
        assert_eq!(profile.get("philanthropist"), Some(5.0));
        assert_eq!(profile.get("freeSpirit"), Some(1.0));
    }

    #[test]
    fn motivation_profile_aggregates_sub_scales() {
        let profile = roster()
            .find("elevebf01")
            .unwrap()
            .motivation_profile()
            .unwrap();
        assert_eq!(profile.len(), 3);
        assert_abs_diff_eq!(profile.get("MI").unwrap(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(profile.get("ME").unwrap(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(profile.get("amotI").unwrap(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn unknown_students_are_reported() {
        let err = roster().find("nobody").unwrap_err();
        assert!(matches!(err, RosterError::UnknownStudent(ref user) if user == "nobody"));
    }

    #[test]
    fn non_numeric_values_are_reported() {
        let err = roster()
            .find("elevebf02")
            .unwrap()
            .motivation_profile()
            .unwrap_err();
        match err {
            RosterError::MalformedValue { column, value, .. } => {
                assert_eq!(column, "micoI");
                assert_eq!(value, "x");
            }
            other => panic!("Expected MalformedValue, got {other:?}"),
        }
    }

    #[test]
    fn a_short_row_only_affects_its_own_student() {
        let input = "User;achiever;player;socialiser;freeSpirit;disruptor;philanthropist\n\
elevebf01;4;2;3;1;0;5\n\
elevebf03;1;2\n";
        let roster = Roster::from_reader(input.as_bytes()).unwrap();
        assert_eq!(roster.len(), 2);
        assert!(roster.find("elevebf01").unwrap().hexad_profile().is_ok());

        match roster.find("elevebf03").unwrap().hexad_profile().unwrap_err() {
            RosterError::MalformedValue { column, value, .. } => {
                assert_eq!(column, "socialiser");
                assert_eq!(value, "");
            }
            other => panic!("Expected MalformedValue, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_values_are_reported() {
        let input = "User;amotI\nelevebf01;NaN\n";
        let roster = Roster::from_reader(input.as_bytes()).unwrap();
        let err = roster.find("elevebf01").unwrap().value("amotI").unwrap_err();
        assert!(matches!(err, RosterError::MalformedValue { ref value, .. } if value == "NaN"));
    }

    #[test]
    fn a_roster_without_user_column_is_rejected() {
        let err = Roster::from_reader("id;achiever\n1;2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, RosterError::ColumnNotFound(ref c) if c == "User"));
    }
}
