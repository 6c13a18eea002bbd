// ========================================================================================
//
//                               THE RECOMMENDATION REQUEST
//
// ========================================================================================
//
// One request, start to finish: resolve the student, derive both profiles, build the
// Hexad and Motivation affinity vectors, and blend them. A request either yields all
// three rankings or fails as a whole; an unknown student fails before any model file
// is touched.

use crate::affinity::{AffinityError, ModelFolder, affinity_vector};
use crate::combine::{CombineError, combine_affinities};
use crate::config::{ConfigError, RecommenderConfig};
use crate::export::{ExportError, ExportedFiles, export_all};
use crate::roster::{Roster, RosterError, StudentRecord};
use crate::types::{AffinityVector, CombinedVector, Element, ModelKind, Profile};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ROSTER_FILE_NAME: &str = "userStats.csv";

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("{model} model: {source}")]
    Affinity {
        model: ModelKind,
        #[source]
        source: AffinityError,
    },
    #[error(transparent)]
    Combine(#[from] CombineError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// The on-disk arrangement of a data directory: the roster plus one folder per model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn roster_path(&self) -> PathBuf {
        self.root.join(ROSTER_FILE_NAME)
    }

    pub fn model_folder(&self, model: ModelKind) -> ModelFolder {
        ModelFolder::new(self.root.join(model.folder_name()))
    }
}

/// Everything one request produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub user: String,
    pub hexad: AffinityVector,
    pub motivation: AffinityVector,
    pub combined: CombinedVector,
}

impl Recommendation {
    /// Rank 0 of the combined ranking.
    pub fn final_element(&self) -> Option<Element> {
        self.combined.best().map(|row| row.element)
    }

    pub fn export(&self, out_dir: &Path) -> Result<ExportedFiles, ExportError> {
        export_all(
            out_dir,
            &self.user,
            &self.hexad,
            &self.motivation,
            &self.combined,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommender {
    config: RecommenderConfig,
}

impl Recommender {
    pub fn new(config: RecommenderConfig) -> Result<Self, RecommendError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Builds one model's affinity vector for `profile`.
    pub fn affinity(
        &self,
        model: ModelKind,
        folder: &ModelFolder,
        profile: &Profile,
    ) -> Result<AffinityVector, RecommendError> {
        log::info!(
            "Scoring {model} model from {} (alpha = {})",
            folder.root().display(),
            self.config.alpha
        );
        affinity_vector(folder, profile, self.config.alpha, &self.config.objective)
            .map_err(|source| RecommendError::Affinity { model, source })
    }

    /// Scores two already-derived profiles and blends the results.
    pub fn recommend_profiles(
        &self,
        user: &str,
        layout: &DataLayout,
        hexad_profile: &Profile,
        motivation_profile: &Profile,
    ) -> Result<Recommendation, RecommendError> {
        let hexad = self.affinity(
            ModelKind::Hexad,
            &layout.model_folder(ModelKind::Hexad),
            hexad_profile,
        )?;
        let motivation = self.affinity(
            ModelKind::Motivation,
            &layout.model_folder(ModelKind::Motivation),
            motivation_profile,
        )?;
        let combined = combine_affinities(&hexad, &motivation, &self.config.blend)?;

        Ok(Recommendation {
            user: user.to_string(),
            hexad,
            motivation,
            combined,
        })
    }

    pub fn recommend_record(
        &self,
        layout: &DataLayout,
        record: &StudentRecord,
    ) -> Result<Recommendation, RecommendError> {
        let hexad_profile = record.hexad_profile()?;
        let motivation_profile = record.motivation_profile()?;
        self.recommend_profiles(record.user(), layout, &hexad_profile, &motivation_profile)
    }

    /// Looks `user` up in the layout's roster and runs the full request.
    pub fn recommend(
        &self,
        layout: &DataLayout,
        user: &str,
    ) -> Result<Recommendation, RecommendError> {
        let roster = Roster::load(&layout.roster_path())?;
        let record = roster.find(user)?;
        self.recommend_record(layout, record)
    }
}
