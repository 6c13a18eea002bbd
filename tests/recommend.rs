use gamaffinity::affinity::{AffinityError, ModelFolder, affinity_vector};
use gamaffinity::combine::{BlendWeights, CombineError, combine_affinities};
use gamaffinity::matrix::MatrixError;
use gamaffinity::pipeline::{DataLayout, RecommendError, Recommender};
use gamaffinity::predict::{ObjectiveWeights, PredictError};
use gamaffinity::config::RecommenderConfig;
use gamaffinity::types::{AffinityVector, Element, ModelKind, Profile};
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

mod common;
use common::write_data_dir;

fn scenario_profile() -> Profile {
    Profile::from_pairs([
        ("achiever", 4.0),
        ("player", 2.0),
        ("socialiser", 3.0),
        ("freeSpirit", 1.0),
        ("disruptor", 0.0),
        ("philanthropist", 5.0),
    ])
}

fn assert_descending(vector: &AffinityVector) {
    for pair in vector.rows().windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "{} ({}) ranked above {} ({})",
            pair[0].element,
            pair[0].score,
            pair[1].element,
            pair[1].score
        );
    }
}

#[test]
fn hexad_scenario_returns_six_ranked_finite_rows() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());
    let folder = ModelFolder::new(dir.path().join("Hexad"));

    let vector = affinity_vector(
        &folder,
        &scenario_profile(),
        0.1,
        &ObjectiveWeights::default(),
    )
    .unwrap();

    assert_eq!(vector.len(), 6);
    assert_descending(&vector);
    let elements: BTreeSet<Element> = vector.iter().map(|row| row.element).collect();
    assert_eq!(elements, BTreeSet::from(Element::ALL));
    for row in vector.iter() {
        assert!(row.prediction.is_finite(), "{} has a non-finite prediction", row.element);
        assert!(row.score.is_finite());
    }
}

#[test]
fn repeated_builds_are_bit_identical() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());
    let folder = ModelFolder::new(dir.path().join("Hexad"));
    let profile = scenario_profile();
    let weights = ObjectiveWeights::default();

    let first = affinity_vector(&folder, &profile, 0.1, &weights).unwrap();
    for _ in 0..10 {
        let again = affinity_vector(&folder, &profile, 0.1, &weights).unwrap();
        assert_eq!(again.len(), first.len());
        for (a, b) in first.iter().zip(again.iter()) {
            assert_eq!(a.element, b.element);
            assert_eq!(a.score.to_bits(), b.score.to_bits());
            assert_eq!(a.prediction.mi_var.to_bits(), b.prediction.mi_var.to_bits());
            assert_eq!(a.prediction.me_var.to_bits(), b.prediction.me_var.to_bits());
            assert_eq!(a.prediction.amot_var.to_bits(), b.prediction.amot_var.to_bits());
        }
    }
}

#[test]
fn a_motivation_profile_against_a_hexad_folder_fails_with_no_common_variables() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());
    let folder = ModelFolder::new(dir.path().join("Hexad"));
    let profile = Profile::from_pairs([("MI", 5.0), ("ME", 3.0), ("amotI", 1.5)]);

    let err = affinity_vector(&folder, &profile, 0.1, &ObjectiveWeights::default()).unwrap_err();
    match err {
        AffinityError::Predict {
            element,
            source: PredictError::NoCommonVariables { .. },
            ..
        } => assert_eq!(element, Element::Avatar),
        other => panic!("Expected NoCommonVariables, got {other:?}"),
    }
}

#[test]
fn a_mislabelled_pvalue_table_aborts_the_build() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());
    let hexad = dir.path().join("Hexad");
    fs::write(
        hexad.join("timerpVals.csv"),
        ";achiever;player;socialiser;freeSpirit;disruptor\nMIVar;0;0;0;0;0\nMEVar;0;0;0;0;0\namotVar;0;0;0;0;0\n",
    )
    .unwrap();

    let err = affinity_vector(
        &ModelFolder::new(&hexad),
        &scenario_profile(),
        0.1,
        &ObjectiveWeights::default(),
    )
    .unwrap_err();
    match err {
        AffinityError::Matrix {
            element,
            source: MatrixError::MissingFromPValues { label, .. },
            ..
        } => {
            assert_eq!(element, Element::Timer);
            assert_eq!(label, "philanthropist");
        }
        other => panic!("Expected MissingFromPValues, got {other:?}"),
    }
}

#[test]
fn combining_covers_the_whole_catalog() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());
    let layout = DataLayout::new(dir.path());
    let weights = ObjectiveWeights::default();

    let hexad = affinity_vector(
        &layout.model_folder(ModelKind::Hexad),
        &scenario_profile(),
        0.1,
        &weights,
    )
    .unwrap();
    let motivation = affinity_vector(
        &layout.model_folder(ModelKind::Motivation),
        &Profile::from_pairs([("MI", 5.0), ("ME", 3.0), ("amotI", 1.5)]),
        0.1,
        &weights,
    )
    .unwrap();

    let combined = combine_affinities(&hexad, &motivation, &BlendWeights::default()).unwrap();
    assert_eq!(combined.len(), 6);
    let elements: BTreeSet<Element> = combined.iter().map(|row| row.element).collect();
    assert_eq!(elements, BTreeSet::from(Element::ALL));
    for pair in combined.rows().windows(2) {
        assert!(pair[0].score_final >= pair[1].score_final);
    }
    for row in combined.iter() {
        assert!((0.0..=1.0).contains(&row.s_hexad));
        assert!((0.0..=1.0).contains(&row.s_motiv));
    }

    let truncated = AffinityVector::from_results(hexad.rows()[..5].to_vec());
    let err = combine_affinities(&truncated, &motivation, &BlendWeights::default()).unwrap_err();
    assert!(matches!(
        err,
        CombineError::MissingElement {
            missing_from: ModelKind::Hexad,
            ..
        }
    ));
}

#[test]
fn full_request_recommends_and_exports() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());
    let layout = DataLayout::new(dir.path());
    let recommender = Recommender::new(RecommenderConfig::default()).unwrap();

    let recommendation = recommender.recommend(&layout, "elevebf01").unwrap();
    let best = recommendation.combined.best().unwrap();
    assert_eq!(recommendation.final_element(), Some(best.element));
    assert_eq!(recommendation.hexad.len(), 6);
    assert_eq!(recommendation.motivation.len(), 6);

    let out_dir = dir.path().join("outputs");
    let files = recommendation.export(&out_dir).unwrap();
    let combined_csv = fs::read_to_string(&files.combined).unwrap();
    let first_data_line = combined_csv.lines().nth(1).unwrap();
    assert!(first_data_line.starts_with(&format!("{},", best.element)));
    assert_eq!(fs::read_to_string(&files.hexad).unwrap().lines().count(), 7);
}

#[test]
fn unknown_student_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());
    let recommender = Recommender::new(RecommenderConfig::default()).unwrap();

    let err = recommender
        .recommend(&DataLayout::new(dir.path()), "elevebf99")
        .unwrap_err();
    assert!(matches!(err, RecommendError::Roster(_)));
    assert_eq!(err.to_string(), "Unknown student: elevebf99");
}

#[test]
fn a_nan_coefficient_fails_the_request_instead_of_winning_it() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());
    fs::write(
        dir.path().join("Hexad").join("timerPathCoefs.csv"),
        ";achiever;player;socialiser;freeSpirit;disruptor;philanthropist\n\
         MIVar;NaN;0;0;0;0;0\nMEVar;0;0;0;0;0;0\namotVar;0;0;0;0;0;0\n",
    )
    .unwrap();
    let recommender = Recommender::new(RecommenderConfig::default()).unwrap();

    let err = recommender
        .recommend(&DataLayout::new(dir.path()), "elevebf01")
        .unwrap_err();
    match err {
        RecommendError::Affinity {
            model: ModelKind::Hexad,
            source:
                AffinityError::Matrix {
                    element,
                    source: MatrixError::MalformedCell { row, value, .. },
                    ..
                },
        } => {
            assert_eq!(element, Element::Timer);
            assert_eq!(row, "MIVar");
            assert_eq!(value, "NaN");
        }
        other => panic!("Expected MalformedCell for timer, got {other:?}"),
    }
}
