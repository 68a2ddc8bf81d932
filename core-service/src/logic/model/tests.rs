//! Engine lifecycle tests

use std::fs;
use std::sync::Arc;

use super::classifier::PerformanceCategory;
use super::dataset::TrainingSample;
use super::error::TrainingError;
use super::inference::{predict_rule_based, PredictionEngine};
use super::rules::rule_based_score;
use super::storage::ModelStorage;
use super::types::{EngineMode, PredictionMethod};
use crate::logic::features::FeatureVector;

fn engine_in(dir: &std::path::Path) -> PredictionEngine {
    PredictionEngine::load(ModelStorage::new(dir))
}

/// Labels follow the rule-based formula so the fit is near-perfect
fn synthetic_dataset() -> Vec<TrainingSample> {
    (0..60u32)
        .map(|i| {
            let features = FeatureVector::new(
                35.0 + f64::from(i * 7 % 60),
                50.0 + f64::from(i * 11 % 50),
                15.0 + f64::from(i * 13 % 35),
                4.0 + f64::from(i * 3 % 16),
                i % 4,
                (i / 4) % 3,
            );
            TrainingSample::new(features, rule_based_score(&features))
        })
        .collect()
}

fn probe_inputs() -> Vec<FeatureVector> {
    let mut inputs = Vec::new();
    for marks in [0.0, 33.3, 50.0, 75.0, 100.0] {
        for attendance in [0.0, 60.0, 100.0] {
            for (internal, assignment) in [(0.0, 0.0), (25.0, 10.0), (50.0, 20.0)] {
                for (certs, comps) in [(0, 0), (2, 1), (10, 10)] {
                    inputs.push(FeatureVector::new(marks, attendance, internal, assignment, certs, comps));
                }
            }
        }
    }
    inputs
}

#[test]
fn test_untrained_engine_uses_rules() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());
    assert_eq!(engine.mode(), EngineMode::Untrained);

    let result = engine.predict(&FeatureVector::new(80.0, 90.0, 40.0, 18.0, 2, 1));
    assert_eq!(result.score, 76.3);
    assert_eq!(result.category, PerformanceCategory::GoodPerformance);
    assert_eq!(result.method, PredictionMethod::RuleBased);
    assert_eq!(result.features.certifications, 2);
}

#[test]
fn test_at_risk_boundary_case() {
    let result = predict_rule_based(&FeatureVector::new(50.0, 50.0, 25.0, 10.0, 0, 0));
    assert_eq!(result.score, 45.0);
    assert_eq!(result.category, PerformanceCategory::AtRiskPerformance);
}

#[test]
fn test_train_switches_to_trained_mode() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let report = engine.train(&synthetic_dataset()).unwrap();
    assert_eq!(report.samples, 60);
    assert_eq!(report.coefficients.len(), 6);
    assert!(report.r_squared > 0.99, "r² = {}", report.r_squared);

    assert_eq!(engine.mode(), EngineMode::Trained);
    assert!(engine.storage().exists());

    let result = engine.predict(&FeatureVector::new(80.0, 90.0, 40.0, 18.0, 2, 1));
    assert_eq!(result.method, PredictionMethod::Trained);
    assert!((result.score - 76.3).abs() < 2.0, "score = {}", result.score);
}

#[test]
fn test_reload_restores_persisted_model() {
    let dir = tempfile::tempdir().unwrap();
    let trainer = engine_in(dir.path());
    trainer.train(&synthetic_dataset()).unwrap();

    let restarted = engine_in(dir.path());
    assert_eq!(restarted.mode(), EngineMode::Trained);
    assert_eq!(
        restarted.current_model().unwrap().metadata.training_id,
        trainer.current_model().unwrap().metadata.training_id
    );

    for input in probe_inputs() {
        assert_eq!(restarted.predict(&input), trainer.predict(&input));
    }
}

#[test]
fn test_corrupted_model_falls_back_to_rules() {
    let dir = tempfile::tempdir().unwrap();
    engine_in(dir.path()).train(&synthetic_dataset()).unwrap();

    let storage = ModelStorage::new(dir.path());
    fs::write(storage.model_path(), b"{\"checksum\": \"deadbeef\", \"payload\": 42}").unwrap();

    let engine = engine_in(dir.path());
    assert_eq!(engine.mode(), EngineMode::Untrained);

    for input in probe_inputs() {
        let result = engine.predict(&input);
        assert_eq!(result, predict_rule_based(&input));
        assert!((0.0..=100.0).contains(&result.score));
    }
}

#[test]
fn test_train_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());
    let data = synthetic_dataset();
    let probe = FeatureVector::new(68.0, 74.0, 31.0, 13.0, 1, 2);

    let first = engine.train(&data).unwrap();
    let before = engine.predict(&probe);
    let second = engine.train(&data).unwrap();
    let after = engine.predict(&probe);

    assert_ne!(first.training_id, second.training_id);
    for (a, b) in first.coefficients.iter().zip(second.coefficients.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
    assert!((first.intercept - second.intercept).abs() < 1e-9);
    assert_eq!(before.score, after.score);
    assert_eq!(before.category, after.category);
}

#[test]
fn test_failed_training_keeps_prior_model() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());
    engine.train(&synthetic_dataset()).unwrap();
    let training_id = engine.current_model().unwrap().metadata.training_id;

    assert!(matches!(engine.train(&[]), Err(TrainingError::EmptyDataset)));
    assert!(matches!(
        engine.train_from_csv(&dir.path().join("missing.csv")),
        Err(TrainingError::Io(_))
    ));

    assert_eq!(engine.mode(), EngineMode::Trained);
    assert_eq!(engine.current_model().unwrap().metadata.training_id, training_id);
    assert_eq!(engine_in(dir.path()).current_model().unwrap().metadata.training_id, training_id);
}

#[test]
fn test_failed_training_from_cold_start_stays_untrained() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let bad = vec![TrainingSample::new(FeatureVector::new(80.0, 90.0, 40.0, 18.0, 0, 0), 140.0)];
    assert!(engine.train(&bad).is_err());
    assert_eq!(engine.mode(), EngineMode::Untrained);
    assert!(!engine.storage().exists());
}

#[test]
fn test_train_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("training_data.csv");

    let mut csv = String::from(
        "marks_obtained,attendance_percentage,internal_marks,assignment_score,certifications,competitions,performance_score\n",
    );
    for sample in synthetic_dataset() {
        let f = sample.features;
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            f.marks_obtained,
            f.attendance_percentage,
            f.internal_marks,
            f.assignment_score,
            f.certifications,
            f.competitions,
            sample.performance_score
        ));
    }
    fs::write(&path, csv).unwrap();

    let engine = engine_in(&dir.path().join("model"));
    let report = engine.train_from_csv(&path).unwrap();
    assert_eq!(report.samples, 60);
    assert!(engine.is_trained());
}

#[test]
fn test_stale_model_degrades_then_stays_rule_based() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());
    engine.train(&synthetic_dataset()).unwrap();

    let mut stale = (*engine.current_model().unwrap()).clone();
    stale.regression.coefficients.truncate(4);
    engine.install(stale);

    let input = FeatureVector::new(80.0, 90.0, 40.0, 18.0, 2, 1);
    let first = engine.predict(&input);
    assert_eq!(first, predict_rule_based(&input));
    assert_eq!(engine.mode(), EngineMode::FallingBack);

    let second = engine.predict(&input);
    assert_eq!(second.method, PredictionMethod::RuleBased);

    let status = engine.status();
    assert_eq!(status.degraded_count, 1);
    assert_eq!(status.rule_based_count, 2);
    assert!(!status.model_loaded);

    assert!(engine.reload());
    assert_eq!(engine.mode(), EngineMode::Trained);
    assert_eq!(engine.predict(&input).method, PredictionMethod::Trained);
}

#[test]
fn test_trained_scores_are_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());
    engine.train(&synthetic_dataset()).unwrap();
    let base = (*engine.current_model().unwrap()).clone();

    let mut high = base.clone();
    high.regression.intercept = 500.0;
    engine.install(high);
    for input in probe_inputs() {
        let result = engine.predict(&input);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.category, PerformanceCategory::GoodPerformance);
    }

    let mut low = base;
    low.regression.intercept = -500.0;
    engine.install(low);
    for input in probe_inputs() {
        let result = engine.predict(&input);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.category, PerformanceCategory::AtRiskPerformance);
    }
}

#[test]
fn test_range_and_category_invariants_both_modes() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());

    let check = |engine: &PredictionEngine| {
        for input in probe_inputs() {
            let result = engine.predict(&input);
            assert!((0.0..=100.0).contains(&result.score));
            assert_eq!(result.category, super::classify(result.score));
            assert_eq!(result.score, (result.score * 100.0).round_ties_even() / 100.0);
        }
    };

    check(&engine);
    engine.train(&synthetic_dataset()).unwrap();
    check(&engine);
}

#[test]
fn test_predict_during_training() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(engine_in(dir.path()));
    engine.train(&synthetic_dataset()).unwrap();
    let data = synthetic_dataset();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for input in probe_inputs() {
                    let result = engine.predict(&input);
                    assert_eq!(result.method, PredictionMethod::Trained);
                    assert!((0.0..=100.0).contains(&result.score));
                }
            });
        }

        for _ in 0..3 {
            engine.train(&data).unwrap();
        }
    });

    let status = engine.status();
    assert_eq!(status.degraded_count, 0);
    assert_eq!(status.prediction_count, status.trained_count);
}

#[test]
fn test_reload_during_training_keeps_model() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(dir.path());
    engine.train(&synthetic_dataset()).unwrap();
    let data = synthetic_dataset();

    for _ in 0..20 {
        let dropped = std::thread::scope(|scope| {
            let reloader = scope.spawn(|| (0..25).filter(|_| !engine.reload()).count());
            engine.train(&data).unwrap();
            reloader.join().unwrap()
        });

        assert_eq!(dropped, 0);
        assert_eq!(engine.mode(), EngineMode::Trained);
    }

    // whatever reload ran last, the installed model matches the persisted one
    let persisted = engine.storage().load().unwrap();
    assert_eq!(
        engine.current_model().unwrap().metadata.training_id,
        persisted.metadata.training_id
    );
}
