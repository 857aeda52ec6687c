//! Integration tests for the combiner, the model factory, the label boundary
//! and CSV round-trips.

use std::sync::Arc;

use ensemble_kit::config::{Kernel, ModelConfig, ModelType, SplitConfig, Task};
use ensemble_kit::data_handling::{Dataset, Example, Label};
use ensemble_kit::io::{read_csv_dataset, write_csv_dataset, CsvReaderConfig};
use ensemble_kit::math::Array2;
use ensemble_kit::metrics::accuracy;
use ensemble_kit::models::classification::{Classifier, Encoding, LabelEncoder};
use ensemble_kit::models::decision_tree::DecisionTree;
use ensemble_kit::models::ensemble::WeightedEnsemble;
use ensemble_kit::models::factory::train_model;
use ensemble_kit::models::Model;
use ensemble_kit::split::split_dataset;
use ensemble_kit::EnsembleError;

fn blobs() -> (Array2<f64>, Vec<f64>) {
    let mut rows = Vec::new();
    let mut y = Vec::new();
    for i in 0..20 {
        let t = i as f64 / 20.0;
        rows.push(vec![1.0 + t, 1.0 - t * 0.5]);
        y.push(1.0);
        rows.push(vec![-1.0 - t, -1.0 + t * 0.5]);
        y.push(0.0);
    }
    (Array2::from_rows(rows).unwrap(), y)
}

// ---------------------------------------------------------------------------
// Weighted ensemble
// ---------------------------------------------------------------------------

#[test]
fn two_identical_models_match_either_alone() {
    let (x, y) = blobs();
    let tree: Arc<dyn Model> = Arc::new(DecisionTree::fit(&x, &y, 3).unwrap());
    let ensemble = WeightedEnsemble::new()
        .with_model(Arc::clone(&tree), 1.0)
        .unwrap()
        .with_model(Arc::clone(&tree), 1.0)
        .unwrap();
    assert_eq!(ensemble.predict(&x).unwrap(), tree.predict(&x));
}

#[test]
fn heterogeneous_members_blend() {
    let (x, y) = blobs();
    let configs = [
        ModelType::DecisionTree { max_depth: 2 },
        ModelType::RandomForest {
            n_estimators: 5,
            max_depth: 3,
            seed: Some(4),
        },
        ModelType::GradientBoosting {
            learning_rate: 0.5,
            n_estimators: 10,
        },
    ];
    let mut ensemble = WeightedEnsemble::new();
    for model_type in configs {
        let model = train_model(&ModelConfig::new(Task::Regression, model_type), &x, &y).unwrap();
        ensemble.add_model(model, 1.0).unwrap();
    }
    assert_eq!(ensemble.len(), 3);
    let scores = ensemble.predict(&x).unwrap();
    let classes: Vec<f64> = scores.iter().map(|s| if *s > 0.5 { 1.0 } else { 0.0 }).collect();
    assert_eq!(accuracy(&y, &classes).unwrap(), 1.0);
}

#[test]
fn empty_ensemble_is_a_configuration_error() {
    assert!(matches!(
        WeightedEnsemble::new().predict_row(&[1.0, 2.0]),
        Err(EnsembleError::EmptyEnsemble)
    ));
}

// ---------------------------------------------------------------------------
// Factory and label boundary
// ---------------------------------------------------------------------------

#[test]
fn factory_builds_every_model_type() {
    let (x, y) = blobs();
    for name in ["tree", "forest", "gbm", "svm"] {
        let model_type: ModelType = name.parse().unwrap();
        let model = train_model(&ModelConfig::new(Task::Classification, model_type.clone()), &x, &y)
            .unwrap();
        assert_eq!(model.name(), model_type.name());
        assert_eq!(model.predict(&x).len(), x.nrows());
    }
}

#[test]
fn factory_propagates_validation_errors() {
    let (x, _) = blobs();
    let cfg = ModelConfig::default();
    assert!(matches!(
        train_model(&cfg, &x, &[1.0]),
        Err(EnsembleError::LabelCountMismatch { .. })
    ));
}

#[test]
fn categorical_labels_round_trip_through_classifier() {
    let examples: Vec<Example> = (0..30)
        .map(|i| {
            let v = i as f64;
            let label = if i < 15 { "low" } else { "high" };
            Example::new(vec![v], label)
        })
        .collect();
    let ds = Dataset::new(examples).unwrap();
    let labels = ds.labels();

    let encoder = LabelEncoder::fit(&labels, Encoding::Signed).unwrap();
    let y = encoder.transform(&labels).unwrap();
    let cfg = ModelConfig::new(
        Task::Classification,
        ModelType::Svm {
            kernel: Kernel::Linear,
            max_iterations: 100,
            gamma: 1.0,
        },
    );
    let model = train_model(&cfg, &ds.feature_matrix(), &y).unwrap();
    let clf = Classifier::new(model, encoder);
    let x = ds.feature_matrix();
    let predicted = clf.predict_labels(x.rows());
    assert_eq!(predicted.len(), labels.len());
    assert!(predicted
        .iter()
        .all(|l| *l == Label::from("low") || *l == Label::from("high")));

    let tree_cfg = ModelConfig::new(Task::Classification, ModelType::DecisionTree { max_depth: 2 });
    let tree = train_model(&tree_cfg, &x, &y).unwrap();
    let clf = Classifier::new(tree, clf.encoder().clone());
    assert_eq!(clf.predict_labels(x.rows()), labels);
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[test]
fn csv_split_and_write_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.csv");
    let mut contents = String::from("x0,x1,label\n");
    for i in 0..20 {
        contents.push_str(&format!("{},{},{}\n", i, 20 - i, if i % 4 == 0 { "yes" } else { "no" }));
    }
    std::fs::write(&input, contents).unwrap();

    let data = read_csv_dataset(&input, &CsvReaderConfig::default()).unwrap();
    assert_eq!(data.dataset.len(), 20);
    let split = split_dataset(&data.dataset, &SplitConfig::default().stratified(true));

    let out = dir.path().join("train.csv");
    write_csv_dataset(&out, &split.train, &data.feature_names, &data.label_column).unwrap();
    let reread = read_csv_dataset(&out, &CsvReaderConfig::default()).unwrap();
    assert_eq!(reread.dataset, split.train);
    assert_eq!(reread.feature_names, data.feature_names);
}
