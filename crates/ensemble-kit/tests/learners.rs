//! Integration tests for the tree, forest, boosting and margin learners.

use ensemble_kit::math::Array2;
use ensemble_kit::metrics::{accuracy, mse};
use ensemble_kit::models::decision_tree::{DecisionTree, Node};
use ensemble_kit::models::gradient_boosting::{BoostingParams, GradientBoosting};
use ensemble_kit::models::random_forest::RandomForest;
use ensemble_kit::models::svm::{MarginClassifier, SvmParams, ALPHA_CUTOFF};
use ensemble_kit::models::Model;
use ensemble_kit::EnsembleError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn separable(n: usize, seed: u64) -> (Array2<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for _ in 0..n {
        let x0: f64 = rng.gen_range(-1.0..1.0);
        let x1: f64 = rng.gen_range(-1.0..1.0);
        y.push(if x0 > 0.0 { 1.0 } else { 0.0 });
        rows.push(vec![x0, x1]);
    }
    (Array2::from_rows(rows).unwrap(), y)
}

fn noisy_xor(n: usize, seed: u64) -> (Array2<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for _ in 0..n {
        let x0: f64 = rng.gen();
        let x1: f64 = rng.gen();
        let clean = (x0 > 0.5) != (x1 > 0.5);
        let flip = rng.gen_bool(0.2);
        y.push(if clean != flip { 1.0 } else { 0.0 });
        rows.push(vec![x0, x1]);
    }
    (Array2::from_rows(rows).unwrap(), y)
}

fn max_internal_on_path(tree: &DecisionTree, id: usize) -> usize {
    match tree.node(id) {
        Node::Leaf { .. } => 0,
        Node::Internal { left, right, .. } => {
            1 + max_internal_on_path(tree, *left).max(max_internal_on_path(tree, *right))
        }
    }
}

// ---------------------------------------------------------------------------
// Decision tree
// ---------------------------------------------------------------------------

#[test]
fn tree_fits_separable_data_at_any_depth() {
    let (x, y) = separable(200, 17);
    for depth in 1..=4 {
        let tree = DecisionTree::fit(&x, &y, depth).unwrap();
        let pred = tree.predict(&x);
        assert_eq!(accuracy(&y, &pred).unwrap(), 1.0, "max_depth {}", depth);
    }
}

#[test]
fn tree_paths_respect_max_depth() {
    let (x, y) = noisy_xor(150, 3);
    for k in 0..6 {
        let tree = DecisionTree::fit(&x, &y, k).unwrap();
        assert!(max_internal_on_path(&tree, 0) <= k);
        assert_eq!(tree.depth(), max_internal_on_path(&tree, 0));
    }
}

#[test]
fn tree_rejects_malformed_input() {
    let x = Array2::from_rows(vec![vec![1.0], vec![2.0]]).unwrap();
    assert!(matches!(
        DecisionTree::fit(&x, &[1.0], 3),
        Err(EnsembleError::LabelCountMismatch { rows: 2, labels: 1 })
    ));
    let empty = Array2::from_shape_vec((0, 1), Vec::new()).unwrap();
    assert!(matches!(
        DecisionTree::fit(&empty, &[], 3),
        Err(EnsembleError::EmptyDataset)
    ));
}

// ---------------------------------------------------------------------------
// Random forest
// ---------------------------------------------------------------------------

fn variance(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64
}

#[test]
fn forest_reduces_prediction_variance() {
    let (x, y) = noisy_xor(120, 21);
    let probes = [[0.25, 0.25], [0.75, 0.25], [0.5, 0.5], [0.9, 0.9]];
    let mut rng = StdRng::seed_from_u64(1234);

    let trials = 30;
    let mut single = vec![Vec::new(); probes.len()];
    let mut bagged = vec![Vec::new(); probes.len()];
    for _ in 0..trials {
        let one = RandomForest::fit_with_rng(&x, &y, 1, 6, &mut rng).unwrap();
        let many = RandomForest::fit_with_rng(&x, &y, 25, 6, &mut rng).unwrap();
        for (p, probe) in probes.iter().enumerate() {
            single[p].push(one.predict_row(probe));
            bagged[p].push(many.predict_row(probe));
        }
    }

    let single_var: f64 = single.iter().map(|v| variance(v)).sum();
    let bagged_var: f64 = bagged.iter().map(|v| variance(v)).sum();
    assert!(
        bagged_var < single_var,
        "forest variance {} should be below single-tree variance {}",
        bagged_var,
        single_var
    );
}

#[test]
fn forest_predictions_stay_in_label_range() {
    let (x, y) = noisy_xor(80, 5);
    let mut rng = StdRng::seed_from_u64(8);
    let forest = RandomForest::fit_with_rng(&x, &y, 10, 4, &mut rng).unwrap();
    assert_eq!(forest.n_trees(), 10);
    for p in forest.predict(&x) {
        assert!((0.0..=1.0).contains(&p));
    }
}

// ---------------------------------------------------------------------------
// Gradient boosting
// ---------------------------------------------------------------------------

#[test]
fn boosting_training_error_is_non_increasing() {
    let rows: Vec<Vec<f64>> = (0..40)
        .map(|i| {
            let t = i as f64 / 4.0;
            vec![t, (t * 1.3).sin()]
        })
        .collect();
    let y: Vec<f64> = rows.iter().map(|r| 1.0 + 0.5 * r[0] - 2.0 * r[1] + (r[0] * 0.7).cos()).collect();
    let x = Array2::from_rows(rows).unwrap();

    let mut previous = f64::INFINITY;
    for n in [0, 1, 2, 5, 10, 20, 40] {
        let params = BoostingParams {
            learning_rate: 0.3,
            n_estimators: n,
        };
        let model = GradientBoosting::fit(&x, &y, &params).unwrap();
        assert_eq!(model.n_estimators(), n);
        let err = mse(&y, &model.predict(&x)).unwrap();
        assert!(err <= previous + 1e-9, "n_estimators {}: {} > {}", n, err, previous);
        previous = err;
    }
}

// ---------------------------------------------------------------------------
// Margin classifier
// ---------------------------------------------------------------------------

#[test]
fn margin_classifier_keeps_bounded_support_set() {
    let (x, y) = separable(60, 2);
    for params in [SvmParams::default(), SvmParams::with_kernel("rbf".parse().unwrap())] {
        let model = MarginClassifier::fit(&x, &y, &params).unwrap();
        assert!(model.support_vectors().len() <= x.nrows());
        for sv in model.support_vectors() {
            assert!(sv.alpha > ALPHA_CUTOFF);
            assert!(sv.label == 1.0 || sv.label == -1.0);
        }
        for row in x.rows() {
            let class = model.predict_class(row);
            assert!(class == 1.0 || class == -1.0);
        }
    }
}
