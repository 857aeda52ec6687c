//! Bootstrap-aggregated decision trees.
//!
//! Each tree is fitted on its own bootstrap resample (N draws with
//! replacement from N rows). Predictions are the arithmetic mean of the
//! per-tree predictions, so the forest stays numeric; rounding to a class
//! is left to the caller. Every split considers every feature: there is no
//! per-split feature subsampling.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{EnsembleError, Result};
use crate::math::Array2;
use crate::models::check_training_set;
use crate::models::decision_tree::DecisionTree;
use crate::models::model_trait::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    /// Seed for bootstrap resampling; `None` draws from the thread-local generator.
    pub seed: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 10,
            max_depth: 5,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

/// Draw `n` row indices uniformly with replacement.
pub fn bootstrap_indices<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

impl RandomForest {
    pub fn fit(x: &Array2<f64>, y: &[f64], params: &ForestParams) -> Result<Self> {
        match params.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                Self::fit_with_rng(x, y, params.n_estimators, params.max_depth, &mut rng)
            }
            None => {
                let mut rng = rand::thread_rng();
                Self::fit_with_rng(x, y, params.n_estimators, params.max_depth, &mut rng)
            }
        }
    }

    /// Fit with an injected generator, for reproducible forests.
    pub fn fit_with_rng<R: Rng>(
        x: &Array2<f64>,
        y: &[f64],
        n_estimators: usize,
        max_depth: usize,
        rng: &mut R,
    ) -> Result<Self> {
        check_training_set(x, y)?;
        if n_estimators == 0 {
            return Err(EnsembleError::InvalidHyperparameter(
                "random forest needs at least one estimator".to_string(),
            ));
        }

        let mut trees = Vec::with_capacity(n_estimators);
        for t in 0..n_estimators {
            let sample = bootstrap_indices(x.nrows(), rng);
            let tree = DecisionTree::fit_on(x, y, sample, max_depth);
            log::debug!(
                "Forest tree {}/{}: {} nodes, depth {}",
                t + 1,
                n_estimators,
                tree.nodes().len(),
                tree.depth()
            );
            trees.push(tree);
        }

        log::info!(
            "Trained random forest with {} trees (max_depth {}) on {} rows",
            trees.len(),
            max_depth,
            x.nrows()
        );
        Ok(RandomForest { trees })
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Individual tree predictions for one row.
    pub fn tree_predictions(&self, row: &[f64]) -> Vec<f64> {
        self.trees.iter().map(|t| t.predict_row(row)).collect()
    }
}

impl Model for RandomForest {
    fn predict_row(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}
