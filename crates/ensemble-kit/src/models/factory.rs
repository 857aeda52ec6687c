use std::sync::Arc;

use crate::config::{ModelConfig, ModelType};
use crate::error::Result;
use crate::math::Array2;
use crate::models::decision_tree::DecisionTree;
use crate::models::gradient_boosting::{BoostingParams, GradientBoosting};
use crate::models::model_trait::Model;
use crate::models::random_forest::{ForestParams, RandomForest};
use crate::models::svm::{MarginClassifier, SvmParams};

/// Train the model described by `config` on numeric targets `y`.
///
/// Every model kind goes through the same entry point and comes back as a
/// shared, read-only handle. `config.task` does not change training; it tells
/// the caller whether to decode scores through a `LabelEncoder`.
pub fn train_model(config: &ModelConfig, x: &Array2<f64>, y: &[f64]) -> Result<Arc<dyn Model>> {
    log::debug!("Training {} for {:?}", config.model_type, config.task);
    let model: Arc<dyn Model> = match config.model_type {
        ModelType::DecisionTree { max_depth } => Arc::new(DecisionTree::fit(x, y, max_depth)?),
        ModelType::RandomForest {
            n_estimators,
            max_depth,
            seed,
        } => Arc::new(RandomForest::fit(
            x,
            y,
            &ForestParams {
                n_estimators,
                max_depth,
                seed,
            },
        )?),
        ModelType::GradientBoosting {
            learning_rate,
            n_estimators,
        } => Arc::new(GradientBoosting::fit(
            x,
            y,
            &BoostingParams {
                learning_rate,
                n_estimators,
            },
        )?),
        ModelType::Svm {
            kernel,
            max_iterations,
            gamma,
        } => Arc::new(MarginClassifier::fit(
            x,
            y,
            &SvmParams {
                kernel,
                max_iterations,
                gamma,
                ..SvmParams::default()
            },
        )?),
    };
    Ok(model)
}
