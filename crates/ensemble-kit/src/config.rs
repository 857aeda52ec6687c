use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EnsembleError;

/// Ratios and seed for the train/validation/test partition.
///
/// Ratios are taken as given; they are not renormalized to sum to one.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    pub train_ratio: f64,
    pub validation_ratio: f64,
    pub test_ratio: f64,
    pub random_seed: u64,
    pub stratified: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.7,
            validation_ratio: 0.15,
            test_ratio: 0.15,
            random_seed: 42,
            stratified: false,
        }
    }
}

impl SplitConfig {
    pub fn new(train_ratio: f64, validation_ratio: f64, test_ratio: f64, random_seed: u64) -> Self {
        Self {
            train_ratio,
            validation_ratio,
            test_ratio,
            random_seed,
            stratified: false,
        }
    }

    pub fn stratified(mut self, stratified: bool) -> Self {
        self.stratified = stratified;
        self
    }
}

/// Margin classifier kernel.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    #[default]
    Linear,
    Rbf,
}

impl FromStr for Kernel {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Kernel::Linear),
            "rbf" | "gauss" => Ok(Kernel::Rbf),
            _ => Err(EnsembleError::UnknownKernel(s.to_string())),
        }
    }
}

/// Whether labels are used as regression targets or decoded back into classes.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Regression,
    #[default]
    Classification,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    DecisionTree {
        max_depth: usize,
    },
    RandomForest {
        n_estimators: usize,
        max_depth: usize,
        #[serde(default)]
        seed: Option<u64>,
    },
    GradientBoosting {
        learning_rate: f64,
        n_estimators: usize,
    },
    Svm {
        kernel: Kernel,
        max_iterations: usize,
        gamma: f64,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::RandomForest {
            n_estimators: 10,
            max_depth: 5,
            seed: None,
        }
    }
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::DecisionTree { .. } => "decision_tree",
            ModelType::RandomForest { .. } => "random_forest",
            ModelType::GradientBoosting { .. } => "gradient_boosting",
            ModelType::Svm { .. } => "svm",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelType {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "decision_tree" | "tree" => Ok(ModelType::DecisionTree { max_depth: 5 }),
            "random_forest" | "forest" => Ok(ModelType::default()),
            "gradient_boosting" | "gbm" => Ok(ModelType::GradientBoosting {
                learning_rate: 0.1,
                n_estimators: 100,
            }),
            "svm" => Ok(ModelType::Svm {
                kernel: Kernel::Linear,
                max_iterations: 100,
                gamma: 1.0,
            }),
            _ => Err(EnsembleError::UnknownModelType(s.to_string())),
        }
    }
}

/// Central configuration for one trainable model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct ModelConfig {
    #[serde(default)]
    pub task: Task,

    #[serde(flatten)]
    pub model_type: ModelType,
}

impl ModelConfig {
    pub fn new(task: Task, model_type: ModelType) -> Self {
        Self { task, model_type }
    }
}
