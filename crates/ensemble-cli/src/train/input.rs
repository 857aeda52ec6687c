use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use ensemble_kit::config::{ModelType, SplitConfig, Task};

use crate::util::validate_tsv_or_csv_file;

/// One weighted member of the trained ensemble.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnsembleMember {
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub model: ModelType,
}

fn default_weight() -> f64 {
    1.0
}

/// Parameters for `ensemble train`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
    pub data: String,
    pub label_column: String,
    /// Field delimiter; inferred from the file extension when absent.
    pub delimiter: Option<char>,
    pub split: SplitConfig,
    pub task: Task,
    pub scale_features: bool,
    pub models: Vec<EnsembleMember>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data: String::new(),
            label_column: "label".to_string(),
            delimiter: None,
            split: SplitConfig::default(),
            task: Task::Classification,
            scale_features: false,
            models: vec![
                EnsembleMember {
                    weight: 1.0,
                    model: ModelType::RandomForest {
                        n_estimators: 10,
                        max_depth: 5,
                        seed: Some(42),
                    },
                },
                EnsembleMember {
                    weight: 1.0,
                    model: ModelType::GradientBoosting {
                        learning_rate: 0.1,
                        n_estimators: 100,
                    },
                },
            ],
        }
    }
}

/// Load a training configuration from a JSON file.
pub fn load_train_config<P: AsRef<Path>>(path: P) -> Result<TrainConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: TrainConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

impl TrainConfig {
    /// Apply command-line overrides on top of a loaded (or default) config.
    pub fn apply_overrides(&mut self, matches: &ArgMatches) -> Result<()> {
        if let Some(data) = matches.get_one::<String>("data") {
            self.data = data.clone();
        }

        if let Some(label_column) = matches.get_one::<String>("label_column") {
            self.label_column = label_column.clone();
        }

        if let Some(model_type) = matches.get_one::<String>("model_type") {
            let model = ModelType::from_str(model_type)?;
            self.models = vec![EnsembleMember { weight: 1.0, model }];
        }

        if let Some(&seed) = matches.get_one::<u64>("seed") {
            self.set_seed(seed);
        }

        if self.data.is_empty() {
            anyhow::bail!("No data file given; set \"data\" in the config or pass --data");
        }
        validate_tsv_or_csv_file(&self.data)?;
        if self.models.is_empty() {
            anyhow::bail!("No models configured; add at least one entry to \"models\"");
        }
        Ok(())
    }

    /// Reseed the split and every seeded forest.
    pub fn set_seed(&mut self, seed: u64) {
        self.split.random_seed = seed;
        for member in &mut self.models {
            if let ModelType::RandomForest { seed: forest_seed, .. } = &mut member.model {
                *forest_seed = Some(seed);
            }
        }
    }
}
