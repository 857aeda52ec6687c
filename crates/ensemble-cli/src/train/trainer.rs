use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use ensemble_kit::config::{ModelConfig, ModelType, Task};
use ensemble_kit::data_handling::Dataset;
use ensemble_kit::io::{read_csv_dataset, CsvReaderConfig};
use ensemble_kit::metrics;
use ensemble_kit::models::classification::{Encoding, LabelEncoder};
use ensemble_kit::models::ensemble::WeightedEnsemble;
use ensemble_kit::models::factory::train_model;
use ensemble_kit::models::Model;
use ensemble_kit::preprocessing::{fit_scaler, transform_all};
use ensemble_kit::split::split_dataset;

use crate::train::input::TrainConfig;
use crate::util::delimiter_for_path;

/// Metrics for one partition. Classification fills the label metrics,
/// regression the error metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scores {
    pub n: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recall: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mae: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r2: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub validation: Option<Scores>,
    pub test: Option<Scores>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub task: Task,
    pub n_train: usize,
    pub n_validation: usize,
    pub n_test: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    pub members: Vec<ModelReport>,
    pub ensemble: ModelReport,
}

/// How numeric scores map back to the dataset's labels.
enum Target {
    Regression,
    Classification(LabelEncoder),
}

impl Target {
    fn for_task(task: Task, dataset: &Dataset, models: &[ModelType]) -> Result<Self> {
        match task {
            Task::Regression => Ok(Target::Regression),
            Task::Classification => {
                let labels = dataset.labels();
                let n_classes = dataset.class_counts().len();
                let encoding = if n_classes == 2 {
                    Encoding::Signed
                } else {
                    Encoding::Ordinal
                };
                if n_classes > 2 && models.iter().any(|m| matches!(m, ModelType::Svm { .. })) {
                    log::warn!(
                        "The margin classifier is binary; with {} classes it only separates the first two",
                        n_classes
                    );
                }
                let encoder = LabelEncoder::fit(&labels, encoding)
                    .context("Failed to encode labels")?;
                Ok(Target::Classification(encoder))
            }
        }
    }

    fn encode(&self, dataset: &Dataset) -> Result<Vec<f64>> {
        match self {
            Target::Regression => dataset
                .numeric_labels()
                .context("Regression needs numeric labels"),
            Target::Classification(encoder) => Ok(encoder.transform(&dataset.labels())?),
        }
    }

    fn score(&self, predictions: &[f64], part: &Dataset) -> Result<Option<Scores>> {
        if part.is_empty() {
            return Ok(None);
        }
        let mut scores = Scores {
            n: part.len(),
            ..Scores::default()
        };
        match self {
            Target::Regression => {
                let truth = part.numeric_labels()?;
                scores.mae = Some(metrics::mae(&truth, predictions)?);
                scores.mse = Some(metrics::mse(&truth, predictions)?);
                scores.rmse = Some(metrics::rmse(&truth, predictions)?);
                scores.r2 = Some(metrics::r2(&truth, predictions)?);
            }
            Target::Classification(encoder) => {
                let truth = part.labels();
                let predicted: Vec<_> = predictions.iter().map(|&s| encoder.decode(s).clone()).collect();
                scores.accuracy = Some(metrics::accuracy(&truth, &predicted)?);
                if encoder.encoding() == Encoding::Signed {
                    let positive = &encoder.classes()[1];
                    scores.precision = Some(metrics::precision(&truth, &predicted, positive)?);
                    scores.recall = Some(metrics::recall(&truth, &predicted, positive)?);
                    scores.f1 = Some(metrics::f1(&truth, &predicted, positive)?);
                }
            }
        }
        Ok(Some(scores))
    }
}

fn log_scores(name: &str, partition: &str, scores: &Option<Scores>) {
    match scores {
        Some(s) => match (s.accuracy, s.rmse) {
            (Some(acc), _) => log::info!("{} {} accuracy: {:.4} (n={})", name, partition, acc, s.n),
            (_, Some(rmse)) => log::info!("{} {} rmse: {:.4} (n={})", name, partition, rmse, s.n),
            _ => {}
        },
        None => log::info!("{} {}: empty partition", name, partition),
    }
}

/// Load data, split, train every configured member, combine them and
/// evaluate members and ensemble on the held-out partitions.
pub fn run_training(config: &TrainConfig) -> Result<TrainReport> {
    let delimiter = match config.delimiter {
        Some(c) => u8::try_from(c).context("Delimiter must be a single-byte character")?,
        None => delimiter_for_path(&config.data),
    };
    let reader_config = CsvReaderConfig {
        label_column: config.label_column.clone(),
        delimiter,
        feature_columns: None,
    };
    let data = read_csv_dataset(&config.data, &reader_config)?;
    data.dataset.log_summary();

    let split = split_dataset(&data.dataset, &config.split);
    let (n_train, n_validation, n_test) = split.sizes();
    log::info!(
        "Split sizes: train {}, validation {}, test {}",
        n_train,
        n_validation,
        n_test
    );
    if split.train.is_empty() {
        anyhow::bail!("Training partition is empty; raise train_ratio or provide more rows");
    }

    let mut x_train = split.train.feature_matrix();
    let mut x_validation = split.validation.feature_matrix();
    let mut x_test = split.test.feature_matrix();
    if config.scale_features {
        let scaler = fit_scaler(&x_train)?;
        x_train = transform_all(&x_train, &scaler)?;
        x_validation = transform_all(&x_validation, &scaler)?;
        x_test = transform_all(&x_test, &scaler)?;
        log::debug!("Standardized features using training-partition statistics");
    }

    let model_types: Vec<ModelType> = config.models.iter().map(|m| m.model.clone()).collect();
    let target = Target::for_task(config.task, &data.dataset, &model_types)?;
    let y_train = target.encode(&split.train)?;

    let mut ensemble = WeightedEnsemble::new();
    let mut members = Vec::with_capacity(config.models.len());
    for member in &config.models {
        let model_config = ModelConfig::new(config.task, member.model.clone());
        let model: Arc<dyn Model> = train_model(&model_config, &x_train, &y_train)
            .with_context(|| format!("Failed to train {}", member.model))?;
        ensemble.add_model(Arc::clone(&model), member.weight)?;

        let report = ModelReport {
            name: model.name().to_string(),
            weight: Some(member.weight),
            validation: target.score(&model.predict(&x_validation), &split.validation)?,
            test: target.score(&model.predict(&x_test), &split.test)?,
        };
        log_scores(&report.name, "validation", &report.validation);
        log_scores(&report.name, "test", &report.test);
        members.push(report);
    }

    let ensemble_report = ModelReport {
        name: "ensemble".to_string(),
        weight: None,
        validation: target.score(&ensemble.predict(&x_validation)?, &split.validation)?,
        test: target.score(&ensemble.predict(&x_test)?, &split.test)?,
    };
    log_scores("ensemble", "validation", &ensemble_report.validation);
    log_scores("ensemble", "test", &ensemble_report.test);

    let classes = match &target {
        Target::Classification(encoder) => encoder.classes().iter().map(|c| c.to_string()).collect(),
        Target::Regression => Vec::new(),
    };

    Ok(TrainReport {
        task: config.task,
        n_train,
        n_validation,
        n_test,
        classes,
        members,
        ensemble: ensemble_report,
    })
}
