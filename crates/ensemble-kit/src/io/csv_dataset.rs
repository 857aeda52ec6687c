//! Delimited text reader and writer for `Dataset`s.
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;

use crate::data_handling::{Dataset, Example, Label};

/// Configuration for reading a delimited file with a header row.
#[derive(Debug, Clone)]
pub struct CsvReaderConfig {
    /// Column name holding the label.
    pub label_column: String,
    pub delimiter: u8,
    /// Optional list of feature columns to load (in order).
    /// When `None`, every column except the label is a feature.
    pub feature_columns: Option<Vec<String>>,
}

impl Default for CsvReaderConfig {
    fn default() -> Self {
        Self {
            label_column: "label".to_string(),
            delimiter: b',',
            feature_columns: None,
        }
    }
}

/// Parsed file ready for splitting and training.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    pub dataset: Dataset,
    pub feature_names: Vec<String>,
    pub label_column: String,
}

/// Read a delimited file into a `Dataset`.
///
/// Labels are numeric when every value parses as `f64`, otherwise every
/// label is kept as a category.
pub fn read_csv_dataset<P: AsRef<Path>>(path: P, config: &CsvReaderConfig) -> Result<CsvDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("Failed to open dataset file: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read dataset header row")?
        .clone();

    let label_idx = find_column(&headers, &config.label_column)
        .ok_or_else(|| anyhow!("Missing label column '{}'", config.label_column))?;

    let feature_indices = resolve_feature_indices(&headers, config, label_idx)?;
    if feature_indices.is_empty() {
        return Err(anyhow!("No feature columns detected in dataset header"));
    }

    let mut rows = Vec::new();
    let mut raw_labels = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let label = record
            .get(label_idx)
            .ok_or_else(|| anyhow!("Missing label value at row {}", row_idx + 1))?;
        raw_labels.push(label.to_string());

        let mut features = Vec::with_capacity(feature_indices.len());
        for &idx in &feature_indices {
            let value = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing feature value at row {}", row_idx + 1))?;
            let parsed = value.parse::<f64>().with_context(|| {
                format!(
                    "Invalid feature '{}' at row {}",
                    headers.get(idx).unwrap_or(""),
                    row_idx + 1
                )
            })?;
            features.push(parsed);
        }
        rows.push(features);
    }

    let labels = parse_labels(raw_labels);
    let examples = rows
        .into_iter()
        .zip(labels)
        .map(|(features, label)| Example::new(features, label))
        .collect();
    let dataset = Dataset::new(examples).context("Failed to build dataset")?;

    let feature_names = feature_indices
        .iter()
        .map(|&idx| headers.get(idx).unwrap_or("").to_string())
        .collect();

    log::info!(
        "Read {} rows with {} features from {}",
        dataset.len(),
        dataset.n_features(),
        path.as_ref().display()
    );

    Ok(CsvDataset {
        dataset,
        feature_names,
        label_column: headers.get(label_idx).unwrap_or("").to_string(),
    })
}

/// Write a dataset with `feature_names` followed by `label_column` as header.
pub fn write_csv_dataset<P: AsRef<Path>>(
    path: P,
    dataset: &Dataset,
    feature_names: &[String],
    label_column: &str,
) -> Result<()> {
    if feature_names.len() != dataset.n_features() && !dataset.is_empty() {
        return Err(anyhow!(
            "Header has {} feature names but the dataset has {} features",
            feature_names.len(),
            dataset.n_features()
        ));
    }
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create dataset file: {}", path.as_ref().display()))?;

    let mut header: Vec<&str> = feature_names.iter().map(String::as_str).collect();
    header.push(label_column);
    writer.write_record(&header).context("Failed to write header")?;

    for (row_idx, example) in dataset.examples().iter().enumerate() {
        let mut record: Vec<String> = example.features().iter().map(|v| v.to_string()).collect();
        record.push(example.label().to_string());
        writer
            .write_record(&record)
            .with_context(|| format!("Failed to write row {}", row_idx + 1))?;
    }
    writer.flush().context("Failed to flush dataset file")?;
    Ok(())
}

fn parse_labels(raw: Vec<String>) -> Vec<Label> {
    let numeric: Option<Vec<f64>> = raw.iter().map(|s| s.parse::<f64>().ok()).collect();
    match numeric {
        Some(values) => values.into_iter().map(Label::from).collect(),
        None => raw.into_iter().map(Label::from).collect(),
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}

fn resolve_feature_indices(
    headers: &StringRecord,
    config: &CsvReaderConfig,
    label_idx: usize,
) -> Result<Vec<usize>> {
    if let Some(names) = &config.feature_columns {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let idx = find_column(headers, name)
                .ok_or_else(|| anyhow!("Missing feature column '{}'", name))?;
            indices.push(idx);
        }
        return Ok(indices);
    }
    Ok((0..headers.len()).filter(|&idx| idx != label_idx).collect())
}
