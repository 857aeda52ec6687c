use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ensemble_kit::config::SplitConfig;
use ensemble_kit::io::{read_csv_dataset, write_csv_dataset, CsvReaderConfig};
use ensemble_kit::split::split_dataset;

use crate::util::{delimiter_for_path, validate_tsv_or_csv_file};

/// Files written by `run_split`, in train/validation/test order.
#[derive(Debug, Clone)]
pub struct SplitOutput {
    pub paths: [PathBuf; 3],
    pub sizes: (usize, usize, usize),
}

/// Split a delimited file into `train.csv`, `validation.csv` and `test.csv`
/// under `out_dir`.
pub fn run_split(
    data: &str,
    label_column: &str,
    out_dir: &Path,
    config: &SplitConfig,
) -> Result<SplitOutput> {
    validate_tsv_or_csv_file(data)?;
    let reader_config = CsvReaderConfig {
        label_column: label_column.to_string(),
        delimiter: delimiter_for_path(data),
        feature_columns: None,
    };
    let input = read_csv_dataset(data, &reader_config)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let split = split_dataset(&input.dataset, config);
    let paths = [
        out_dir.join("train.csv"),
        out_dir.join("validation.csv"),
        out_dir.join("test.csv"),
    ];
    for (path, part) in paths.iter().zip([&split.train, &split.validation, &split.test]) {
        write_csv_dataset(path, part, &input.feature_names, &input.label_column)?;
        log::info!("Wrote {} rows to {}", part.len(), path.display());
    }

    Ok(SplitOutput {
        paths,
        sizes: split.sizes(),
    })
}
