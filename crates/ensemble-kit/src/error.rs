use thiserror::Error;

/// Errors raised by training entry points, the combiner and the label encoder.
#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    LabelCountMismatch { rows: usize, labels: usize },
    #[error("row {row} has {found} features, expected {expected}")]
    FeatureArityMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid shape ({rows}, {cols}) for buffer of length {len}")]
    Shape { rows: usize, cols: usize, len: usize },
    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),
    #[error("no models registered in the ensemble")]
    EmptyEnsemble,
    #[error("ensemble weights sum to zero")]
    ZeroTotalWeight,
    #[error("ensemble weight must be finite and non-negative, got {0}")]
    InvalidWeight(f64),
    #[error("expected numeric labels, found a categorical label")]
    NonNumericLabel,
    #[error("label {0} was not seen when the encoder was fitted")]
    UnknownLabel(String),
    #[error("signed encoding needs exactly two classes, found {0}")]
    NotBinary(usize),
    #[error("length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("unknown model type: {0}")]
    UnknownModelType(String),
    #[error("unknown kernel: {0}. Valid options are: linear, rbf")]
    UnknownKernel(String),
}

pub type Result<T> = std::result::Result<T, EnsembleError>;
