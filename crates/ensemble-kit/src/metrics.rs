//! Evaluation metrics for classifiers and regressors.
//!
//! Classification metrics are generic over the label type so they work on
//! decoded `Label`s as well as on raw numeric classes. Every metric checks
//! that both inputs have the same, non-zero length.
use crate::error::{EnsembleError, Result};

fn check_pair<T, U>(truth: &[T], predicted: &[U]) -> Result<()> {
    if truth.is_empty() {
        return Err(EnsembleError::EmptyDataset);
    }
    if truth.len() != predicted.len() {
        return Err(EnsembleError::LengthMismatch {
            expected: truth.len(),
            found: predicted.len(),
        });
    }
    Ok(())
}

/// Confusion counts for one positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BinaryCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_negative: usize,
}

impl BinaryCounts {
    pub fn from_labels<T: PartialEq>(truth: &[T], predicted: &[T], positive: &T) -> Result<Self> {
        check_pair(truth, predicted)?;
        let mut counts = BinaryCounts::default();
        for (t, p) in truth.iter().zip(predicted) {
            match (t == positive, p == positive) {
                (true, true) => counts.true_positive += 1,
                (false, true) => counts.false_positive += 1,
                (true, false) => counts.false_negative += 1,
                (false, false) => counts.true_negative += 1,
            }
        }
        Ok(counts)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Fraction of predictions equal to the truth.
pub fn accuracy<T: PartialEq>(truth: &[T], predicted: &[T]) -> Result<f64> {
    check_pair(truth, predicted)?;
    let hits = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    Ok(ratio(hits, truth.len()))
}

/// Precision for `positive`; 0 when nothing was predicted positive.
pub fn precision<T: PartialEq>(truth: &[T], predicted: &[T], positive: &T) -> Result<f64> {
    let c = BinaryCounts::from_labels(truth, predicted, positive)?;
    Ok(ratio(c.true_positive, c.true_positive + c.false_positive))
}

/// Recall for `positive`; 0 when the truth has no positives.
pub fn recall<T: PartialEq>(truth: &[T], predicted: &[T], positive: &T) -> Result<f64> {
    let c = BinaryCounts::from_labels(truth, predicted, positive)?;
    Ok(ratio(c.true_positive, c.true_positive + c.false_negative))
}

/// Harmonic mean of precision and recall for `positive`.
///
/// # Arguments
///
/// * `truth` - Ground-truth labels.
/// * `predicted` - Predicted labels, same length as `truth`.
/// * `positive` - The class treated as positive.
///
/// # Returns
///
/// The F1 score, or 0 when precision and recall are both 0.
pub fn f1<T: PartialEq>(truth: &[T], predicted: &[T], positive: &T) -> Result<f64> {
    let c = BinaryCounts::from_labels(truth, predicted, positive)?;
    let p = ratio(c.true_positive, c.true_positive + c.false_positive);
    let r = ratio(c.true_positive, c.true_positive + c.false_negative);
    if p + r == 0.0 {
        Ok(0.0)
    } else {
        Ok(2.0 * p * r / (p + r))
    }
}

pub fn mae(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(truth, predicted)?;
    let sum: f64 = truth.iter().zip(predicted).map(|(t, p)| (t - p).abs()).sum();
    Ok(sum / truth.len() as f64)
}

pub fn mse(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(truth, predicted)?;
    let sum: f64 = truth.iter().zip(predicted).map(|(t, p)| (t - p) * (t - p)).sum();
    Ok(sum / truth.len() as f64)
}

pub fn rmse(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    mse(truth, predicted).map(f64::sqrt)
}

/// Coefficient of determination. A constant truth vector yields 1 for an
/// exact fit and 0 otherwise.
pub fn r2(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(truth, predicted)?;
    let mean = crate::math::mean(truth).unwrap_or(0.0);
    let ss_res: f64 = truth.iter().zip(predicted).map(|(t, p)| (t - p) * (t - p)).sum();
    let ss_tot: f64 = truth.iter().map(|t| (t - mean) * (t - mean)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}
