use crate::math::Array2;

/// Uniform prediction contract shared by every trained model.
///
/// Models are produced by their own `fit` constructors and are read-only
/// afterwards; there is no retraining through this trait. Predictions are
/// plain numbers: class semantics (rounding, sign) are applied by
/// `models::classification` or by the caller.
pub trait Model: Send + Sync {
    /// Predict a single feature vector.
    ///
    /// `row` must have at least as many features as the training rows;
    /// a shorter row is a caller error and may panic.
    fn predict_row(&self, row: &[f64]) -> f64;

    /// Predict every row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Vec<f64> {
        x.rows().map(|row| self.predict_row(row)).collect()
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "model"
    }
}
