//! Feature standardization.
//!
//! A `Scaler` is fitted on the training partition only and then applied to
//! every partition, so validation and test rows never leak into the
//! statistics.

use crate::error::{EnsembleError, Result};
use crate::math::Array2;

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    pub const MIN_STD: f64 = 1e-9;

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}

/// Fit a `Scaler` where rows are samples and columns are features.
pub fn fit_scaler(x: &Array2<f64>) -> Result<Scaler> {
    let (nrows, ncols) = x.shape();
    if nrows == 0 {
        return Err(EnsembleError::EmptyDataset);
    }

    let mut mean = vec![0.0f64; ncols];
    for row in x.rows() {
        for (m, v) in mean.iter_mut().zip(row) {
            *m += v;
        }
    }
    let nrows_f = nrows as f64;
    for v in mean.iter_mut() {
        *v /= nrows_f;
    }

    let mut var = vec![0.0f64; ncols];
    for row in x.rows() {
        for c in 0..ncols {
            let d = row[c] - mean[c];
            var[c] += d * d;
        }
    }
    for v in var.iter_mut() {
        *v = (*v / nrows_f).sqrt().max(Scaler::MIN_STD);
    }

    Ok(Scaler { mean, std: var })
}

/// Transform all rows using the provided `Scaler`.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Result<Array2<f64>> {
    if x.ncols() != sc.mean.len() {
        return Err(EnsembleError::LengthMismatch {
            expected: sc.mean.len(),
            found: x.ncols(),
        });
    }
    let out = x.rows().flat_map(|row| sc.transform_row(row)).collect();
    Array2::from_shape_vec((x.nrows(), x.ncols()), out)
}

/// Fit a scaler and return it with the transformed matrix.
pub fn fit_transform(x: &Array2<f64>) -> Result<(Scaler, Array2<f64>)> {
    let sc = fit_scaler(x)?;
    let transformed = transform_all(x, &sc)?;
    Ok((sc, transformed))
}
