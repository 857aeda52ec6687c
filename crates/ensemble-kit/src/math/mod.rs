//! Small dense-matrix type and the numeric helpers shared by the learners.
//!
//! `Array2` is a row-major container with just enough surface for the
//! models in this crate (row slicing, row selection, column extraction).
//! `linalg` holds the least-squares solver used by the boosting weak learner.
pub mod linalg;
pub mod matrix;

pub use matrix::Array2;

/// Dot product of two equally sized slices.
pub fn dot(lhs: &[f64], rhs: &[f64]) -> f64 {
    debug_assert_eq!(lhs.len(), rhs.len(), "dot requires equal length vectors");
    lhs.iter().zip(rhs.iter()).map(|(a, b)| a * b).sum()
}

/// Squared Euclidean distance between two equally sized slices.
pub fn squared_distance(lhs: &[f64], rhs: &[f64]) -> f64 {
    debug_assert_eq!(
        lhs.len(),
        rhs.len(),
        "squared_distance requires equal length vectors"
    );
    lhs.iter()
        .zip(rhs.iter())
        .map(|(a, b)| {
            let d = a - b;
            d * d
        })
        .sum()
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
