pub mod classification;
pub mod decision_tree;
pub mod ensemble;
pub mod factory;
pub mod gradient_boosting;
pub mod linear;
pub mod model_trait;
pub mod random_forest;
pub mod svm;

pub use model_trait::Model;

use crate::error::{EnsembleError, Result};
use crate::math::Array2;

/// Entry-point validation shared by every `fit`: a non-empty matrix and one
/// label per row. Arity is already enforced by `Array2` construction.
pub(crate) fn check_training_set(x: &Array2<f64>, y: &[f64]) -> Result<()> {
    if x.nrows() == 0 {
        return Err(EnsembleError::EmptyDataset);
    }
    if x.nrows() != y.len() {
        return Err(EnsembleError::LabelCountMismatch {
            rows: x.nrows(),
            labels: y.len(),
        });
    }
    Ok(())
}
