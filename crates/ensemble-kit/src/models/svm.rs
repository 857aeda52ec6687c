//! Heuristic kernel margin classifier.
//!
//! Not a quadratic-program solver: one dual weight (alpha) per training
//! example is nudged by a fixed step whenever that example's error exceeds a
//! tolerance, for a fixed number of passes, and clamped to `[0, 1]`. There is
//! no guarantee of a maximal margin or of convergence. The bias starts at 0
//! and is not updated.
//!
//! Labels follow the `{-1, +1}` convention: any label `> 0` is treated as
//! `+1`, everything else as `-1`.
use crate::config::Kernel;
use crate::error::Result;
use crate::math::{dot, squared_distance, Array2};
use crate::models::check_training_set;
use crate::models::model_trait::Model;

/// Examples with alpha above this are kept as support vectors.
pub const ALPHA_CUTOFF: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvmParams {
    pub kernel: Kernel,
    /// Number of full passes over the training set.
    pub max_iterations: usize,
    /// RBF width; unused by the linear kernel.
    pub gamma: f64,
    /// Errors at or below this magnitude leave alpha untouched.
    pub tolerance: f64,
    /// Alpha step per update.
    pub step: f64,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            kernel: Kernel::Linear,
            max_iterations: 100,
            gamma: 1.0,
            tolerance: 0.1,
            step: 0.01,
        }
    }
}

impl SvmParams {
    pub fn with_kernel(kernel: Kernel) -> Self {
        Self {
            kernel,
            ..Self::default()
        }
    }
}

fn kernel_value(kernel: Kernel, gamma: f64, a: &[f64], b: &[f64]) -> f64 {
    match kernel {
        Kernel::Linear => dot(a, b),
        Kernel::Rbf => (-gamma * squared_distance(a, b)).exp(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupportVector {
    pub features: Vec<f64>,
    pub label: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone)]
pub struct MarginClassifier {
    support_vectors: Vec<SupportVector>,
    bias: f64,
    kernel: Kernel,
    gamma: f64,
}

/// Map an arbitrary numeric label to the `{-1, +1}` convention.
pub fn signed_label(label: f64) -> f64 {
    if label > 0.0 {
        1.0
    } else {
        -1.0
    }
}

impl MarginClassifier {
    pub fn fit(x: &Array2<f64>, y: &[f64], params: &SvmParams) -> Result<Self> {
        check_training_set(x, y)?;
        let labels: Vec<f64> = y.iter().map(|&v| signed_label(v)).collect();
        let n = x.nrows();
        let bias = 0.0;
        let mut alphas = vec![0.0f64; n];

        let kernel = |i: usize, j: usize| {
            kernel_value(params.kernel, params.gamma, x.row_slice(i), x.row_slice(j))
        };

        for pass in 0..params.max_iterations {
            let mut updates = 0usize;
            for i in 0..n {
                let margin = bias
                    + (0..n)
                        .filter(|&j| alphas[j] != 0.0)
                        .map(|j| alphas[j] * labels[j] * kernel(j, i))
                        .sum::<f64>();
                let error = labels[i] - margin;
                if error.abs() > params.tolerance {
                    alphas[i] = (alphas[i] + params.step * labels[i] * error).clamp(0.0, 1.0);
                    updates += 1;
                }
            }
            log::debug!(
                "Margin classifier pass {}/{}: {} alpha updates",
                pass + 1,
                params.max_iterations,
                updates
            );
        }

        let support_vectors: Vec<SupportVector> = (0..n)
            .filter(|&i| alphas[i] > ALPHA_CUTOFF)
            .map(|i| SupportVector {
                features: x.row_slice(i).to_vec(),
                label: labels[i],
                alpha: alphas[i],
            })
            .collect();

        log::info!(
            "Trained margin classifier ({:?} kernel): {} support vectors out of {} examples",
            params.kernel,
            support_vectors.len(),
            n
        );
        Ok(MarginClassifier {
            support_vectors,
            bias,
            kernel: params.kernel,
            gamma: params.gamma,
        })
    }

    pub fn support_vectors(&self) -> &[SupportVector] {
        &self.support_vectors
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// `+1` when the decision value is positive, otherwise `-1`.
    pub fn predict_class(&self, row: &[f64]) -> f64 {
        signed_label(self.predict_row(row))
    }
}

impl Model for MarginClassifier {
    /// Raw decision value `bias + sum(alpha_i * y_i * k(row, sv_i))`.
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.bias
            + self
                .support_vectors
                .iter()
                .map(|sv| sv.alpha * sv.label * kernel_value(self.kernel, self.gamma, row, &sv.features))
                .sum::<f64>()
    }

    fn name(&self) -> &str {
        "svm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirrored_pairs() -> (Array2<f64>, Vec<f64>) {
        let rows = vec![
            vec![0.5, 0.5],
            vec![-0.5, -0.5],
            vec![0.4, 0.6],
            vec![-0.4, -0.6],
        ];
        (Array2::from_rows(rows).unwrap(), vec![1.0, 0.0, 1.0, 0.0])
    }

    #[test]
    fn no_passes_keeps_no_support_vectors() {
        let (x, y) = mirrored_pairs();
        let params = SvmParams {
            max_iterations: 0,
            ..SvmParams::default()
        };
        let model = MarginClassifier::fit(&x, &y, &params).unwrap();
        assert!(model.support_vectors().is_empty());
        assert_eq!(model.predict_row(&[1.0, 1.0]), 0.0);
    }

    #[test]
    fn linear_kernel_separates_mirrored_pairs() {
        let (x, y) = mirrored_pairs();
        let model = MarginClassifier::fit(&x, &y, &SvmParams::default()).unwrap();
        assert_eq!(model.support_vectors().len(), 4);
        for sv in model.support_vectors() {
            assert!(sv.alpha > ALPHA_CUTOFF && sv.alpha <= 1.0);
        }
        assert_eq!(model.bias(), 0.0);
        for (row, &label) in x.rows().zip(&y) {
            assert_eq!(model.predict_class(row), signed_label(label));
        }
    }

    #[test]
    fn rbf_kernel_classifies_training_points() {
        let (x, y) = mirrored_pairs();
        let params = SvmParams::with_kernel(Kernel::Rbf);
        let model = MarginClassifier::fit(&x, &y, &params).unwrap();
        assert_eq!(model.kernel(), Kernel::Rbf);
        assert!(model.support_vectors().len() <= x.nrows());
        for (row, &label) in x.rows().zip(&y) {
            assert_eq!(model.predict_class(row), signed_label(label));
        }
    }

    #[test]
    fn rbf_kernel_is_bounded() {
        let a = [0.0, 0.0];
        assert_eq!(kernel_value(Kernel::Rbf, 1.0, &a, &a), 1.0);
        let far = kernel_value(Kernel::Rbf, 1.0, &a, &[3.0, 4.0]);
        assert!((far - (-25.0f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn zero_and_one_labels_map_to_signs() {
        assert_eq!(signed_label(0.0), -1.0);
        assert_eq!(signed_label(1.0), 1.0);
        assert_eq!(signed_label(-3.0), -1.0);
    }
}
