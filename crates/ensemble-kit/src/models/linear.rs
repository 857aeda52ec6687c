use crate::error::Result;
use crate::math::linalg::least_squares_with_bias;
use crate::math::{dot, Array2};
use crate::models::check_training_set;
use crate::models::model_trait::Model;

/// Tiny ridge on the weight diagonal; keeps collinear features solvable.
const RIDGE: f64 = 1e-10;

/// Closed-form least-squares regressor with an intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegression {
    pub fn fit(x: &Array2<f64>, y: &[f64]) -> Result<Self> {
        check_training_set(x, y)?;
        let (beta, dropped) = least_squares_with_bias(x, y, RIDGE);
        if dropped > 0 {
            log::warn!(
                "Least squares dropped {} rank-deficient column(s); their weights are 0",
                dropped
            );
        }
        Ok(LinearRegression {
            intercept: beta[0],
            coefficients: beta[1..].to_vec(),
        })
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl Model for LinearRegression {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept + dot(&self.coefficients, row)
    }

    fn name(&self) -> &str {
        "linear_regression"
    }
}
