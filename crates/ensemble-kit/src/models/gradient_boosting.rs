//! Residual-fitting boosting with linear weak learners.
//!
//! Starting from an all-zero prediction, every round fits a
//! `LinearRegression` to the current residuals and adds it, damped by the
//! learning rate. Labels are plain reals; thresholding a score into a class
//! is the caller's job.
use crate::error::Result;
use crate::math::Array2;
use crate::models::check_training_set;
use crate::models::linear::LinearRegression;
use crate::models::model_trait::Model;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostingParams {
    pub learning_rate: f64,
    pub n_estimators: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            n_estimators: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GradientBoosting {
    learners: Vec<LinearRegression>,
    learning_rate: f64,
}

impl GradientBoosting {
    pub fn fit(x: &Array2<f64>, y: &[f64], params: &BoostingParams) -> Result<Self> {
        check_training_set(x, y)?;

        let mut running = vec![0.0; y.len()];
        let mut learners = Vec::with_capacity(params.n_estimators);
        for round in 0..params.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&running).map(|(t, p)| t - p).collect();
            let learner = LinearRegression::fit(x, &residuals)?;
            for (pred, row) in running.iter_mut().zip(x.rows()) {
                *pred += params.learning_rate * learner.predict_row(row);
            }
            learners.push(learner);

            if log::log_enabled!(log::Level::Debug) {
                let mse = y
                    .iter()
                    .zip(&running)
                    .map(|(t, p)| (t - p) * (t - p))
                    .sum::<f64>()
                    / y.len() as f64;
                log::debug!("Boosting round {}/{}: train MSE {:.6}", round + 1, params.n_estimators, mse);
            }
        }

        log::info!(
            "Trained gradient boosting with {} rounds (learning_rate {}) on {} rows",
            learners.len(),
            params.learning_rate,
            x.nrows()
        );
        Ok(GradientBoosting {
            learners,
            learning_rate: params.learning_rate,
        })
    }

    pub fn learners(&self) -> &[LinearRegression] {
        &self.learners
    }

    pub fn n_estimators(&self) -> usize {
        self.learners.len()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Score after each boosting round, in training order.
    pub fn staged_predict_row(&self, row: &[f64]) -> Vec<f64> {
        let mut acc = 0.0;
        self.learners
            .iter()
            .map(|learner| {
                acc += self.learning_rate * learner.predict_row(row);
                acc
            })
            .collect()
    }
}

impl Model for GradientBoosting {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.learners
            .iter()
            .fold(0.0, |acc, learner| acc + self.learning_rate * learner.predict_row(row))
    }

    fn name(&self) -> &str {
        "gradient_boosting"
    }
}
