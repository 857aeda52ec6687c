//! Weighted combination of already-trained models.
//!
//! The combined score for a row is `sum(w_i * p_i) / sum(w_i)`, so weights
//! are renormalized on every call and need not sum to one. Members are held
//! behind `Arc` and are never retrained or mutated.
use std::sync::Arc;

use crate::error::{EnsembleError, Result};
use crate::math::Array2;
use crate::models::model_trait::Model;

#[derive(Clone, Default)]
pub struct WeightedEnsemble {
    members: Vec<(Arc<dyn Model>, f64)>,
}

impl std::fmt::Debug for WeightedEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.members.iter().map(|(m, w)| (m.name().to_string(), *w)))
            .finish()
    }
}

impl WeightedEnsemble {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model. Weights must be finite and non-negative.
    pub fn add_model(&mut self, model: Arc<dyn Model>, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(EnsembleError::InvalidWeight(weight));
        }
        log::debug!("Ensemble: added {} with weight {}", model.name(), weight);
        self.members.push((model, weight));
        Ok(())
    }

    pub fn with_model(mut self, model: Arc<dyn Model>, weight: f64) -> Result<Self> {
        self.add_model(model, weight)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.members.iter().map(|(_, w)| *w).collect()
    }

    fn total_weight(&self) -> Result<f64> {
        if self.members.is_empty() {
            return Err(EnsembleError::EmptyEnsemble);
        }
        let total: f64 = self.members.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Err(EnsembleError::ZeroTotalWeight);
        }
        Ok(total)
    }

    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        let total = self.total_weight()?;
        let weighted: f64 = self
            .members
            .iter()
            .map(|(model, w)| w * model.predict_row(row))
            .sum();
        Ok(weighted / total)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let total = self.total_weight()?;
        Ok(x.rows()
            .map(|row| {
                self.members
                    .iter()
                    .map(|(model, w)| w * model.predict_row(row))
                    .sum::<f64>()
                    / total
            })
            .collect())
    }
}
