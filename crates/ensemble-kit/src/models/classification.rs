//! Boundary between labels and numeric model scores.
//!
//! Learners only see numbers. A `LabelEncoder` maps labels to the numeric
//! targets a learner expects and decodes scores back into labels; a
//! `Classifier` pairs a trained model with the encoder it was trained under.
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{EnsembleError, Result};
use crate::data_handling::Label;
use crate::models::model_trait::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Codes `0..k-1` in label sort order; decode rounds and clamps.
    Ordinal,
    /// Exactly two classes: first is `-1`, second is `+1`; decode by sign.
    Signed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<Label>,
    encoding: Encoding,
}

impl LabelEncoder {
    pub fn fit(labels: &[Label], encoding: Encoding) -> Result<Self> {
        if labels.is_empty() {
            return Err(EnsembleError::EmptyDataset);
        }
        let classes: Vec<Label> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if encoding == Encoding::Signed && classes.len() != 2 {
            return Err(EnsembleError::NotBinary(classes.len()));
        }
        log::debug!("Label encoder fitted on {} classes ({:?})", classes.len(), encoding);
        Ok(LabelEncoder { classes, encoding })
    }

    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn encode(&self, label: &Label) -> Result<f64> {
        let idx = self
            .classes
            .binary_search(label)
            .map_err(|_| EnsembleError::UnknownLabel(label.to_string()))?;
        Ok(match self.encoding {
            Encoding::Ordinal => idx as f64,
            Encoding::Signed => {
                if idx == 0 {
                    -1.0
                } else {
                    1.0
                }
            }
        })
    }

    pub fn transform(&self, labels: &[Label]) -> Result<Vec<f64>> {
        labels.iter().map(|l| self.encode(l)).collect()
    }

    pub fn decode(&self, score: f64) -> &Label {
        let last = self.classes.len() - 1;
        let idx = match self.encoding {
            Encoding::Ordinal => {
                if score.is_nan() {
                    0
                } else {
                    score.round().clamp(0.0, last as f64) as usize
                }
            }
            Encoding::Signed => usize::from(score > 0.0),
        };
        &self.classes[idx]
    }
}

/// A trained model that answers in labels.
#[derive(Clone)]
pub struct Classifier {
    model: Arc<dyn Model>,
    encoder: LabelEncoder,
}

impl Classifier {
    pub fn new(model: Arc<dyn Model>, encoder: LabelEncoder) -> Self {
        Classifier { model, encoder }
    }

    pub fn model(&self) -> &Arc<dyn Model> {
        &self.model
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    pub fn predict_label(&self, row: &[f64]) -> Label {
        self.encoder.decode(self.model.predict_row(row)).clone()
    }

    pub fn predict_labels<'a, I>(&self, rows: I) -> Vec<Label>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        rows.into_iter().map(|row| self.predict_label(row)).collect()
    }
}
