//! Labeled examples and datasets.
//!
//! A `Dataset` is an ordered list of immutable `Example`s sharing one
//! feature arity. Labels are either numeric or categorical; the learners
//! consume numeric labels only, categorical labels go through
//! `models::classification::LabelEncoder` first.
use std::collections::BTreeMap;
use std::fmt;

use ordered_float::OrderedFloat;

use crate::error::{EnsembleError, Result};
use crate::math::Array2;

/// Example label. Totally ordered so it can key class counts and groups;
/// numeric labels sort before categorical ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Numeric(OrderedFloat<f64>),
    Category(String),
}

impl Label {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Label::Numeric(v) => Some(v.into_inner()),
            Label::Category(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Label::Numeric(_))
    }
}

impl From<f64> for Label {
    fn from(value: f64) -> Self {
        Label::Numeric(OrderedFloat(value))
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Category(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Category(value)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Numeric(v) => write!(f, "{}", v),
            Label::Category(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    features: Vec<f64>,
    label: Label,
}

impl Example {
    pub fn new(features: Vec<f64>, label: impl Into<Label>) -> Self {
        Example {
            features,
            label: label.into(),
        }
    }

    pub fn features(&self) -> &[f64] {
        &self.features
    }

    pub fn label(&self) -> &Label {
        &self.label
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    examples: Vec<Example>,
    n_features: usize,
}

impl Dataset {
    /// Build a dataset, checking that every example has the arity of the first.
    pub fn new(examples: Vec<Example>) -> Result<Self> {
        let n_features = examples.first().map(|e| e.features.len()).unwrap_or(0);
        for (row, example) in examples.iter().enumerate() {
            if example.features.len() != n_features {
                return Err(EnsembleError::FeatureArityMismatch {
                    row,
                    expected: n_features,
                    found: example.features.len(),
                });
            }
        }
        Ok(Dataset {
            examples,
            n_features,
        })
    }

    /// Pair up a feature matrix with a label list.
    pub fn from_parts<L: Into<Label>>(x: &Array2<f64>, labels: Vec<L>) -> Result<Self> {
        if x.nrows() != labels.len() {
            return Err(EnsembleError::LabelCountMismatch {
                rows: x.nrows(),
                labels: labels.len(),
            });
        }
        let examples = x
            .rows()
            .zip(labels)
            .map(|(row, label)| Example::new(row.to_vec(), label))
            .collect();
        Ok(Dataset {
            examples,
            n_features: x.ncols(),
        })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Subset by index, preserving the given order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            examples: indices.iter().map(|&i| self.examples[i].clone()).collect(),
            n_features: self.n_features,
        }
    }

    pub fn feature_matrix(&self) -> Array2<f64> {
        let data = self
            .examples
            .iter()
            .flat_map(|e| e.features.iter().copied())
            .collect();
        Array2::from_raw(self.examples.len(), self.n_features, data)
    }

    pub fn labels(&self) -> Vec<Label> {
        self.examples.iter().map(|e| e.label.clone()).collect()
    }

    /// Labels as numbers; fails on the first categorical label.
    pub fn numeric_labels(&self) -> Result<Vec<f64>> {
        self.examples
            .iter()
            .map(|e| e.label.as_f64().ok_or(EnsembleError::NonNumericLabel))
            .collect()
    }

    /// Count of examples per distinct label, in label order.
    pub fn class_counts(&self) -> BTreeMap<Label, usize> {
        let mut counts = BTreeMap::new();
        for example in &self.examples {
            *counts.entry(example.label.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn log_summary(&self) {
        log::info!(
            "Dataset: {} examples, {} features, {} distinct labels",
            self.len(),
            self.n_features,
            self.class_counts().len()
        );
    }
}
