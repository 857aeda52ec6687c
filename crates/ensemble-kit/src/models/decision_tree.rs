//! Gini-impurity decision tree over numeric labels.
//!
//! Nodes live in a flat arena (`Vec<Node>`) with children referenced by
//! index; the root is always node 0. A node becomes a leaf when the depth
//! limit is reached, its partition is pure, or no candidate threshold
//! lowers the impurity. Leaves predict the majority label; ties go to the
//! smallest label value.
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use crate::error::Result;
use crate::math::Array2;
use crate::models::model_trait::Model;
use crate::models::check_training_set;

/// Prediction of a leaf built over an empty partition. Never produced by a
/// well-formed fit since both sides of a split are non-empty.
pub const EMPTY_LEAF_PREDICTION: f64 = 0.0;

/// A split must beat the parent impurity by more than this.
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf {
        prediction: f64,
    },
    Internal {
        feature_index: usize,
        threshold: f64,
        left: NodeId,
        right: NodeId,
    },
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    max_depth: usize,
    n_features: usize,
}

/// Gini impurity of a label multiset, `1 - sum(p_c^2)`; 0 for an empty slice.
pub fn gini_impurity(labels: &[f64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let mut counts: BTreeMap<OrderedFloat<f64>, usize> = BTreeMap::new();
    for &label in labels {
        *counts.entry(OrderedFloat(label)).or_insert(0) += 1;
    }
    let counts: Vec<usize> = counts.into_values().collect();
    gini_from_counts(&counts, labels.len())
}

/// Size-weighted impurity of a two-way split.
pub fn weighted_gini(left: &[f64], right: &[f64]) -> f64 {
    let total = left.len() + right.len();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    (left.len() as f64 / n) * gini_impurity(left) + (right.len() as f64 / n) * gini_impurity(right)
}

fn gini_from_counts(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

struct Split {
    feature_index: usize,
    threshold: f64,
    impurity: f64,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    /// Dense class id per training row.
    class_of: Vec<usize>,
    /// Distinct label values, ascending; indexed by class id.
    classes: Vec<f64>,
    max_depth: usize,
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn new(x: &'a Array2<f64>, y: &[f64], max_depth: usize) -> Self {
        let mut ids: BTreeMap<OrderedFloat<f64>, usize> = BTreeMap::new();
        for &label in y {
            ids.entry(OrderedFloat(label)).or_insert(0);
        }
        let classes: Vec<f64> = ids.keys().map(|k| k.into_inner()).collect();
        for (id, slot) in ids.values_mut().enumerate() {
            *slot = id;
        }
        let class_of = y.iter().map(|&label| ids[&OrderedFloat(label)]).collect();
        TreeBuilder {
            x,
            class_of,
            classes,
            max_depth,
            nodes: Vec::new(),
        }
    }

    fn counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &i in indices {
            counts[self.class_of[i]] += 1;
        }
        counts
    }

    /// Majority label; the first maximum in ascending label order wins.
    fn majority(&self, counts: &[usize]) -> f64 {
        let mut best: Option<(usize, usize)> = None;
        for (class, &count) in counts.iter().enumerate() {
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((class, count));
            }
        }
        best.map_or(EMPTY_LEAF_PREDICTION, |(class, _)| self.classes[class])
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn build(&mut self, indices: Vec<usize>, depth: usize) -> NodeId {
        if indices.is_empty() {
            log::warn!("Decision tree reached an empty partition at depth {}", depth);
            return self.push(Node::Leaf {
                prediction: EMPTY_LEAF_PREDICTION,
            });
        }

        let counts = self.counts(&indices);
        let prediction = self.majority(&counts);
        let distinct = counts.iter().filter(|&&c| c > 0).count();
        if depth >= self.max_depth || distinct <= 1 {
            return self.push(Node::Leaf { prediction });
        }

        let parent = gini_from_counts(&counts, indices.len());
        let split = match self.best_split(&indices, &counts) {
            Some(split) if split.impurity < parent - MIN_IMPURITY_DECREASE => split,
            _ => return self.push(Node::Leaf { prediction }),
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x[(i, split.feature_index)] <= split.threshold);

        // reserve the slot so the parent precedes its children
        let id = self.push(Node::Leaf { prediction });
        let left = self.build(left, depth + 1);
        let right = self.build(right, depth + 1);
        self.nodes[id] = Node::Internal {
            feature_index: split.feature_index,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    /// Scan every feature and every midpoint between consecutive distinct
    /// values, keeping the first split with the lowest weighted impurity.
    fn best_split(&self, indices: &[usize], counts: &[usize]) -> Option<Split> {
        let n = indices.len();
        let mut best: Option<Split> = None;
        let mut sorted = indices.to_vec();

        for feature_index in 0..self.x.ncols() {
            let value = |i: usize| self.x[(i, feature_index)];
            sorted.sort_by(|&a, &b| value(a).total_cmp(&value(b)));

            let mut left = vec![0usize; counts.len()];
            let mut right = counts.to_vec();
            for pos in 0..n - 1 {
                let class = self.class_of[sorted[pos]];
                left[class] += 1;
                right[class] -= 1;

                let (lo, hi) = (value(sorted[pos]), value(sorted[pos + 1]));
                if !(lo < hi) {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                let impurity = (n_left as f64 / n as f64) * gini_from_counts(&left, n_left)
                    + (n_right as f64 / n as f64) * gini_from_counts(&right, n_right);

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    let mid = lo + (hi - lo) / 2.0;
                    // adjacent floats can round the midpoint up to `hi`
                    let threshold = if mid < hi { mid } else { lo };
                    best = Some(Split {
                        feature_index,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

impl DecisionTree {
    /// Train a tree on every row of `x`.
    pub fn fit(x: &Array2<f64>, y: &[f64], max_depth: usize) -> Result<Self> {
        check_training_set(x, y)?;
        Ok(Self::fit_on(x, y, (0..x.nrows()).collect(), max_depth))
    }

    /// Train on the rows named by `indices` (repeats allowed). Inputs are
    /// assumed validated by the caller.
    pub(crate) fn fit_on(x: &Array2<f64>, y: &[f64], indices: Vec<usize>, max_depth: usize) -> Self {
        let mut builder = TreeBuilder::new(x, y, max_depth);
        builder.build(indices, 0);
        DecisionTree {
            nodes: builder.nodes,
            max_depth,
            n_features: x.ncols(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Largest number of internal nodes on any root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            match &self.nodes[id] {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Internal { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        deepest
    }
}

impl Model for DecisionTree {
    fn predict_row(&self, row: &[f64]) -> f64 {
        debug_assert!(
            row.len() >= self.n_features,
            "row has {} features, tree was trained on {}",
            row.len(),
            self.n_features
        );
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { prediction } => return *prediction,
                Node::Internal {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature_index] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}
