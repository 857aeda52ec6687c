//! Seeded train/validation/test partitioning and k-fold folds.
//!
//! All shuffling goes through one `StdRng` built from the configured seed,
//! so identical inputs and config always give identical partitions and no
//! process-wide random state is touched.
//!
//! Stratified mode groups examples by label (ascending label order) and
//! shuffles each group with the shared generator. The global partition
//! sizes are fixed first; each group then gets the floor or the ceiling of
//! its proportional share of every partition, chosen so that the group and
//! partition totals both come out exact. Each partition is the
//! concatenation of its per-group sub-slices, in group order.
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::SplitConfig;
use crate::data_handling::{Dataset, Label};

/// Absorbs binary rounding error in `n * ratio` before flooring (0.15 * 100 must give 15).
const RATIO_EPS: f64 = 1e-9;

/// Index-level result of a split.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
    pub test: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit {
    pub train: Dataset,
    pub validation: Dataset,
    pub test: Dataset,
}

impl DatasetSplit {
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.train.len(), self.validation.len(), self.test.len())
    }
}

/// One cross-validation fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

fn portion(n: usize, ratio: f64) -> usize {
    if ratio.is_nan() || ratio <= 0.0 {
        return 0;
    }
    ((n as f64 * ratio + RATIO_EPS).floor() as usize).min(n)
}

/// Partition sizes for `n` examples: floors of the train and validation
/// shares, with the test partition taking whatever is left.
pub fn partition_sizes(n: usize, config: &SplitConfig) -> (usize, usize, usize) {
    let n_train = portion(n, config.train_ratio);
    let n_validation = portion(n, config.validation_ratio).min(n - n_train);
    (n_train, n_validation, n - n_train - n_validation)
}

/// Group indices by label in ascending label order, shuffling each group.
fn shuffled_groups(labels: &[Label], rng: &mut StdRng) -> Vec<Vec<usize>> {
    let mut groups: BTreeMap<&Label, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(idx);
    }
    groups
        .into_values()
        .map(|mut members| {
            members.shuffle(rng);
            members
        })
        .collect()
}

/// Per-group counts for each window, `counts[g][w]`.
///
/// Each count is the floor or the ceiling of `n_g * sizes[w] / n`; a group's
/// counts add up to its size and a window's counts add up to `sizes[w]`.
/// Floors are assigned first, then each group's leftover units are placed
/// along augmenting paths, trying windows with the largest remainder first.
fn allocate(group_sizes: &[usize], sizes: &[usize]) -> Vec<Vec<usize>> {
    let n: usize = group_sizes.iter().sum();
    debug_assert_eq!(sizes.iter().sum::<usize>(), n);
    let mut counts = vec![vec![0usize; sizes.len()]; group_sizes.len()];
    if n == 0 {
        return counts;
    }

    let mut open = sizes.to_vec();
    let mut candidates = Vec::with_capacity(group_sizes.len());
    let mut missing = Vec::with_capacity(group_sizes.len());
    for (g, &n_g) in group_sizes.iter().enumerate() {
        let mut remainders = Vec::new();
        for (w, &size) in sizes.iter().enumerate() {
            let share = n_g as u128 * size as u128;
            let floor = (share / n as u128) as usize;
            counts[g][w] = floor;
            open[w] = open[w].saturating_sub(floor);
            let remainder = share % n as u128;
            if remainder > 0 {
                remainders.push((remainder, w));
            }
        }
        remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        candidates.push(remainders.into_iter().map(|(_, w)| w).collect::<Vec<_>>());
        missing.push(n_g - counts[g].iter().sum::<usize>());
    }

    let mut bumped = vec![vec![false; sizes.len()]; group_sizes.len()];
    for g in 0..group_sizes.len() {
        for _ in 0..missing[g] {
            let mut visited = vec![false; sizes.len()];
            if !augment(g, &candidates, &mut bumped, &mut open, &mut visited) {
                // only reachable when `sizes` does not add up to the group total
                if let Some(w) = open.iter().position(|&o| o > 0) {
                    open[w] -= 1;
                    counts[g][w] += 1;
                }
            }
        }
    }
    for (row, extra) in counts.iter_mut().zip(&bumped) {
        for (count, &bump) in row.iter_mut().zip(extra) {
            *count += usize::from(bump);
        }
    }
    counts
}

/// Find a window for one more unit of group `g`, moving another group's
/// extra unit to a different window when that frees a slot.
fn augment(
    g: usize,
    candidates: &[Vec<usize>],
    bumped: &mut [Vec<bool>],
    open: &mut [usize],
    visited: &mut [bool],
) -> bool {
    for &w in &candidates[g] {
        if bumped[g][w] || visited[w] {
            continue;
        }
        visited[w] = true;
        if open[w] > 0 {
            open[w] -= 1;
            bumped[g][w] = true;
            return true;
        }
        for h in 0..bumped.len() {
            if h != g && bumped[h][w] && augment(h, candidates, bumped, open, visited) {
                bumped[h][w] = false;
                bumped[g][w] = true;
                return true;
            }
        }
    }
    false
}

/// Slice every shuffled group by its allocated counts and concatenate the
/// slices of each window in group order.
fn cut_groups(groups: &[Vec<usize>], sizes: &[usize]) -> Vec<Vec<usize>> {
    let group_sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
    let counts = allocate(&group_sizes, sizes);
    let mut windows: Vec<Vec<usize>> = sizes.iter().map(|&s| Vec::with_capacity(s)).collect();
    for (members, row) in groups.iter().zip(&counts) {
        let mut start = 0;
        for (window, &count) in windows.iter_mut().zip(row) {
            window.extend_from_slice(&members[start..start + count]);
            start += count;
        }
    }
    windows
}

/// Compute split indices for `n` examples. `labels` is only consulted when
/// `config.stratified` is set.
pub fn split_indices(n: usize, labels: Option<&[Label]>, config: &SplitConfig) -> SplitIndices {
    let mut rng = StdRng::seed_from_u64(config.random_seed);
    let (n_train, n_validation, n_test) = partition_sizes(n, config);

    let (train, validation, test) = match labels {
        Some(labels) if config.stratified => {
            debug_assert_eq!(labels.len(), n);
            let groups = shuffled_groups(labels, &mut rng);
            let mut windows = cut_groups(&groups, &[n_train, n_validation, n_test]).into_iter();
            (
                windows.next().unwrap_or_default(),
                windows.next().unwrap_or_default(),
                windows.next().unwrap_or_default(),
            )
        }
        _ => {
            let mut indices: Vec<usize> = (0..n).collect();
            indices.shuffle(&mut rng);
            let test = indices.split_off(n_train + n_validation);
            let validation = indices.split_off(n_train);
            (indices, validation, test)
        }
    };

    for (name, size) in [("train", n_train), ("validation", n_validation), ("test", n_test)] {
        if size == 0 && n > 0 {
            log::warn!("Split produced an empty {} partition for {} examples", name, n);
        }
    }
    log::debug!(
        "Split {} examples into {}/{}/{} (stratified: {})",
        n,
        train.len(),
        validation.len(),
        test.len(),
        config.stratified
    );

    SplitIndices {
        train,
        validation,
        test,
    }
}

/// Partition a dataset into disjoint train/validation/test subsets whose
/// union is the input.
pub fn split_dataset(dataset: &Dataset, config: &SplitConfig) -> DatasetSplit {
    let labels = config.stratified.then(|| dataset.labels());
    let indices = split_indices(dataset.len(), labels.as_deref(), config);
    DatasetSplit {
        train: dataset.select(&indices.train),
        validation: dataset.select(&indices.validation),
        test: dataset.select(&indices.test),
    }
}

/// `k` folds over `n` examples; each index appears in exactly one validation fold.
///
/// Fold sizes differ by at most one. With `labels` and `stratified`, every
/// class is spread over the folds the same way the stratified split spreads
/// it over partitions.
pub fn k_fold(
    n: usize,
    labels: Option<&[Label]>,
    k: usize,
    seed: u64,
    stratified: bool,
) -> Vec<Fold> {
    let k = k.max(1);
    let mut rng = StdRng::seed_from_u64(seed);
    let sizes: Vec<usize> = (0..k).map(|i| (i + 1) * n / k - i * n / k).collect();

    let windows = match labels {
        Some(labels) if stratified => {
            let groups = shuffled_groups(labels, &mut rng);
            cut_groups(&groups, &sizes)
        }
        _ => {
            let mut indices: Vec<usize> = (0..n).collect();
            indices.shuffle(&mut rng);
            let mut windows = Vec::with_capacity(k);
            let mut start = 0;
            for size in &sizes {
                windows.push(indices[start..start + size].to_vec());
                start += size;
            }
            windows
        }
    };

    (0..windows.len())
        .map(|i| Fold {
            validation: windows[i].clone(),
            train: windows
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .flat_map(|(_, w)| w.iter().copied())
                .collect(),
        })
        .collect()
}
