//! Integration tests for the dataset splitter and k-fold helper.

use std::collections::BTreeSet;

use ensemble_kit::config::SplitConfig;
use ensemble_kit::data_handling::{Dataset, Example, Label};
use ensemble_kit::split::{k_fold, split_dataset, split_indices};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn threshold_dataset(n: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let examples = (0..n)
        .map(|_| {
            let x0: f64 = rng.gen();
            let x1: f64 = rng.gen();
            let label = if x0 + x1 > 1.0 { 1.0 } else { 0.0 };
            Example::new(vec![x0, x1], label)
        })
        .collect();
    Dataset::new(examples).unwrap()
}

fn skewed_labels(n: usize) -> Vec<Label> {
    (0..n)
        .map(|i| Label::from(if i % 10 < 8 { 0.0 } else { 1.0 }))
        .collect()
}

fn count(ds: &Dataset, label: &Label) -> usize {
    ds.examples().iter().filter(|e| e.label() == label).count()
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn stratified_70_15_15_seed_42() {
    let ds = threshold_dataset(100, 7);
    let cfg = SplitConfig::new(0.7, 0.15, 0.15, 42).stratified(true);
    let split = split_dataset(&ds, &cfg);
    assert_eq!(split.sizes(), (70, 15, 15));

    let positive = Label::from(1.0);
    let share = count(&ds, &positive) as f64 / ds.len() as f64;
    for part in [&split.train, &split.validation, &split.test] {
        let expected = share * part.len() as f64;
        let got = count(part, &positive) as f64;
        assert!(
            (got - expected).abs() <= 1.0,
            "partition of {} has {} positives, expected about {}",
            part.len(),
            got,
            expected
        );
    }
}

// ---------------------------------------------------------------------------
// Properties over seed sweeps
// ---------------------------------------------------------------------------

#[test]
fn partitions_are_disjoint_and_cover_input() {
    for seed in 0..25u64 {
        for stratified in [false, true] {
            let labels = skewed_labels(57);
            let cfg = SplitConfig::new(0.6, 0.25, 0.15, seed).stratified(stratified);
            let idx = split_indices(57, Some(&labels), &cfg);
            let all: Vec<usize> = idx
                .train
                .iter()
                .chain(&idx.validation)
                .chain(&idx.test)
                .copied()
                .collect();
            assert_eq!(all.len(), 57);
            let unique: BTreeSet<usize> = all.into_iter().collect();
            assert_eq!(unique, (0..57).collect());
        }
    }
}

#[test]
fn same_seed_same_partitions() {
    let labels = skewed_labels(40);
    for seed in 0..25u64 {
        for stratified in [false, true] {
            let cfg = SplitConfig::new(0.7, 0.15, 0.15, seed).stratified(stratified);
            let a = split_indices(40, Some(&labels), &cfg);
            let b = split_indices(40, Some(&labels), &cfg);
            assert_eq!(a, b);
        }
    }
}

#[test]
fn different_seeds_shuffle_differently() {
    let a = split_indices(50, None, &SplitConfig::new(0.7, 0.15, 0.15, 1));
    let b = split_indices(50, None, &SplitConfig::new(0.7, 0.15, 0.15, 2));
    assert_ne!(a.train, b.train);
}

#[test]
fn stratified_keeps_skewed_balance_for_all_seeds() {
    let labels = skewed_labels(90);
    let positive = Label::from(1.0);
    let n_pos = labels.iter().filter(|l| **l == positive).count();
    let share = n_pos as f64 / labels.len() as f64;
    for seed in 0..50u64 {
        let cfg = SplitConfig::new(0.7, 0.15, 0.15, seed).stratified(true);
        let idx = split_indices(labels.len(), Some(&labels), &cfg);
        for part in [&idx.train, &idx.validation, &idx.test] {
            let got = part.iter().filter(|&&i| labels[i] == positive).count() as f64;
            assert!((got - share * part.len() as f64).abs() <= 1.0, "seed {}", seed);
        }
    }
}

#[test]
fn tiny_ratio_yields_empty_partition() {
    let cfg = SplitConfig::new(0.95, 0.01, 0.04, 3);
    let idx = split_indices(10, None, &cfg);
    assert_eq!(idx.train.len(), 9);
    assert!(idx.validation.is_empty());
    assert_eq!(idx.test.len(), 1);
}

#[test]
fn categorical_labels_stratify() {
    let examples = (0..30)
        .map(|i| {
            let label = match i % 3 {
                0 => "red",
                1 => "green",
                _ => "blue",
            };
            Example::new(vec![i as f64], label)
        })
        .collect();
    let ds = Dataset::new(examples).unwrap();
    let split = split_dataset(&ds, &SplitConfig::default().stratified(true));
    assert_eq!(split.sizes(), (21, 4, 5));
    for color in ["red", "green", "blue"] {
        let label = Label::from(color);
        assert_eq!(count(&split.train, &label), 7);
        let held_out = count(&split.validation, &label) + count(&split.test, &label);
        assert_eq!(held_out, 3);
        for part in [&split.validation, &split.test] {
            let expected = part.len() as f64 / 3.0;
            assert!((count(part, &label) as f64 - expected).abs() <= 1.0);
        }
    }
}

fn assert_class_shares(labels: &[Label], cfg: &SplitConfig) {
    let idx = split_indices(labels.len(), Some(labels), cfg);
    let classes: BTreeSet<&Label> = labels.iter().collect();
    for class in classes {
        let share = labels.iter().filter(|l| *l == class).count() as f64 / labels.len() as f64;
        for part in [&idx.train, &idx.validation, &idx.test] {
            let got = part.iter().filter(|&&i| labels[i] == *class).count() as f64;
            let expected = share * part.len() as f64;
            assert!(
                (got - expected).abs() <= 1.0,
                "class {} in partition of {}: got {}, expected {}",
                class,
                part.len(),
                got,
                expected
            );
        }
    }
}

fn labels_with_counts(counts: &[usize]) -> Vec<Label> {
    counts
        .iter()
        .enumerate()
        .flat_map(|(class, &c)| std::iter::repeat(Label::from(class as f64)).take(c))
        .collect()
}

#[test]
fn three_class_shares_hold_in_every_partition() {
    let cfg = SplitConfig::new(0.7, 0.15, 0.15, 42).stratified(true);
    for a in 1..30 {
        for b in 1..30 {
            for c in 1..30 {
                assert_class_shares(&labels_with_counts(&[a, b, c]), &cfg);
            }
        }
    }
    // two small classes next to a large one
    let idx = split_indices(19, Some(&labels_with_counts(&[2, 2, 15])), &cfg);
    assert_eq!((idx.train.len(), idx.validation.len(), idx.test.len()), (13, 2, 4));
}

#[test]
fn many_class_shares_hold_across_seeds_and_ratios() {
    let ratios = [(0.7, 0.15, 0.15), (0.6, 0.25, 0.15), (0.34, 0.33, 0.33), (0.9, 0.05, 0.05)];
    let class_counts = [
        vec![1, 1, 1, 1, 1],
        vec![7, 3, 3, 3, 1],
        vec![40, 2, 9, 5],
        vec![12, 11, 10, 9, 8, 7],
    ];
    for seed in 0..10u64 {
        for &(train, validation, test) in &ratios {
            let cfg = SplitConfig::new(train, validation, test, seed).stratified(true);
            for counts in &class_counts {
                assert_class_shares(&labels_with_counts(counts), &cfg);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// k-fold
// ---------------------------------------------------------------------------

#[test]
fn stratified_folds_cover_and_balance() {
    let labels = skewed_labels(50);
    let folds = k_fold(labels.len(), Some(&labels), 5, 9, true);
    assert_eq!(folds.len(), 5);
    let mut seen = BTreeSet::new();
    for fold in &folds {
        assert_eq!(fold.validation.len(), 10);
        let pos = fold.validation.iter().filter(|&&i| labels[i] == Label::from(1.0)).count();
        assert_eq!(pos, 2);
        for &i in &fold.validation {
            assert!(seen.insert(i));
            assert!(!fold.train.contains(&i));
        }
    }
    assert_eq!(seen.len(), 50);
}
