//! ensemble-kit: a small ensemble-learning toolkit.
//!
//! This crate provides a seeded (optionally stratified) dataset splitter,
//! a Gini decision tree stored in a flat node arena, a bootstrap-aggregated
//! forest, residual boosting over linear weak learners, a heuristic kernel
//! margin classifier and a weighted combiner over any trained model.
//!
//! Every learner is numeric and regression-shaped: it trains on `f64`
//! targets and predicts `f64` scores through the `models::Model` trait.
//! Class semantics live at the boundary in `models::classification`.
//! Training is single-threaded and synchronous; trained models are
//! read-only and `Send + Sync`.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod math;
pub mod metrics;
pub mod models;
pub mod preprocessing;
pub mod split;

pub use error::{EnsembleError, Result};
