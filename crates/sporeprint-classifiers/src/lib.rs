//! sporeprint-classifiers: binary classification of the mushroom dataset.
//!
//! This crate loads and label-encodes the tabular data, produces a seeded
//! train/test split, wraps linfa learners (SVM, logistic regression and a
//! bagged decision-tree forest) behind one trait, and computes the metrics and
//! plotly charts shown by the dashboard and the CLI reports.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod models;
pub mod report;
pub mod stats;
