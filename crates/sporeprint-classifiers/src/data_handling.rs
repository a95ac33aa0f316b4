//! Data structures and helpers for the encoded mushroom dataset.
//!
//! This module defines `LabelEncoder`, `EncodedTable` and `TrainTestSplit`, and
//! contains the load step (read + encode every column) and the seeded
//! train/test partitioning used by the evaluator.
use std::collections::HashMap;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{ClassLabel, DataConfig};
use crate::error::{ClassifierError, Result};
use crate::io::{read_csv_table, RawTable};

/// Maps each distinct category string of one column to a distinct integer code.
///
/// Codes are handed out in order of first appearance. An encoder may be seeded with
/// an ordered list of classes, which then occupy codes `0..k`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, u32>,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut encoder = Self::new();
        for class in classes {
            encoder.insert(class.into());
        }
        encoder
    }

    fn insert(&mut self, value: String) -> u32 {
        if let Some(&code) = self.index.get(&value) {
            return code;
        }
        let code = self.classes.len() as u32;
        self.index.insert(value.clone(), code);
        self.classes.push(value);
        code
    }

    /// Learn the categories of `values` and return their codes.
    pub fn fit_transform<'a, I>(&mut self, values: I) -> Vec<u32>
    where
        I: IntoIterator<Item = &'a str>,
    {
        values
            .into_iter()
            .map(|value| self.insert(value.to_string()))
            .collect()
    }

    pub fn transform(&self, value: &str) -> Option<u32> {
        self.index.get(value).copied()
    }

    pub fn inverse_transform(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    /// Categories in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

/// The fully label-encoded dataset.
#[derive(Debug, Clone)]
pub struct EncodedTable {
    pub columns: Vec<String>,
    pub values: Array2<u32>,
    pub encoders: Vec<LabelEncoder>,
}

impl EncodedTable {
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        crate::io::csv_table::find_column(&self.columns, name)
    }

    pub fn encoder(&self, name: &str) -> Option<&LabelEncoder> {
        self.column_index(name).map(|idx| &self.encoders[idx])
    }

    pub fn log_input_data_summary(&self, target_column: &str) {
        log::info!("----- Input Data Summary -----");
        log::info!("{} rows, {} columns", self.nrows(), self.ncols());
        if let Some(idx) = self.column_index(target_column) {
            let target = self.values.column(idx);
            for (code, class) in self.encoders[idx].classes().iter().enumerate() {
                let count = target.iter().filter(|&&v| v == code as u32).count();
                log::info!("{} '{}' (code {}): {} rows", target_column, class, code, count);
            }
        }
        log::info!("-------------------------------");
    }
}

/// Encode every column independently. The target column is encoded against the
/// configured classes so that the negative class is 0 and the positive class is 1.
pub fn encode_table(raw: &RawTable, config: &DataConfig) -> Result<EncodedTable> {
    let target_idx = raw
        .column_index(&config.target_column)
        .ok_or_else(|| ClassifierError::MissingColumn(config.target_column.clone()))?;

    let nrows = raw.nrows();
    let ncols = raw.ncols();
    let mut values = Array2::<u32>::zeros((nrows, ncols));
    let mut encoders = Vec::with_capacity(ncols);

    for col in 0..ncols {
        let (encoder, codes) = if col == target_idx {
            encode_target(raw, col, &config.target_column, &config.classes)?
        } else {
            let mut encoder = LabelEncoder::new();
            let codes = encoder.fit_transform(raw.column(col));
            (encoder, codes)
        };
        values.column_mut(col).assign(&Array1::from_vec(codes));
        encoders.push(encoder);
    }

    Ok(EncodedTable {
        columns: raw.headers.clone(),
        values,
        encoders,
    })
}

fn encode_target(
    raw: &RawTable,
    col: usize,
    column_name: &str,
    classes: &[ClassLabel; 2],
) -> Result<(LabelEncoder, Vec<u32>)> {
    let mut codes = Vec::with_capacity(raw.nrows());
    for (row, value) in raw.column(col).enumerate() {
        let code = classes
            .iter()
            .position(|class| class.matches(value))
            .ok_or_else(|| ClassifierError::UnknownClass {
                column: column_name.to_string(),
                value: value.to_string(),
                row: row + 1,
            })?;
        codes.push(code as u32);
    }
    let encoder = LabelEncoder::with_classes(classes.iter().map(|class| class.value.clone()));
    Ok((encoder, codes))
}

/// Read the configured CSV and label-encode it.
pub fn load_dataset(config: &DataConfig) -> Result<EncodedTable> {
    log::info!("Loading dataset from {}", config.path.display());
    let raw = read_csv_table(&config.path)?;
    let table = encode_table(&raw, config)?;
    table.log_input_data_summary(&config.target_column);
    Ok(table)
}

/// Features and labels partitioned into a fitting subset and a held-out subset.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<usize>,
    pub y_test: Array1<usize>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub feature_names: Vec<String>,
}

impl TrainTestSplit {
    pub fn n_features(&self) -> usize {
        self.x_train.ncols()
    }
}

/// Separate `target_column` from the features and partition rows with a seeded
/// shuffle. `ceil(test_size * n)` rows go to the test partition.
pub fn train_test_split(
    table: &EncodedTable,
    target_column: &str,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ClassifierError::Split(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    let target_idx = table
        .column_index(target_column)
        .ok_or_else(|| ClassifierError::MissingColumn(target_column.to_string()))?;

    let n_samples = table.nrows();
    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(ClassifierError::Split(format!(
            "{} rows with test_size {} leaves an empty partition",
            n_samples, test_size
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(&mut rng);
    let (test_indices, train_indices) = indices.split_at(n_test);

    let feature_cols: Vec<usize> = (0..table.ncols()).filter(|&c| c != target_idx).collect();
    let features = table
        .values
        .select(Axis(1), &feature_cols)
        .mapv(|v| v as f64);
    let labels = table.values.column(target_idx).mapv(|v| v as usize);

    log::debug!(
        "Split {} rows into {} train / {} test (seed {})",
        n_samples,
        n_train,
        n_test,
        seed
    );

    Ok(TrainTestSplit {
        x_train: features.select(Axis(0), train_indices),
        x_test: features.select(Axis(0), test_indices),
        y_train: labels.select(Axis(0), train_indices),
        y_test: labels.select(Axis(0), test_indices),
        train_indices: train_indices.to_vec(),
        test_indices: test_indices.to_vec(),
        feature_names: feature_cols
            .iter()
            .map(|&c| table.columns[c].clone())
            .collect(),
    })
}
