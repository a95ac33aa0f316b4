//! Process-wide cache of the loaded dataset and its split.
use std::sync::{Arc, OnceLock};

use sporeprint_classifiers::config::DataConfig;
use sporeprint_classifiers::data_handling::{
    load_dataset, train_test_split, EncodedTable, TrainTestSplit,
};
use sporeprint_classifiers::error::Result;

/// The encoded table and the train/test split derived from it.
#[derive(Debug)]
pub struct SessionData {
    pub table: EncodedTable,
    pub split: TrainTestSplit,
}

impl SessionData {
    pub fn load(config: &DataConfig) -> Result<Self> {
        let table = load_dataset(config)?;
        let split = train_test_split(&table, &config.target_column, config.test_size, config.seed)?;
        log::info!(
            "Dataset ready: {} training rows, {} test rows, {} features",
            split.y_train.len(),
            split.y_test.len(),
            split.n_features()
        );
        Ok(SessionData { table, split })
    }
}

/// Filled on first access and never invalidated. A failed load is not cached.
#[derive(Debug, Default)]
pub struct DatasetCache {
    cell: OnceLock<Arc<SessionData>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, config: &DataConfig) -> Result<Arc<SessionData>> {
        if let Some(data) = self.cell.get() {
            return Ok(Arc::clone(data));
        }
        let loaded = Arc::new(SessionData::load(config)?);
        // a concurrent request may have filled the cell first; keep that one
        Ok(Arc::clone(self.cell.get_or_init(|| loaded)))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
