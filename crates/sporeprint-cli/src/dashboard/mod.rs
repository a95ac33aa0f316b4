//! The interactive dashboard: form state in, render description out.
//!
//! Every interaction re-runs [`Dashboard::handle`] from scratch. The only state that
//! outlives a request is the [`DatasetCache`].
pub mod cache;
pub mod form;
pub mod page;

use anyhow::{Context, Result};

use sporeprint_classifiers::config::ModelConfig;
use sporeprint_classifiers::data_handling::EncodedTable;
use sporeprint_classifiers::evaluation::train_and_evaluate;
use sporeprint_classifiers::models::build_model;
use sporeprint_classifiers::report::{plot_metrics, Chart};

use crate::config::DashboardConfig;
pub use cache::{DatasetCache, SessionData};
pub use form::{Classifier, FormError, FormState};

pub const TITLE: &str = "Binary Classification Web App";
pub const TAGLINE: &str = "Are your mushrooms edible or poisonous \u{1F344}";
pub const RAW_DATA_HEADING: &str = "Mushroom Data Set (Classification)";

/// Everything the page needs to draw one response.
pub struct RenderDescription {
    pub form: FormState,
    pub results: Option<ClassificationResults>,
    pub raw_data: Option<RawDataTable>,
}

/// Output of one classify trigger.
pub struct ClassificationResults {
    pub heading: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub charts: Vec<Chart>,
}

/// The loaded, encoded dataset as a table.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<u32>>,
}

impl RawDataTable {
    pub fn from_table(table: &EncodedTable) -> Self {
        RawDataTable {
            columns: table.columns.clone(),
            rows: table.values.rows().into_iter().map(|row| row.to_vec()).collect(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    cache: DatasetCache,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Dashboard {
            config,
            cache: DatasetCache::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Handle one interaction.
    ///
    /// Without `classify` only the form (and, if toggled, the raw table) is returned.
    /// With it a fresh model is built from the form, fitted on the cached training
    /// split, scored on the test split and the requested charts are drawn.
    pub fn handle(&self, form: &FormState) -> Result<RenderDescription> {
        let session = self
            .cache
            .get_or_load(&self.config.data)
            .with_context(|| format!("Failed to load dataset {}", self.config.data.path.display()))?;

        let results = if form.classify {
            Some(self.classify(form, &session)?)
        } else {
            None
        };

        let raw_data = form
            .show_raw_data
            .then(|| RawDataTable::from_table(&session.table));

        Ok(RenderDescription {
            form: form.clone(),
            results,
            raw_data,
        })
    }

    fn classify(&self, form: &FormState, session: &SessionData) -> Result<ClassificationResults> {
        let model_type = form.model_type();
        let heading = format!("{} Results", model_type.display_name());
        log::info!("[Sporeprint::Dashboard] Classify with {:?}", model_type);

        let params = ModelConfig::new(model_type).with_random_state(self.config.random_state);
        let mut model = build_model(params);
        let evaluation = train_and_evaluate(model.as_mut(), &session.split)
            .with_context(|| format!("{} could not be trained", model.name()))?;

        let charts = plot_metrics(
            model.as_ref(),
            &session.split.x_test,
            &session.split.y_test,
            &form.metrics,
            self.config.data.class_names(),
        )
        .context("Failed to plot metrics")?;

        Ok(ClassificationResults {
            heading,
            accuracy: evaluation.accuracy,
            precision: evaluation.precision,
            recall: evaluation.recall,
            charts,
        })
    }
}
