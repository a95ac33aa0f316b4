use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::{ModelConfig, ModelType};
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::{threshold_labels, ClassifierModel};

const NAME: &str = "Random Forest";

/// Fraction of the feature columns each tree is grown on.
const FEATURE_SUBSAMPLE: f64 = 0.7;

/// One member of the ensemble and the feature columns it was grown on.
struct ForestTree {
    tree: DecisionTree<f64, usize>,
    features: Vec<usize>,
}

/// Bagged ensemble of depth-limited decision trees.
///
/// Trees are fitted in parallel on the rayon pool. Tree `i` draws its bootstrap rows
/// and feature subset from an RNG seeded with `random_state + i`, so a forest is
/// reproducible for a fixed seed. The positive-class probability is the fraction of
/// trees voting poisonous.
pub struct RandomForestClassifier {
    trees: Vec<ForestTree>,
    params: ModelConfig,
}

impl RandomForestClassifier {
    pub fn new(params: ModelConfig) -> Self {
        RandomForestClassifier {
            trees: Vec::new(),
            params,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn fit_error(reason: impl Into<String>) -> ClassifierError {
    ClassifierError::Fit {
        model: NAME.to_string(),
        reason: reason.into(),
    }
}

fn grow_tree(
    x: &Array2<f64>,
    y: &Array1<usize>,
    seed: u64,
    max_depth: usize,
    bootstrap: bool,
) -> std::result::Result<ForestTree, String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_samples = x.nrows();
    let n_features = x.ncols();

    let rows: Vec<usize> = if bootstrap {
        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
    } else {
        (0..n_samples).collect()
    };

    let n_selected = ((n_features as f64 * FEATURE_SUBSAMPLE).round() as usize).clamp(1, n_features);
    let mut features = sample(&mut rng, n_features, n_selected).into_vec();
    features.sort_unstable();

    let records = x.select(Axis(0), &rows).select(Axis(1), &features);
    let targets = y.select(Axis(0), &rows);
    let dataset = Dataset::new(records, targets);

    let tree = DecisionTree::<f64, usize>::params()
        .max_depth(Some(max_depth))
        .fit(&dataset)
        .map_err(|e| e.to_string())?;

    Ok(ForestTree { tree, features })
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        let ModelType::RandomForest {
            n_estimators,
            max_depth,
            bootstrap,
        } = self.params.model_type
        else {
            return Err(fit_error(format!(
                "expected RandomForest params, got {:?}",
                self.params.model_type
            )));
        };
        if n_estimators == 0 {
            return Err(fit_error("n_estimators must be at least 1"));
        }
        if max_depth == 0 {
            return Err(fit_error("max_depth must be at least 1"));
        }
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(fit_error("training data is empty"));
        }

        let seed = self.params.random_state;
        log::debug!(
            "Growing {} trees (max_depth {}, bootstrap {}) on {} rows",
            n_estimators,
            max_depth,
            bootstrap,
            x.nrows()
        );

        let trees = (0..u64::from(n_estimators))
            .into_par_iter()
            .map(|i| grow_tree(x, y, seed.wrapping_add(i), max_depth as usize, bootstrap))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(fit_error)?;

        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(threshold_labels(&self.predict_proba(x)?))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ClassifierError::NotFitted(NAME.to_string()));
        }

        let votes = self
            .trees
            .par_iter()
            .map(|member| {
                let records = x.select(Axis(1), &member.features);
                let labels: Array1<usize> = member.tree.predict(&records);
                labels.mapv(|label| if label == 1 { 1.0 } else { 0.0 })
            })
            .reduce(|| Array1::<f64>::zeros(x.nrows()), |a, b| a + b);

        Ok(votes / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        NAME
    }
}
