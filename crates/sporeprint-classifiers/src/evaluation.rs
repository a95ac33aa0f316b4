//! Fit a classifier on the training split and score it on the held-out split.
use std::time::Instant;

use ndarray::Array1;
use serde::Serialize;

use crate::data_handling::TrainTestSplit;
use crate::error::{ClassifierError, Result};
use crate::models::ClassifierModel;
use crate::stats::ConfusionMatrix;

/// Test-split metrics of one fitted model.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub model_name: String,
    pub accuracy: f64,
    /// Against the positive class (1, poisonous)
    pub precision: f64,
    pub recall: f64,
    #[serde(skip)]
    pub confusion: ConfusionMatrix,
    #[serde(skip)]
    pub y_pred: Array1<usize>,
    pub n_train: usize,
    pub n_test: usize,
}

/// Fit `model` on the training arrays (leaving it in the fitted state) and compute
/// accuracy, precision and recall on the test arrays.
pub fn train_and_evaluate(
    model: &mut dyn ClassifierModel,
    split: &TrainTestSplit,
) -> Result<Evaluation> {
    if split.y_test.is_empty() {
        return Err(ClassifierError::EmptyInput("evaluation"));
    }

    let start_time = Instant::now();
    model.fit(&split.x_train, &split.y_train)?;
    log::info!(
        "{} fitted on {} rows in {:?}",
        model.name(),
        split.x_train.nrows(),
        start_time.elapsed()
    );

    let y_pred = model.predict(&split.x_test)?;
    let confusion = ConfusionMatrix::from_predictions(&split.y_test, &y_pred)?;

    let evaluation = Evaluation {
        model_name: model.name().to_string(),
        accuracy: confusion.accuracy(),
        precision: confusion.precision(),
        recall: confusion.recall(),
        confusion,
        y_pred,
        n_train: split.y_train.len(),
        n_test: split.y_test.len(),
    };
    log::info!(
        "{}: accuracy {:.2}, precision {:.2}, recall {:.2}",
        evaluation.model_name,
        evaluation.accuracy,
        evaluation.precision,
        evaluation.recall
    );
    Ok(evaluation)
}
