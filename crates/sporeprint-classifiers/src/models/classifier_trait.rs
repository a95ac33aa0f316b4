use ndarray::{Array1, Array2};

use crate::error::Result;

/// A small trait abstraction for the binary classifiers offered by the dashboard.
/// Labels follow the encoded target convention (0 for edible, 1 for poisonous).
pub trait ClassifierModel: Send {
    /// Fit the model on features `x` and labels `y`, replacing any previous fit.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>;

    /// Predict a class label (0 or 1) for every row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;

    /// Probability of the positive class (label 1) for every row of `x`.
    /// Also used as the decision score for threshold-swept curves.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Turn positive-class probabilities into hard labels.
pub(crate) fn threshold_labels(probabilities: &Array1<f64>) -> Array1<usize> {
    probabilities.mapv(|p| if p > 0.5 { 1 } else { 0 })
}
