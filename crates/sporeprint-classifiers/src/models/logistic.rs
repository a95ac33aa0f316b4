use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};

use crate::config::{ModelConfig, ModelType};
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::{threshold_labels, ClassifierModel};

const NAME: &str = "Logistic Regression";

/// L2-regularized logistic regression.
///
/// The regularization strength `c` is an inverse penalty, so it is handed to linfa
/// as `alpha = 1 / c`.
pub struct LogisticRegressionClassifier {
    model: Option<FittedLogisticRegression<f64, usize>>,
    params: ModelConfig,
}

impl LogisticRegressionClassifier {
    pub fn new(params: ModelConfig) -> Self {
        LogisticRegressionClassifier {
            model: None,
            params,
        }
    }
}

impl ClassifierModel for LogisticRegressionClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        let ModelType::LogisticRegression { c, max_iter } = self.params.model_type else {
            return Err(ClassifierError::Fit {
                model: NAME.to_string(),
                reason: format!(
                    "expected LogisticRegression params, got {:?}",
                    self.params.model_type
                ),
            });
        };
        if c <= 0.0 {
            return Err(ClassifierError::Fit {
                model: NAME.to_string(),
                reason: format!("C must be positive, got {}", c),
            });
        }

        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let fitted = LogisticRegression::<f64>::default()
            .alpha(1.0 / c)
            .max_iterations(u64::from(max_iter))
            .fit(&dataset)
            .map_err(|e| ClassifierError::Fit {
                model: NAME.to_string(),
                reason: e.to_string(),
            })?;

        log::debug!(
            "Logistic regression fitted, intercept {:.4}, positive class {}",
            fitted.intercept(),
            fitted.labels().pos.class
        );
        self.model = Some(fitted);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(threshold_labels(&self.predict_proba(x)?))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| ClassifierError::NotFitted(NAME.to_string()))?;
        let probabilities = model.predict_probabilities(x);
        // linfa reports the probability of whichever class it picked as positive
        if model.labels().pos.class == 1 {
            Ok(probabilities)
        } else {
            Ok(probabilities.mapv(|p| 1.0 - p))
        }
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logistic_regression_classifier() {
        // label follows the first feature, second feature is noise
        let x = Array2::from_shape_vec(
            (12, 2),
            vec![
                0.0, 3.0, 1.0, 2.0, 0.0, 1.0, 1.0, 0.0, 0.0, 2.0, 1.0, 3.0, 0.0, 0.0, 1.0, 1.0,
                0.0, 3.0, 1.0, 2.0, 0.0, 1.0, 1.0, 0.0,
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1]);

        let mut classifier = LogisticRegressionClassifier::new(ModelConfig::new(
            ModelType::LogisticRegression {
                c: 10.0,
                max_iter: 200,
            },
        ));
        classifier.fit(&x, &y).unwrap();

        let probabilities = classifier.predict_proba(&x).unwrap();
        assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
        // rows with feature 1.0 lean poisonous
        assert!(probabilities[1] > probabilities[0]);
        assert_eq!(classifier.predict(&x).unwrap(), y);
    }

    #[test]
    fn non_positive_c_fails_to_fit() {
        let x = Array2::from_shape_vec((2, 1), vec![0.0, 1.0]).unwrap();
        let y = Array1::from_vec(vec![0, 1]);
        let mut classifier = LogisticRegressionClassifier::new(ModelConfig::new(
            ModelType::LogisticRegression { c: 0.0, max_iter: 100 },
        ));
        assert!(matches!(
            classifier.fit(&x, &y),
            Err(ClassifierError::Fit { .. })
        ));
    }
}
