use linfa::dataset::Pr;
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_svm::{Svm, SvmParams};
use ndarray::{Array1, Array2};

use crate::config::{GammaPolicy, ModelConfig, ModelType, SvmKernel};
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::ClassifierModel;

const NAME: &str = "Support Vector Machine (SVM)";

/// Support vector classifier with Platt-scaled probability outputs.
pub struct SVMClassifier {
    model: Option<Svm<f64, Pr>>,
    params: ModelConfig,
}

impl SVMClassifier {
    pub fn new(params: ModelConfig) -> Self {
        SVMClassifier {
            model: None,
            params,
        }
    }

    fn fitted(&self) -> Result<&Svm<f64, Pr>> {
        self.model
            .as_ref()
            .ok_or_else(|| ClassifierError::NotFitted(NAME.to_string()))
    }

    /// Decision value (`weighted_sum - rho`) of every row. Positive means poisonous.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self.fitted()?;
        Ok(x.outer_iter()
            .map(|row| model.weighted_sum(&row) - model.rho)
            .collect())
    }
}

/// Kernel coefficient for the RBF kernel, following the `scale` / `auto` policies.
pub fn resolve_gamma(x: &Array2<f64>, policy: GammaPolicy) -> f64 {
    let n_features = x.ncols().max(1) as f64;
    match policy {
        GammaPolicy::Auto => 1.0 / n_features,
        GammaPolicy::Scale => {
            let variance = if x.is_empty() { 0.0 } else { x.var(0.0) };
            if variance > 0.0 {
                1.0 / (n_features * variance)
            } else {
                1.0
            }
        }
    }
}

impl ClassifierModel for SVMClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        let ModelType::SVM { c, kernel, gamma } = self.params.model_type else {
            return Err(ClassifierError::Fit {
                model: NAME.to_string(),
                reason: format!("expected SVM params, got {:?}", self.params.model_type),
            });
        };

        // Positive class (poisonous, 1) becomes `true`
        let targets = y.mapv(|label| label == 1);
        let dataset = Dataset::new(x.to_owned(), targets);

        let mut model: SvmParams<f64, Pr> = Svm::<f64, Pr>::params().pos_neg_weights(c, c);

        model = match kernel {
            SvmKernel::Linear => model.linear_kernel(),
            SvmKernel::Rbf => {
                // linfa's gaussian kernel is exp(-|x - y|^2 / eps)
                let gamma = resolve_gamma(x, gamma);
                log::debug!("SVM rbf kernel with gamma {:.6}", gamma);
                model.gaussian_kernel(1.0 / gamma)
            }
        };

        let fitted = model.fit(&dataset).map_err(|e| ClassifierError::Fit {
            model: NAME.to_string(),
            reason: e.to_string(),
        })?;
        self.model = Some(fitted);
        Ok(())
    }

    /// Hard labels follow the decision sign, not the Platt probability.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(self
            .decision_function(x)?
            .mapv(|value| usize::from(value > 0.0)))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self.fitted()?;
        let predictions: Array1<Pr> = model.predict(x);
        Ok(predictions.mapv(|p| *p as f64))
    }

    fn name(&self) -> &str {
        NAME
    }
}
