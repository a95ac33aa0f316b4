use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::logistic::LogisticRegressionClassifier;
use crate::models::random_forest::RandomForestClassifier;
use crate::models::svm::SVMClassifier;

/// Build an untrained, boxed classifier model from a `ModelConfig`.
pub fn build_model(params: ModelConfig) -> Box<dyn ClassifierModel> {
    log::debug!("Building {} with {:?}", params.model_type.display_name(), params.model_type);
    match params.model_type {
        ModelType::SVM { .. } => Box::new(SVMClassifier::new(params)),
        ModelType::LogisticRegression { .. } => {
            Box::new(LogisticRegressionClassifier::new(params))
        }
        ModelType::RandomForest { .. } => Box::new(RandomForestClassifier::new(params)),
    }
}
