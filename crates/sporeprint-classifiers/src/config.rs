use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Inclusive bounds for the regularization strength `C` (SVM and logistic regression).
pub const C_RANGE: (f64, f64) = (0.01, 10.0);
pub const C_STEP: f64 = 0.01;
/// Inclusive bounds for the logistic regression iteration budget.
pub const MAX_ITER_RANGE: (u32, u32) = (100, 500);
/// Inclusive bounds for the number of trees in the forest.
pub const N_ESTIMATORS_RANGE: (u32, u32) = (100, 5000);
pub const N_ESTIMATORS_STEP: u32 = 10;
/// Inclusive bounds for the maximum depth of each tree.
pub const MAX_DEPTH_RANGE: (u32, u32) = (1, 20);

/// Kernel used by the support vector machine.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SvmKernel {
    #[default]
    Rbf,
    Linear,
}

/// How the RBF kernel coefficient is derived from the training data.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GammaPolicy {
    /// `1 / (n_features * Var(X))`
    #[default]
    Scale,
    /// `1 / n_features`
    Auto,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    SVM {
        c: f64,
        kernel: SvmKernel,
        gamma: GammaPolicy,
    },
    LogisticRegression {
        c: f64,
        max_iter: u32,
    },
    RandomForest {
        n_estimators: u32,
        max_depth: u32,
        bootstrap: bool,
    },
}

impl ModelType {
    /// Default hyper-parameters for each kind: the lower end of every widget range.
    pub fn svm_default() -> Self {
        ModelType::SVM {
            c: C_RANGE.0,
            kernel: SvmKernel::Rbf,
            gamma: GammaPolicy::Scale,
        }
    }

    pub fn logistic_regression_default() -> Self {
        ModelType::LogisticRegression {
            c: C_RANGE.0,
            max_iter: MAX_ITER_RANGE.0,
        }
    }

    pub fn random_forest_default() -> Self {
        ModelType::RandomForest {
            n_estimators: N_ESTIMATORS_RANGE.0,
            max_depth: MAX_DEPTH_RANGE.0,
            bootstrap: true,
        }
    }

    /// Human readable classifier name, as shown in the classifier selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::SVM { .. } => "Support Vector Machine (SVM)",
            ModelType::LogisticRegression { .. } => "Logistic Regression",
            ModelType::RandomForest { .. } => "Random Forest",
        }
    }

    /// Short machine name, matching the `FromStr` spelling.
    pub fn key(&self) -> &'static str {
        match self {
            ModelType::SVM { .. } => "svm",
            ModelType::LogisticRegression { .. } => "logistic_regression",
            ModelType::RandomForest { .. } => "random_forest",
        }
    }
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::svm_default()
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svm" | "support vector machine (svm)" => Ok(ModelType::svm_default()),
            "logistic_regression" | "logistic-regression" | "lr" | "logistic regression" => {
                Ok(ModelType::logistic_regression_default())
            }
            "random_forest" | "random-forest" | "rf" | "random forest" => {
                Ok(ModelType::random_forest_default())
            }
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: svm, logistic_regression, random_forest",
                s
            )),
        }
    }
}

impl FromStr for SvmKernel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rbf" => Ok(SvmKernel::Rbf),
            "linear" => Ok(SvmKernel::Linear),
            _ => Err(format!("Unsupported kernel type: {}. Valid options are: rbf, linear", s)),
        }
    }
}

impl fmt::Display for SvmKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvmKernel::Rbf => write!(f, "rbf"),
            SvmKernel::Linear => write!(f, "linear"),
        }
    }
}

impl FromStr for GammaPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scale" => Ok(GammaPolicy::Scale),
            "auto" => Ok(GammaPolicy::Auto),
            _ => Err(format!("Unsupported gamma policy: {}. Valid options are: scale, auto", s)),
        }
    }
}

impl fmt::Display for GammaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GammaPolicy::Scale => write!(f, "scale"),
            GammaPolicy::Auto => write!(f, "auto"),
        }
    }
}

/// Central configuration for models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Seed for stochastic learners (bootstrap sampling in the forest).
    pub random_state: u64,

    #[serde(flatten)]
    pub model_type: ModelType,
}

impl ModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        Self {
            random_state: 0,
            model_type,
        }
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(ModelType::default())
    }
}

/// One class of the binary target: the raw cell value and its display name.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClassLabel {
    pub value: String,
    pub name: String,
}

impl ClassLabel {
    pub fn new(value: &str, name: &str) -> Self {
        Self {
            value: value.to_string(),
            name: name.to_string(),
        }
    }

    /// A raw target cell belongs to this class only when it equals the value exactly.
    pub fn matches(&self, raw: &str) -> bool {
        raw == self.value
    }
}

/// Where the dataset lives and how it is split.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub path: PathBuf,
    pub target_column: String,
    /// Negative class first (code 0), positive class second (code 1).
    pub classes: [ClassLabel; 2],
    pub test_size: f64,
    pub seed: u64,
}

impl DataConfig {
    pub fn class_names(&self) -> [&str; 2] {
        [self.classes[0].name.as_str(), self.classes[1].name.as_str()]
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/mushrooms.csv"),
            target_column: "type".to_string(),
            classes: [ClassLabel::new("e", "edible"), ClassLabel::new("p", "poisonous")],
            test_size: 0.3,
            seed: 0,
        }
    }
}
