//! Widget state of the dashboard sidebar, parsed from URL-encoded pairs.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use sporeprint_classifiers::config::{
    GammaPolicy, ModelType, SvmKernel, C_RANGE, MAX_DEPTH_RANGE, MAX_ITER_RANGE,
    N_ESTIMATORS_RANGE,
};
use sporeprint_classifiers::report::MetricPlot;

/// Rejected form input. Rendered as a 400 response.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("invalid value '{value}' for {field}: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
}

/// The three classifiers offered in the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classifier {
    #[default]
    Svm,
    LogisticRegression,
    RandomForest,
}

impl Classifier {
    pub const ALL: [Classifier; 3] = [
        Classifier::Svm,
        Classifier::LogisticRegression,
        Classifier::RandomForest,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Classifier::Svm => "Support Vector Machine (SVM)",
            Classifier::LogisticRegression => "Logistic Regression",
            Classifier::RandomForest => "Random Forest",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Classifier::Svm => "svm",
            Classifier::LogisticRegression => "logistic_regression",
            Classifier::RandomForest => "random_forest",
        }
    }
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Classifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let model_type: ModelType = s.parse()?;
        Ok(match model_type {
            ModelType::SVM { .. } => Classifier::Svm,
            ModelType::LogisticRegression { .. } => Classifier::LogisticRegression,
            ModelType::RandomForest { .. } => Classifier::RandomForest,
        })
    }
}

/// Every sidebar widget, including the hyperparameters of classifiers that are not
/// currently selected so their values survive switching back and forth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    pub classifier: Classifier,
    /// SVM `C` (query key `C`)
    pub svm_c: f64,
    pub kernel: SvmKernel,
    pub gamma: GammaPolicy,
    /// Logistic regression `C` (query key `C_LR`)
    pub lr_c: f64,
    pub max_iter: u32,
    pub n_estimators: u32,
    pub max_depth: u32,
    pub bootstrap: bool,
    pub metrics: Vec<MetricPlot>,
    pub classify: bool,
    pub show_raw_data: bool,
}

impl Default for FormState {
    fn default() -> Self {
        FormState {
            classifier: Classifier::Svm,
            svm_c: C_RANGE.0,
            kernel: SvmKernel::Rbf,
            gamma: GammaPolicy::Scale,
            lr_c: C_RANGE.0,
            max_iter: MAX_ITER_RANGE.0,
            n_estimators: N_ESTIMATORS_RANGE.0,
            max_depth: MAX_DEPTH_RANGE.0,
            bootstrap: true,
            metrics: Vec::new(),
            classify: false,
            show_raw_data: false,
        }
    }
}

impl FormState {
    /// Parse a raw query string such as `classifier=svm&C=0.5&metrics=roc_curve`.
    pub fn from_query(query: &str) -> Result<Self, FormError> {
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Build the form from decoded key/value pairs. Missing keys keep their defaults;
    /// `metrics` may repeat. Empty values are treated as missing.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut form = FormState::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "classifier" => form.classifier = parse_choice("classifier", value)?,
                "C" => form.svm_c = parse_in_range("C", value, C_RANGE)?,
                "kernel" => form.kernel = parse_choice("kernel", value)?,
                "gamma" => form.gamma = parse_choice("gamma", value)?,
                "C_LR" => form.lr_c = parse_in_range("C_LR", value, C_RANGE)?,
                "max_iter" => form.max_iter = parse_in_range("max_iter", value, MAX_ITER_RANGE)?,
                "n_estimators" => {
                    form.n_estimators = parse_in_range("n_estimators", value, N_ESTIMATORS_RANGE)?
                }
                "max_depth" => {
                    form.max_depth = parse_in_range("max_depth", value, MAX_DEPTH_RANGE)?
                }
                "bootstrap" => form.bootstrap = parse_flag("bootstrap", value)?,
                "metrics" => {
                    let metric: MetricPlot = parse_choice("metrics", value)?;
                    if !form.metrics.contains(&metric) {
                        form.metrics.push(metric);
                    }
                }
                "classify" => form.classify = parse_flag("classify", value)?,
                "show_raw_data" => form.show_raw_data = parse_flag("show_raw_data", value)?,
                other => log::debug!("Ignoring unknown form field '{}'", other),
            }
        }
        Ok(form)
    }

    /// Hyperparameters of the selected classifier.
    pub fn model_type(&self) -> ModelType {
        match self.classifier {
            Classifier::Svm => ModelType::SVM {
                c: self.svm_c,
                kernel: self.kernel,
                gamma: self.gamma,
            },
            Classifier::LogisticRegression => ModelType::LogisticRegression {
                c: self.lr_c,
                max_iter: self.max_iter,
            },
            Classifier::RandomForest => ModelType::RandomForest {
                n_estimators: self.n_estimators,
                max_depth: self.max_depth,
                bootstrap: self.bootstrap,
            },
        }
    }

    pub fn wants_metric(&self, metric: MetricPlot) -> bool {
        self.metrics.contains(&metric)
    }
}

fn parse_choice<T>(field: &'static str, value: &str) -> Result<T, FormError>
where
    T: FromStr<Err = String>,
{
    value.parse().map_err(|reason| FormError::Invalid {
        field,
        value: value.to_string(),
        reason,
    })
}

fn parse_in_range<T>(field: &'static str, value: &str, (min, max): (T, T)) -> Result<T, FormError>
where
    T: FromStr + PartialOrd + fmt::Display + Copy,
    T::Err: fmt::Display,
{
    let parsed: T = value.parse().map_err(|e: T::Err| FormError::Invalid {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    // NaN fails both comparisons and lands here too
    if !(parsed >= min && parsed <= max) {
        return Err(FormError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(parsed)
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, FormError> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        _ => Err(FormError::Invalid {
            field,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
