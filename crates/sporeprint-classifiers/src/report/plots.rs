use std::fmt;
use std::str::FromStr;

use maud::{html, Markup};
use ndarray::{Array1, Array2};
use plotly::common::{DashType, Line, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{HeatMap, Plot, Scatter};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::ClassifierModel;
use crate::stats::{precision_recall_curve, roc_curve, ConfusionMatrix};

/// Diagnostic charts a user can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricPlot {
    ConfusionMatrix,
    RocCurve,
    PrecisionRecallCurve,
}

impl MetricPlot {
    /// Every chart kind, in the order charts are rendered.
    pub const ALL: [MetricPlot; 3] = [
        MetricPlot::ConfusionMatrix,
        MetricPlot::RocCurve,
        MetricPlot::PrecisionRecallCurve,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetricPlot::ConfusionMatrix => "Confusion Matrix",
            MetricPlot::RocCurve => "ROC Curve",
            MetricPlot::PrecisionRecallCurve => "Precision-Recall Curve",
        }
    }

    /// Form / command line spelling.
    pub fn key(&self) -> &'static str {
        match self {
            MetricPlot::ConfusionMatrix => "confusion_matrix",
            MetricPlot::RocCurve => "roc_curve",
            MetricPlot::PrecisionRecallCurve => "precision_recall_curve",
        }
    }
}

impl fmt::Display for MetricPlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MetricPlot {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "confusion_matrix" | "cm" => Ok(MetricPlot::ConfusionMatrix),
            "roc_curve" | "roc" => Ok(MetricPlot::RocCurve),
            "precision_recall_curve" | "pr_curve" | "pr" => Ok(MetricPlot::PrecisionRecallCurve),
            _ => Err(format!(
                "Unknown metric plot: {}. Valid options are: confusion_matrix, roc_curve, precision_recall_curve",
                s
            )),
        }
    }
}

/// A rendered chart with an optional block of supporting markup.
pub struct Chart {
    pub kind: MetricPlot,
    pub plot: Plot,
    pub caption: Option<Markup>,
}

impl Chart {
    pub fn title(&self) -> &'static str {
        self.kind.label()
    }
}

/// Render every distinct requested chart for a fitted model on the test split.
///
/// Charts come back in `MetricPlot::ALL` order regardless of request order; an empty
/// request yields no charts.
pub fn plot_metrics(
    model: &dyn ClassifierModel,
    x_test: &Array2<f64>,
    y_test: &Array1<usize>,
    requested: &[MetricPlot],
    class_names: [&str; 2],
) -> Result<Vec<Chart>> {
    let wanted: Vec<MetricPlot> = MetricPlot::ALL
        .into_iter()
        .filter(|kind| requested.contains(kind))
        .collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let scores = model.predict_proba(x_test)?;
    let mut charts = Vec::with_capacity(wanted.len());
    for kind in wanted {
        let chart = match kind {
            MetricPlot::ConfusionMatrix => {
                let y_pred = model.predict(x_test)?;
                let cm = ConfusionMatrix::from_predictions(y_test, &y_pred)?;
                Chart {
                    kind,
                    plot: plot_confusion_matrix(&cm, class_names),
                    caption: Some(confusion_table(&cm, class_names)),
                }
            }
            MetricPlot::RocCurve => Chart {
                kind,
                plot: plot_roc_curve(y_test, &scores, model.name())?,
                caption: None,
            },
            MetricPlot::PrecisionRecallCurve => Chart {
                kind,
                plot: plot_precision_recall_curve(y_test, &scores, model.name())?,
                caption: None,
            },
        };
        charts.push(chart);
    }
    Ok(charts)
}

/// Heatmap of true (rows) vs predicted (columns) labels.
pub fn plot_confusion_matrix(cm: &ConfusionMatrix, class_names: [&str; 2]) -> Plot {
    let labels: Vec<String> = class_names.iter().map(|s| s.to_string()).collect();
    let z: Vec<Vec<usize>> = cm.as_rows().iter().map(|row| row.to_vec()).collect();

    let trace = HeatMap::new(labels.clone(), labels, z).name("Count");

    let layout = Layout::new()
        .title("Confusion Matrix")
        .x_axis(Axis::new().title("Predicted label"))
        .y_axis(Axis::new().title("True label"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

fn confusion_table(cm: &ConfusionMatrix, class_names: [&str; 2]) -> Markup {
    let rows = cm.as_rows();
    html! {
        table class="confusion" {
            thead {
                tr {
                    th { "true \\ predicted" }
                    @for name in class_names { th { (name) } }
                }
            }
            tbody {
                @for (i, name) in class_names.iter().enumerate() {
                    tr {
                        th { (name) }
                        @for count in rows[i] { td { (count) } }
                    }
                }
            }
        }
    }
}

pub fn plot_roc_curve(y_test: &Array1<usize>, scores: &Array1<f64>, model_name: &str) -> Result<Plot> {
    let roc = roc_curve(y_test, scores)?;

    let legend = format!("{} (AUC = {:.2})", model_name, roc.auc);
    let curve = Scatter::new(roc.fpr, roc.tpr)
        .mode(Mode::Lines)
        .name(&legend);

    let chance = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("Chance level")
        .line(Line::new().color("grey").dash(DashType::Dash));

    let mut plot = Plot::new();
    plot.add_trace(curve);
    plot.add_trace(chance);
    plot.set_layout(
        Layout::new()
            .title("ROC Curve")
            .x_axis(Axis::new().title("False Positive Rate (Positive label: 1)"))
            .y_axis(Axis::new().title("True Positive Rate (Positive label: 1)")),
    );
    Ok(plot)
}

pub fn plot_precision_recall_curve(
    y_test: &Array1<usize>,
    scores: &Array1<f64>,
    model_name: &str,
) -> Result<Plot> {
    let pr = precision_recall_curve(y_test, scores)?;

    let legend = format!("{} (AP = {:.2})", model_name, pr.average_precision);
    let curve = Scatter::new(pr.recall, pr.precision)
        .mode(Mode::Lines)
        .name(&legend);

    let mut plot = Plot::new();
    plot.add_trace(curve);
    plot.set_layout(
        Layout::new()
            .title("Precision-Recall Curve")
            .x_axis(Axis::new().title("Recall (Positive label: 1)"))
            .y_axis(Axis::new().title("Precision (Positive label: 1)")),
    );
    Ok(plot)
}
