//! HTML rendering of a [`RenderDescription`].
use maud::{html, Markup, PreEscaped, DOCTYPE};

use sporeprint_classifiers::config::{
    GammaPolicy, SvmKernel, C_RANGE, C_STEP, MAX_DEPTH_RANGE, MAX_ITER_RANGE, N_ESTIMATORS_RANGE,
    N_ESTIMATORS_STEP,
};
use sporeprint_classifiers::report::{plot_div, MetricPlot, PLOTLY_JS_CDN};

use super::{
    Classifier, ClassificationResults, FormState, RawDataTable, RenderDescription,
    RAW_DATA_HEADING, TAGLINE, TITLE,
};

const PAGE_CSS: &str = "
body { margin: 0; font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; color: #262730; display: flex; }
aside { width: 300px; min-height: 100vh; padding: 24px; background: #f0f2f6; box-sizing: border-box; }
aside h2 { font-size: 1.1em; margin-top: 24px; }
aside label { display: block; margin: 12px 0 4px; }
aside input[type=number], aside select { width: 100%; box-sizing: border-box; }
main { flex: 1; padding: 24px 48px; }
.metric { font-size: 1.1em; margin: 4px 0; }
.error { color: #b00020; white-space: pre-wrap; }
table { border-collapse: collapse; font-size: 0.85em; }
th, td { border: 1px solid #e6e9ef; padding: 2px 8px; text-align: right; }
";

const AUTO_SUBMIT: &str = "this.form.submit()";

fn layout(title: &str, sidebar: Markup, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
                script src=(PLOTLY_JS_CDN) {}
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                aside { (sidebar) }
                main { (body) }
            }
        }
    }
}

/// Full dashboard page.
pub fn render(description: &RenderDescription) -> Markup {
    let body = html! {
        h1 { (TITLE) }
        p { (TAGLINE) }
        @if let Some(results) = &description.results {
            (render_results(results))
        }
        @if let Some(raw) = &description.raw_data {
            (render_raw_data(raw))
        }
    };
    layout(TITLE, sidebar(&description.form), body)
}

/// Page shown when a request could not be served.
pub fn render_error(heading: &str, message: &str) -> Markup {
    let body = html! {
        h1 { (TITLE) }
        h2 { (heading) }
        p class="error" { (message) }
        p { a href="/" { "Back to the dashboard" } }
    };
    layout(TITLE, html! { h1 { (TITLE) } p { (TAGLINE) } }, body)
}

fn sidebar(form: &FormState) -> Markup {
    html! {
        h1 { (TITLE) }
        p { (TAGLINE) }
        form method="get" action="/" {
            h2 { "Choose classifier" }
            label for="classifier" { "Classifier" }
            select id="classifier" name="classifier" onchange=(AUTO_SUBMIT) {
                @for classifier in Classifier::ALL {
                    option value=(classifier.key()) selected[classifier == form.classifier] {
                        (classifier.label())
                    }
                }
            }

            h2 { "Model Hyperparameters" }
            (hyperparameters(form))

            label for="metrics" { "What metrics to plot?" }
            select id="metrics" name="metrics" multiple {
                @for metric in MetricPlot::ALL {
                    option value=(metric.key()) selected[form.wants_metric(metric)] {
                        (metric.label())
                    }
                }
            }

            p { button type="submit" name="classify" value="true" { "Classify" } }

            label {
                input type="checkbox" name="show_raw_data" value="true"
                    checked[form.show_raw_data] onchange=(AUTO_SUBMIT);
                " Show raw data"
            }
        }
    }
}

/// Widgets of the selected classifier plus hidden copies of the other values.
fn hyperparameters(form: &FormState) -> Markup {
    html! {
        @match form.classifier {
            Classifier::Svm => {
                (number_input("C", "C (Regularization parameter)", form.svm_c, C_RANGE, C_STEP))
                (radio("kernel", "Kernel", &[SvmKernel::Rbf, SvmKernel::Linear], &form.kernel))
                (radio("gamma", "Gamma (Kernel coefficient)", &[GammaPolicy::Scale, GammaPolicy::Auto], &form.gamma))
            }
            Classifier::LogisticRegression => {
                (number_input("C_LR", "C (Regularization parameter)", form.lr_c, C_RANGE, C_STEP))
                label for="max_iter" { "Maximum number of iterations" }
                input type="range" id="max_iter" name="max_iter" min=(MAX_ITER_RANGE.0)
                    max=(MAX_ITER_RANGE.1) value=(form.max_iter)
                    oninput="this.nextElementSibling.value = this.value";
                output { (form.max_iter) }
            }
            Classifier::RandomForest => {
                (number_input("n_estimators", "The number of trees in the forest", form.n_estimators, N_ESTIMATORS_RANGE, N_ESTIMATORS_STEP))
                (number_input("max_depth", "The maximum depth of the tree", form.max_depth, MAX_DEPTH_RANGE, 1))
                (radio("bootstrap", "Bootstrap samples when building trees", &[true, false], &form.bootstrap))
            }
        }
        @if form.classifier != Classifier::Svm {
            input type="hidden" name="C" value=(form.svm_c);
            input type="hidden" name="kernel" value=(form.kernel);
            input type="hidden" name="gamma" value=(form.gamma);
        }
        @if form.classifier != Classifier::LogisticRegression {
            input type="hidden" name="C_LR" value=(form.lr_c);
            input type="hidden" name="max_iter" value=(form.max_iter);
        }
        @if form.classifier != Classifier::RandomForest {
            input type="hidden" name="n_estimators" value=(form.n_estimators);
            input type="hidden" name="max_depth" value=(form.max_depth);
            input type="hidden" name="bootstrap" value=(form.bootstrap);
        }
    }
}

fn number_input<T: std::fmt::Display>(
    name: &str,
    label: &str,
    value: T,
    (min, max): (T, T),
    step: T,
) -> Markup {
    html! {
        label for=(name) { (label) }
        input type="number" id=(name) name=(name) min=(min) max=(max) step=(step) value=(value);
    }
}

fn radio<T: std::fmt::Display + PartialEq>(name: &str, label: &str, options: &[T], current: &T) -> Markup {
    html! {
        fieldset {
            legend { (label) }
            @for option in options {
                label {
                    input type="radio" name=(name) value=(option) checked[option == current];
                    " " (option)
                }
            }
        }
    }
}

fn render_results(results: &ClassificationResults) -> Markup {
    html! {
        section id="results" {
            h2 { (results.heading) }
            p class="metric" { "Accuracy: " (format!("{:.2}", results.accuracy)) }
            p class="metric" { "Precision: " (format!("{:.2}", results.precision)) }
            p class="metric" { "Recall: " (format!("{:.2}", results.recall)) }
            @for (idx, chart) in results.charts.iter().enumerate() {
                div class="chart" {
                    h3 { (chart.title()) }
                    (plot_div(&chart.plot, &format!("chart-{}", idx)))
                    @if let Some(caption) = &chart.caption {
                        (caption)
                    }
                }
            }
        }
    }
}

fn render_raw_data(raw: &RawDataTable) -> Markup {
    html! {
        section id="raw-data" {
            h2 { (RAW_DATA_HEADING) }
            (raw_data_table(raw))
        }
    }
}

/// The encoded dataset as an HTML table, preceded by its shape.
pub fn raw_data_table(raw: &RawDataTable) -> Markup {
    html! {
        p { (raw.nrows()) " rows \u{00D7} " (raw.ncols()) " columns" }
        table {
            thead {
                tr {
                    th {}
                    @for column in &raw.columns { th { (column) } }
                }
            }
            tbody {
                @for (idx, row) in raw.rows.iter().enumerate() {
                    tr {
                        th { (idx) }
                        @for value in row { td { (value) } }
                    }
                }
            }
        }
    }
}
