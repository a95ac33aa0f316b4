//! Diagnostic charts and standalone HTML reports.
pub mod plots;
pub mod report;

pub use plots::{plot_metrics, Chart, MetricPlot};
pub use report::{plot_div, Report, ReportSection, PLOTLY_JS_CDN};
