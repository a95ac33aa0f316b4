//! One-shot classification from the command line, with an HTML report.
use std::path::Path;

use anyhow::{Context, Result};
use maud::html;
use serde::Serialize;

use sporeprint_classifiers::config::ModelType;
use sporeprint_classifiers::report::{Report, ReportSection};

use crate::config::DashboardConfig;
use crate::dashboard::{page, Dashboard, FormState, RenderDescription, RAW_DATA_HEADING, TITLE};

/// Run the same pipeline the dashboard runs when "Classify" is pressed.
pub fn run_classify(config: &DashboardConfig, form: &FormState) -> Result<RenderDescription> {
    let form = FormState {
        classify: true,
        ..form.clone()
    };
    Dashboard::new(config.clone()).handle(&form)
}

/// The three headline metrics, two decimals each.
pub fn format_metrics(description: &RenderDescription) -> Option<String> {
    description.results.as_ref().map(|results| {
        format!(
            "{}\nAccuracy: {:.2}\nPrecision: {:.2}\nRecall: {:.2}",
            results.heading, results.accuracy, results.precision, results.recall
        )
    })
}

#[derive(Serialize)]
struct RunSummary<'a> {
    config: &'a DashboardConfig,
    model: ModelType,
    form: &'a FormState,
}

/// Write a standalone report of a classify run: overview, charts, optional raw data
/// and the configuration used.
pub fn write_classify_report<P: AsRef<Path>>(
    config: &DashboardConfig,
    description: RenderDescription,
    path: P,
) -> Result<()> {
    let model = description.form.model_type();
    let mut report = Report::new(
        "Sporeprint",
        clap::crate_version!(),
        None,
        &format!("{} Report", model.display_name()),
    );

    /* Section 1: Overview */
    {
        let mut overview_section = ReportSection::new("Overview");
        overview_section.add_content(html! {
            p { (TITLE) ": " (model.display_name()) " fitted on " (config.data.path.display()) "." }
        });
        if let Some(results) = &description.results {
            overview_section.add_content(html! {
                table {
                    tr { th { "Accuracy" } td { (format!("{:.2}", results.accuracy)) } }
                    tr { th { "Precision" } td { (format!("{:.2}", results.precision)) } }
                    tr { th { "Recall" } td { (format!("{:.2}", results.recall)) } }
                }
            });
        }
        report.add_section(overview_section);
    }

    /* Section 2: Charts */
    if let Some(results) = description.results {
        if !results.charts.is_empty() {
            let mut charts_section = ReportSection::new("Metrics");
            for chart in results.charts {
                charts_section.add_content(html! { h3 { (chart.title()) } });
                charts_section.add_plot(chart.plot);
                if let Some(caption) = chart.caption {
                    charts_section.add_content(caption);
                }
            }
            report.add_section(charts_section);
        }
    }

    /* Section 3: Raw data */
    if let Some(raw) = &description.raw_data {
        let mut raw_section = ReportSection::new(RAW_DATA_HEADING);
        raw_section.add_content(page::raw_data_table(raw));
        report.add_section(raw_section);
    }

    /* Section 4: Configuration */
    {
        let summary = RunSummary {
            config,
            model,
            form: &description.form,
        };
        let json = serde_json::to_string_pretty(&summary)?;
        let mut config_section = ReportSection::new("Configuration");
        config_section.add_content(html! {
            pre { code { (json) } }
        });
        report.add_section(config_section);
    }

    report
        .save_to_file(&path)
        .with_context(|| format!("Failed to write report: {}", path.as_ref().display()))?;
    Ok(())
}
