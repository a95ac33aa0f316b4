use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

/// plotly.js bundle loaded by every page that embeds charts.
pub const PLOTLY_JS_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const REPORT_CSS: &str = "
body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 0; color: #262730; }
header { display: flex; align-items: center; gap: 16px; padding: 16px 32px; background: #f0f2f6; }
header img { height: 48px; }
main { padding: 16px 32px; }
section { margin-bottom: 32px; }
h2 { border-bottom: 1px solid #e6e9ef; padding-bottom: 4px; }
table { border-collapse: collapse; margin: 8px 0; }
th, td { border: 1px solid #e6e9ef; padding: 4px 10px; text-align: right; }
.plot { margin: 12px 0; }
footer { padding: 16px 32px; color: #808495; font-size: 0.85em; }
";

/// Embed a chart as an inline `<div>` plus the script that draws it.
///
/// The page must load [`PLOTLY_JS_CDN`] once.
pub fn plot_div(plot: &Plot, div_id: &str) -> Markup {
    html! {
        div class="plot" {
            (PreEscaped(plot.to_inline_html(Some(div_id))))
        }
    }
}

/// A titled block of a [`Report`].
pub struct ReportSection {
    title: String,
    blocks: Vec<Block>,
}

enum Block {
    Content(Markup),
    Plot(Plot),
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn add_content(&mut self, content: Markup) {
        self.blocks.push(Block::Content(content));
    }

    pub fn add_plot(&mut self, plot: Plot) {
        self.blocks.push(Block::Plot(plot));
    }

    pub fn n_plots(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::Plot(_)))
            .count()
    }

    fn render(&self, section_idx: usize) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for (block_idx, block) in self.blocks.iter().enumerate() {
                    @match block {
                        Block::Content(content) => { (content) }
                        Block::Plot(plot) => {
                            (plot_div(plot, &format!("plot-{}-{}", section_idx, block_idx)))
                        }
                    }
                }
            }
        }
    }
}

/// Standalone HTML report made of sections.
pub struct Report {
    software: String,
    version: String,
    logo: Option<String>,
    title: String,
    created: DateTime<Local>,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(software: &str, version: &str, logo: Option<&str>, title: &str) -> Self {
        Report {
            software: software.to_string(),
            version: version.to_string(),
            logo: logo.map(str::to_string),
            title: title.to_string(),
            created: Local::now(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    pub fn render(&self) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_JS_CDN) {}
                    style { (PreEscaped(REPORT_CSS)) }
                }
                body {
                    header {
                        @if let Some(logo) = &self.logo {
                            img src=(logo) alt=(self.software);
                        }
                        h1 { (self.title) }
                    }
                    main {
                        @for (idx, section) in self.sections.iter().enumerate() {
                            (section.render(idx))
                        }
                    }
                    footer {
                        "Generated by " (self.software) " v" (self.version) " on "
                        (self.created.format("%Y-%m-%d %H:%M:%S"))
                    }
                }
            }
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        fs::write(&path, self.render().into_string())?;
        log::info!("Report written to {}", path.as_ref().display());
        Ok(())
    }
}
