//! # Report Rendering Module
//!
//! Renders a [`ComparisonReport`] for people (plain text, HTML) and for
//! machines (JSON). Rendering never fails for text and HTML; JSON goes
//! through serde.

mod html;
mod text;

pub use html::{html_escape, render_html};
pub use text::render_text;

pub(crate) use html::build_page;

use std::fmt;

use clap::ValueEnum;

use crate::compare::ComparisonReport;
use crate::error::Result;

/// Output format for a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Aligned plain text
    #[default]
    #[value(alias = "txt")]
    Text,
    /// The whole report as pretty-printed JSON
    Json,
    /// Standalone HTML page
    Html,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        })
    }
}

/// Pretty-printed JSON of the whole report
pub fn render_json(report: &ComparisonReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render a report in the given format
pub fn render(report: &ComparisonReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => render_json(report),
        ReportFormat::Html => Ok(render_html(report)),
    }
}

/// Whole numbers without decimals, everything else with one
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Signed difference, e.g. `+3` or `-120.5`
fn format_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{}", format_value(delta))
    } else {
        format_value(delta)
    }
}

/// Fraction 0..1 as a whole percentage
fn format_share(share: f64) -> String {
    format!("{:.0}%", share * 100.0)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// At most `max` characters, with an ellipsis when cut
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
