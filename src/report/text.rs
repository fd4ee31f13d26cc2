//! Plain-text report for the terminal

use super::{format_delta, format_share, format_value, truncate, yes_no};
use crate::compare::{ComparisonReport, Metric};

/// Render a report as aligned plain text
pub fn render_text(report: &ComparisonReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Page structure comparison for \"{}\"\n", report.query));
    out.push_str(&format!(
        "Generated {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if report.rows.is_empty() {
        out.push_str("No search results.\n");
        return out;
    }

    out.push_str(&format!(
        "{:>4}  {:<18} {:>6} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3}  {:<6} {:<5} {:<4} {:<3} {:>8}  {}\n",
        "Rank", "Type", "Words", "H1", "H2", "H3", "H4", "H5", "H6", "Schema", "Title", "Meta", "JS",
        "Richness", "URL"
    ));

    for row in &report.rows {
        match (row.features(), row.error()) {
            (Some(f), _) => {
                let h = &f.heading_counts;
                out.push_str(&format!(
                    "{:>4}  {:<18} {:>6} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3}  {:<6} {:<5} {:<4} {:<3} {:>8}  {}\n",
                    row.rank,
                    row.page_type.label(),
                    f.word_count,
                    h.h1,
                    h.h2,
                    h.h3,
                    h.h4,
                    h.h5,
                    h.h6,
                    yes_no(f.has_schema_markup),
                    yes_no(f.has_title),
                    yes_no(f.has_meta_description),
                    yes_no(f.js_rendering_suspected),
                    format!("{:.1}", f.richness_score),
                    row.url
                ));
            }
            (None, error) => {
                let reason = error.map(|e| e.to_string()).unwrap_or_default();
                out.push_str(&format!(
                    "{:>4}  {:<18} {:<62}  {}\n",
                    row.rank,
                    row.page_type.label(),
                    format!("unavailable ({reason})"),
                    row.url
                ));
            }
        }
    }

    let Some(aggregates) = &report.aggregates else {
        out.push_str("\nNo page could be loaded; nothing to aggregate.\n");
        push_unavailable(&mut out, report);
        return out;
    };

    push_details(&mut out, report);

    out.push_str(&format!(
        "\nAggregates over {} of {} pages\n",
        aggregates.pages,
        report.rows.len()
    ));
    for summary in &aggregates.metrics {
        out.push_str(&format!(
            "  {:<10} mean {:>8}  max {:>8}\n",
            summary.metric.label(),
            format_value(summary.mean),
            format_value(summary.max)
        ));
    }
    out.push_str(&format!(
        "  Schema markup on {}, title on {}, meta description on {}\n",
        format_share(aggregates.schema_share),
        format_share(aggregates.title_share),
        format_share(aggregates.meta_description_share)
    ));

    if let Some(baseline) = report.baseline() {
        out.push_str(&format!(
            "\nBaseline: rank {} ({})\n",
            baseline.rank, baseline.url
        ));
        if report.authority_driven() {
            out.push_str(&format!(
                "  The top page is a {}; it likely ranks on domain authority, not content.\n",
                baseline.page_type.label()
            ));
        }
        for delta in report.deltas.iter().filter(|d| d.rank != baseline.rank) {
            let parts: Vec<String> = [Metric::WordCount, Metric::TotalHeadings, Metric::H2, Metric::RichnessScore]
                .iter()
                .filter_map(|metric| {
                    delta
                        .get(*metric)
                        .map(|value| format!("{} {}", metric.label(), format_delta(value)))
                })
                .collect();
            out.push_str(&format!("  rank {:>2} vs baseline: {}\n", delta.rank, parts.join(", ")));
        }
    }

    if report.coverage.is_empty() {
        out.push_str("\nNo service or procedure pages among the results; coverage skipped.\n");
    } else {
        out.push_str(&format!(
            "\nContent coverage across {} service/procedure pages\n",
            report.qualifying_pages
        ));
        for c in &report.coverage {
            out.push_str(&format!(
                "  {:<22} {:>2} of {:<2} {:>6}%  {}\n",
                c.element.label(),
                c.count,
                c.total,
                format!("{:.1}", c.percentage),
                c.priority
            ));
        }
    }

    if !report.differentiators.is_empty() {
        let labels: Vec<&str> = report.differentiators.iter().map(|e| e.label()).collect();
        out.push_str(&format!("\nBaseline differentiators: {}\n", labels.join(", ")));
    }

    if !report.gaps.is_empty() {
        let labels: Vec<&str> = report.gaps.iter().map(|e| e.label()).collect();
        out.push_str(&format!("Gap opportunities: {}\n", labels.join(", ")));
    }

    push_section_order(&mut out, report);
    push_unavailable(&mut out, report);
    out
}

/// Per-page notes that do not fit the table
fn push_details(out: &mut String, report: &ComparisonReport) {
    out.push_str("\nPage details\n");
    for (row, f) in report.extracted() {
        out.push_str(&format!(
            "  #{} {}\n",
            row.rank,
            f.title.as_deref().unwrap_or("(no title)")
        ));
        if f.js_rendering_suspected {
            out.push_str(&format!(
                "      Only {} visible words; the page may need JavaScript to render\n",
                f.word_count
            ));
        }
        if !f.schema_types.is_empty() {
            out.push_str(&format!("      Schema types: {}\n", f.schema_types.join(", ")));
        }
        if let Some(meta) = &f.meta_description {
            out.push_str(&format!("      Meta description: {}\n", truncate(meta, 100)));
        }
        if let Some(cta) = &f.hero.cta_text {
            out.push_str(&format!("      Hero CTA: {cta}\n"));
        }
        if !f.technologies.is_empty() {
            out.push_str(&format!("      Technologies: {}\n", f.technologies.join(", ")));
        }
        if !f.h2s.is_empty() {
            out.push_str(&format!("      H2 outline: {}\n", f.h2s.join(" | ")));
        }
        out.push_str(&format!("      Internal links: {}\n", f.internal_links.len()));
    }
}

fn push_section_order(out: &mut String, report: &ComparisonReport) {
    let order = &report.section_order;
    if order.is_empty() {
        return;
    }

    out.push_str("\nSection order (H2 by position)\n");
    out.push_str("  #  ");
    for rank in &order.ranks {
        out.push_str(&format!(" {:<28}", format!("rank {rank}")));
    }
    out.push('\n');
    for (position, headings) in order.rows.iter().enumerate() {
        out.push_str(&format!("  {:<3}", position + 1));
        for heading in headings {
            out.push_str(&format!(
                " {:<28}",
                truncate(heading.as_deref().unwrap_or("-"), 28)
            ));
        }
        out.push('\n');
    }
}

fn push_unavailable(out: &mut String, report: &ComparisonReport) {
    let failed: Vec<_> = report.unavailable().collect();
    if failed.is_empty() {
        return;
    }

    out.push_str("\nUnavailable pages\n");
    for (row, error) in failed {
        out.push_str(&format!("  {:>2}  {}  {}\n", row.rank, row.url, error));
    }
}
