//! HTML report, served by the web interface and written by `--format html`

use super::{format_delta, format_share, format_value, truncate, yes_no};
use crate::compare::{ComparisonReport, Metric};

/// Render a report as a standalone HTML page
pub fn render_html(report: &ComparisonReport) -> String {
    let mut rows = String::new();
    for row in &report.rows {
        let link = format!(
            r#"<a href="{url}" target="_blank" rel="noopener">{title}</a>"#,
            url = html_escape(&row.url),
            title = html_escape(if row.title.is_empty() { &row.url } else { &row.title }),
        );

        match (row.features(), row.error()) {
            (Some(f), _) => {
                let h = &f.heading_counts;
                let baseline = if report.baseline_rank == Some(row.rank) {
                    r#" class="baseline""#
                } else {
                    ""
                };
                rows.push_str(&format!(
                    r#"<tr{baseline}><td>{rank}</td><td>{link}<div class="sub">{h1}</div></td><td>{ptype}</td><td class="num">{words}</td><td class="num">{h1c}</td><td class="num">{h2c}</td><td class="num">{h3c}</td><td class="num">{h4c}</td><td class="num">{h5c}</td><td class="num">{h6c}</td><td>{schema}</td><td>{title}</td><td>{meta}</td><td{js_class}>{js}</td><td class="num">{rich:.1}</td></tr>"#,
                    rank = row.rank,
                    h1 = html_escape(f.h1.as_deref().unwrap_or("")),
                    ptype = row.page_type.label(),
                    words = f.word_count,
                    h1c = h.h1,
                    h2c = h.h2,
                    h3c = h.h3,
                    h4c = h.h4,
                    h5c = h.h5,
                    h6c = h.h6,
                    schema = yes_no(f.has_schema_markup),
                    title = yes_no(f.has_title),
                    meta = yes_no(f.has_meta_description),
                    js_class = if f.js_rendering_suspected { r#" class="flag""# } else { "" },
                    js = yes_no(f.js_rendering_suspected),
                    rich = f.richness_score,
                ));
            }
            (None, error) => {
                let reason = error.map(|e| e.to_string()).unwrap_or_default();
                rows.push_str(&format!(
                    r#"<tr class="unavailable"><td>{rank}</td><td>{link}</td><td>{ptype}</td><td colspan="12">unavailable ({reason})</td></tr>"#,
                    rank = row.rank,
                    ptype = row.page_type.label(),
                    reason = html_escape(&reason),
                ));
            }
        }
    }

    let table = if report.rows.is_empty() {
        r#"<p class="empty">No search results.</p>"#.to_string()
    } else {
        format!(
            r#"<table><thead><tr><th>#</th><th>Page</th><th>Type</th><th>Words</th><th>H1</th><th>H2</th><th>H3</th><th>H4</th><th>H5</th><th>H6</th><th>Schema</th><th>Title</th><th>Meta</th><th title="Very little visible text; may need JavaScript">JS</th><th>Richness</th></tr></thead><tbody>{rows}</tbody></table>"#
        )
    };

    let content = format!(
        r#"<div class="container">
<h2>Pages ranking for &ldquo;{query}&rdquo;</h2>
<p class="sub">Generated {generated}</p>
{table}
{details}
{aggregates}
{coverage}
{sections}
{unavailable}
<p><a href="/">New search</a></p>
</div>"#,
        query = html_escape(&report.query),
        generated = report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        details = render_details(report),
        aggregates = render_aggregates(report),
        coverage = render_coverage(report),
        sections = render_section_order(report),
        unavailable = render_unavailable(report),
    );

    build_page(&format!("Comparison: {}", report.query), &content)
}

fn render_aggregates(report: &ComparisonReport) -> String {
    let Some(aggregates) = &report.aggregates else {
        if report.rows.is_empty() {
            return String::new();
        }
        return r#"<p class="empty">No page could be loaded; nothing to aggregate.</p>"#.to_string();
    };

    let baseline_delta = |metric: Metric| -> String {
        let deltas: Vec<String> = report
            .deltas
            .iter()
            .filter(|d| Some(d.rank) != report.baseline_rank)
            .filter_map(|d| d.get(metric).map(|v| format!("#{} {}", d.rank, format_delta(v))))
            .collect();
        deltas.join(", ")
    };

    let metric_rows: String = aggregates
        .metrics
        .iter()
        .map(|s| {
            format!(
                r#"<tr><td>{label}</td><td class="num">{mean}</td><td class="num">{max}</td><td>{deltas}</td></tr>"#,
                label = s.metric.label(),
                mean = format_value(s.mean),
                max = format_value(s.max),
                deltas = baseline_delta(s.metric),
            )
        })
        .collect();

    let authority = if report.authority_driven() {
        r#"<p class="warn">The top page is a homepage or geo page; it likely ranks on domain authority, not content.</p>"#
    } else {
        ""
    };

    format!(
        r#"<h3>Aggregates over {pages} of {total} pages</h3>
{authority}
<table><thead><tr><th>Metric</th><th>Mean</th><th>Max</th><th>Delta vs baseline (#{baseline})</th></tr></thead><tbody>{metric_rows}</tbody></table>
<p>Schema markup on {schema} of pages, title on {title}, meta description on {meta}.</p>"#,
        pages = aggregates.pages,
        total = report.rows.len(),
        baseline = report.baseline_rank.unwrap_or_default(),
        schema = format_share(aggregates.schema_share),
        title = format_share(aggregates.title_share),
        meta = format_share(aggregates.meta_description_share),
    )
}

fn render_details(report: &ComparisonReport) -> String {
    let rows: String = report
        .extracted()
        .map(|(row, f)| {
            let js = if f.js_rendering_suspected {
                format!(r#"<div class="flag">Only {} visible words; may need JavaScript to render</div>"#, f.word_count)
            } else {
                String::new()
            };
            format!(
                r#"<tr><td>{rank}</td><td>{schema}</td><td>{meta}</td><td>{cta}</td><td>{tech}</td><td class="num">{links}</td><td>{outline}{js}</td></tr>"#,
                rank = row.rank,
                schema = html_escape(&f.schema_types.join(", ")),
                meta = html_escape(&truncate(f.meta_description.as_deref().unwrap_or(""), 160)),
                cta = html_escape(f.hero.cta_text.as_deref().unwrap_or("")),
                tech = html_escape(&f.technologies.join(", ")),
                links = f.internal_links.len(),
                outline = html_escape(&f.h2s.join(" | ")),
            )
        })
        .collect();

    if rows.is_empty() {
        return String::new();
    }
    format!(
        r#"<h3>Page details</h3>
<table><thead><tr><th>#</th><th>Schema types</th><th>Meta description</th><th>Hero CTA</th><th>Technologies</th><th>Internal links</th><th>H2 outline</th></tr></thead><tbody>{rows}</tbody></table>"#
    )
}

fn render_section_order(report: &ComparisonReport) -> String {
    let order = &report.section_order;
    if order.is_empty() {
        return String::new();
    }

    let header: String = order
        .ranks
        .iter()
        .map(|rank| format!("<th>#{rank}</th>"))
        .collect();
    let rows: String = order
        .rows
        .iter()
        .enumerate()
        .map(|(position, headings)| {
            let cells: String = headings
                .iter()
                .map(|h| format!("<td>{}</td>", html_escape(h.as_deref().unwrap_or(""))))
                .collect();
            format!(r#"<tr><td class="num">{}</td>{cells}</tr>"#, position + 1)
        })
        .collect();

    format!(
        r#"<h3>Section order</h3>
<table><thead><tr><th>H2</th>{header}</tr></thead><tbody>{rows}</tbody></table>"#
    )
}

fn render_coverage(report: &ComparisonReport) -> String {
    if report.coverage.is_empty() {
        if report.aggregates.is_some() {
            return r#"<p class="empty">No service or procedure pages among the results; coverage skipped.</p>"#
                .to_string();
        }
        return String::new();
    }

    let rows: String = report
        .coverage
        .iter()
        .map(|c| {
            format!(
                r#"<tr><td>{label}</td><td class="num">{count} of {total}</td><td class="num">{pct:.1}%</td><td>{priority}</td></tr>"#,
                label = c.element.label(),
                count = c.count,
                total = c.total,
                pct = c.percentage,
                priority = c.priority,
            )
        })
        .collect();

    format!(
        r#"<h3>Content coverage across {qualifying} service/procedure pages</h3>
<table><thead><tr><th>Element</th><th>Pages</th><th>Share</th><th>Priority</th></tr></thead><tbody>{rows}</tbody></table>"#,
        qualifying = report.qualifying_pages,
    )
}

fn render_unavailable(report: &ComparisonReport) -> String {
    let items: String = report
        .unavailable()
        .map(|(row, error)| {
            format!(
                "<li>#{} {} ({})</li>",
                row.rank,
                html_escape(&row.url),
                html_escape(&error.to_string())
            )
        })
        .collect();

    if items.is_empty() {
        return String::new();
    }
    format!("<h3>Unavailable pages</h3><ul>{items}</ul>")
}

/// Wrap page content in the shared document shell
pub(crate) fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | pagecompare</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fafafa;}}
.top{{background:#1a1a1a;color:#fff;padding:12px 24px;}}
.top h1{{font-size:18px;font-weight:600;}}
.container{{max-width:1100px;margin:0 auto;padding:24px;}}
h2{{margin-bottom:8px;}}
h3{{margin:24px 0 8px;}}
table{{width:100%;border-collapse:collapse;background:#fff;font-size:13px;}}
th,td{{border:1px solid #e0e0e0;padding:6px 8px;text-align:left;vertical-align:top;}}
th{{background:#f5f5f5;}}
td.num{{text-align:right;}}
tr.baseline{{background:#e8f5e9;}}
tr.unavailable{{color:#888;background:#fafafa;}}
.sub{{color:#888;font-size:12px;margin-top:2px;}}
.empty{{color:#888;padding:24px 0;}}
.flag{{color:#c62828;font-weight:600;}}
.warn{{background:#fff8e1;border:1px solid #ffecb3;padding:8px 12px;border-radius:4px;font-size:13px;color:#795548;margin-bottom:12px;}}
.error{{background:#fce4ec;border:1px solid #f8bbd0;padding:8px 12px;border-radius:4px;color:#c62828;margin-bottom:12px;}}
form input[type=text]{{padding:8px;font-size:15px;width:60%;}}
form button{{padding:8px 16px;font-size:15px;}}
a{{color:#0066cc;}}
</style>
</head>
<body>
<div class="top"><h1>pagecompare</h1></div>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Escape text for use in HTML content and attribute values
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
