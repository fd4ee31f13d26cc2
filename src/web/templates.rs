use crate::report::{build_page, html_escape};

/// Render the search form, optionally with an error banner and the
/// previously entered keyword.
pub fn render_form(keyword: &str, error: Option<&str>) -> String {
    let banner = error
        .map(|e| format!(r#"<div class="error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();

    let content = format!(
        r#"<div class="container">
<h2>Compare the pages ranking for a keyword</h2>
<p class="sub" style="margin-bottom:16px;">Fetches the top organic results and compares headings, word counts, schema markup and content elements.</p>
{banner}
<form method="post" action="/analyze">
    <input type="text" name="keyword" value="{keyword}" placeholder="e.g. knee replacement" autofocus>
    <button type="submit">Analyze</button>
</form>
</div>"#,
        keyword = html_escape(keyword),
    );

    build_page("Search", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_posts_keyword() {
        let html = render_form("", None);
        assert!(html.contains(r#"action="/analyze""#));
        assert!(html.contains(r#"name="keyword""#));
        assert!(!html.contains(r#"class="error""#));
    }

    #[test]
    fn test_form_shows_escaped_error() {
        let html = render_form("\"lasik\"", Some("Authentication error: <missing>"));
        assert!(html.contains("Authentication error: &lt;missing&gt;"));
        assert!(html.contains(r#"value="&quot;lasik&quot;""#));
    }
}
