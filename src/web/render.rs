//! HTML rendering of the query page.
//!
//! The page is built in code, so there is no template file to load or fail
//! on at runtime. Every user- or engine-supplied string goes through
//! [`escape_html`].

use super::page::PageModel;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; }
textarea { font-family: monospace; width: 100%; }
table { border-collapse: collapse; margin-top: 1em; }
th, td { border: 1px solid #ccc; padding: 0.25em 0.5em; text-align: left; }
td.null { color: #999; font-style: italic; }
p.empty { color: #666; }
";

/// Renders the full query page.
pub fn render_page(page: &PageModel) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Duckie</title>\n");
    html.push_str(&format!("<style>\n{STYLE}</style>\n"));
    html.push_str("</head>\n<body>\n<h1>Duckie</h1>\n");

    render_source_picker(&mut html, page);
    render_query_form(&mut html, page);
    render_results(&mut html, page);

    html.push_str("</body>\n</html>\n");
    html
}

fn render_source_picker(html: &mut String, page: &PageModel) {
    html.push_str("<form method=\"get\" action=\"/query\">\n");
    html.push_str("<label for=\"datasource\">Data source</label>\n");
    html.push_str("<select id=\"datasource\" name=\"datasource\">\n");
    html.push_str("<option value=\"\">-- choose --</option>\n");
    for name in &page.data_sources {
        let selected = if *name == page.selected_source {
            " selected"
        } else {
            ""
        };
        let name = escape_html(name);
        html.push_str(&format!(
            "<option value=\"{name}\"{selected}>{name}</option>\n"
        ));
    }
    html.push_str("</select>\n<button type=\"submit\">Describe</button>\n</form>\n");
}

fn render_query_form(html: &mut String, page: &PageModel) {
    html.push_str("<form method=\"post\" action=\"/query\">\n");
    html.push_str(&format!(
        "<input type=\"hidden\" name=\"datasource\" value=\"{}\">\n",
        escape_html(&page.selected_source)
    ));
    html.push_str(&format!(
        "<textarea name=\"query\" rows=\"6\">{}</textarea>\n",
        escape_html(&page.query)
    ));
    html.push_str("<button type=\"submit\">Run</button>\n</form>\n");
}

fn render_results(html: &mut String, page: &PageModel) {
    html.push_str("<table>\n<thead>\n<tr>");
    for column in &page.columns {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in &page.results {
        html.push_str("<tr>");
        for value in row {
            if value.is_null() {
                html.push_str("<td class=\"null\">NULL</td>");
            } else {
                html.push_str(&format!(
                    "<td>{}</td>",
                    escape_html(&value.to_display_string())
                ));
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");

    if page.is_empty() {
        html.push_str("<p class=\"empty\">No rows returned</p>\n");
    }
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
