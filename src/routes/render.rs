//! HTML shell rendering for the page handlers.

use axum::response::Html;

const PAGE_TEMPLATE: &str = include_str!("../../templates/page.html");

/// Render a page body into the shared shell.
#[must_use]
pub fn page(title: &str, body: &str) -> Html<String> {
    page_with_head(title, "", body)
}

/// Render with extra head markup (used for refresh hints).
#[must_use]
pub fn page_with_head(title: &str, head: &str, body: &str) -> Html<String> {
    Html(
        PAGE_TEMPLATE
            .replace("{{TITLE}}", &escape(title))
            .replace("{{HEAD}}", head)
            .replace("{{BODY}}", body),
    )
}

/// Escape untrusted text for HTML interpolation.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
