//! Markdown rendering shared by every page that shows authored content.

use pulldown_cmark::{html, Options, Parser};

/// GitHub-flavoured extensions authors rely on in proposal documents.
fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Render `markdown` to an HTML fragment.
///
/// Rendering never fails: malformed input is rendered best-effort, and raw
/// HTML blocks in the source are passed through unchanged.
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() + markdown.len() / 2);
    html::push_html(&mut out, parser);
    out
}
