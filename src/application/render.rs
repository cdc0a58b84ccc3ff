//! Markdown rendering for post and practice-area bodies.
//!
//! Content is authored as markdown in the back office and stored alongside
//! the rendered HTML, which is sanitized before persistence so the public
//! surface never serves markup it did not produce.

use comrak::{Options, markdown_to_html};

/// Render markdown to sanitized HTML.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;

    let html = markdown_to_html(markdown, &options);
    ammonia::clean(&html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = render_markdown("# Heading\n\nSome *emphasis*.");
        assert!(html.contains("<h1>Heading</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn strips_script_tags() {
        let html = render_markdown("hello <script>alert(1)</script> world");
        assert!(!html.contains("<script>"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn autolinks_bare_urls() {
        let html = render_markdown("see https://example.com for details");
        assert!(html.contains("<a href=\"https://example.com\""));
    }
}
