//! Port for turning source snippets into highlighted HTML.

/// Renders source code as HTML.
///
/// Implementations must not panic; `None` means "show the plain source".
#[cfg_attr(test, mockall::automock)]
pub trait SyntaxHighlighter: Send + Sync {
    /// Highlight `source` written in `language`.
    fn highlight(&self, source: &str, language: &str) -> Option<String>;
}

/// Highlighter that only escapes the source inside a `<pre>` block.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSyntaxHighlighter;

impl SyntaxHighlighter for FixtureSyntaxHighlighter {
    fn highlight(&self, source: &str, _language: &str) -> Option<String> {
        let escaped = source
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        Some(format!("<pre><code>{escaped}</code></pre>"))
    }
}
