//! Lightweight HTML highlighter for the snippet panel.
//!
//! Source is split into comments, string literals, numbers, keywords and
//! plain text, escaped, and wrapped in one `<span class="line">` per line.
//! The themed wrapper carries a `background-color` that is stripped before
//! returning so the page container controls the background.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::ports::SyntaxHighlighter;

const THEME_STYLE: &str = "background-color: #0d1117; color: #e6edf3";

static INLINE_BACKGROUND: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"background-color:\s*#[0-9a-fA-F]{3,8};?\s*"));

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "type", "use", "where",
    "while",
];

const SQL_KEYWORDS: &[&str] = &[
    "AND", "AUTOINCREMENT", "BIGINT", "BY", "CASCADE", "CREATE", "DELETE", "DESC", "FROM", "INDEX",
    "INSERT", "INTEGER", "INTO", "KEY", "NOT", "NULL", "ON", "ORDER", "PRIMARY", "REFERENCES",
    "SELECT", "SET", "TABLE", "TEXT", "UNIQUE", "UPDATE", "VALUES", "WHERE",
];

const TOML_KEYWORDS: &[&str] = &["true", "false"];

#[derive(Debug, Clone, Copy)]
struct Grammar {
    keywords: &'static [&'static str],
    line_comment: &'static str,
    case_insensitive: bool,
}

fn grammar_for(language: &str) -> Option<Grammar> {
    match language.to_ascii_lowercase().as_str() {
        "rust" | "rs" => Some(Grammar {
            keywords: RUST_KEYWORDS,
            line_comment: "//",
            case_insensitive: false,
        }),
        "sql" => Some(Grammar {
            keywords: SQL_KEYWORDS,
            line_comment: "--",
            case_insensitive: true,
        }),
        "toml" => Some(Grammar {
            keywords: TOML_KEYWORDS,
            line_comment: "#",
            case_insensitive: false,
        }),
        _ => None,
    }
}

/// Keyword-level highlighter for `rust`, `sql` and `toml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlHighlighter;

impl SyntaxHighlighter for HtmlHighlighter {
    fn highlight(&self, source: &str, language: &str) -> Option<String> {
        let grammar = grammar_for(language)?;
        let lines: Vec<String> = source
            .lines()
            .map(|line| format!("<span class=\"line\">{}</span>", highlight_line(line, grammar)))
            .collect();
        let html = format!(
            "<pre class=\"highlight\" style=\"{THEME_STYLE}\" data-language=\"{}\"><code>{}</code></pre>",
            escape(language),
            lines.join("\n")
        );
        strip_background(&html)
    }
}

fn strip_background(html: &str) -> Option<String> {
    let pattern = INLINE_BACKGROUND.as_ref().ok()?;
    Some(pattern.replace_all(html, "").into_owned())
}

fn highlight_line(line: &str, grammar: Grammar) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(ch) = rest.chars().next() {
        if rest.starts_with(grammar.line_comment) {
            push_span(&mut out, "comment", rest);
            break;
        }
        let taken = if ch == '"' || ch == '\'' {
            let end = string_end(rest, ch);
            push_span(&mut out, "string", &rest[..end]);
            end
        } else if ch.is_ascii_digit() {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            push_span(&mut out, "number", &rest[..end]);
            end
        } else if ch.is_alphabetic() || ch == '_' {
            let end = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let word = &rest[..end];
            if is_keyword(word, grammar) {
                push_span(&mut out, "keyword", word);
            } else {
                out.push_str(&escape(word));
            }
            end
        } else {
            out.push_str(&escape(&rest[..ch.len_utf8()]));
            ch.len_utf8()
        };
        rest = &rest[taken..];
    }
    out
}

/// Byte length of the quoted literal at the start of `text`, honouring
/// backslash escapes. Unterminated literals run to the end of the line.
fn string_end(text: &str, quote: char) -> usize {
    let mut escaped = false;
    for (index, ch) in text.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return index + ch.len_utf8();
        }
    }
    text.len()
}

fn is_keyword(word: &str, grammar: Grammar) -> bool {
    if grammar.case_insensitive {
        grammar
            .keywords
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(word))
    } else {
        grammar.keywords.contains(&word)
    }
}

fn push_span(out: &mut String, class: &str, text: &str) {
    out.push_str("<span class=\"");
    out.push_str(class);
    out.push_str("\">");
    out.push_str(&escape(text));
    out.push_str("</span>");
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unknown_languages_are_not_highlighted() {
        assert!(HtmlHighlighter.highlight("print(1)", "python").is_none());
    }

    #[rstest]
    fn inline_background_is_removed() {
        let html = HtmlHighlighter.highlight("let x = 1;", "rust").expect("html");
        assert!(!html.contains("background-color"));
        assert!(html.contains("color: #e6edf3"));
    }

    #[rstest]
    #[case("rust", "let user = 1;", "<span class=\"keyword\">let</span> user = <span class=\"number\">1</span>;")]
    #[case("sql", "select id from users", "<span class=\"keyword\">select</span> id <span class=\"keyword\">from</span> users")]
    #[case("toml", "# note", "<span class=\"comment\"># note</span>")]
    fn marks_tokens(#[case] language: &str, #[case] source: &str, #[case] expected: &str) {
        let html = HtmlHighlighter.highlight(source, language).expect("html");
        assert!(html.contains(expected), "{html}");
    }

    #[rstest]
    fn escapes_markup_inside_strings() {
        let html = HtmlHighlighter
            .highlight(r#"let s = "<b>\"x\"</b>";"#, "rust")
            .expect("html");
        assert!(html.contains("<span class=\"string\">&quot;&lt;b&gt;\\&quot;x\\&quot;&lt;/b&gt;&quot;</span>"));
    }

    #[rstest]
    fn one_span_per_line() {
        let html = HtmlHighlighter.highlight("a\nb\nc", "sql").expect("html");
        assert_eq!(html.matches("<span class=\"line\">").count(), 3);
    }
}
