// Markup rendering
// Renders the text once with highlight elements around each span.

use crate::models::{Category, Granularity, Span};

pub fn highlight_class(category: Category, granularity: Granularity) -> &'static str {
    match (category, granularity) {
        (Category::Ai, Granularity::Word) => "slop-highlight",
        (Category::Ai, Granularity::Line) => "slop-line-highlight",
        (Category::Human, Granularity::Word) => "slop-human-highlight",
        (Category::Human, Granularity::Line) => "slop-human-line-highlight",
    }
}

/// HTML-escaped `text` with a `<span>` per highlight, tooltips included.
pub fn render_markup(text: &str, spans: &[Span]) -> String {
    render_markup_with(text, spans, true)
}

/// Like [`render_markup`]; without `tooltips` the `title` attribute is left out.
///
/// Expects annotator output (sorted, non-overlapping). Spans that overlap an earlier
/// one or fall outside the text are skipped.
pub fn render_markup_with(text: &str, spans: &[Span], tooltips: bool) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * 64);
    let mut cursor = 0;

    for span in spans {
        if span.start < cursor
            || span.start >= span.end
            || !text.is_char_boundary(span.start)
            || !text.is_char_boundary(span.end)
        {
            continue;
        }
        let Some(inner) = text.get(span.start..span.end) else {
            continue;
        };

        out.push_str(&escape_html(&text[cursor..span.start]));
        let reason = escape_html(&span.reason);
        let title = if tooltips {
            format!(" title=\"{}\"", reason)
        } else {
            String::new()
        };
        out.push_str(&format!(
            "<span class=\"{}\" data-reason=\"{}\"{}>{}</span>",
            highlight_class(span.category, span.granularity),
            reason,
            title,
            escape_html(inner)
        ));
        cursor = span.end;
    }

    out.push_str(&escape_html(&text[cursor..]));
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
mod tests {
    use super::*;

    fn span(start: usize, end: usize, category: Category, granularity: Granularity, reason: &str) -> Span {
        Span {
            start,
            end,
            char_start: start,
            char_end: end,
            category,
            granularity,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_render_wraps_spans() {
        let text = "Moreover, gonna go";
        let spans = vec![
            span(0, 8, Category::Ai, Granularity::Word, "Cliché transition"),
            span(10, 15, Category::Human, Granularity::Word, "Slang"),
        ];
        assert_eq!(
            render_markup(text, &spans),
            "<span class=\"slop-highlight\" data-reason=\"Cliché transition\" title=\"Cliché transition\">Moreover</span>, \
             <span class=\"slop-human-highlight\" data-reason=\"Slang\" title=\"Slang\">gonna</span> go"
        );
    }

    #[test]
    fn test_render_escapes_text_and_reason() {
        let text = "a <b> & \"c\"";
        let spans = vec![span(2, 5, Category::Ai, Granularity::Line, "x<y")];
        let html = render_markup(text, &spans);
        assert!(html.starts_with("a <span class=\"slop-line-highlight\" data-reason=\"x&lt;y\""));
        assert!(html.contains(">&lt;b&gt;</span>"));
        assert!(html.ends_with(" &amp; &quot;c&quot;"));
    }

    #[test]
    fn test_render_without_tooltips() {
        let spans = vec![span(0, 5, Category::Ai, Granularity::Word, "Buzzword")];
        assert_eq!(
            render_markup_with("delve in", &spans, false),
            "<span class=\"slop-highlight\" data-reason=\"Buzzword\">delve</span> in"
        );
    }

    #[test]
    fn test_render_skips_bad_spans() {
        let text = "héllo world";
        let spans = vec![
            span(0, 2, Category::Ai, Granularity::Word, "split char"),
            span(7, 12, Category::Ai, Granularity::Word, "ok"),
            span(8, 10, Category::Human, Granularity::Word, "overlap"),
        ];
        let html = render_markup(text, &spans);
        assert_eq!(html, "héllo <span class=\"slop-highlight\" data-reason=\"ok\" title=\"ok\">world</span>");
    }
}
