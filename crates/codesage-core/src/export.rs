//! Standalone HTML export of the current review and history.

use crate::format::{escape_html, to_compact_html, to_html};
use crate::models::HistoryEntry;
use crate::utils::format_timestamp;

const PAGE_STYLE: &str = "body{background:#111827;color:#f3f4f6;font-family:system-ui,sans-serif;\
max-width:960px;margin:2rem auto;padding:0 1rem}\
pre{background:#1f2937;padding:1rem;border-radius:.5rem;overflow-x:auto}\
code{font-family:ui-monospace,monospace}\
section.entry{border:1px solid #374151;border-radius:.5rem;padding:1rem;margin:1.5rem 0}\
.meta{color:#9ca3af;font-size:.875rem}";

/// Render a full HTML document with `result` through the full formatter
/// and each history entry through the compact one.
pub fn review_page(result: &str, history: &[HistoryEntry]) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str("<title>CodeSage review</title>\n");
    page.push_str(&format!("<style>{PAGE_STYLE}</style>\n"));
    page.push_str("</head>\n<body>\n");

    page.push_str("<h1>Review</h1>\n");
    if result.trim().is_empty() {
        page.push_str("<p class=\"meta\">No review yet.</p>\n");
    } else {
        page.push_str(&format!("<article>{}</article>\n", to_html(result)));
    }

    if !history.is_empty() {
        page.push_str(&format!("<h2>History ({})</h2>\n", history.len()));
    }
    for entry in history {
        page.push_str(&format!(
            "<section class=\"entry\">\n<p class=\"meta\">{} &middot; {} lines &middot; {}</p>\n",
            escape_html(entry.language.display_name()),
            entry.line_count(),
            format_timestamp(&entry.timestamp),
        ));
        page.push_str(&format!("<pre><code>{}</code></pre>\n", escape_html(&entry.input_code)));
        page.push_str(&format!(
            "<div>{}</div>\n</section>\n",
            to_compact_html(&entry.reviewed_result)
        ));
    }

    page.push_str("</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    #[test]
    fn test_empty_page() {
        let page = review_page("", &[]);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("No review yet."));
        assert!(!page.contains("<h2>"));
    }

    #[test]
    fn test_page_with_history_escapes_code() {
        let history = vec![HistoryEntry::new(
            "if (a < b) {}".into(),
            Language::JavaScript,
            "**Fine**".into(),
        )];
        let page = review_page("## Summary\nAll good", &history);
        assert!(page.contains(">Summary</h4>"));
        assert!(page.contains("<h2>History (1)</h2>"));
        assert!(page.contains("if (a &lt; b) {}"));
        assert!(page.contains("JavaScript &middot; 1 lines"));
        assert!(page.contains(">Fine</strong>"));
    }

    #[test]
    fn test_page_sections_are_complete_and_ordered() {
        let history = vec![
            HistoryEntry::new("a".into(), Language::Python, "one".into()),
            HistoryEntry::new("b".into(), Language::Rust, "two".into()),
        ];
        let page = review_page("Looks good", &history);

        assert!(page.contains(&format!("<style>{PAGE_STYLE}</style>\n</head>")));
        assert!(page.contains("<article>"));
        assert_eq!(page.matches("<section class=\"entry\">").count(), 2);
        assert_eq!(page.matches("</section>\n").count(), 2);
        let first = page.find("<pre><code>a</code></pre>").unwrap();
        let second = page.find("<pre><code>b</code></pre>").unwrap();
        assert!(first < second);
        assert!(page.ends_with("</body>\n</html>\n"));
    }
}
