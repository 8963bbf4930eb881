use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::sanitize::{escape_html, sanitize};

lazy_static! {
    static ref EXTRA_BLANK_LINES: Regex = Regex::new(r"\n\s*\n\s*\n").unwrap();

    // Headers, most specific first
    static ref H5: Regex = Regex::new(r"(?m)^### (.*)$").unwrap();
    static ref H4: Regex = Regex::new(r"(?m)^## (.*)$").unwrap();
    static ref H3: Regex = Regex::new(r"(?m)^# (.*)$").unwrap();

    pub(super) static ref CODE_FENCE: Regex = Regex::new(r"(?s)```(\w+)?\n(.*?)```").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`\n]+?)`").unwrap();
    static ref COMPACT_INLINE_CODE: Regex = Regex::new(r"`([^`]+)`").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*(.*?)\*").unwrap();

    static ref UNORDERED_ITEM: Regex = Regex::new(r"(?m)^\s*[-*+] (.*)$").unwrap();
    static ref ORDERED_ITEM: Regex = Regex::new(r"(?m)^\s*(\d+)\. (.*)$").unwrap();
    static ref LIST_RUN: Regex = Regex::new(r#"(?s)(<li class="flex[^>]*>.*?</li>\s*)+"#).unwrap();
    static ref COMPACT_UNORDERED_ITEM: Regex = Regex::new(r"(?m)^- (.*)$").unwrap();
    static ref COMPACT_ORDERED_ITEM: Regex = Regex::new(r"(?m)^(\d+)\. (.*)$").unwrap();

    static ref RULE: Regex = Regex::new(r"(?m)^\s*---\s*$").unwrap();
    static ref BARE_LINE: Regex = Regex::new(r"(?m)^[^\n<]+$").unwrap();
    static ref DOUBLE_PARAGRAPH: Regex = Regex::new(r"<p[^>]*><p[^>]*>(.*?)</p></p>").unwrap();

    static ref BLOCK_MARKER: Regex = Regex::new(r"<!--block:(\d+)-->").unwrap();
}

// ============================================================================
// Markup templates
// ============================================================================

const H5_HTML: &str =
    r#"<h5 class="text-lg font-semibold my-4 text-blue-300 border-l-4 border-blue-400 pl-3">${1}</h5>"#;
const H4_HTML: &str =
    r#"<h4 class="text-xl font-bold my-5 text-purple-300 border-l-4 border-purple-400 pl-3">${1}</h4>"#;
const H3_HTML: &str =
    r#"<h3 class="text-2xl font-bold my-6 text-cyan-300 border-l-4 border-cyan-400 pl-3">${1}</h3>"#;

const INLINE_CODE_HTML: &str = r#"<code class="bg-gray-700/80 text-green-300 px-2 py-1 rounded-md text-sm font-mono border border-gray-600/50">${1}</code>"#;
const BOLD_HTML: &str = r#"<strong class="font-bold text-yellow-300">${1}</strong>"#;
const ITALIC_HTML: &str = r#"<em class="italic text-blue-300">${1}</em>"#;
const UNORDERED_ITEM_HTML: &str = r#"<li class="flex items-start gap-2 my-1"><span class="text-blue-400 mt-1">•</span><span>${1}</span></li>"#;
const ORDERED_ITEM_HTML: &str = r#"<li class="flex items-start gap-2 my-1"><span class="text-purple-400 font-semibold min-w-[20px]">${1}.</span><span>${2}</span></li>"#;
const LIST_HTML: &str = r#"<ul class="my-4 space-y-1 pl-2">${0}</ul>"#;
const RULE_HTML: &str = r#"<hr class="my-6 border-gray-600/50 border-dashed"/>"#;
const PARAGRAPH_HTML: &str = r#"<p class="my-3 text-gray-100 leading-relaxed">${0}</p>"#;
const PARAGRAPH_UNWRAP_HTML: &str = r#"<p class="my-3 text-gray-100 leading-relaxed">${1}</p>"#;

const COMPACT_INLINE_CODE_HTML: &str =
    r#"<code class="bg-gray-700 text-cyan-300 px-2 py-1 rounded text-sm font-mono">${1}</code>"#;
const COMPACT_BOLD_HTML: &str = r#"<strong class="font-semibold text-white">${1}</strong>"#;
const COMPACT_ITALIC_HTML: &str = r#"<em class="italic text-gray-300">${1}</em>"#;
const COMPACT_UNORDERED_ITEM_HTML: &str = r#"<li class="text-gray-200 ml-4 mb-2">• ${1}</li>"#;
const COMPACT_ORDERED_ITEM_HTML: &str = r#"<li class="text-gray-200 ml-4 mb-2">${1}. ${2}</li>"#;

/// Language assumed for a fence with no tag
pub const DEFAULT_FENCE_LANGUAGE: &str = "javascript";

/// Rendered code blocks held out of the line-oriented passes.
///
/// Each block is replaced by a marker that starts with `<`, so the paragraph
/// pass skips it, and carries no `*`, backtick or list prefix.
#[derive(Default)]
struct StashedBlocks(Vec<String>);

impl StashedBlocks {
    fn stash(&mut self, html: String) -> String {
        let marker = format!("<!--block:{}-->", self.0.len());
        self.0.push(html);
        marker
    }

    fn restore(&self, text: &str) -> String {
        BLOCK_MARKER
            .replace_all(text, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.0.get(i))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

fn fence_language<'a>(caps: &'a Captures<'_>) -> &'a str {
    caps.get(1).map(|m| m.as_str()).unwrap_or(DEFAULT_FENCE_LANGUAGE)
}

/// Attribute-safe form of a code body. Input escaping already covered the
/// review text; this catches markup the header pass put inside the fence.
fn data_code(code: &str) -> String {
    code.replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "&#10;")
}

fn code_block_html(language: &str, code: &str, index: usize) -> String {
    format!(
        concat!(
            r#"<div class="relative group my-6 rounded-xl overflow-hidden border border-gray-700/50 shadow-lg">"#,
            r#"<div class="flex items-center justify-between bg-gray-800/80 px-4 py-2 border-b border-gray-700/50">"#,
            r#"<span class="text-xs font-medium text-gray-300 flex items-center gap-2">{upper}</span>"#,
            r#"<button class="flex items-center gap-1 text-xs text-gray-400 hover:text-white transition-colors duration-200 copy-btn" data-code="{data}" data-index="{index}">"#,
            r#"<span class="copy-text">Copy</span></button></div>"#,
            r#"<pre class="language-{lang} bg-gray-900 text-sm p-4 overflow-x-auto"><code class="language-{lang}">{code}</code></pre>"#,
            r#"</div>"#,
        ),
        upper = language.to_uppercase(),
        data = data_code(code),
        index = index,
        lang = language,
        code = code,
    )
}

fn compact_code_block_html(language: &str, code: &str) -> String {
    format!(
        concat!(
            r#"<div class="relative my-6 rounded-xl overflow-hidden border border-gray-600/50 shadow-lg">"#,
            r#"<div class="flex items-center justify-between bg-gray-700/80 px-4 py-2 border-b border-gray-600/50">"#,
            r#"<span class="text-xs font-medium text-gray-300 flex items-center gap-2">{upper}</span></div>"#,
            r#"<pre class="bg-gray-800 text-sm p-4 overflow-x-auto"><code class="text-gray-100">{code}</code></pre>"#,
            r#"</div>"#,
        ),
        upper = language.to_uppercase(),
        code = code,
    )
}

/// Escape, collapse blank-line runs and convert headers. Shared prefix of
/// both renderings.
fn prepare(text: &str) -> String {
    let text = escape_html(&text.replace("\r\n", "\n"));
    let text = EXTRA_BLANK_LINES.replace_all(&text, "\n\n");
    let text = H5.replace_all(&text, H5_HTML);
    let text = H4.replace_all(&text, H4_HTML);
    H3.replace_all(&text, H3_HTML).into_owned()
}

/// Render a review for the main result view.
///
/// Fenced code blocks get a language header and a copy button carrying the
/// code in `data-code`, numbered in order of appearance by `data-index`.
/// The output contains only tags and attributes from the allow-list.
pub fn to_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = prepare(text);

    let mut blocks = StashedBlocks::default();
    let text = CODE_FENCE
        .replace_all(&text, |caps: &Captures<'_>| {
            let index = blocks.0.len();
            let html = code_block_html(fence_language(caps), caps[2].trim(), index);
            blocks.stash(html)
        })
        .into_owned();

    let text = INLINE_CODE.replace_all(&text, INLINE_CODE_HTML);
    let text = BOLD.replace_all(&text, BOLD_HTML);
    let text = ITALIC.replace_all(&text, ITALIC_HTML);

    let text = UNORDERED_ITEM.replace_all(&text, UNORDERED_ITEM_HTML);
    let text = ORDERED_ITEM.replace_all(&text, ORDERED_ITEM_HTML);
    let text = LIST_RUN.replace_all(&text, LIST_HTML);

    let text = RULE.replace_all(&text, RULE_HTML);
    let text = BARE_LINE.replace_all(&text, PARAGRAPH_HTML);
    let text = DOUBLE_PARAGRAPH.replace_all(&text, PARAGRAPH_UNWRAP_HTML);

    sanitize(&blocks.restore(&text))
}

/// Denser rendering for history cards: no copy buttons, bare list items,
/// and newlines kept as `<br/>`.
pub fn to_compact_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = prepare(text);

    let mut blocks = StashedBlocks::default();
    let text = CODE_FENCE
        .replace_all(&text, |caps: &Captures<'_>| {
            let html = compact_code_block_html(fence_language(caps), caps[2].trim());
            blocks.stash(html)
        })
        .into_owned();

    let text = BOLD.replace_all(&text, COMPACT_BOLD_HTML);
    let text = ITALIC.replace_all(&text, COMPACT_ITALIC_HTML);
    let text = COMPACT_INLINE_CODE.replace_all(&text, COMPACT_INLINE_CODE_HTML);

    let text = COMPACT_UNORDERED_ITEM.replace_all(&text, COMPACT_UNORDERED_ITEM_HTML);
    let text = COMPACT_ORDERED_ITEM.replace_all(&text, COMPACT_ORDERED_ITEM_HTML);

    let text = text.replace('\n', "<br/>");

    sanitize(&blocks.restore(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::copy_payload;

    const P_OPEN: &str = r#"<p class="my-3 text-gray-100 leading-relaxed">"#;

    #[test]
    fn test_empty_input() {
        assert_eq!(to_html(""), "");
        assert_eq!(to_compact_html(""), "");
    }

    #[test]
    fn test_plain_text_becomes_paragraph() {
        assert_eq!(to_html("Looks good"), format!("{P_OPEN}Looks good</p>"));
    }

    #[test]
    fn test_headers() {
        let html = to_html("# Title\n## Section\n### Detail");
        assert!(html.contains(">Title</h3>"));
        assert!(html.contains(">Section</h4>"));
        assert!(html.contains(">Detail</h5>"));
        assert!(!html.contains("<p"));
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        let html = to_html("one\n\n\n\ntwo");
        assert_eq!(html, format!("{P_OPEN}one</p>\n\n{P_OPEN}two</p>"));
    }

    #[test]
    fn test_code_block_with_copy_button() {
        let html = to_html("Try:\n```python\nprint('x')\n```\nDone");
        assert!(html.contains(">PYTHON</span>"));
        assert!(html.contains(r#"data-code="print('x')""#));
        assert!(html.contains(r#"data-index="0""#));
        assert!(html.contains(r#"<code class="language-python">print('x')</code>"#));
        assert!(html.contains(&format!("{P_OPEN}Done</p>")));
    }

    #[test]
    fn test_code_blocks_are_numbered_in_order() {
        let html = to_html("```\nlet a = 1;\n```\n\n```rust\nlet b = 2;\n```");
        let first = html.find(r#"data-index="0""#).unwrap();
        let second = html.find(r#"data-index="1""#).unwrap();
        assert!(first < second);
        assert!(html.contains(">JAVASCRIPT</span>"));
        assert!(html.contains(">RUST</span>"));
    }

    #[test]
    fn test_code_block_body_untouched_by_inline_passes() {
        let html = to_html("```js\nlet a = 2 ** 3 ** 4;\n- not a list\n```");
        assert!(!html.contains("<strong"));
        assert!(!html.contains("<li"));
        assert!(html.contains("let a = 2 ** 3 ** 4;\n- not a list"));
    }

    #[test]
    fn test_copy_payload_recovers_code() {
        let code = "if (a < b) {\n  say(\"hi\");\n}";
        let html = to_html(&format!("```js\n{code}\n```"));
        let start = html.find("data-code=\"").unwrap() + "data-code=\"".len();
        let end = start + html[start..].find('"').unwrap();
        assert_eq!(copy_payload(&html[start..end]), code);
    }

    #[test]
    fn test_copy_payload_recovers_entity_literals() {
        let code = "let s = \"&nbsp;\";\nlet t = \"&amp;lt;\";";
        let html = to_html(&format!("```js\n{code}\n```"));
        let start = html.find("data-code=\"").unwrap() + "data-code=\"".len();
        let end = start + html[start..].find('"').unwrap();
        assert_eq!(copy_payload(&html[start..end]), code);
    }

    #[test]
    fn test_hash_comment_in_fence_becomes_heading() {
        let html = to_html("```python\n# comment\nx = 1\n```");
        assert!(html.contains("<h3"));
        assert!(html.contains("copy-btn"));
        assert!(!html.contains("&lt;button"));
    }

    #[test]
    fn test_inline_emphasis() {
        let html = to_html("Use `map` with **care** and *style*");
        assert!(html.contains(">map</code>"));
        assert!(html.contains(r#"<strong class="font-bold text-yellow-300">care</strong>"#));
        assert!(html.contains(r#"<em class="italic text-blue-300">style</em>"#));
    }

    #[test]
    fn test_list_run_wrapped_once() {
        let html = to_html("Issues:\n- first\n- second\n1. step");
        assert_eq!(html.matches("<ul").count(), 1);
        assert_eq!(html.matches("<li").count(), 3);
        assert!(html.contains(">1.</span><span>step</span>"));
    }

    #[test]
    fn test_horizontal_rule() {
        let html = to_html("above\n---\nbelow");
        assert!(html.contains("<hr class="));
        assert!(html.contains(&format!("{P_OPEN}above</p>")));
    }

    #[test]
    fn test_markup_in_review_is_escaped() {
        let html = to_html("<script>alert(1)</script>");
        assert!(!html.contains("<script"));
        assert_eq!(
            html,
            format!("{P_OPEN}&lt;script&gt;alert(1)&lt;/script&gt;</p>")
        );

        let html = to_html(r#"<img src=x onerror="boom()">"#);
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_crlf_is_normalized() {
        assert_eq!(to_html("a\r\nb"), format!("{P_OPEN}a</p>\n{P_OPEN}b</p>"));
    }

    // --- compact ---

    #[test]
    fn test_compact_line_breaks_and_lists() {
        let html = to_compact_html("Notes\n- one\n2. two");
        assert_eq!(
            html,
            concat!(
                "Notes<br/>",
                r#"<li class="text-gray-200 ml-4 mb-2">• one</li><br/>"#,
                r#"<li class="text-gray-200 ml-4 mb-2">2. two</li>"#,
            )
        );
    }

    #[test]
    fn test_compact_code_has_no_copy_button() {
        let html = to_compact_html("```go\nfmt.Println(1)\n```");
        assert!(html.contains(">GO</span>"));
        assert!(html.contains("fmt.Println(1)"));
        assert!(!html.contains("copy-btn"));
    }

    #[test]
    fn test_compact_emphasis_classes() {
        let html = to_compact_html("**bold** *it* `code`");
        assert!(html.contains(r#"<strong class="font-semibold text-white">bold</strong>"#));
        assert!(html.contains(r#"<em class="italic text-gray-300">it</em>"#));
        assert!(html.contains(">code</code>"));
    }
}
