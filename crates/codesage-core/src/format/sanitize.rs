use lazy_static::lazy_static;
use regex::Regex;

use super::{ALLOWED_ATTRIBUTES, ALLOWED_TAGS};

lazy_static! {
    /// A single tag anchored at the start of the haystack
    static ref TAG: Regex = Regex::new(r"^<(/?)([A-Za-z][A-Za-z0-9]*)([^<>]*?)(/?)>").unwrap();

    /// One `name` or `name="value"` attribute with its leading whitespace
    static ref ATTRIBUTE: Regex = Regex::new(r#"\s+([A-Za-z][A-Za-z0-9-]*)(?:="[^"<>]*")?"#).unwrap();
}

/// Escape the characters that could open markup or break out of a quoted
/// attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_allowed_tag(tag: &regex::Captures<'_>) -> bool {
    let name = tag[2].to_ascii_lowercase();
    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return false;
    }

    let attrs = &tag[3];
    let mut consumed = 0;
    for attr in ATTRIBUTE.captures_iter(attrs) {
        let whole = attr.get(0).map(|m| m.range()).unwrap_or(0..0);
        if whole.start != consumed {
            return false;
        }
        consumed = whole.end;
        let attr_name = attr[1].to_ascii_lowercase();
        if !ALLOWED_ATTRIBUTES.contains(&attr_name.as_str()) {
            return false;
        }
    }
    attrs[consumed..].trim().is_empty()
}

/// Allow-list pass over formatter output.
///
/// Every `<` that does not open a well-formed tag from `ALLOWED_TAGS`
/// carrying only `ALLOWED_ATTRIBUTES` is escaped, so the result can be
/// injected as raw HTML whatever the review text contained.
pub fn sanitize(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        match TAG.captures(rest) {
            Some(tag) if is_allowed_tag(&tag) => {
                let len = tag.get(0).map(|m| m.end()).unwrap_or(1);
                out.push_str(&rest[..len]);
                rest = &rest[len..];
            }
            _ => {
                out.push_str("&lt;");
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Entities a `data-code` attribute can carry, with what they stand for
const PAYLOAD_ENTITIES: &[(&str, char)] = &[
    ("&#10;", '\n'),
    ("&quot;", '"'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&amp;", '&'),
];

/// Recover the exact code carried by a copy button's `data-code` attribute.
///
/// This is the host side of the copy affordance in [`to_html`] output:
/// whatever embeds the fragment hands the attribute value here and puts the
/// result on its clipboard. Each entity is decoded once, left to right, so
/// code that itself contains entity text (`&amp;lt;`, `&nbsp;`) comes back
/// unchanged.
///
/// [`to_html`]: super::to_html
pub fn copy_payload(data_code: &str) -> String {
    let mut out = String::with_capacity(data_code.len());
    let mut rest = data_code;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match PAYLOAD_ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_sanitize_keeps_allowed_markup() {
        let html = r#"<p class="my-3">hi <strong class="b">there</strong></p><hr class="x"/><br/>"#;
        assert_eq!(sanitize(html), html);

        let button = r#"<button class="copy-btn" data-code="a&#10;b" data-index="0">Copy</button>"#;
        assert_eq!(sanitize(button), button);
    }

    #[test]
    fn test_sanitize_escapes_disallowed_tags() {
        assert_eq!(
            sanitize("<script>alert(1)</script>"),
            "&lt;script>alert(1)&lt;/script>"
        );
        assert_eq!(
            sanitize(r#"<p onclick="steal()">x</p>"#),
            r#"&lt;p onclick="steal()">x</p>"#
        );
        assert_eq!(sanitize("a < b"), "a &lt; b");
    }

    #[test]
    fn test_copy_payload_round_trips_escaping() {
        let code = "if (a < b && c > \"d\") {\n  run();\n}";
        let carried = escape_html(code).replace('\n', "&#10;");
        assert_eq!(copy_payload(&carried), code);
    }

    #[test]
    fn test_copy_payload_keeps_entity_text_in_code() {
        let code = "let s = \"&nbsp;\"; // &amp;lt; & &#10;";
        let carried = escape_html(code).replace('\n', "&#10;");
        assert_eq!(copy_payload(&carried), code);
    }

    #[test]
    fn test_copy_payload_passes_unknown_entities() {
        assert_eq!(copy_payload("a &copy; b &"), "a &copy; b &");
    }
}
