//! Lenient markup-to-text extraction
//!
//! Catalog text fields are HTML fragments. They are read as a forgiving XML
//! stream (fragment wrapped in a synthetic root, end-tag names unchecked) and
//! only text and CDATA content is kept. Input the stream reader cannot cope
//! with falls back to a tag-stripping regex.
//!
//! A `<` not followed by a name, `/`, `!` or `?` is text ("väärtus < 5").

use crate::error::{SyncError, SyncResult};
use once_cell::sync::Lazy;
use quick_xml::escape::unescape_with;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[A-Za-z/!?][^>]*>").expect("tag pattern is valid"));

/// Named entities found in catalog markup. Numeric references are handled by
/// the unescaper itself.
fn resolve_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        "nbsp" => "\u{a0}",
        "shy" => "\u{ad}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "bdquo" => "\u{201e}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "bull" => "\u{2022}",
        "auml" => "ä",
        "Auml" => "Ä",
        "ouml" => "ö",
        "Ouml" => "Ö",
        "uuml" => "ü",
        "Uuml" => "Ü",
        "otilde" => "õ",
        "Otilde" => "Õ",
        "scaron" => "š",
        "Scaron" => "Š",
        "zcaron" => "ž",
        "Zcaron" => "Ž",
        _ => return None,
    };
    Some(value)
}

/// Text content of a markup fragment; `""` stays `""`
pub fn strip_markup(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    if !has_tag(input) {
        return unescape_with(input, resolve_entity)
            .map(|text| text.into_owned())
            .unwrap_or_else(|_| input.to_string());
    }

    match extract_text(&escape_bare_lt(input)) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(error = %e, "Markup not well-formed, falling back to tag stripping");
            strip_tags(input)
        }
    }
}

/// `strip_markup` for an untyped document field
///
/// Anything other than a JSON string (null, numbers, objects) is rejected.
pub fn strip_markup_value(field: &str, value: &Value) -> SyncResult<String> {
    match value {
        Value::String(s) => Ok(strip_markup(s)),
        other => Err(SyncError::invalid_input(
            field,
            format!("expected a string, got {}", json_type(other)),
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `<` opens markup only when followed by a name, `/`, `!` or `?`
fn opens_tag(rest: &str) -> bool {
    matches!(rest.chars().next(), Some(c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

fn has_tag(input: &str) -> bool {
    input.match_indices('<').any(|(i, _)| opens_tag(&input[i + 1..]))
}

/// Rewrite comparison-style `<` as `&lt;` so the reader keeps it as text
fn escape_bare_lt(input: &str) -> Cow<'_, str> {
    if !input.match_indices('<').any(|(i, _)| !opens_tag(&input[i + 1..])) {
        return Cow::Borrowed(input);
    }
    let mut escaped = String::with_capacity(input.len() + 8);
    let mut last = 0;
    for (i, _) in input.match_indices('<') {
        if !opens_tag(&input[i + 1..]) {
            escaped.push_str(&input[last..i]);
            escaped.push_str("&lt;");
            last = i + 1;
        }
    }
    escaped.push_str(&input[last..]);
    Cow::Owned(escaped)
}

fn extract_text(input: &str) -> quick_xml::Result<String> {
    let wrapped = format!("<fragment>{}</fragment>", input);
    let mut reader = Reader::from_str(&wrapped);
    reader.trim_text(false);
    reader.check_end_names(false);

    let mut text = String::with_capacity(input.len());
    loop {
        match reader.read_event()? {
            Event::Text(t) => match t.unescape_with(resolve_entity) {
                Ok(unescaped) => text.push_str(&unescaped),
                // Stray '&' in running text
                Err(_) => text.push_str(&String::from_utf8_lossy(&t)),
            },
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}

fn strip_tags(input: &str) -> String {
    let stripped = TAG.replace_all(input, "");
    match unescape_with(&stripped, resolve_entity) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => stripped.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_string() {
        assert_eq!(strip_markup(""), "");
        assert_eq!(strip_markup_value("body", &json!("")).unwrap(), "");
    }

    #[test]
    fn test_nested_tags() {
        assert_eq!(strip_markup("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(
            strip_markup("<ul><li>Üks</li><li>Kaks</li></ul>"),
            "ÜksKaks"
        );
    }

    #[test]
    fn test_plain_text_unchanged() {
        for text in [
            "Hello World",
            "Rida 1\nRida 2",
            "  tühikud  ",
            "A & B",
            "1 < 2 and 3 > 2",
            "väärtus < 5",
            "a <= b",
            "<",
        ] {
            assert_eq!(strip_markup(text), text);
        }
    }

    #[test]
    fn test_html_void_and_unclosed_tags() {
        assert_eq!(strip_markup("Esimene<br>Teine"), "EsimeneTeine");
        assert_eq!(strip_markup("<p>Lõik</div>"), "Lõik");
    }

    #[test]
    fn test_comparison_inside_markup_is_text() {
        assert_eq!(strip_markup("<p>väärtus < 5</p>"), "väärtus < 5");
        assert_eq!(strip_markup("<b>x</b> <= 3 > 1"), "x <= 3 > 1");
        assert_eq!(strip_tags("<i>a</i> < b"), "a < b");
    }

    #[test]
    fn test_entities() {
        assert_eq!(strip_markup("<p>a&nbsp;b</p>"), "a\u{a0}b");
        assert_eq!(strip_markup("&otilde;un &amp; pirn"), "õun & pirn");
        assert_eq!(strip_markup("&#8211;"), "\u{2013}");
    }

    #[test]
    fn test_non_string_values_rejected() {
        for value in [json!(null), json!(123), json!({"key": "value"}), json!(["a"])] {
            let err = strip_markup_value("body", &value).unwrap_err();
            assert!(matches!(err, SyncError::InvalidInput { .. }), "{:?}", value);
        }
    }
}
