use crate::block::{AttrValue, Attributes};

/// Parse the text between a tag name and its `>` into an attribute map.
///
/// `a="x"`, `a='x'` and `a=x` give string values, a bare `a` gives `true`.
/// Nothing here fails: an unterminated quote runs to the end of the text,
/// stray `=` and `/` characters are skipped, a trailing `name=` is a flag,
/// and a repeated name keeps its last value.
pub fn parse_attributes(text: &str) -> Attributes {
    let mut attrs = Attributes::new();
    let mut rest = text;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/' || c == '=');
        if rest.is_empty() {
            break;
        }

        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..name_len];
        rest = &rest[name_len..];

        let after_ws = rest.trim_start();
        let Some(value_text) = after_ws.strip_prefix('=') else {
            attrs.insert(name.to_string(), AttrValue::Flag(true));
            continue;
        };

        let value_text = value_text.trim_start();
        if value_text.is_empty() {
            // `name=` with nothing after it.
            attrs.insert(name.to_string(), AttrValue::Flag(true));
            break;
        }
        let (value, remaining) = split_value(value_text);
        attrs.insert(name.to_string(), AttrValue::Value(value.to_string()));
        rest = remaining;
    }

    attrs
}

/// Split an attribute value off the front of `text`, returning it unquoted.
fn split_value(text: &str) -> (&str, &str) {
    match text.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &text[1..];
            match body.find(quote) {
                Some(end) => (&body[..end], &body[end + 1..]),
                None => (body, ""),
            }
        }
        _ => {
            let end = text.find(char::is_whitespace).unwrap_or(text.len());
            (&text[..end], &text[end..])
        }
    }
}
