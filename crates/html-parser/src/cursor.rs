//! Tokenizer primitives. Each function takes `(input, position)` and either
//! returns the matched value plus the position just past it, or `None`/the
//! unchanged position to signal "no match" without consuming anything — so
//! the tree builder can try an alternative from the same spot.

macro_rules! strspn {
    ($bytes:expr, $pos:expr, $pattern:pat $(if $guard:expr)?) => {{
        let bytes: &[u8] = $bytes;
        let mut at = $pos;
        while at < bytes.len() && matches!(bytes[at], $pattern $(if $guard)?) {
            at += 1;
        }
        at
    }};
}

pub(crate) fn spaces(input: &str, pos: usize) -> usize {
    strspn!(input.as_bytes(), pos, b' ' | b'\t' | b'\r' | b'\n')
}

pub(crate) fn tag_name(input: &str, pos: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    if pos >= bytes.len() || !bytes[pos].is_ascii_alphabetic() {
        return None;
    }
    let end = strspn!(bytes, pos, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-');
    Some((input[pos..end].to_ascii_lowercase(), end))
}

pub(crate) fn attribute_name(input: &str, pos: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    if pos >= bytes.len() || !bytes[pos].is_ascii_alphabetic() {
        return None;
    }
    let end = strspn!(bytes, pos, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b':' | b'-');
    Some((input[pos..end].to_ascii_lowercase(), end))
}

pub(crate) fn literal(input: &str, pos: usize, lit: &str) -> Option<usize> {
    input[pos..].starts_with(lit).then(|| pos + lit.len())
}

pub(crate) fn literal_ci(input: &str, pos: usize, lit: &str) -> Option<usize> {
    let end = pos.checked_add(lit.len())?;
    let candidate = input.get(pos..end)?;
    candidate.eq_ignore_ascii_case(lit).then_some(end)
}

const BARE_VALUE_TERMINATORS: [u8; 8] = [b'`', b'"', b'\'', b'<', b'>', b'=', b' ', b'\t'];

fn is_bare_value_terminator(b: u8) -> bool {
    BARE_VALUE_TERMINATORS.contains(&b) || b == b'\r' || b == b'\n'
}

/// Quoted values decode character references; bare values are taken verbatim.
pub(crate) fn attribute_value(input: &str, pos: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    let quote = *bytes.get(pos)?;

    if quote == b'"' || quote == b'\'' {
        let body_start = pos + 1;
        let rel = memchr::memchr(quote, &bytes[body_start..])?;
        let end = body_start + rel;
        let decoded = entities::decode(bytes[body_start..end].as_ref());
        return Some((String::from_utf8_lossy(&decoded).into_owned(), end + 1));
    }

    if is_bare_value_terminator(quote) {
        return None;
    }

    let end = strspn!(bytes, pos, b if !is_bare_value_terminator(b));
    Some((input[pos..end].to_string(), end))
}

/// `name` optionally followed by `= value`; a dangling `=` with no legal
/// value following behaves as if the `=` were never there.
pub(crate) fn attribute(input: &str, pos: usize) -> Option<((String, String), usize)> {
    let (name, at) = attribute_name(input, pos)?;
    let after_name = at;
    let at = spaces(input, at);

    if let Some(eq_at) = literal(input, at, "=") {
        let value_at = spaces(input, eq_at);
        if let Some((value, end)) = attribute_value(input, value_at) {
            return Some(((name, value), end));
        }
    }

    Some(((name, String::new()), after_name))
}

/// Parses a start tag: `<name (spaces attribute)* spaces (/>|>)`.
/// Returns `(name, attributes, self_closing, position_after)`.
pub(crate) fn start_tag(
    input: &str,
    pos: usize,
) -> Option<(String, Vec<(String, String)>, bool, usize)> {
    let at = literal(input, pos, "<")?;
    let (name, mut at) = tag_name(input, at)?;

    let mut attrs = Vec::new();
    loop {
        let before_spaces = at;
        let after_spaces = spaces(input, before_spaces);
        if after_spaces == before_spaces && !attrs.is_empty() {
            break;
        }
        match attribute(input, after_spaces) {
            Some((pair, after)) => {
                attrs.push(pair);
                at = after;
            }
            None => {
                at = after_spaces;
                break;
            }
        }
    }

    if let Some(after) = literal(input, at, "/>") {
        return Some((name, attrs, true, after));
    }
    let after = literal(input, at, ">")?;
    Some((name, attrs, false, after))
}

/// `</name spaces>`, returning the (lowercased) name regardless of what it is.
pub(crate) fn general_end_tag(input: &str, pos: usize) -> Option<(String, usize)> {
    let at = literal(input, pos, "</")?;
    let (name, at) = tag_name(input, at)?;
    let at = spaces(input, at);
    let at = literal(input, at, ">")?;
    Some((name, at))
}

/// `general_end_tag` constrained to a specific (already-lowercased) name.
pub(crate) fn end_tag(input: &str, pos: usize, expected: &str) -> Option<usize> {
    let (name, at) = general_end_tag(input, pos)?;
    (name == expected).then_some(at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_name_lowercases_and_stops_at_terminator() {
        assert_eq!(tag_name("DIV>", 0), Some(("div".to_string(), 3)));
        assert_eq!(tag_name("h1 class", 0), Some(("h1".to_string(), 2)));
        assert_eq!(tag_name("<div", 0), None);
    }

    #[test]
    fn attribute_handles_bare_and_quoted_values() {
        assert_eq!(
            attribute("disabled>", 0),
            Some((("disabled".to_string(), String::new()), 8))
        );
        assert_eq!(
            attribute("href=example.com>", 0),
            Some((("href".to_string(), "example.com".to_string()), 16))
        );
        assert_eq!(
            attribute("href=\"a&amp;b\">", 0),
            Some((("href".to_string(), "a&b".to_string()), 14))
        );
    }

    #[test]
    fn start_tag_parses_attributes_and_self_closing() {
        let (name, attrs, self_closing, at) = start_tag("<input disabled />", 0).unwrap();
        assert_eq!(name, "input");
        assert_eq!(attrs, vec![("disabled".to_string(), String::new())]);
        assert!(self_closing);
        assert_eq!(at, "<input disabled />".len());
    }

    #[test]
    fn end_tag_matches_case_insensitively() {
        assert_eq!(end_tag("</DIV>", 0, "div"), Some(6));
        assert_eq!(end_tag("</span>", 0, "div"), None);
    }
}
