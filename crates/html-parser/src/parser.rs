//! Recursive-descent tree builder: doctype, comment, self-closing tag,
//! normal element, or text, tried in that order at every position. Optional
//! end tags are realized by refusing to nest an element whose start would
//! force an ancestor closed; that ancestor's own loop then sees the same
//! bytes again and reacts to them.

use crate::cursor;
use crate::node::Node;

#[cfg(feature = "tracing")]
macro_rules! trace_implicit_close {
    ($parent:expr, $child:expr) => {
        tracing::debug!(parent = $parent, child = $child, "implicit close via invalid nesting")
    };
}
#[cfg(not(feature = "tracing"))]
macro_rules! trace_implicit_close {
    ($parent:expr, $child:expr) => {{
        let _ = ($parent, $child);
    }};
}

const VOID: &[&str] = &[
    "br", "img", "hr", "meta", "input", "embed", "area", "base", "col", "keygen", "link",
    "param", "source", "command", "track", "wbr",
];

const RAW_TEXT: &[&str] = &["script", "style"];

fn is_void(tag: &str) -> bool {
    VOID.contains(&tag)
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT.contains(&tag)
}

/// Does the appearance of `child` as a start tag force `parent` to close?
/// Mirrors the HTML5 "optional tags" implied-end-tag table.
fn is_invalid_nest(parent: &str, child: &str) -> bool {
    match parent {
        "head" => child == "body",
        "li" => child == "li",
        "dt" | "dd" => matches!(child, "dt" | "dd"),
        "p" => matches!(
            child,
            "address"
                | "article"
                | "aside"
                | "blockquote"
                | "details"
                | "div"
                | "dl"
                | "fieldset"
                | "figcaption"
                | "figure"
                | "footer"
                | "form"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "header"
                | "hgroup"
                | "hr"
                | "main"
                | "menu"
                | "nav"
                | "ol"
                | "p"
                | "pre"
                | "section"
                | "table"
                | "ul"
        ),
        "rt" | "rp" => matches!(child, "rt" | "rp"),
        "optgroup" => child == "optgroup",
        "option" => matches!(child, "option" | "optgroup"),
        "colgroup" => child != "col",
        "caption" => true,
        "thead" => matches!(child, "tbody" | "tfoot"),
        "tbody" => matches!(child, "tbody" | "tfoot" | "table"),
        "tfoot" => child == "table",
        "tr" => matches!(child, "tr" | "thead" | "tbody" | "tfoot"),
        "td" | "th" => matches!(child, "td" | "th" | "tr" | "tbody" | "tfoot"),
        _ => false,
    }
}

pub(crate) fn parse_document(input: &str) -> Vec<Node> {
    parse_nodes(input, 0, "").0
}

fn next_char_boundary(input: &str, pos: usize) -> usize {
    let mut next = pos + 1;
    while next < input.len() && !input.is_char_boundary(next) {
        next += 1;
    }
    next.min(input.len())
}

fn push_node(nodes: &mut Vec<Node>, node: Node) {
    if let Node::Text(ref text) = node {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(prev)) = nodes.last_mut() {
            prev.push_str(text);
            return;
        }
    }
    nodes.push(node);
}

fn element(name: String, attributes: Vec<(String, String)>, children: Vec<Node>) -> Node {
    Node::Element {
        name,
        attributes,
        children,
    }
}

/// Parses children until end-of-input, a matching end tag for `parent_tag`
/// (consumed), or a token that must close `parent_tag` instead (not
/// consumed — the caller sees it again). `parent_tag` is `""` at the top
/// level, where no end tag ever matches and no nesting is ever invalid.
fn parse_nodes(input: &str, mut pos: usize, parent_tag: &str) -> (Vec<Node>, usize) {
    let mut nodes = Vec::new();
    let len = input.len();

    loop {
        if pos >= len {
            return (nodes, pos);
        }

        if !parent_tag.is_empty() {
            if let Some((name, after)) = cursor::general_end_tag(input, pos) {
                return if name == parent_tag {
                    (nodes, after)
                } else {
                    (nodes, pos)
                };
            }

            if let Some((tag_name, ..)) = cursor::start_tag(input, pos) {
                if is_invalid_nest(parent_tag, &tag_name) {
                    trace_implicit_close!(parent_tag, tag_name.as_str());
                    return (nodes, pos);
                }
            }
        }

        match parse_one_node(input, pos) {
            Some((node, after)) => {
                push_node(&mut nodes, node);
                pos = after;
            }
            None => {
                let next = next_char_boundary(input, pos);
                push_node(&mut nodes, Node::Text(input[pos..next].to_string()));
                pos = next;
            }
        }
    }
}

fn parse_one_node(input: &str, pos: usize) -> Option<(Node, usize)> {
    if input.as_bytes().get(pos) == Some(&b'<') {
        if let Some((content, after)) = parse_comment(input, pos) {
            return Some((Node::Comment(content), after));
        }
        if let Some(after) = parse_doctype(input, pos) {
            return Some((
                element("!doctype".to_string(), Vec::new(), Vec::new()),
                after,
            ));
        }
        if let Some((name, attrs, self_closing, after)) = cursor::start_tag(input, pos) {
            if self_closing {
                return Some((element(name, attrs, Vec::new()), after));
            }
            if is_raw_text(&name) {
                let (children, after) = parse_raw_text(input, after, &name);
                return Some((element(name, attrs, children), after));
            }
            if is_void(&name) {
                return Some((element(name, attrs, Vec::new()), after));
            }
            let (children, after) = parse_nodes(input, after, &name);
            return Some((element(name, attrs, children), after));
        }
    }
    parse_text(input, pos)
}

fn parse_doctype(input: &str, pos: usize) -> Option<usize> {
    let at = cursor::literal(input, pos, "<!")?;
    let at = cursor::literal_ci(input, at, "doctype")?;
    let bytes = input.as_bytes();
    let rel = memchr::memchr(b'>', &bytes[at..])?;
    Some(at + rel + 1)
}

fn parse_comment(input: &str, pos: usize) -> Option<(String, usize)> {
    let at = cursor::literal(input, pos, "<!--")?;
    let bytes = input.as_bytes();
    match memchr::memmem::find(&bytes[at..], b"-->") {
        Some(rel) => Some((input[at..at + rel].to_string(), at + rel + 3)),
        None => Some((input[at..].to_string(), input.len())),
    }
}

/// A maximal run of non-`<` characters, with entity references decoded. A
/// leading `<` that no other alternative accepted is absorbed as a single
/// literal character so parsing always makes progress.
fn parse_text(input: &str, pos: usize) -> Option<(Node, usize)> {
    let bytes = input.as_bytes();
    if pos >= bytes.len() {
        return None;
    }

    let mut end = if bytes[pos] == b'<' {
        next_char_boundary(input, pos)
    } else {
        pos
    };
    while end < bytes.len() && bytes[end] != b'<' {
        end = next_char_boundary(input, end);
    }

    let raw = &input[pos..end];
    let decoded = entities::decode(raw.as_bytes());
    Some((
        Node::Text(String::from_utf8_lossy(&decoded).into_owned()),
        end,
    ))
}

/// Inside `script`/`style`, nested tags are inert except for comments; a
/// `<` that doesn't start a comment or the matching end tag is just content.
fn parse_raw_text(input: &str, mut pos: usize, tag: &str) -> (Vec<Node>, usize) {
    let mut nodes = Vec::new();
    let bytes = input.as_bytes();
    let mut text_start = pos;

    loop {
        if pos >= bytes.len() {
            if text_start < pos {
                push_node(&mut nodes, Node::Text(input[text_start..pos].to_string()));
            }
            return (nodes, pos);
        }

        if let Some(after) = cursor::end_tag(input, pos, tag) {
            if text_start < pos {
                push_node(&mut nodes, Node::Text(input[text_start..pos].to_string()));
            }
            return (nodes, after);
        }

        if bytes[pos] == b'<' {
            if let Some((comment, after)) = parse_comment(input, pos) {
                if text_start < pos {
                    push_node(&mut nodes, Node::Text(input[text_start..pos].to_string()));
                }
                push_node(&mut nodes, Node::Comment(comment));
                pos = after;
                text_start = pos;
                continue;
            }
        }

        pos = next_char_boundary(input, pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn plain_text_round_trips() {
        assert_eq!(parse("hello world"), vec![Node::Text("hello world".into())]);
    }

    #[test]
    fn basic_element_lowercases_tag_and_attribute() {
        assert_eq!(
            parse("<a HREF=example.com></A>"),
            vec![element(
                "a".into(),
                vec![("href".into(), "example.com".into())],
                Vec::new()
            )]
        );
    }

    #[test]
    fn void_tag_self_close_equivalence() {
        let open = parse("<input>");
        let closed = parse("<input />");
        assert_eq!(open, closed);
        assert_eq!(
            open,
            vec![element("input".into(), Vec::new(), Vec::new())]
        );
    }

    #[test]
    fn boolean_attribute_has_empty_value() {
        assert_eq!(
            parse("<input disabled>"),
            vec![element(
                "input".into(),
                vec![("disabled".into(), String::new())],
                Vec::new()
            )]
        );
    }

    #[test]
    fn optional_end_tag_li_closes_on_sibling() {
        assert_eq!(
            parse("<ul><li><li></ul>"),
            vec![element(
                "ul".into(),
                Vec::new(),
                vec![
                    element("li".into(), Vec::new(), Vec::new()),
                    element("li".into(), Vec::new(), Vec::new()),
                ]
            )]
        );
    }

    #[test]
    fn script_raw_text_with_embedded_comment() {
        let parsed = parse("<script>a<!--</script><script>-->b</script>");
        assert_eq!(
            parsed,
            vec![element(
                "script".into(),
                Vec::new(),
                vec![
                    Node::Text("a".into()),
                    Node::Comment("</script><script>".into()),
                    Node::Text("b".into()),
                ]
            )]
        );
    }

    #[test]
    fn caption_invalid_nest_closes_on_any_child() {
        assert_eq!(
            parse("<table><caption><col></table>"),
            vec![element(
                "table".into(),
                Vec::new(),
                vec![
                    element("caption".into(), Vec::new(), Vec::new()),
                    element("col".into(), Vec::new(), Vec::new()),
                ]
            )]
        );
    }

    #[test]
    fn missing_end_tag_closes_implicitly_at_end_of_input() {
        assert_eq!(
            parse("<div>aaa"),
            vec![element(
                "div".into(),
                Vec::new(),
                vec![Node::Text("aaa".into())]
            )]
        );
    }

    #[test]
    fn stray_angle_bracket_is_absorbed_as_text() {
        assert_eq!(parse("a < b"), vec![Node::Text("a < b".into())]);
    }

    #[test]
    fn entity_scenarios_from_testable_properties() {
        assert_eq!(parse("&amp;"), vec![Node::Text("&".into())]);
        assert_eq!(parse("&#38;"), vec![Node::Text("&".into())]);
        assert_eq!(parse("&#x26;"), vec![Node::Text("&".into())]);
        assert_eq!(parse("&#383;"), vec![Node::Text("ſ".into())]);
    }

    #[test]
    fn doctype_is_a_synthetic_empty_element() {
        assert_eq!(
            parse("<!DOCTYPE html>"),
            vec![element("!doctype".into(), Vec::new(), Vec::new())]
        );
    }

    #[test]
    fn parse_is_deterministic() {
        let input = "<div id=\"a\"><p>x</p><p>y</p></div>";
        assert_eq!(parse(input), parse(input));
    }

    #[test]
    fn unterminated_comment_consumes_to_end_of_input() {
        assert_eq!(
            parse("<!-- never closes"),
            vec![Node::Comment(" never closes".into())]
        );
    }
}
