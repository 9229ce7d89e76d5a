//! Tree queries and traversal utilities. All recursive helpers walk Element
//! children only; Text and Comment nodes are inert leaves.

use crate::node::Node;
use rustc_hash::FxHashMap;

/// Depth-first, document-order search for every element named `name`
/// (case-insensitive), including matches nested inside other matches.
pub fn get_elements_by_tag_name<'a>(name: &str, nodes: &'a [Node]) -> Vec<&'a Node> {
    let name = name.to_ascii_lowercase();
    let mut out = Vec::new();
    collect_by_tag(&name, nodes, &mut out);
    out
}

fn collect_by_tag<'a>(name: &str, nodes: &'a [Node], out: &mut Vec<&'a Node>) {
    for node in nodes {
        if let Node::Element { name: tag, children, .. } = node {
            if tag == name {
                out.push(node);
            }
            collect_by_tag(name, children, out);
        }
    }
}

/// Every element whose class list contains all of `classes`
/// (whitespace-separated).
pub fn get_elements_by_class_name<'a>(classes: &str, nodes: &'a [Node]) -> Vec<&'a Node> {
    let wanted: Vec<&str> = classes.split_ascii_whitespace().collect();
    let mut out = Vec::new();
    collect_by_class(&wanted, nodes, &mut out);
    out
}

fn collect_by_class<'a>(wanted: &[&str], nodes: &'a [Node], out: &mut Vec<&'a Node>) {
    for node in nodes {
        if let Node::Element { attributes, children, .. } = node {
            let own = get_class_list(attributes);
            if wanted.iter().all(|c| own.contains(c)) {
                out.push(node);
            }
            collect_by_class(wanted, children, out);
        }
    }
}

/// The first element carrying `id="<id>"` in document order, if any.
pub fn get_element_by_id<'a>(id: &str, nodes: &'a [Node]) -> Option<&'a Node> {
    find_element(nodes, &mut |_, attrs| get_id(attrs) == Some(id))
}

pub fn find_element<'a>(
    nodes: &'a [Node],
    predicate: &mut dyn FnMut(&str, &[(String, String)]) -> bool,
) -> Option<&'a Node> {
    for node in nodes {
        if let Node::Element { name, attributes, children } = node {
            if predicate(name, attributes) {
                return Some(node);
            }
            if let Some(found) = find_element(children, predicate) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_elements<'a>(
    nodes: &'a [Node],
    predicate: &mut dyn FnMut(&str, &[(String, String)]) -> bool,
) -> Vec<&'a Node> {
    let mut out = Vec::new();
    find_elements_inner(nodes, predicate, &mut out);
    out
}

fn find_elements_inner<'a>(
    nodes: &'a [Node],
    predicate: &mut dyn FnMut(&str, &[(String, String)]) -> bool,
    out: &mut Vec<&'a Node>,
) {
    for node in nodes {
        if let Node::Element { name, attributes, children } = node {
            if predicate(name, attributes) {
                out.push(node);
            }
            find_elements_inner(children, predicate, out);
        }
    }
}

/// Top-level only (not recursive): maps every top-level Element through `f`.
pub fn map_elements<T>(
    nodes: &[Node],
    mut f: impl FnMut(&str, &[(String, String)], &[Node]) -> T,
) -> Vec<T> {
    nodes
        .iter()
        .filter_map(|n| match n {
            Node::Element { name, attributes, children } => Some(f(name, attributes, children)),
            _ => None,
        })
        .collect()
}

/// Top-level only: every Element satisfying `pred`.
pub fn filter_elements<'a>(
    nodes: &'a [Node],
    mut pred: impl FnMut(&str, &[(String, String)], &[Node]) -> bool,
) -> Vec<&'a Node> {
    nodes
        .iter()
        .filter(|n| match n {
            Node::Element { name, attributes, children } => pred(name, attributes, children),
            _ => false,
        })
        .collect()
}

/// Top-level only: `f` applied to every top-level Element, keeping `Some`s.
pub fn filter_map_elements<T>(
    nodes: &[Node],
    mut f: impl FnMut(&str, &[(String, String)], &[Node]) -> Option<T>,
) -> Vec<T> {
    nodes
        .iter()
        .filter_map(|n| match n {
            Node::Element { name, attributes, children } => f(name, attributes, children),
            _ => None,
        })
        .collect()
}

/// Concatenation of all Text content in document order; Comments contribute
/// nothing.
pub fn text_content(nodes: &[Node]) -> String {
    let mut out = String::new();
    accumulate_text(nodes, &mut out);
    out
}

fn accumulate_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element { children, .. } => accumulate_text(children, out),
            Node::Comment(_) => {}
        }
    }
}

pub fn get_value<'a>(name: &str, attributes: &'a [(String, String)]) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

pub fn get_id(attributes: &[(String, String)]) -> Option<&str> {
    get_value("id", attributes)
}

pub fn get_class_list(attributes: &[(String, String)]) -> Vec<&str> {
    get_value("class", attributes)
        .map(|c| c.split_ascii_whitespace().collect())
        .unwrap_or_default()
}

/// Walks the whole tree once, bucketing elements by id. Values are sequences
/// because more than one element may (incorrectly, but permissibly) share an
/// id.
pub fn create_id_dict(nodes: &[Node]) -> FxHashMap<String, Vec<&Node>> {
    let mut map = FxHashMap::default();
    fn walk<'a>(nodes: &'a [Node], map: &mut FxHashMap<String, Vec<&'a Node>>) {
        for node in nodes {
            if let Node::Element { attributes, children, .. } = node {
                if let Some(id) = get_id(attributes) {
                    map.entry(id.to_string()).or_default().push(node);
                }
                walk(children, map);
            }
        }
    }
    walk(nodes, &mut map);
    map
}

pub fn create_tag_dict(nodes: &[Node]) -> FxHashMap<String, Vec<&Node>> {
    let mut map = FxHashMap::default();
    fn walk<'a>(nodes: &'a [Node], map: &mut FxHashMap<String, Vec<&'a Node>>) {
        for node in nodes {
            if let Node::Element { name, children, .. } = node {
                map.entry(name.clone()).or_default().push(node);
                walk(children, map);
            }
        }
    }
    walk(nodes, &mut map);
    map
}

/// A single element contributes to one bucket per class token it carries.
pub fn create_class_dict(nodes: &[Node]) -> FxHashMap<String, Vec<&Node>> {
    let mut map = FxHashMap::default();
    fn walk<'a>(nodes: &'a [Node], map: &mut FxHashMap<String, Vec<&'a Node>>) {
        for node in nodes {
            if let Node::Element { attributes, children, .. } = node {
                for class in get_class_list(attributes) {
                    map.entry(class.to_string()).or_default().push(node);
                }
                walk(children, map);
            }
        }
    }
    walk(nodes, &mut map);
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn text_content_ignores_comments_and_descends_elements() {
        let nodes = parse("<div>This is <span>some</span> text</div>");
        assert_eq!(text_content(&nodes), "This is some text");

        let nodes = parse("<div>This is <!--some--> text</div>");
        assert_eq!(text_content(&nodes), "This is  text");
    }

    #[test]
    fn get_elements_by_tag_name_is_depth_first() {
        let nodes = parse("<div><p>a</p><div><p>b</p></div></div>");
        let ps = get_elements_by_tag_name("p", &nodes);
        assert_eq!(ps.len(), 2);
    }

    #[test]
    fn get_element_by_id_returns_first_match() {
        let nodes = parse("<div id=\"x\">a</div><div id=\"x\">b</div>");
        let found = get_element_by_id("x", &nodes).unwrap();
        assert_eq!(text_content(found.children()), "a");
    }

    #[test]
    fn class_list_and_class_query_split_on_whitespace() {
        let nodes = parse("<div class=\"a b\"></div><div class=\"a\"></div>");
        let matches = get_elements_by_class_name("a b", &nodes);
        assert_eq!(matches.len(), 1);
        let matches = get_elements_by_class_name("a", &nodes);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn index_builders_bucket_by_document_order() {
        let nodes = parse("<div id=\"a\" class=\"x\"><span class=\"x y\">1</span></div>");
        let tags = create_tag_dict(&nodes);
        assert_eq!(tags.get("span").map(Vec::len), Some(1));

        let classes = create_class_dict(&nodes);
        assert_eq!(classes.get("x").map(Vec::len), Some(2));
        assert_eq!(classes.get("y").map(Vec::len), Some(1));

        let ids = create_id_dict(&nodes);
        assert_eq!(ids.get("a").map(Vec::len), Some(1));
    }
}
