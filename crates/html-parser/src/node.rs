//! The node data model produced by [`crate::parse`].

/// A single parsed node. Trees are owned top-down: each `Element`'s
/// `children` own their own subtrees, with no back-references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A run of character data with all character references decoded.
    Text(String),
    /// `name` is ASCII-lowercased; `attributes` preserve source order and may
    /// contain duplicate names. DOCTYPE is represented as an element named
    /// `!doctype` with no attributes or children.
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<Node>,
    },
    /// Raw content between `<!--` and `-->`, not entity-decoded.
    Comment(String),
}

impl Node {
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[(String, String)] {
        match self {
            Node::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element { .. })
    }
}
