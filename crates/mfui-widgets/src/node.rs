#![forbid(unsafe_code)]

//! Render tree produced by components.
//!
//! A [`Node`] is the markup a component hands to its host: elements with a
//! tag, an optional host [`ElementId`], attributes, and children, plus text.

use mfui_core::host::ElementId;

/// One node of rendered markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element {
        tag: String,
        id: Option<ElementId>,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

impl Node {
    /// An empty element.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: tag.into(),
            id: None,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Bind the element to a host element id.
    #[must_use]
    pub fn with_id(mut self, element: ElementId) -> Self {
        if let Self::Element { id, .. } = &mut self {
            *id = Some(element);
        }
        self
    }

    /// Set an attribute, replacing an existing value.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Element { attrs, .. } = &mut self {
            let name = name.into();
            let value = value.into();
            match attrs.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = value,
                None => attrs.push((name, value)),
            }
        }
        self
    }

    /// Append space-separated class names. Empty names are skipped.
    #[must_use]
    pub fn class(self, class: impl AsRef<str>) -> Self {
        let class = class.as_ref().trim();
        if class.is_empty() {
            return self;
        }
        let joined = match self.get_attr("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.attr("class", joined)
    }

    /// Append a child.
    #[must_use]
    pub fn child(mut self, node: Node) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    /// Append several children.
    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    /// Element tag, `None` for text.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            Self::Text(_) => None,
        }
    }

    /// Host element id, if bound.
    pub fn id(&self) -> Option<ElementId> {
        match self {
            Self::Element { id, .. } => *id,
            Self::Text(_) => None,
        }
    }

    /// Attribute value.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            Self::Text(_) => None,
        }
    }

    /// Whether the `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Direct children.
    pub fn child_nodes(&self) -> &[Node] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text(_) => &[],
        }
    }

    /// Depth-first search including `self`.
    pub fn find(&self, pred: &dyn Fn(&Node) -> bool) -> Option<&Node> {
        if pred(self) {
            return Some(self);
        }
        self.child_nodes().iter().find_map(|c| c.find(pred))
    }

    /// Find the element bound to `id`.
    pub fn find_by_id(&self, id: ElementId) -> Option<&Node> {
        self.find(&|n| n.id() == Some(id))
    }

    /// Find the first element with `name=value`.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<&Node> {
        self.find(&|n| n.get_attr(name) == Some(value))
    }

    /// Find the first element with the given class.
    pub fn find_by_class(&self, class: &str) -> Option<&Node> {
        self.find(&|n| n.has_class(class))
    }

    /// Whether `id` is bound to this node or a descendant.
    pub fn contains_id(&self, id: ElementId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Concatenated text of this subtree.
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Element { children, .. } => {
                children.iter().map(Node::text_content).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_attrs_and_children() {
        let node = Node::element("div")
            .class("modal")
            .class("small")
            .attr("role", "dialog")
            .attr("role", "alertdialog")
            .child(Node::text("hi"));

        assert_eq!(node.tag(), Some("div"));
        assert_eq!(node.get_attr("class"), Some("modal small"));
        assert_eq!(node.get_attr("role"), Some("alertdialog"));
        assert!(node.has_class("small"));
        assert_eq!(node.text_content(), "hi");
    }

    #[test]
    fn empty_class_is_ignored() {
        let node = Node::element("div").class("  ");
        assert_eq!(node.get_attr("class"), None);
    }

    #[test]
    fn find_by_id_walks_subtree() {
        let id = ElementId::new(42);
        let tree = Node::element("div").child(
            Node::element("section").child(Node::element("button").with_id(id)),
        );
        assert_eq!(tree.find_by_id(id).and_then(Node::tag), Some("button"));
        assert!(tree.contains_id(id));
        assert!(!tree.contains_id(ElementId::new(1)));
    }

    #[test]
    fn text_nodes_ignore_element_builders() {
        let node = Node::text("x").attr("a", "b").child(Node::text("y"));
        assert_eq!(node, Node::text("x"));
        assert_eq!(node.tag(), None);
    }
}
