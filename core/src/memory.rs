//! Headless, arena-backed [`Document`] implementation.
//!
//! Used as the document double in tests and by hosts without a browser. Nodes
//! are never freed; ids stay valid for the life of the document.

use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt::Write as _;

use indexmap::IndexMap;

use crate::{
    document::{
        Document, Event, EventHandler, EventListenerId, is_valid_attribute_name,
        is_valid_class_token, is_valid_tag_name,
    },
    error::DocumentError,
    node::NodeId,
    style::parse_declarations,
};

const ROOT_TAG: &str = "body";
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone)]
enum Child {
    Element(NodeId),
    Text(String),
}

struct Listener {
    id: EventListenerId,
    node: NodeId,
    event: String,
    handler: EventHandler,
}

#[derive(Debug, Default)]
struct MemoryNode {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<Child>,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    value: Option<String>,
}

impl MemoryNode {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            ..Self::default()
        }
    }

    fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .into_iter()
            .flat_map(|classes| classes.split_whitespace())
    }
}

/// An in-memory document tree.
///
/// ```
/// use breeze_core::{Document, MemoryDocument};
///
/// let document = MemoryDocument::new();
/// let node = document.create_element("p").unwrap();
/// document.set_text_content(node, "hi").unwrap();
/// document.append_child(document.root(), node).unwrap();
/// assert_eq!(document.to_html(document.root()).unwrap(), "<body><p>hi</p></body>");
/// ```
pub struct MemoryDocument {
    nodes: RefCell<Vec<MemoryNode>>,
    listeners: RefCell<Vec<Listener>>,
    next_listener: Cell<u64>,
}

impl core::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("nodes", &self.nodes.borrow().len())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Creates a document holding only its `<body>` root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![MemoryNode::new(ROOT_TAG)]),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        }
    }

    /// Creates a shared document, ready to hand to factories and stores.
    #[must_use]
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Number of nodes ever created, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// The class tokens of `node`, in order.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    pub fn classes(&self, node: NodeId) -> Result<Vec<String>, DocumentError> {
        self.with_node(node, |n| n.class_tokens().map(str::to_owned).collect())
    }

    /// The literal attributes of `node`, in insertion order, without the
    /// reflected `style` attribute.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    pub fn attributes(&self, node: NodeId) -> Result<Vec<(String, String)>, DocumentError> {
        self.with_node(node, |n| {
            n.attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        })
    }

    /// The inline style declarations of `node`, in insertion order.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    pub fn style(&self, node: NodeId) -> Result<Vec<(String, String)>, DocumentError> {
        self.with_node(node, |n| {
            n.style
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        })
    }

    /// Dispatches an event of type `kind` at `node`, bubbling through its ancestors.
    ///
    /// Handlers run after every internal borrow is released, so they may freely
    /// call back into the document.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    pub fn dispatch(&self, node: NodeId, kind: &str) -> Result<Event, DocumentError> {
        let mut path = vec![node];
        let mut current = self.parent(node)?;
        while let Some(ancestor) = current {
            path.push(ancestor);
            current = self.parent(ancestor)?;
        }

        let handlers: Vec<EventHandler> = {
            let listeners = self.listeners.borrow();
            path.iter()
                .flat_map(|step| {
                    listeners
                        .iter()
                        .filter(move |l| l.node == *step && l.event == kind)
                        .map(|l| Rc::clone(&l.handler))
                })
                .collect()
        };

        let event = Event::new(kind, node);
        for handler in handlers {
            handler(&event);
        }
        Ok(event)
    }

    /// Serializes `node` and its subtree to HTML.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    pub fn to_html(&self, node: NodeId) -> Result<String, DocumentError> {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        write_html(&nodes, node, &mut out)?;
        Ok(out)
    }

    fn with_node<T>(
        &self,
        node: NodeId,
        f: impl FnOnce(&MemoryNode) -> T,
    ) -> Result<T, DocumentError> {
        let nodes = self.nodes.borrow();
        nodes
            .get(node.index())
            .map(f)
            .ok_or(DocumentError::UnknownNode(node))
    }

    fn with_node_mut<T>(
        &self,
        node: NodeId,
        f: impl FnOnce(&mut MemoryNode) -> T,
    ) -> Result<T, DocumentError> {
        let mut nodes = self.nodes.borrow_mut();
        nodes
            .get_mut(node.index())
            .map(f)
            .ok_or(DocumentError::UnknownNode(node))
    }

    fn is_ancestor(nodes: &[MemoryNode], candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(node) = current {
            if node == candidate {
                return true;
            }
            current = nodes.get(node.index()).and_then(|n| n.parent);
        }
        false
    }

    fn detach(nodes: &mut [MemoryNode], child: NodeId) {
        let Some(parent) = nodes[child.index()].parent.take() else {
            return;
        };
        nodes[parent.index()]
            .children
            .retain(|c| !matches!(c, Child::Element(id) if *id == child));
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> NodeId {
        NodeId::from_raw(0)
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DocumentError> {
        if !is_valid_tag_name(tag) {
            return Err(DocumentError::InvalidName {
                kind: "tag",
                name: tag.to_owned(),
            });
        }
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId::from_index(nodes.len())
            .ok_or_else(|| DocumentError::Host(String::from("node arena exhausted")))?;
        nodes.push(MemoryNode::new(tag));
        Ok(id)
    }

    fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.borrow().len()
    }

    fn tag_name(&self, node: NodeId) -> Result<String, DocumentError> {
        self.with_node(node, |n| n.tag.clone())
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        let mut nodes = self.nodes.borrow_mut();
        for id in [parent, child] {
            if id.index() >= nodes.len() {
                return Err(DocumentError::UnknownNode(id));
            }
        }
        if Self::is_ancestor(&nodes, child, parent) {
            return Err(DocumentError::Hierarchy { parent, child });
        }
        Self::detach(&mut nodes, child);
        nodes[child.index()].parent = Some(parent);
        nodes[parent.index()].children.push(Child::Element(child));
        Ok(())
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        let mut nodes = self.nodes.borrow_mut();
        for id in [parent, child] {
            if id.index() >= nodes.len() {
                return Err(DocumentError::UnknownNode(id));
            }
        }
        if nodes[child.index()].parent != Some(parent) {
            return Err(DocumentError::NotAChild { parent, child });
        }
        Self::detach(&mut nodes, child);
        Ok(())
    }

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DocumentError> {
        self.with_node(node, |n| n.parent)
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DocumentError> {
        self.with_node(node, |n| {
            n.children
                .iter()
                .filter_map(|c| match c {
                    Child::Element(id) => Some(*id),
                    Child::Text(_) => None,
                })
                .collect()
        })
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DocumentError> {
        if !is_valid_attribute_name(name) {
            return Err(DocumentError::InvalidName {
                kind: "attribute",
                name: name.to_owned(),
            });
        }
        self.with_node_mut(node, |n| {
            if name.eq_ignore_ascii_case("style") {
                n.style = parse_declarations(value)
                    .map(|(name, value)| (name.to_owned(), value.to_owned()))
                    .collect();
            } else {
                n.attributes.insert(name.to_owned(), value.to_owned());
            }
        })
    }

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DocumentError> {
        self.with_node(node, |n| {
            if name.eq_ignore_ascii_case("style") {
                (!n.style.is_empty()).then(|| serialize_style(&n.style))
            } else {
                n.attributes.get(name).cloned()
            }
        })
    }

    fn add_class(&self, node: NodeId, class: &str) -> Result<(), DocumentError> {
        if !is_valid_class_token(class) {
            return Err(DocumentError::InvalidToken(class.to_owned()));
        }
        self.with_node_mut(node, |n| {
            if n.class_tokens().any(|existing| existing == class) {
                return;
            }
            let mut tokens: Vec<&str> = n.class_tokens().collect();
            tokens.push(class);
            let joined = tokens.join(" ");
            n.attributes.insert(String::from("class"), joined);
        })
    }

    fn set_style_property(
        &self,
        node: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError> {
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == ':' || c == ';') {
            return Err(DocumentError::InvalidName {
                kind: "style property",
                name: name.to_owned(),
            });
        }
        self.with_node_mut(node, |n| {
            if value.is_empty() {
                n.style.shift_remove(name);
            } else {
                n.style.insert(name.to_owned(), value.to_owned());
            }
        })
    }

    fn remove_style_property(&self, node: NodeId, name: &str) -> Result<(), DocumentError> {
        self.with_node_mut(node, |n| {
            n.style.shift_remove(name);
        })
    }

    fn style_property(&self, node: NodeId, name: &str) -> Result<Option<String>, DocumentError> {
        self.with_node(node, |n| n.style.get(name).cloned())
    }

    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), DocumentError> {
        let mut nodes = self.nodes.borrow_mut();
        if node.index() >= nodes.len() {
            return Err(DocumentError::UnknownNode(node));
        }
        let previous = core::mem::take(&mut nodes[node.index()].children);
        for child in previous {
            if let Child::Element(id) = child {
                nodes[id.index()].parent = None;
            }
        }
        if !text.is_empty() {
            nodes[node.index()]
                .children
                .push(Child::Text(text.to_owned()));
        }
        Ok(())
    }

    fn text_content(&self, node: NodeId) -> Result<String, DocumentError> {
        let nodes = self.nodes.borrow();
        if node.index() >= nodes.len() {
            return Err(DocumentError::UnknownNode(node));
        }
        let mut text = String::new();
        collect_text(&nodes, node, &mut text);
        Ok(text)
    }

    fn input_value(&self, node: NodeId) -> Result<String, DocumentError> {
        self.with_node(node, |n| {
            n.value
                .clone()
                .or_else(|| n.attributes.get("value").cloned())
                .unwrap_or_default()
        })
    }

    fn set_input_value(&self, node: NodeId, value: &str) -> Result<(), DocumentError> {
        self.with_node_mut(node, |n| n.value = Some(value.to_owned()))
    }

    fn add_event_listener(
        &self,
        node: NodeId,
        event: &str,
        handler: EventHandler,
    ) -> Result<EventListenerId, DocumentError> {
        if !self.contains(node) {
            return Err(DocumentError::UnknownNode(node));
        }
        let id = EventListenerId::from_raw(self.next_listener.get());
        self.next_listener.set(id.into_raw() + 1);
        self.listeners.borrow_mut().push(Listener {
            id,
            node,
            event: event.to_owned(),
            handler,
        });
        Ok(id)
    }

    fn remove_event_listener(&self, listener: EventListenerId) -> Result<(), DocumentError> {
        self.listeners.borrow_mut().retain(|l| l.id != listener);
        Ok(())
    }
}

fn collect_text(nodes: &[MemoryNode], node: NodeId, out: &mut String) {
    for child in &nodes[node.index()].children {
        match child {
            Child::Text(text) => out.push_str(text),
            Child::Element(id) => collect_text(nodes, *id, out),
        }
    }
}

fn serialize_style(style: &IndexMap<String, String>) -> String {
    style
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(text: &str, out: &mut String, in_attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn write_html(nodes: &[MemoryNode], node: NodeId, out: &mut String) -> Result<(), DocumentError> {
    let data = nodes
        .get(node.index())
        .ok_or(DocumentError::UnknownNode(node))?;

    out.push('<');
    out.push_str(&data.tag);
    for (name, value) in &data.attributes {
        let _ = write!(out, " {name}=\"");
        escape(value, out, true);
        out.push('"');
    }
    if !data.style.is_empty() {
        out.push_str(" style=\"");
        escape(&serialize_style(&data.style), out, true);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&data.tag.as_str()) {
        return Ok(());
    }

    for child in &data.children {
        match child {
            Child::Text(text) => escape(text, out, false),
            Child::Element(id) => write_html(nodes, *id, out)?,
        }
    }
    let _ = write!(out, "</{}>", data.tag);
    Ok(())
}
