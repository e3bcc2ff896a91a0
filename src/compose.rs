//! Composite element construction.
//!
//! [`h`] creates an element, fills it with text or child nodes, optionally wires
//! one event listener and appends it to a parent, all in one call.
//! [`ElementBuilder`] offers the same steps as a fluent builder.

use core::fmt;

use breeze_core::{
    AttrValue, Attributes, Document, DocumentError, ElementFactory, Error, EventHandler, NodeId,
    Style,
};
use tracing::debug;

/// What goes inside a composed element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    /// Nothing.
    #[default]
    Empty,
    /// Literal text content.
    Text(String),
    /// A single child node.
    Node(NodeId),
    /// Child nodes appended in order.
    Nodes(Vec<NodeId>),
}

impl Content {
    fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            _ => "",
        }
    }

    fn nodes(&self) -> &[NodeId] {
        match self {
            Self::Node(node) => core::slice::from_ref(node),
            Self::Nodes(nodes) => nodes,
            Self::Empty | Self::Text(_) => &[],
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<NodeId> for Content {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<Vec<NodeId>> for Content {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self::Nodes(nodes)
    }
}

impl<const N: usize> From<[NodeId; N]> for Content {
    fn from(nodes: [NodeId; N]) -> Self {
        Self::Nodes(nodes.to_vec())
    }
}

/// Creates an element, fills it and appends it to `parent`.
///
/// Text content is set as literal text; node content is appended in order. When
/// `listener` is given, its handler is attached for that event type before the
/// element is appended.
///
/// # Errors
///
/// - [`Error::InvalidNode`] if `parent` or any content node is not part of the
///   document. Nothing is created in that case.
/// - Any error of [`ElementFactory::create`].
/// - [`Error::Document`] if the host refuses an append or the listener.
pub fn h(
    factory: &ElementFactory,
    parent: NodeId,
    tag: &str,
    attributes: Attributes,
    content: impl Into<Content>,
    listener: Option<(&str, EventHandler)>,
) -> Result<NodeId, Error> {
    let mut builder = ElementBuilder::new(tag)
        .attributes(attributes)
        .content(content);
    if let Some((event, handler)) = listener {
        builder = builder.on(event, handler);
    }
    builder.mount(factory, parent)
}

/// Fluent builder for a composed element.
///
/// ```
/// use breeze::compose::ElementBuilder;
/// use breeze::{Document, ElementFactory, MemoryDocument};
///
/// let document = MemoryDocument::shared();
/// let factory = ElementFactory::new(document.clone());
///
/// let title = ElementBuilder::new("h1")
///     .class("title")
///     .content("Breeze")
///     .mount(&factory, document.root())
///     .unwrap();
///
/// assert_eq!(
///     document.to_html(title).unwrap(),
///     r#"<h1 class="title">Breeze</h1>"#
/// );
/// ```
#[must_use]
pub struct ElementBuilder {
    tag: String,
    attributes: Attributes,
    content: Content,
    listeners: Vec<(String, EventHandler)>,
}

impl fmt::Debug for ElementBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBuilder")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes)
            .field("content", &self.content)
            .field(
                "listeners",
                &self.listeners.iter().map(|(event, _)| event).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ElementBuilder {
    /// Starts an element of type `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            content: Content::Empty,
            listeners: Vec::new(),
        }
    }

    /// Replaces the attribute map.
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets one attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Sets the `classListAdd` entry.
    pub fn class(mut self, classes: impl Into<AttrValue>) -> Self {
        self.attributes = self.attributes.class(classes);
        self
    }

    /// Sets the inline style map.
    pub fn style(mut self, style: Style) -> Self {
        self.attributes = self.attributes.style(style);
        self
    }

    /// Replaces the content.
    pub fn content(mut self, content: impl Into<Content>) -> Self {
        self.content = content.into();
        self
    }

    /// Adds one child node after any existing node content.
    ///
    /// Text content is discarded.
    pub fn child(mut self, node: NodeId) -> Self {
        self.content = match self.content {
            Content::Node(first) => Content::Nodes(vec![first, node]),
            Content::Nodes(mut nodes) => {
                nodes.push(node);
                Content::Nodes(nodes)
            }
            Content::Empty | Content::Text(_) => Content::Node(node),
        };
        self
    }

    /// Attaches `handler` for events of type `event`.
    pub fn on(mut self, event: impl Into<String>, handler: EventHandler) -> Self {
        self.listeners.push((event.into(), handler));
        self
    }

    /// Builds the element and appends it to `parent`.
    ///
    /// # Errors
    ///
    /// See [`h`].
    pub fn mount(self, factory: &ElementFactory, parent: NodeId) -> Result<NodeId, Error> {
        let document = factory.document().as_ref();
        if let Some(&missing) = core::iter::once(&parent)
            .chain(self.content.nodes())
            .find(|&&node| !document.contains(node))
        {
            return Err(Error::InvalidNode(missing));
        }
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if self.content.nodes().contains(&current) {
                return Err(DocumentError::Hierarchy {
                    parent,
                    child: current,
                }
                .into());
            }
            ancestor = document.parent(current)?;
        }

        let node = factory.create(&self.tag, self.attributes, self.content.text())?;
        for &child in self.content.nodes() {
            document.append_child(node, child)?;
        }
        for (event, handler) in self.listeners {
            document.add_event_listener(node, &event, handler)?;
        }
        document.append_child(parent, node)?;

        debug!(%node, %parent, "element mounted");
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use breeze_core::{Event, MemoryDocument};

    use super::*;

    fn setup() -> (Rc<MemoryDocument>, ElementFactory) {
        let document = MemoryDocument::shared();
        let factory = ElementFactory::new(document.clone());
        (document, factory)
    }

    #[test]
    fn text_content_is_literal() {
        let (document, factory) = setup();
        let node = h(
            &factory,
            document.root(),
            "p",
            Attributes::new().with("id", "intro"),
            "<b>not markup</b>",
            None,
        )
        .unwrap();

        assert_eq!(document.text_content(node).unwrap(), "<b>not markup</b>");
        assert_eq!(document.children(document.root()).unwrap(), vec![node]);
    }

    #[test]
    fn node_content_is_appended_in_order() {
        let (document, factory) = setup();
        let first = factory.create("li", Attributes::new(), "one").unwrap();
        let second = factory.create("li", Attributes::new(), "two").unwrap();

        let list = h(
            &factory,
            document.root(),
            "ul",
            Attributes::new(),
            [first, second],
            None,
        )
        .unwrap();

        assert_eq!(
            document.to_html(list).unwrap(),
            "<ul><li>one</li><li>two</li></ul>"
        );
    }

    #[test]
    fn single_node_content() {
        let (document, factory) = setup();
        let icon = factory.create("i", Attributes::new(), "").unwrap();
        let button = h(&factory, document.root(), "button", Attributes::new(), icon, None).unwrap();
        assert_eq!(document.children(button).unwrap(), vec![icon]);
    }

    #[test]
    fn listener_fires_on_dispatch() {
        let (document, factory) = setup();
        let clicks = Rc::new(Cell::new(0));
        let handler: EventHandler = Rc::new({
            let clicks = Rc::clone(&clicks);
            move |_: &Event| clicks.set(clicks.get() + 1)
        });

        let button = h(
            &factory,
            document.root(),
            "button",
            Attributes::new(),
            "Go",
            Some(("click", handler)),
        )
        .unwrap();

        document.dispatch(button, "click").unwrap();
        document.dispatch(button, "keydown").unwrap();
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn unknown_nodes_fail_before_anything_is_created() {
        let (document, factory) = setup();
        let before = document.node_count();
        let stray = NodeId::from_raw(77);

        assert_eq!(
            h(&factory, stray, "div", Attributes::new(), "", None),
            Err(Error::InvalidNode(stray))
        );
        assert_eq!(
            h(&factory, document.root(), "div", Attributes::new(), vec![stray], None),
            Err(Error::InvalidNode(stray))
        );
        assert_eq!(document.node_count(), before);
    }

    #[test]
    fn ancestors_of_the_parent_are_rejected_as_content() {
        let (document, factory) = setup();
        let outer = h(&factory, document.root(), "section", Attributes::new(), "", None).unwrap();
        let inner = h(&factory, outer, "div", Attributes::new(), "", None).unwrap();
        let before = document.to_html(document.root()).unwrap();
        let count = document.node_count();

        assert_eq!(
            h(&factory, inner, "p", Attributes::new(), outer, None),
            Err(Error::Document(DocumentError::Hierarchy {
                parent: inner,
                child: outer
            }))
        );
        assert_eq!(
            h(&factory, inner, "p", Attributes::new(), inner, None),
            Err(Error::Document(DocumentError::Hierarchy {
                parent: inner,
                child: inner
            }))
        );
        assert_eq!(document.to_html(document.root()).unwrap(), before);
        assert_eq!(document.node_count(), count);
    }

    #[test]
    fn invalid_type_is_reported() {
        let (document, factory) = setup();
        assert_eq!(
            h(&factory, document.root(), "", Attributes::new(), "", None),
            Err(Error::InvalidType(String::new()))
        );
    }

    #[test]
    fn builder_composes_attributes_children_and_listeners() {
        let (document, factory) = setup();
        let label = factory.create("span", Attributes::new(), "Save").unwrap();
        let fired = Rc::new(Cell::new(false));

        let button = ElementBuilder::new("button")
            .attr("type", "button")
            .class(["btn", "primary"])
            .style(Style::new().with("marginTop", "4px"))
            .child(label)
            .on("click", {
                let fired = Rc::clone(&fired);
                Rc::new(move |event: &Event| {
                    event.prevent_default();
                    fired.set(true);
                })
            })
            .mount(&factory, document.root())
            .unwrap();

        assert_eq!(
            document.to_html(button).unwrap(),
            r#"<button class="btn primary" type="button" style="margin-top: 4px;"><span>Save</span></button>"#
        );
        assert!(document.dispatch(label, "click").unwrap().default_prevented());
        assert!(fired.get());
    }
}
