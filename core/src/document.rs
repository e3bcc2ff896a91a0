//! The document-tree capability the rest of the toolkit is written against.
//!
//! Nothing in `breeze-core` reaches for a global document. Components receive a
//! [`SharedDocument`] and an explicit mount [`NodeId`], so the same code drives a
//! browser DOM (`breeze-web`) or the headless [`MemoryDocument`](crate::memory::MemoryDocument).

use alloc::rc::Rc;
use core::{cell::Cell, fmt};

use crate::{error::DocumentError, node::NodeId};

/// Shared handle to a document implementation.
pub type SharedDocument = Rc<dyn Document>;

/// Callback attached to a node with [`Document::add_event_listener`].
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Identifies an event listener registered on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventListenerId(u64);

impl EventListenerId {
    /// Wraps a raw listener counter value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

/// An event delivered to an [`EventHandler`].
#[derive(Debug)]
pub struct Event {
    kind: String,
    target: NodeId,
    default_prevented: Cell<bool>,
}

impl Event {
    /// Creates an event of `kind` targeting `target`.
    pub fn new(kind: impl Into<String>, target: NodeId) -> Self {
        Self {
            kind: kind.into(),
            target,
            default_prevented: Cell::new(false),
        }
    }

    /// The event type, such as `click` or `submit`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The node the event was dispatched to.
    #[must_use]
    pub const fn target(&self) -> NodeId {
        self.target
    }

    /// Asks the host to skip its default action for this event.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Whether a handler called [`Event::prevent_default`].
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Primitive operations over a display tree.
///
/// Implementations own every node they create and hand out [`NodeId`]s. All
/// methods take `&self`; implementations use interior mutability so a document
/// can be shared between the factory, the store and collaborators.
pub trait Document: fmt::Debug {
    /// The mount point new top-level content is attached to.
    fn root(&self) -> NodeId;

    /// Creates a detached element for `tag`.
    ///
    /// # Errors
    ///
    /// Fails when the host rejects the tag name.
    fn create_element(&self, tag: &str) -> Result<NodeId, DocumentError>;

    /// Whether `node` was issued by this document.
    fn contains(&self, node: NodeId) -> bool;

    /// The tag name `node` was created with.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    fn tag_name(&self, node: NodeId) -> Result<String, DocumentError>;

    /// Appends `child` as the last child of `parent`, moving it if already attached.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes or when the insertion would create a cycle.
    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError>;

    /// Detaches `child` from `parent`.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes or when `child` is not a child of `parent`.
    fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError>;

    /// The element children of `node`, in document order.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DocumentError>;

    /// The element `node` is attached to, if any.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DocumentError>;

    /// Sets a literal attribute.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes or invalid attribute names.
    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DocumentError>;

    /// Reads a literal attribute.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DocumentError>;

    /// Adds a class token to the node's class list.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes or tokens that are empty or contain whitespace.
    fn add_class(&self, node: NodeId, class: &str) -> Result<(), DocumentError>;

    /// Sets one inline style property. `name` is a CSS property name (`z-index`).
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes or nodes without inline style.
    fn set_style_property(&self, node: NodeId, name: &str, value: &str)
    -> Result<(), DocumentError>;

    /// Removes one inline style property.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes or nodes without inline style.
    fn remove_style_property(&self, node: NodeId, name: &str) -> Result<(), DocumentError>;

    /// Reads one inline style property.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    fn style_property(&self, node: NodeId, name: &str) -> Result<Option<String>, DocumentError>;

    /// Replaces all children of `node` with literal text.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), DocumentError>;

    /// The concatenated text of `node` and its descendants.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    fn text_content(&self, node: NodeId) -> Result<String, DocumentError>;

    /// The current value of a form control.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    fn input_value(&self, node: NodeId) -> Result<String, DocumentError>;

    /// Replaces the current value of a form control, as a user edit would.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes.
    fn set_input_value(&self, node: NodeId, value: &str) -> Result<(), DocumentError>;

    /// Attaches `handler` for events of type `event` on `node`.
    ///
    /// # Errors
    ///
    /// Fails for unknown nodes or when the host refuses the listener.
    fn add_event_listener(
        &self,
        node: NodeId,
        event: &str,
        handler: EventHandler,
    ) -> Result<EventListenerId, DocumentError>;

    /// Detaches a listener previously returned by [`Document::add_event_listener`].
    ///
    /// Unknown listener ids are ignored.
    ///
    /// # Errors
    ///
    /// Fails when the host refuses to detach the listener.
    fn remove_event_listener(&self, listener: EventListenerId) -> Result<(), DocumentError>;
}

/// Whether `tag` is acceptable as an element type.
///
/// An ASCII letter followed by ASCII alphanumerics, `-`, `_`, `.` or `:`.
#[must_use]
pub fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

/// Whether `name` can be used with [`Document::set_attribute`].
#[must_use]
pub fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| {
                !c.is_whitespace() && !c.is_control() && !matches!(c, '"' | '\'' | '>' | '/' | '=')
            })
}

/// Whether `token` can be added to a class list.
#[must_use]
pub fn is_valid_class_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names() {
        assert!(is_valid_tag_name("div"));
        assert!(is_valid_tag_name("my-widget"));
        assert!(is_valid_tag_name("h1"));
        assert!(!is_valid_tag_name(""));
        assert!(!is_valid_tag_name("1div"));
        assert!(!is_valid_tag_name("di v"));
        assert!(!is_valid_tag_name("<div>"));
    }

    #[test]
    fn attribute_names() {
        assert!(is_valid_attribute_name("data-count"));
        assert!(is_valid_attribute_name("textContent"));
        assert!(is_valid_attribute_name("aria-label"));
        assert!(!is_valid_attribute_name(""));
        assert!(!is_valid_attribute_name("bad name"));
        assert!(!is_valid_attribute_name("a=b"));
    }

    #[test]
    fn prevent_default_is_sticky() {
        let event = Event::new("submit", NodeId::from_raw(1));
        assert!(!event.default_prevented());
        event.prevent_default();
        assert!(event.default_prevented());
        assert_eq!(event.kind(), "submit");
    }
}
