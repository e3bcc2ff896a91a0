//! [`Document`] implementation over the browser DOM.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::Rc,
};

use breeze_core::{
    Document, DocumentError, Event, EventHandler, EventListenerId, NodeId,
    document::{is_valid_attribute_name, is_valid_class_token, is_valid_tag_name},
};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{CssStyleDeclaration, Element, HtmlElement, HtmlInputElement};

use crate::{dom::DomRoot, error::describe};

struct ListenerSlot {
    node: NodeId,
    event: String,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

/// Arena of DOM elements addressed by [`NodeId`].
///
/// Node `#0` is the mount element. Elements created through the document, or
/// adopted with [`WebDocument::adopt`], keep their id until
/// [`WebDocument::release`]; ids are never reused. A `WeakMap` maps elements
/// back to their id. Event listener closures are owned here and dropped by
/// [`Document::remove_event_listener`], by `release`, or with the document.
pub struct WebDocument {
    document: web_sys::Document,
    nodes: RefCell<Vec<Option<Element>>>,
    index: js_sys::WeakMap,
    listeners: RefCell<HashMap<EventListenerId, ListenerSlot>>,
    next_listener: Cell<u64>,
}

impl fmt::Debug for WebDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDocument")
            .field("nodes", &self.nodes.borrow().iter().flatten().count())
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl WebDocument {
    /// Creates a document whose root node is the mount element of `root`.
    #[must_use]
    pub fn new(root: &DomRoot) -> Self {
        let index = js_sys::WeakMap::new();
        index.set(root.element(), &JsValue::from(0));
        Self {
            document: root.document().clone(),
            nodes: RefCell::new(vec![Some(root.element().clone())]),
            index,
            listeners: RefCell::new(HashMap::new()),
            next_listener: Cell::new(0),
        }
    }

    /// Creates a shareable document.
    #[must_use]
    pub fn shared(root: &DomRoot) -> Rc<Self> {
        Rc::new(Self::new(root))
    }

    /// The DOM element behind `node`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownNode`] for ids this document never
    /// issued or has released.
    pub fn element(&self, node: NodeId) -> Result<Element, DocumentError> {
        self.nodes
            .borrow()
            .get(node.index())
            .cloned()
            .flatten()
            .ok_or(DocumentError::UnknownNode(node))
    }

    /// The id of `element`, if it was created or adopted by this document and
    /// not released since.
    #[must_use]
    pub fn node_of(&self, element: &Element) -> Option<NodeId> {
        let raw = self.index.get(element).as_f64()?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let node = NodeId::from_raw(raw as u32);
        self.contains(node).then_some(node)
    }

    /// Forgets `node`: its id becomes unknown and the listeners attached
    /// through this document are detached. The element itself stays wherever
    /// it is in the DOM. Unbind the node from any store first.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownNode`] for unknown ids and
    /// [`DocumentError::Host`] for the mount element.
    pub fn release(&self, node: NodeId) -> Result<(), DocumentError> {
        if node == self.root() {
            return Err(DocumentError::Host(String::from(
                "the mount element cannot be released",
            )));
        }
        let element = self
            .nodes
            .borrow_mut()
            .get_mut(node.index())
            .and_then(Option::take)
            .ok_or(DocumentError::UnknownNode(node))?;
        self.index.delete(&element);

        let attached: Vec<EventListenerId> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, slot)| slot.node == node)
            .map(|(&id, _)| id)
            .collect();
        for id in attached {
            if let Some(slot) = self.listeners.borrow_mut().remove(&id) {
                element
                    .remove_event_listener_with_callback(
                        &slot.event,
                        slot.closure.as_ref().unchecked_ref(),
                    )
                    .map_err(|e| host(&e))?;
            }
        }
        debug!(%node, "node released");
        Ok(())
    }

    /// Registers an element created elsewhere, returning its existing id if it
    /// is already known.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Host`] if the arena cannot issue another id.
    pub fn adopt(&self, element: Element) -> Result<NodeId, DocumentError> {
        if let Some(node) = self.node_of(&element) {
            return Ok(node);
        }
        self.push(element)
    }

    fn push(&self, element: Element) -> Result<NodeId, DocumentError> {
        let mut nodes = self.nodes.borrow_mut();
        let node = NodeId::from_index(nodes.len())
            .ok_or_else(|| DocumentError::Host(String::from("node arena is full")))?;
        self.index.set(&element, &JsValue::from(node.into_raw()));
        nodes.push(Some(element));
        Ok(node)
    }

    fn style(&self, node: NodeId) -> Result<CssStyleDeclaration, DocumentError> {
        self.element(node)?
            .dyn_ref::<HtmlElement>()
            .map(HtmlElement::style)
            .ok_or_else(|| DocumentError::Host(format!("node {node} has no inline style")))
    }
}

fn host(err: &JsValue) -> DocumentError {
    DocumentError::Host(describe(err))
}

impl Document for WebDocument {
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
        let element = self.document.create_element(tag).map_err(|e| host(&e))?;
        self.push(element)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes
            .borrow()
            .get(node.index())
            .is_some_and(Option::is_some)
    }

    fn tag_name(&self, node: NodeId) -> Result<String, DocumentError> {
        Ok(self.element(node)?.local_name())
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        let parent = self.element(parent)?;
        let child = self.element(child)?;
        parent.append_child(&child).map_err(|e| host(&e))?;
        Ok(())
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        let parent_element = self.element(parent)?;
        let child_element = self.element(child)?;
        let is_child = child_element
            .parent_node()
            .is_some_and(|actual| js_sys::Object::is(&actual, &parent_element));
        if !is_child {
            return Err(DocumentError::NotAChild { parent, child });
        }
        parent_element
            .remove_child(&child_element)
            .map_err(|e| host(&e))?;
        Ok(())
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DocumentError> {
        let children = self.element(node)?.children();
        Ok((0..children.length())
            .filter_map(|index| children.item(index))
            .filter_map(|child| self.node_of(&child))
            .collect())
    }

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DocumentError> {
        Ok(self
            .element(node)?
            .parent_element()
            .and_then(|parent| self.node_of(&parent)))
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DocumentError> {
        if !is_valid_attribute_name(name) {
            return Err(DocumentError::InvalidName {
                kind: "attribute",
                name: name.to_owned(),
            });
        }
        self.element(node)?
            .set_attribute(name, value)
            .map_err(|e| host(&e))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DocumentError> {
        Ok(self.element(node)?.get_attribute(name))
    }

    fn add_class(&self, node: NodeId, class: &str) -> Result<(), DocumentError> {
        if !is_valid_class_token(class) {
            return Err(DocumentError::InvalidToken(class.to_owned()));
        }
        self.element(node)?
            .class_list()
            .add_1(class)
            .map_err(|e| host(&e))
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
        let style = self.style(node)?;
        if value.is_empty() {
            style.remove_property(name).map_err(|e| host(&e))?;
            Ok(())
        } else {
            style.set_property(name, value).map_err(|e| host(&e))
        }
    }

    fn remove_style_property(&self, node: NodeId, name: &str) -> Result<(), DocumentError> {
        self.style(node)?
            .remove_property(name)
            .map_err(|e| host(&e))?;
        Ok(())
    }

    fn style_property(&self, node: NodeId, name: &str) -> Result<Option<String>, DocumentError> {
        let value = self
            .style(node)?
            .get_property_value(name)
            .map_err(|e| host(&e))?;
        Ok((!value.is_empty()).then_some(value))
    }

    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), DocumentError> {
        self.element(node)?.set_text_content(Some(text));
        Ok(())
    }

    fn text_content(&self, node: NodeId) -> Result<String, DocumentError> {
        Ok(self.element(node)?.text_content().unwrap_or_default())
    }

    fn input_value(&self, node: NodeId) -> Result<String, DocumentError> {
        let element = self.element(node)?;
        Ok(element.dyn_ref::<HtmlInputElement>().map_or_else(
            || element.get_attribute("value").unwrap_or_default(),
            HtmlInputElement::value,
        ))
    }

    fn set_input_value(&self, node: NodeId, value: &str) -> Result<(), DocumentError> {
        let element = self.element(node)?;
        match element.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.set_value(value),
            None => element.set_attribute("value", value).map_err(|e| host(&e))?,
        }
        Ok(())
    }

    /// Attaches `handler` to the DOM element. The [`Event`] it receives targets
    /// the node the listener is attached to; calling
    /// [`Event::prevent_default`] prevents the browser default.
    fn add_event_listener(
        &self,
        node: NodeId,
        event: &str,
        handler: EventHandler,
    ) -> Result<EventListenerId, DocumentError> {
        let element = self.element(node)?;
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |raw: web_sys::Event| {
            let event = Event::new(raw.type_(), node);
            handler(&event);
            if event.default_prevented() {
                raw.prevent_default();
            }
        });
        element
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| host(&e))?;

        let id = EventListenerId::from_raw(self.next_listener.get());
        self.next_listener.set(id.into_raw() + 1);
        self.listeners.borrow_mut().insert(
            id,
            ListenerSlot {
                node,
                event: event.to_owned(),
                closure,
            },
        );
        debug!(%node, event, "DOM listener attached");
        Ok(id)
    }

    fn remove_event_listener(&self, listener: EventListenerId) -> Result<(), DocumentError> {
        let Some(slot) = self.listeners.borrow_mut().remove(&listener) else {
            return Ok(());
        };
        self.element(slot.node)?
            .remove_event_listener_with_callback(&slot.event, slot.closure.as_ref().unchecked_ref())
            .map_err(|e| host(&e))
    }
}
