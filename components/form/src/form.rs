//! Form containers that collect text inputs.

use std::{cell::RefCell, rc::Rc};

use breeze_core::{
    Attributes, Document, DocumentError, ElementFactory, Error, Event, EventListenerId, NodeId,
    SharedDocument,
};
use breeze_layout::Layer;
use serde::Serialize;
use tracing::{debug, warn};

/// Name and current value of one input, as read by [`Form::get_data_on_submit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValue {
    /// The input's `name` attribute.
    pub name: String,
    /// The input's current value.
    pub value: String,
}

/// A `<form>` element that tracks the inputs added through it.
///
/// Submit buttons are appended to the form but not tracked, so they never show
/// up in the collected data.
#[derive(Debug, Clone)]
pub struct Form {
    factory: ElementFactory,
    node: NodeId,
    id: String,
    inputs: Rc<RefCell<Vec<NodeId>>>,
}

impl Form {
    /// Creates `<form id=…>` and appends it to `mount`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidNode`] if `mount` is not a node of the factory's document.
    /// - [`Error::Document`] if the host refuses to create or append the form.
    pub fn new(
        factory: &ElementFactory,
        mount: NodeId,
        id: impl Into<String>,
    ) -> Result<Self, Error> {
        if !factory.document().contains(mount) {
            return Err(Error::InvalidNode(mount));
        }
        let form = Self::detached(factory, id.into())?;
        factory.document().append_child(mount, form.node)?;
        debug!(form = %form.id, %mount, "form mounted");
        Ok(form)
    }

    /// Creates `<form id=…>` inside `layer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if the host refuses to create or append the form.
    pub fn in_layer(
        factory: &ElementFactory,
        layer: &Layer,
        id: impl Into<String>,
    ) -> Result<Self, Error> {
        let form = Self::detached(factory, id.into())?;
        layer.add_element(form.node)?;
        debug!(form = %form.id, layer = layer.id(), "form mounted in layer");
        Ok(form)
    }

    fn detached(factory: &ElementFactory, id: String) -> Result<Self, Error> {
        let node = factory.create("form", Attributes::new().with("id", id.as_str()), "")?;
        Ok(Self {
            factory: factory.clone(),
            node,
            id,
            inputs: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Appends a text input and tracks it for [`Form::get_data_on_submit`].
    ///
    /// `id` is used for both the `id` and `name` attributes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if the host refuses to create or append the input.
    pub fn add_input(&self, id: &str, placeholder: &str) -> Result<NodeId, Error> {
        let attributes = Attributes::new()
            .with("id", id)
            .with("name", id)
            .with("placeholder", placeholder);
        let input = self.factory.create("input", attributes, "")?;
        self.document().append_child(self.node, input)?;
        self.inputs.borrow_mut().push(input);
        Ok(input)
    }

    /// Appends `<input type="submit">` with the given label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if the host refuses to create or append the button.
    pub fn add_submit(&self, id: &str, value: &str) -> Result<NodeId, Error> {
        let attributes = Attributes::new()
            .with("type", "submit")
            .with("id", id)
            .with("value", value);
        let submit = self.factory.create("input", attributes, "")?;
        self.document().append_child(self.node, submit)?;
        Ok(submit)
    }

    /// Reads the name and current value of every tracked input, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if an input can no longer be read.
    pub fn get_data_on_submit(&self) -> Result<Vec<FieldValue>, Error> {
        collect(self.document().as_ref(), &self.inputs.borrow()).map_err(Error::from)
    }

    /// Calls `handler` with the collected data whenever the form is submitted.
    ///
    /// The submit event's default action is prevented. Returns the listener id,
    /// which can be passed to [`Document::remove_event_listener`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if the listener cannot be attached.
    pub fn on_submit<F>(&self, handler: F) -> Result<EventListenerId, Error>
    where
        F: Fn(&[FieldValue]) + 'static,
    {
        let document = self.factory.share_document();
        let inputs = Rc::clone(&self.inputs);
        let form = self.id.clone();
        let listener = self.document().add_event_listener(
            self.node,
            "submit",
            Rc::new(move |event: &Event| {
                event.prevent_default();
                let data = collect(document.as_ref(), &inputs.borrow());
                match data {
                    Ok(data) => handler(&data),
                    Err(err) => warn!(%form, error = %err, "could not read form data"),
                }
            }),
        )?;
        Ok(listener)
    }

    /// The `id` attribute given at construction.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The `<form>` node.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// The tracked input nodes, in insertion order.
    #[must_use]
    pub fn inputs(&self) -> Vec<NodeId> {
        self.inputs.borrow().clone()
    }

    fn document(&self) -> &SharedDocument {
        self.factory.document()
    }
}

fn collect(document: &dyn Document, inputs: &[NodeId]) -> Result<Vec<FieldValue>, DocumentError> {
    inputs
        .iter()
        .map(|&input| {
            Ok(FieldValue {
                name: document.attribute(input, "name")?.unwrap_or_default(),
                value: document.input_value(input)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use breeze_core::MemoryDocument;
    use serde_json::json;

    use super::*;

    fn setup() -> (Rc<MemoryDocument>, ElementFactory) {
        let document = MemoryDocument::shared();
        let factory = ElementFactory::new(document.clone());
        (document, factory)
    }

    #[test]
    fn builds_inputs_and_submit() {
        let (document, factory) = setup();
        let form = Form::new(&factory, document.root(), "signup").unwrap();

        form.add_input("email", "you@example.com").unwrap();
        form.add_submit("go", "Sign up").unwrap();

        assert_eq!(
            document.to_html(form.node()).unwrap(),
            concat!(
                r#"<form id="signup">"#,
                r#"<input id="email" name="email" placeholder="you@example.com">"#,
                r#"<input type="submit" id="go" value="Sign up">"#,
                "</form>"
            )
        );
        assert_eq!(form.inputs().len(), 1);
    }

    #[test]
    fn collects_names_and_current_values() {
        let (document, factory) = setup();
        let form = Form::new(&factory, document.root(), "login").unwrap();
        let user = form.add_input("user", "Username").unwrap();
        form.add_input("password", "Password").unwrap();
        form.add_submit("submit", "Log in").unwrap();

        document.set_input_value(user, "ada").unwrap();

        let data = form.get_data_on_submit().unwrap();
        assert_eq!(
            data,
            vec![
                FieldValue {
                    name: "user".into(),
                    value: "ada".into()
                },
                FieldValue {
                    name: "password".into(),
                    value: String::new()
                },
            ]
        );
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!([
                {"name": "user", "value": "ada"},
                {"name": "password", "value": ""},
            ])
        );
    }

    #[test]
    fn forms_can_live_in_layers() {
        let (document, factory) = setup();
        let layer = Layer::new(&factory, document.root(), "dialogs", 100).unwrap();
        let form = Form::in_layer(&factory, &layer, "feedback").unwrap();

        assert_eq!(document.parent(form.node()).unwrap(), Some(layer.node()));
    }

    #[test]
    fn submit_handler_receives_data_and_prevents_default() {
        let (document, factory) = setup();
        let form = Form::new(&factory, document.root(), "search").unwrap();
        let query = form.add_input("q", "Search").unwrap();
        let submit = form.add_submit("go", "Go").unwrap();

        let received = Rc::new(RefCell::new(Vec::new()));
        form.on_submit({
            let received = Rc::clone(&received);
            move |data| received.borrow_mut().extend_from_slice(data)
        })
        .unwrap();

        document.set_input_value(query, "rust").unwrap();
        let event = document.dispatch(submit, "submit").unwrap();

        assert!(event.default_prevented());
        assert_eq!(
            *received.borrow(),
            vec![FieldValue {
                name: "q".into(),
                value: "rust".into()
            }]
        );
    }

    #[test]
    fn submit_handler_can_extend_the_form() {
        let (document, factory) = setup();
        let form = Form::new(&factory, document.root(), "wizard").unwrap();
        form.add_input("a", "A").unwrap();
        let submit = form.add_submit("next", "Next").unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        form.on_submit({
            let form = form.clone();
            let seen = Rc::clone(&seen);
            move |data| {
                seen.borrow_mut().push(data.len());
                form.add_input("b", "B").unwrap();
            }
        })
        .unwrap();

        document.dispatch(submit, "submit").unwrap();
        document.dispatch(submit, "submit").unwrap();

        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(form.inputs().len(), 3);
    }

    #[test]
    fn rejects_unknown_mounts() {
        let (_, factory) = setup();
        let mount = NodeId::from_raw(9);
        assert_eq!(
            Form::new(&factory, mount, "f").unwrap_err(),
            Error::InvalidNode(mount)
        );
    }
}
