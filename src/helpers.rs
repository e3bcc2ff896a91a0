//! Thin conveniences over the document and the element factory.

use breeze_core::{
    Attributes, Document, ElementFactory, Error, EventHandler, Failure, NodeId, Report,
};
use tracing::warn;

/// Appends `child` as the last child of `parent`.
///
/// # Errors
///
/// Returns [`Error::Document`] if either node is unknown or the append would
/// create a cycle.
pub fn append_to(document: &dyn Document, parent: NodeId, child: NodeId) -> Result<(), Error> {
    document.append_child(parent, child)?;
    Ok(())
}

/// Replaces the children of `node` with literal `text`.
///
/// # Errors
///
/// Returns [`Error::Document`] if `node` is unknown.
pub fn set_text_content(document: &dyn Document, node: NodeId, text: &str) -> Result<(), Error> {
    document.set_text_content(node, text)?;
    Ok(())
}

/// Sets every entry of `attributes` as a literal attribute of `node`.
///
/// Unlike [`ElementFactory::create`], neither `style` nor `classListAdd` is
/// treated specially: every value is coerced to a string and set as is.
///
/// # Errors
///
/// Returns [`Error::InvalidNode`] if `node` is not part of the document.
/// Individual attribute failures are logged and collected in the [`Report`].
pub fn set_attributes(
    document: &dyn Document,
    node: NodeId,
    attributes: &Attributes,
) -> Result<Report, Error> {
    if !document.contains(node) {
        return Err(Error::InvalidNode(node));
    }
    let mut report = Report::new();
    for (name, value) in attributes.iter() {
        match document.set_attribute(node, name, &value.to_attribute_string()) {
            Ok(()) => report.record_success(),
            Err(err) => {
                warn!(%node, attribute = name, error = %err, "attribute not applied");
                report.record_failure(Failure::new(name, err));
            }
        }
    }
    Ok(report)
}

/// Creates a detached element with `text` as its content.
///
/// # Errors
///
/// Any error of [`ElementFactory::create`].
pub fn create_element_with_text(
    factory: &ElementFactory,
    tag: &str,
    attributes: Attributes,
    text: &str,
) -> Result<NodeId, Error> {
    let node = factory.create(tag, attributes, "")?;
    set_text_content(factory.document().as_ref(), node, text)?;
    Ok(node)
}

/// Creates an element with `text` as its content and appends it to `parent`.
///
/// # Errors
///
/// [`Error::InvalidNode`] if `parent` is not part of the document, or any error
/// of [`ElementFactory::create`].
pub fn create_element_and_append(
    factory: &ElementFactory,
    parent: NodeId,
    tag: &str,
    attributes: Attributes,
    text: &str,
) -> Result<NodeId, Error> {
    let document = factory.document().as_ref();
    if !document.contains(parent) {
        return Err(Error::InvalidNode(parent));
    }
    let node = create_element_with_text(factory, tag, attributes, text)?;
    append_to(document, parent, node)?;
    Ok(node)
}

/// Creates an empty element, attaches `handler` for `event` and appends it to
/// `parent`.
///
/// # Errors
///
/// [`Error::InvalidNode`] if `parent` is not part of the document, or any error
/// of [`ElementFactory::create`].
pub fn append_element_with_listener(
    factory: &ElementFactory,
    parent: NodeId,
    tag: &str,
    attributes: Attributes,
    event: &str,
    handler: EventHandler,
) -> Result<NodeId, Error> {
    let document = factory.document().as_ref();
    if !document.contains(parent) {
        return Err(Error::InvalidNode(parent));
    }
    let node = factory.create(tag, attributes, "")?;
    document.add_event_listener(node, event, handler)?;
    append_to(document, parent, node)?;
    Ok(node)
}
