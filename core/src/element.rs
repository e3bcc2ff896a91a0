//! Element construction and attribute normalization.

use alloc::rc::Rc;

use tracing::{debug, warn};

use crate::{
    attributes::{AttrValue, Attributes, STYLE_KEY},
    document::{Document, SharedDocument, is_valid_class_token, is_valid_tag_name},
    error::{DocumentError, Error},
    node::NodeId,
    report::{Failure, Report},
    style::{Style, property_name},
};

/// A freshly constructed element together with the outcome of each attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Built {
    /// The new, detached node.
    pub node: NodeId,
    /// One entry per attribute (and per style declaration) that was applied.
    pub report: Report,
}

/// Builds detached elements on a document.
///
/// Construction runs in a fixed order: the bare node, then the `classListAdd`
/// classes, then the remaining attributes in insertion order, then the text
/// content. Attribute failures are isolated and reported; everything else fails
/// the whole call.
#[derive(Debug, Clone)]
pub struct ElementFactory {
    document: SharedDocument,
}

impl ElementFactory {
    /// Creates a factory for `document`.
    #[must_use]
    pub fn new(document: SharedDocument) -> Self {
        Self { document }
    }

    /// The document nodes are created on.
    #[must_use]
    pub const fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// A second handle to the same document.
    #[must_use]
    pub fn share_document(&self) -> SharedDocument {
        Rc::clone(&self.document)
    }

    /// Creates an element and returns its node, logging isolated attribute failures.
    ///
    /// # Errors
    ///
    /// See [`ElementFactory::build`].
    pub fn create(
        &self,
        tag: &str,
        attributes: Attributes,
        content: &str,
    ) -> Result<NodeId, Error> {
        self.build(tag, attributes, content).map(|built| built.node)
    }

    /// Creates an element and returns its node with a per-attribute [`Report`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidType`] when `tag` is not a valid identifier.
    /// - [`Error::InvalidClassList`] when `classListAdd` is not a class name or a
    ///   list of class names, or holds an empty or whitespace-containing token.
    /// - [`Error::Document`] when the host cannot create the node or set its text.
    pub fn build(
        &self,
        tag: &str,
        mut attributes: Attributes,
        content: &str,
    ) -> Result<Built, Error> {
        if !is_valid_tag_name(tag) {
            return Err(Error::InvalidType(tag.to_owned()));
        }
        let classes = attributes
            .take_class_list()
            .map(class_tokens)
            .transpose()?
            .unwrap_or_default();

        let document = self.document.as_ref();
        let node = document.create_element(tag)?;

        for class in &classes {
            document
                .add_class(node, class)
                .map_err(|err| Error::InvalidClassList(err.to_string()))?;
        }

        let mut report = Report::new();
        for (name, value) in attributes {
            match value {
                AttrValue::Style(style) if name == STYLE_KEY => {
                    apply_style(document, node, &style, &mut report);
                }
                value => {
                    record(
                        &mut report,
                        &name,
                        document.set_attribute(node, &name, &value.to_attribute_string()),
                    );
                }
            }
        }

        document.set_text_content(node, content)?;
        debug!(%node, tag, classes = classes.len(), attributes = report.total(), "element created");
        Ok(Built { node, report })
    }
}

fn class_tokens(value: AttrValue) -> Result<Vec<String>, Error> {
    let tokens = match value {
        AttrValue::Text(class) => vec![class],
        AttrValue::List(classes) => classes,
        other => {
            return Err(Error::InvalidClassList(format!(
                "expected a class name or a list of class names, got {}",
                other.kind()
            )));
        }
    };
    if let Some(bad) = tokens.iter().find(|token| !is_valid_class_token(token)) {
        return Err(Error::InvalidClassList(format!("invalid class token `{bad}`")));
    }
    Ok(tokens)
}

fn apply_style(document: &dyn Document, node: NodeId, style: &Style, report: &mut Report) {
    for (name, value) in style.iter() {
        let css_name = property_name(name);
        record(
            report,
            &format!("{STYLE_KEY}.{name}"),
            document.set_style_property(node, &css_name, value),
        );
    }
}

fn record(report: &mut Report, subject: &str, result: Result<(), DocumentError>) {
    match result {
        Ok(()) => report.record_success(),
        Err(err) => {
            warn!(attribute = subject, error = %err, "attribute not applied");
            report.record_failure(Failure::new(subject, err));
        }
    }
}
