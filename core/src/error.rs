//! Error types shared by the element factory, the document capability and the
//! state store.

use thiserror::Error;

use crate::node::NodeId;

/// Errors raised synchronously to the caller when a usage contract is violated.
///
/// Failures that are isolated on purpose (a single attribute, listener or binding)
/// never surface through this type; they are collected into a
/// [`Report`](crate::report::Report) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The element tag is empty or not a valid identifier.
    #[error("invalid element type `{0}`")]
    InvalidType(String),
    /// The `classListAdd` attribute is neither a class name nor a list of class names.
    #[error("invalid class list: {0}")]
    InvalidClassList(String),
    /// A state update does not describe a key/value mapping.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A listener handed over by a dynamic host is not callable.
    #[error("invalid listener: {0}")]
    InvalidListener(String),
    /// The node handle does not refer to a live node of the document.
    #[error("node {0} is not part of this document")]
    InvalidNode(NodeId),
    /// A binding property or state key is malformed.
    #[error("invalid {role} `{key}`")]
    InvalidKey {
        /// Which argument was rejected.
        role: &'static str,
        /// The rejected value.
        key: String,
    },
    /// The state key is absent while the store runs the strict bind policy.
    #[error("state key `{0}` is not present in the current state")]
    UnknownStateKey(String),
    /// A configuration document could not be understood.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The host document refused an operation that element construction depends on.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Errors reported by a [`Document`](crate::document::Document) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The node id was never issued by this document.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// A tag, attribute or style property name is not acceptable to the host.
    #[error("invalid {kind} name `{name}`")]
    InvalidName {
        /// What kind of name was rejected.
        kind: &'static str,
        /// The rejected name.
        name: String,
    },
    /// A class token is empty or contains whitespace.
    #[error("invalid class token `{0}`")]
    InvalidToken(String),
    /// `child` is not a direct child of `parent`.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// The expected parent.
        parent: NodeId,
        /// The node that was not found under `parent`.
        child: NodeId,
    },
    /// Appending `child` under `parent` would create a cycle.
    #[error("cannot insert {child} under {parent}")]
    Hierarchy {
        /// The prospective parent.
        parent: NodeId,
        /// The node being inserted.
        child: NodeId,
    },
    /// The host environment raised an error.
    #[error("host error: {0}")]
    Host(String),
}

/// Result alias used throughout `breeze-core`.
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_value() {
        let error = Error::UnknownStateKey("count".into());
        assert_eq!(
            error.to_string(),
            "state key `count` is not present in the current state"
        );

        let error = Error::InvalidKey {
            role: "property",
            key: String::new(),
        };
        assert_eq!(error.to_string(), "invalid property ``");
    }

    #[test]
    fn document_errors_are_transparent() {
        let error = Error::from(DocumentError::UnknownNode(NodeId::from_raw(7)));
        assert_eq!(error.to_string(), "unknown node #7");
    }
}
