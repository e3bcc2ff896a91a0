#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]

pub mod compose;
pub mod helpers;
pub mod logging;

#[doc(inline)]
pub use breeze_core::{
    AttrValue, Attributes, Binding, Built, Document, DocumentError, ElementFactory, Error, Event,
    EventHandler, EventListenerId, Failure, ListenerError, ListenerId, MemoryDocument, NodeId,
    Report, SharedDocument, StateMap, StateStore, StoreConfig, Style, UnknownKeyPolicy,
    UpdateReport,
};
pub use breeze_core::{attributes, config, document, element, error, memory, report, state, style};
pub use breeze_form as form;
pub use breeze_layout as layout;
#[doc(inline)]
pub use compose::{Content, ElementBuilder, h};
#[doc(inline)]
pub use form::{FieldValue, Form};
#[doc(inline)]
pub use layout::Layer;
#[doc(inline)]
pub use logging::{LogConfig, init_logging};

pub mod prelude {
    //! Commonly used types and functions.
    //!
    //! ```
    //! use breeze::prelude::*;
    //!
    //! let document = MemoryDocument::shared();
    //! let factory = ElementFactory::new(document.clone());
    //! let store = StateStore::new(document.clone());
    //!
    //! let node = h(&factory, document.root(), "p", Attributes::new(), "", None).unwrap();
    //! store.set_state(serde_json::json!({ "greeting": "hi" })).unwrap();
    //! store.bind(node, "textContent", "greeting").unwrap();
    //! assert_eq!(document.text_content(node).unwrap(), "hi");
    //! ```
    pub use super::helpers::*;
    pub use super::{
        AttrValue, Attributes, Content, Document, ElementBuilder, ElementFactory, Error, Event,
        EventHandler, FieldValue, Form, Layer, MemoryDocument, NodeId, Report, SharedDocument,
        StateMap, StateStore, StoreConfig, Style, UnknownKeyPolicy, UpdateReport, h,
    };
}

pub use tracing as log;
