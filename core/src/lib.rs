//! # breeze-core
//!
//! The platform-independent half of Breeze:
//!
//! - [`ElementFactory`] turns a tag, an [`Attributes`] map and text content into
//!   a detached node, validating the tag and the `classListAdd` list first.
//! - [`StateStore`] keeps a flat key/value state, notifies listeners on every
//!   mutation and keeps bound node properties in sync.
//! - [`Document`] is the capability both of them write through. The web backend
//!   implements it on top of the browser DOM; [`MemoryDocument`] implements it
//!   in memory for tests and headless hosts.

#![allow(clippy::multiple_crate_versions)]

extern crate alloc;

pub mod attributes;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod memory;
pub mod node;
pub mod report;
pub mod state;
pub mod style;
mod value;


#[doc(inline)]
pub use attributes::{AttrValue, Attributes, CLASS_LIST_KEY, STYLE_KEY};
#[doc(inline)]
pub use config::{StoreConfig, UnknownKeyPolicy};
#[doc(inline)]
pub use document::{Document, Event, EventHandler, EventListenerId, SharedDocument};
#[doc(inline)]
pub use element::{Built, ElementFactory};
pub use error::{DocumentError, Error, Result};
pub use memory::MemoryDocument;
pub use node::NodeId;
pub use report::{Failure, Report};
#[doc(inline)]
pub use state::{
    Binding, ListenerError, ListenerId, StateMap, StateStore, TEXT_CONTENT, UpdateReport,
};
pub use style::{Style, property_name};
