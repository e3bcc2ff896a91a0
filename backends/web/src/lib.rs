#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Browser backend for Breeze.
//!
//! [`WebDocument`] implements [`breeze_core::Document`] over `web-sys`, so the
//! element factory, layers, forms and the state store drive real DOM nodes.
//! [`WebMount`] resolves the mount element and is also the JavaScript entry
//! point:
//!
//! ```js
//! import init, { WebMount, installLogging } from "./breeze_web.js";
//!
//! await init();
//! installLogging("debug");
//! const mount = new WebMount();
//! const state = mount.createState();
//! ```

mod bridge;
mod console;
mod document;
mod dom;
mod error;
mod mount;

pub use bridge::JsStateStore;
pub use console::{ConsoleLine, ConsoleWriter, install_logging, install_logging_js};
pub use document::WebDocument;
pub use dom::{DEFAULT_ROOT_ID, DomRoot};
pub use error::WebError;
pub use mount::{WebMount, WebMountBuilder};
