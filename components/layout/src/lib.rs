//! Layered containers for Breeze.
//!
//! A [`Layer`] is a `div` appended to an explicit mount node and stacked with an
//! inline `z-index`. Content is moved in and out of it with
//! [`Layer::add_element`] and [`Layer::remove_element`].
//!
//! ```
//! use breeze_core::{Attributes, Document, ElementFactory, MemoryDocument};
//! use breeze_layout::Layer;
//!
//! let document = MemoryDocument::shared();
//! let factory = ElementFactory::new(document.clone());
//!
//! let mut overlay = Layer::new(&factory, document.root(), "overlay", 10).unwrap();
//! let toast = factory.create("p", Attributes::new(), "Saved").unwrap();
//! overlay.add_element(toast).unwrap();
//! overlay.set_z_index(20).unwrap();
//!
//! assert_eq!(
//!     document.to_html(overlay.node()).unwrap(),
//!     r#"<div id="overlay" style="z-index: 20;"><p>Saved</p></div>"#
//! );
//! ```

pub mod layer;

#[doc(inline)]
pub use layer::Layer;
