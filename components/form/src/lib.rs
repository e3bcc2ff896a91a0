//! Form assembly for Breeze.
//!
//! [`Form`] appends a `<form>` to a mount node or a [`Layer`](breeze_layout::Layer),
//! adds inputs and submit buttons to it and reads the inputs back on demand.

pub mod form;

#[doc(inline)]
pub use form::{FieldValue, Form};
