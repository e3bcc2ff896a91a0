use crate::error::WebError;

use web_sys::{Document, Element, Window};

/// Id of the container created when no mount element is named.
pub const DEFAULT_ROOT_ID: &str = "breeze-root";

/// The browser document and the element Breeze mounts into.
#[derive(Debug, Clone)]
pub struct DomRoot {
    document: Document,
    element: Element,
}

impl DomRoot {
    /// Resolves the mount element.
    ///
    /// With `root_id`, the existing element with that id is used. Without it, a
    /// `<div id="breeze-root">` is appended to `<body>`.
    ///
    /// # Errors
    ///
    /// - [`WebError::DomUnavailable`] outside a browser or without a `<body>`.
    /// - [`WebError::RootNotFound`] if no element has id `root_id`.
    pub fn new(root_id: Option<&str>) -> Result<Self, WebError> {
        let window: Window = web_sys::window().ok_or(WebError::DomUnavailable)?;
        let document: Document = window.document().ok_or(WebError::DomUnavailable)?;

        let element = if let Some(id) = root_id {
            document
                .get_element_by_id(id)
                .ok_or_else(|| WebError::RootNotFound(id.to_string()))?
        } else if let Some(existing) = document.get_element_by_id(DEFAULT_ROOT_ID) {
            existing
        } else {
            let body = document.body().ok_or(WebError::DomUnavailable)?;
            let host = document.create_element("div")?;
            host.set_id(DEFAULT_ROOT_ID);
            body.append_child(&host)?;
            host
        };

        Ok(Self { document, element })
    }

    /// Returns the DOM element representing the mounting point.
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }

    /// Returns the owning document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Removes every child of the mounting element.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Js`] if the browser refuses a removal.
    pub fn clear(&self) -> Result<(), WebError> {
        while let Some(child) = self.element.first_child() {
            self.element.remove_child(&child)?;
        }
        Ok(())
    }
}
