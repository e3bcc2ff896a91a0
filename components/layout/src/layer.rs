//! Z-ordered containers.

use breeze_core::{Attributes, Document, ElementFactory, Error, NodeId, SharedDocument, Style};
use tracing::debug;

/// CSS property carrying a layer's stacking order.
const Z_INDEX: &str = "z-index";

/// A `div` container attached to a mount node, stacked by its `z-index`.
///
/// The layer owns no children of its own; it only appends and removes the nodes
/// it is handed.
#[derive(Debug, Clone)]
pub struct Layer {
    document: SharedDocument,
    node: NodeId,
    id: String,
    z_index: i32,
}

impl Layer {
    /// Creates a layer `<div id=…>` with an inline `z-index` and appends it to `mount`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidNode`] if `mount` is not a node of the factory's document.
    /// - [`Error::Document`] if the host refuses to create or append the container.
    pub fn new(
        factory: &ElementFactory,
        mount: NodeId,
        id: impl Into<String>,
        z_index: i32,
    ) -> Result<Self, Error> {
        let document = factory.share_document();
        if !document.contains(mount) {
            return Err(Error::InvalidNode(mount));
        }

        let id = id.into();
        let attributes = Attributes::new()
            .with("id", id.as_str())
            .style(Style::new().with("zIndex", z_index));
        let node = factory.create("div", attributes, "")?;
        document.append_child(mount, node)?;

        debug!(layer = %id, %node, z_index, "layer mounted");
        Ok(Self {
            document,
            node,
            id,
            z_index,
        })
    }

    /// Appends `element` as the last child of the layer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if the node is unknown or cannot be moved here.
    pub fn add_element(&self, element: NodeId) -> Result<(), Error> {
        self.document.append_child(self.node, element)?;
        Ok(())
    }

    /// Detaches `element` from the layer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if `element` is not a direct child of the layer.
    pub fn remove_element(&self, element: NodeId) -> Result<(), Error> {
        self.document.remove_child(self.node, element)?;
        Ok(())
    }

    /// Moves the layer to a new stacking position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if the host rejects the style update. The
    /// recorded z-index is left unchanged in that case.
    pub fn set_z_index(&mut self, z_index: i32) -> Result<(), Error> {
        self.document
            .set_style_property(self.node, Z_INDEX, &z_index.to_string())?;
        self.z_index = z_index;
        Ok(())
    }

    /// The `id` attribute given at construction.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The current stacking order.
    #[must_use]
    pub const fn z_index(&self) -> i32 {
        self.z_index
    }

    /// The container node.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }
}
