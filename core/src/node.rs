//! Arena handles for document nodes.

use core::fmt;

/// Opaque handle to a node owned by a [`Document`](crate::document::Document).
///
/// Ids are indices into the document's node arena. They are only meaningful for
/// the document that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Wraps a raw arena index.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw arena index.
    #[must_use]
    pub const fn into_raw(self) -> u32 {
        self.0
    }

    /// Returns the arena slot for this id.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Builds the id for an arena slot.
    ///
    /// Returns `None` once the arena outgrows the id space.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
