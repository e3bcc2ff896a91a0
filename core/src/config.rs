//! Store configuration.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// What [`StateStore::bind`](crate::state::StateStore::bind) does when the state
/// key is absent from the current state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeyPolicy {
    /// Record the binding anyway; it starts applying once the key appears.
    Ignore,
    /// Reject the binding with [`Error::UnknownStateKey`].
    #[default]
    Fail,
}

/// Tunables for a [`StateStore`](crate::state::StateStore).
///
/// Deserializes from camelCase JSON with every field optional:
///
/// ```
/// use breeze_core::{StoreConfig, UnknownKeyPolicy};
///
/// let config = StoreConfig::from_json(r#"{ "onUnknownKey": "ignore" }"#).unwrap();
/// assert_eq!(config.on_unknown_key, UnknownKeyPolicy::Ignore);
/// assert_eq!(config.max_deferred_passes, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Bind policy for keys missing from the state.
    pub on_unknown_key: UnknownKeyPolicy,
    /// Upper bound on mutations queued by listeners and applied after the current
    /// notification pass. Further queued mutations are dropped.
    pub max_deferred_passes: usize,
}

impl StoreConfig {
    /// Default number of deferred passes drained per top-level mutation.
    pub const DEFAULT_MAX_DEFERRED_PASSES: usize = 64;

    /// Creates the default configuration: strict binding, 64 deferred passes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            on_unknown_key: UnknownKeyPolicy::Fail,
            max_deferred_passes: Self::DEFAULT_MAX_DEFERRED_PASSES,
        }
    }

    /// Sets the bind policy.
    #[must_use]
    pub const fn with_unknown_key_policy(mut self, policy: UnknownKeyPolicy) -> Self {
        self.on_unknown_key = policy;
        self
    }

    /// Sets the deferred pass limit.
    #[must_use]
    pub const fn with_max_deferred_passes(mut self, passes: usize) -> Self {
        self.max_deferred_passes = passes;
        self
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the text is not a valid configuration object.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|err| Error::Config(err.to_string()))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict() {
        let config = StoreConfig::default();
        assert_eq!(config.on_unknown_key, UnknownKeyPolicy::Fail);
        assert_eq!(config.max_deferred_passes, 64);
    }

    #[test]
    fn parses_partial_json() {
        let config = StoreConfig::from_json(r#"{"maxDeferredPasses": 3}"#).unwrap();
        assert_eq!(config, StoreConfig::new().with_max_deferred_passes(3));
    }

    #[test]
    fn rejects_unknown_policy() {
        let error = StoreConfig::from_json(r#"{"onUnknownKey": "maybe"}"#).unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }
}
