use std::rc::Rc;

use breeze_core::{ElementFactory, Error, NodeId, StateStore, StoreConfig};
use tracing::info;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::{
    bridge::{JsStateStore, js_to_value},
    document::WebDocument,
    dom::DomRoot,
    error::WebError,
};

/// Builder for [`WebMount`].
#[derive(Debug, Default, Clone)]
pub struct WebMountBuilder {
    root_id: Option<String>,
    config: StoreConfig,
}

impl WebMountBuilder {
    /// Creates a builder that mounts into `#breeze-root` with the default store
    /// configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root_id: None,
            config: StoreConfig::new(),
        }
    }

    /// Mounts into the existing element with id `id` instead.
    #[must_use]
    pub fn with_root_id(mut self, id: impl Into<String>) -> Self {
        self.root_id = Some(id.into());
        self
    }

    /// Configuration used by [`WebMount::store`].
    #[must_use]
    pub const fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves the mount element and creates the [`WebMount`].
    ///
    /// # Errors
    ///
    /// Returns an error if the DOM is unavailable or the named root is missing.
    pub fn build(self) -> Result<WebMount, WebError> {
        WebMount::new_with_options(self)
    }
}

/// Entry point for using Breeze inside the browser.
///
/// Owns the [`WebDocument`] arena for one mount element and hands out element
/// factories and state stores that share it.
#[wasm_bindgen]
#[derive(Debug)]
pub struct WebMount {
    root: DomRoot,
    document: Rc<WebDocument>,
    factory: ElementFactory,
    config: StoreConfig,
}

impl WebMount {
    fn new_with_options(builder: WebMountBuilder) -> Result<Self, WebError> {
        let root = DomRoot::new(builder.root_id.as_deref())?;
        let document = WebDocument::shared(&root);
        let factory = ElementFactory::new(document.clone());
        info!(root = %root.element().id(), "breeze mounted");
        Ok(Self {
            root,
            document,
            factory,
            config: builder.config,
        })
    }

    /// The resolved mount element and its document.
    #[must_use]
    pub const fn root(&self) -> &DomRoot {
        &self.root
    }

    /// The node arena behind every factory and store of this mount.
    #[must_use]
    pub const fn document(&self) -> &Rc<WebDocument> {
        &self.document
    }

    /// Element factory creating nodes in this mount's document.
    #[must_use]
    pub const fn factory(&self) -> &ElementFactory {
        &self.factory
    }

    /// A state store using the configuration given to the builder.
    #[must_use]
    pub fn store(&self) -> StateStore {
        self.create_store(self.config.clone())
    }

    /// A state store bound to this mount's document.
    #[must_use]
    pub fn create_store(&self, config: StoreConfig) -> StateStore {
        StateStore::with_config(self.document.clone(), config)
    }
}

#[wasm_bindgen]
impl WebMount {
    /// Mounts into the element with id `rootId`, or into a `#breeze-root`
    /// container appended to `<body>` when omitted.
    ///
    /// # Errors
    ///
    /// Throws if the DOM is unavailable or the named root is missing.
    #[wasm_bindgen(constructor)]
    pub fn new(root_id: Option<String>) -> Result<Self, WebError> {
        let builder = WebMountBuilder::new();
        match root_id {
            Some(id) => builder.with_root_id(id).build(),
            None => builder.build(),
        }
    }

    /// Creates a `BreezeState` for this mount. `config` is optional and takes
    /// the camelCase fields of [`StoreConfig`].
    ///
    /// # Errors
    ///
    /// Throws if `config` is not a valid configuration object.
    #[wasm_bindgen(js_name = createState)]
    pub fn create_state(&self, config: &JsValue) -> Result<JsStateStore, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            self.config.clone()
        } else {
            let value = js_to_value(config)?;
            serde_json::from_value::<StoreConfig>(value)
                .map_err(|err| WebError::from(Error::Config(err.to_string())))?
        };
        Ok(JsStateStore::new(
            self.create_store(config),
            self.document.clone(),
        ))
    }

    /// The mount element.
    #[wasm_bindgen(js_name = rootElement)]
    #[must_use]
    pub fn root_element(&self) -> Element {
        self.root.element().clone()
    }

    /// The DOM element behind node id `node`, if this mount issued it.
    #[must_use]
    pub fn element(&self, node: u32) -> Option<Element> {
        self.document.element(NodeId::from_raw(node)).ok()
    }
}
