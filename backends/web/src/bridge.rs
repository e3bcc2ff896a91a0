//! JavaScript surface of the state store.
//!
//! ```js
//! const mount = new WebMount("app");
//! const state = mount.createState({ onUnknownKey: "ignore" });
//! state.addListener((s) => console.log(s));
//! state.bind(document.getElementById("title"), "textContent", "title");
//! state.setState({ title: "Hello" });
//! ```

use std::{cell::RefCell, rc::Rc};

use breeze_core::{Error, ListenerId, StateMap, StateStore};
use serde_json::Value;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue, prelude::wasm_bindgen};
use web_sys::Element;

use crate::{document::WebDocument, error::WebError};

/// A [`StateStore`] exposed to JavaScript as `BreezeState`.
#[wasm_bindgen(js_name = BreezeState)]
#[derive(Debug)]
pub struct JsStateStore {
    store: StateStore,
    document: Rc<WebDocument>,
    listeners: RefCell<Vec<(js_sys::Function, ListenerId)>>,
}

impl JsStateStore {
    pub(crate) fn new(store: StateStore, document: Rc<WebDocument>) -> Self {
        Self {
            store,
            document,
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// The wrapped store.
    #[must_use]
    pub const fn store(&self) -> &StateStore {
        &self.store
    }
}

#[wasm_bindgen(js_class = BreezeState)]
impl JsStateStore {
    /// Returns a copy of the state as a plain object.
    ///
    /// # Errors
    ///
    /// Fails if the state cannot be converted to a JavaScript value.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        Ok(state_to_js(&self.store.get_state())?)
    }

    /// Merges `partial` into the state and runs a notification pass.
    ///
    /// # Errors
    ///
    /// Throws if `partial` is not a plain object.
    #[wasm_bindgen(js_name = setState)]
    pub fn set_state(&self, partial: &JsValue) -> Result<(), JsValue> {
        let partial = js_to_value(partial)?;
        let report = self.store.set_state(partial).map_err(WebError::from)?;
        debug!(
            listener_failures = report.listeners.failures().len(),
            binding_failures = report.bindings.failures().len(),
            "setState finished"
        );
        Ok(())
    }

    /// Clears the state and runs a notification pass.
    #[wasm_bindgen(js_name = resetState)]
    pub fn reset_state(&self) {
        self.store.reset_state();
    }

    /// Registers `listener`, called with a copy of the state after every mutation.
    ///
    /// # Errors
    ///
    /// Throws if `listener` is not a function.
    #[wasm_bindgen(js_name = addListener)]
    pub fn add_listener(&self, listener: JsValue) -> Result<(), JsValue> {
        let function = as_function(&listener)?.clone();
        let callback = function.clone();
        let id = self.store.add_listener(move |state: &StateMap| {
            let state = state_to_js(state)?;
            callback
                .call1(&JsValue::NULL, &state)
                .map_err(WebError::from)?;
            Ok(())
        });
        self.listeners.borrow_mut().push((function, id));
        Ok(())
    }

    /// Unregisters every registration of `listener`. Functions that were never
    /// registered are ignored.
    ///
    /// # Errors
    ///
    /// Throws if `listener` is not a function.
    #[wasm_bindgen(js_name = removeListener)]
    pub fn remove_listener(&self, listener: &JsValue) -> Result<(), JsValue> {
        let listener = as_function(listener)?;
        self.listeners.borrow_mut().retain(|(function, id)| {
            if js_sys::Object::is(function, listener) {
                self.store.remove_listener(*id);
                false
            } else {
                true
            }
        });
        Ok(())
    }

    /// Binds `property` of `element` to `stateKey` and applies it once.
    ///
    /// # Errors
    ///
    /// Throws if `element` is not a DOM element, on an empty property or key,
    /// or when `stateKey` is absent under the strict policy.
    pub fn bind(&self, element: JsValue, property: &str, state_key: &str) -> Result<(), JsValue> {
        let element = element
            .dyn_into::<Element>()
            .map_err(|value| WebError::InvalidNode(type_of(&value)))?;
        let node = self.document.adopt(element).map_err(WebError::from)?;
        self.store
            .bind(node, property, state_key)
            .map_err(WebError::from)?;
        Ok(())
    }

    /// Removes the bindings of `element` matching `property` and `stateKey`
    /// (omitted arguments match anything). Returns how many were removed.
    pub fn unbind(
        &self,
        element: &Element,
        property: Option<String>,
        state_key: Option<String>,
    ) -> u32 {
        let Some(node) = self.document.node_of(element) else {
            return 0;
        };
        let removed = self
            .store
            .unbind(node, property.as_deref(), state_key.as_deref());
        u32::try_from(removed).unwrap_or(u32::MAX)
    }
}

fn type_of(value: &JsValue) -> String {
    value.js_typeof().as_string().unwrap_or_default()
}

fn as_function(value: &JsValue) -> Result<&js_sys::Function, WebError> {
    value.dyn_ref::<js_sys::Function>().ok_or_else(|| {
        Error::InvalidListener(format!("expected a function, got {}", type_of(value))).into()
    })
}

fn state_to_js(state: &StateMap) -> Result<JsValue, WebError> {
    let text = serde_json::to_string(state).map_err(|err| WebError::Js(err.to_string()))?;
    Ok(js_sys::JSON::parse(&text)?)
}

pub(crate) fn js_to_value(value: &JsValue) -> Result<Value, WebError> {
    let text = js_sys::JSON::stringify(value)?.as_string().ok_or_else(|| {
        Error::InvalidState(format!("expected an object, got {}", type_of(value)))
    })?;
    serde_json::from_str(&text).map_err(|err| Error::InvalidState(err.to_string()).into())
}
