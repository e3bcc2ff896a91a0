//! Key/value reactive store with element bindings.
//!
//! A [`StateStore`] owns a flat [`StateMap`]. Every mutation runs one
//! synchronous notification pass: listeners first, in registration order, then
//! every binding, grouped by node in order of each node's first binding. Failures
//! of individual listeners or bindings are logged, collected into the returned
//! [`UpdateReport`] and never stop the pass.
//!
//! ```
//! use breeze_core::{Attributes, Document, ElementFactory, MemoryDocument, StateStore};
//! use serde_json::json;
//!
//! let document = MemoryDocument::shared();
//! let factory = ElementFactory::new(document.clone());
//! let store = StateStore::new(document.clone());
//!
//! let label = factory.create("span", Attributes::new(), "").unwrap();
//! store.set_state(json!({ "name": "Ada" })).unwrap();
//! store.bind(label, "textContent", "name").unwrap();
//! assert_eq!(document.text_content(label).unwrap(), "Ada");
//!
//! store.set_state(json!({ "name": "Grace" })).unwrap();
//! assert_eq!(document.text_content(label).unwrap(), "Grace");
//! ```

use alloc::{collections::VecDeque, rc::Rc};
use core::{
    cell::{Cell, RefCell},
    fmt,
};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::{
    attributes::STYLE_KEY,
    config::{StoreConfig, UnknownKeyPolicy},
    document::{SharedDocument, is_valid_attribute_name},
    error::{DocumentError, Error},
    node::NodeId,
    report::{Failure, Report},
    style::property_name,
    value::{attribute_string, kind, text_content_string},
};

/// The authoritative state of a store.
pub type StateMap = serde_json::Map<String, Value>;

/// Error a listener returns to signal failure.
pub type ListenerError = Box<dyn std::error::Error>;

/// Binding property that replaces a node's text content.
pub const TEXT_CONTENT: &str = "textContent";

type ListenerFn = dyn FnMut(&StateMap) -> Result<(), ListenerError>;

/// Handle returned by [`StateStore::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// One recorded binding of a node property to a state key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// `textContent`, `style`, or a literal attribute name.
    pub property: String,
    /// Key looked up in the state on every pass.
    pub state_key: String,
}

impl Binding {
    fn matches(&self, property: Option<&str>, state_key: Option<&str>) -> bool {
        property.is_none_or(|p| p == self.property)
            && state_key.is_none_or(|k| k == self.state_key)
    }
}

/// Outcome of a mutation and the notification passes it caused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Listener invocations.
    pub listeners: Report,
    /// Binding applications. Bindings whose key is absent count as skipped.
    pub bindings: Report,
    /// Notification passes run, including deferred ones.
    pub passes: usize,
    /// The call was made during a pass and queued rather than applied.
    pub deferred: bool,
    /// Queued mutations dropped after exceeding the deferred pass limit.
    pub dropped: usize,
}

impl UpdateReport {
    fn deferred() -> Self {
        Self {
            deferred: true,
            ..Self::default()
        }
    }

    /// Whether every listener and binding succeeded and nothing was dropped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.listeners.is_clean() && self.bindings.is_clean() && self.dropped == 0
    }

    fn absorb(&mut self, other: Self) {
        self.listeners.merge(other.listeners);
        self.bindings.merge(other.bindings);
        self.passes += other.passes;
        self.dropped += other.dropped;
    }
}

enum Mutation {
    Merge(StateMap),
    Reset,
}

struct ListenerEntry {
    id: ListenerId,
    callback: Rc<RefCell<Box<ListenerFn>>>,
}

struct Inner {
    document: SharedDocument,
    config: StoreConfig,
    state: RefCell<StateMap>,
    listeners: RefCell<Vec<ListenerEntry>>,
    bindings: RefCell<IndexMap<NodeId, Vec<Binding>>>,
    next_listener: Cell<u64>,
    notifying: Cell<bool>,
    pending: RefCell<VecDeque<Mutation>>,
}

/// Clears the in-pass flag when the outermost mutation finishes or unwinds.
struct PassGuard<'a>(&'a Cell<bool>);

impl<'a> PassGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A reactive key/value store bound to a document.
///
/// Cloning yields another handle to the same store. The store is single-threaded
/// and every operation runs to completion before returning.
///
/// Mutations issued while a pass is running (from a listener, for example) are
/// queued and applied right after the current pass, each with its own full pass,
/// before the outermost call returns.
#[derive(Clone)]
pub struct StateStore {
    inner: Rc<Inner>,
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.listener_count())
            .field("bindings", &self.binding_count())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl StateStore {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new(document: SharedDocument) -> Self {
        Self::with_config(document, StoreConfig::default())
    }

    /// Creates an empty store.
    #[must_use]
    pub fn with_config(document: SharedDocument, config: StoreConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                document,
                config,
                state: RefCell::new(StateMap::new()),
                listeners: RefCell::new(Vec::new()),
                bindings: RefCell::new(IndexMap::new()),
                next_listener: Cell::new(0),
                notifying: Cell::new(false),
                pending: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Creates a store seeded with `initial`, without notifying anyone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if `initial` is not a key/value mapping.
    pub fn with_state(
        document: SharedDocument,
        config: StoreConfig,
        initial: impl Serialize,
    ) -> Result<Self, Error> {
        let store = Self::with_config(document, config);
        *store.inner.state.borrow_mut() = into_state_map(initial)?;
        Ok(store)
    }

    /// The configuration this store was built with.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// The document bindings are applied to.
    #[must_use]
    pub fn document(&self) -> &SharedDocument {
        &self.inner.document
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn get_state(&self) -> StateMap {
        self.inner.state.borrow().clone()
    }

    /// Returns a copy of one state value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.state.borrow().get(key).cloned()
    }

    /// Merges `partial` into the state key by key, then notifies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if `partial` does not serialize to a
    /// key/value mapping. Listener and binding failures are reported, not raised.
    pub fn set_state(&self, partial: impl Serialize) -> Result<UpdateReport, Error> {
        let partial = into_state_map(partial)?;
        Ok(self.mutate(Mutation::Merge(partial)))
    }

    /// Replaces the state with an empty map, then notifies.
    pub fn reset_state(&self) -> UpdateReport {
        self.mutate(Mutation::Reset)
    }

    /// Registers a listener called with the new state after every mutation.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&StateMap) -> Result<(), ListenerError> + 'static,
    {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push(ListenerEntry {
            id,
            callback: Rc::new(RefCell::new(Box::new(listener))),
        });
        debug!(%id, "listener added");
        id
    }

    /// Unregisters a listener. Unknown ids are ignored.
    ///
    /// Returns whether a listener was removed.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id);
        before != listeners.len()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Binds `property` of `node` to `state_key` and applies it once.
    ///
    /// `property` is `textContent`, `style` (merging a mapping into the inline
    /// style) or any attribute name. The returned report covers the initial
    /// application.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidNode`] if `node` is not a node of the store's document.
    /// - [`Error::InvalidKey`] if `property` or `state_key` is empty, or
    ///   `property` is not a valid attribute name.
    /// - [`Error::UnknownStateKey`] if `state_key` is absent and the store runs
    ///   [`UnknownKeyPolicy::Fail`].
    pub fn bind(&self, node: NodeId, property: &str, state_key: &str) -> Result<Report, Error> {
        if !self.inner.document.contains(node) {
            return Err(Error::InvalidNode(node));
        }
        if !is_valid_attribute_name(property) {
            return Err(Error::InvalidKey {
                role: "property",
                key: property.to_owned(),
            });
        }
        if state_key.is_empty() {
            return Err(Error::InvalidKey {
                role: "state key",
                key: state_key.to_owned(),
            });
        }
        if !self.inner.state.borrow().contains_key(state_key) {
            match self.inner.config.on_unknown_key {
                UnknownKeyPolicy::Fail => {
                    return Err(Error::UnknownStateKey(state_key.to_owned()));
                }
                UnknownKeyPolicy::Ignore => {
                    debug!(%node, property, state_key, "binding to absent key");
                }
            }
        }

        let binding = Binding {
            property: property.to_owned(),
            state_key: state_key.to_owned(),
        };
        self.inner
            .bindings
            .borrow_mut()
            .entry(node)
            .or_default()
            .push(binding.clone());

        let mut report = Report::new();
        self.run_binding(node, &binding, &mut report);
        Ok(report)
    }

    /// Removes the bindings of `node` matching `property` and `state_key`
    /// (`None` matches anything). Returns how many were removed.
    pub fn unbind(&self, node: NodeId, property: Option<&str>, state_key: Option<&str>) -> usize {
        let mut bindings = self.inner.bindings.borrow_mut();
        let Some(list) = bindings.get_mut(&node) else {
            return 0;
        };
        let before = list.len();
        list.retain(|binding| !binding.matches(property, state_key));
        let removed = before - list.len();
        if list.is_empty() {
            bindings.shift_remove(&node);
        }
        debug!(%node, removed, "bindings removed");
        removed
    }

    /// Removes every binding of `node`.
    pub fn unbind_node(&self, node: NodeId) -> usize {
        self.unbind(node, None, None)
    }

    /// The bindings recorded for `node`, in insertion order.
    #[must_use]
    pub fn bindings_for(&self, node: NodeId) -> Vec<Binding> {
        self.inner
            .bindings
            .borrow()
            .get(&node)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of recorded bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.inner.bindings.borrow().values().map(Vec::len).sum()
    }

    fn mutate(&self, mutation: Mutation) -> UpdateReport {
        if self.inner.notifying.get() {
            debug!("deferring state mutation issued during a notification pass");
            self.inner.pending.borrow_mut().push_back(mutation);
            return UpdateReport::deferred();
        }

        let _guard = PassGuard::enter(&self.inner.notifying);
        let mut report = self.run_pass(mutation);

        let mut deferred_passes = 0;
        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            let Some(next) = next else {
                break;
            };
            if deferred_passes >= self.inner.config.max_deferred_passes {
                let dropped = 1 + self.inner.pending.borrow_mut().drain(..).count();
                error!(
                    dropped,
                    limit = self.inner.config.max_deferred_passes,
                    "deferred state mutations exceeded the pass limit"
                );
                report.dropped += dropped;
                break;
            }
            deferred_passes += 1;
            report.absorb(self.run_pass(next));
        }
        report
    }

    fn run_pass(&self, mutation: Mutation) -> UpdateReport {
        {
            let mut state = self.inner.state.borrow_mut();
            match mutation {
                Mutation::Merge(partial) => {
                    for (key, value) in partial {
                        state.insert(key, value);
                    }
                }
                Mutation::Reset => state.clear(),
            }
        }

        let listeners = self.notify_listeners();
        let bindings = self.update_bindings();
        UpdateReport {
            listeners,
            bindings,
            passes: 1,
            deferred: false,
            dropped: 0,
        }
    }

    fn notify_listeners(&self) -> Report {
        let snapshot = self.get_state();
        let listeners: Vec<_> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|entry| (entry.id, Rc::clone(&entry.callback)))
            .collect();

        let mut report = Report::new();
        for (id, callback) in listeners {
            let result = match callback.try_borrow_mut() {
                Ok(mut callback) => (*callback)(&snapshot),
                Err(_) => Err("listener is already running".into()),
            };
            match result {
                Ok(()) => report.record_success(),
                Err(err) => {
                    warn!(listener = %id, error = %err, "state listener failed");
                    report.record_failure(Failure::new(id.to_string(), err));
                }
            }
        }
        report
    }

    fn update_bindings(&self) -> Report {
        let bindings: Vec<(NodeId, Binding)> = self
            .inner
            .bindings
            .borrow()
            .iter()
            .flat_map(|(node, list)| list.iter().map(move |binding| (*node, binding.clone())))
            .collect();

        let mut report = Report::new();
        for (node, binding) in &bindings {
            self.run_binding(*node, binding, &mut report);
        }
        report
    }

    fn run_binding(&self, node: NodeId, binding: &Binding, report: &mut Report) {
        match self.apply_binding(node, binding) {
            Ok(true) => report.record_success(),
            Ok(false) => report.record_skip(),
            Err(err) => {
                warn!(
                    %node,
                    property = %binding.property,
                    state_key = %binding.state_key,
                    error = %err,
                    "binding not applied"
                );
                report.record_failure(Failure::new(
                    format!("{node}.{} <- {}", binding.property, binding.state_key),
                    err,
                ));
            }
        }
    }

    /// Applies one binding. Returns `Ok(false)` when the key is absent.
    fn apply_binding(&self, node: NodeId, binding: &Binding) -> Result<bool, DocumentError> {
        let Some(value) = self.get(&binding.state_key) else {
            return Ok(false);
        };
        let document = self.inner.document.as_ref();

        match (binding.property.as_str(), &value) {
            (TEXT_CONTENT, value) => {
                document.set_text_content(node, &text_content_string(value))?;
            }
            (STYLE_KEY, Value::Object(declarations)) => {
                for (name, value) in declarations {
                    let name = property_name(name);
                    match value {
                        Value::Null => document.remove_style_property(node, &name)?,
                        value => {
                            document.set_style_property(node, &name, &attribute_string(value))?;
                        }
                    }
                }
            }
            (property, value) => {
                document.set_attribute(node, property, &attribute_string(value))?;
            }
        }
        Ok(true)
    }
}

/// Converts a serializable value into a state map.
fn into_state_map(partial: impl Serialize) -> Result<StateMap, Error> {
    match serde_json::to_value(partial).map_err(|err| Error::InvalidState(err.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidState(format!(
            "expected a key/value mapping, got {}",
            kind(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::{
        Attributes, Document, ElementFactory,
        document::{EventHandler, EventListenerId},
        memory::MemoryDocument,
    };

    fn setup() -> (Rc<MemoryDocument>, ElementFactory, StateStore) {
        setup_with(StoreConfig::default())
    }

    fn setup_with(config: StoreConfig) -> (Rc<MemoryDocument>, ElementFactory, StateStore) {
        let document = MemoryDocument::shared();
        let factory = ElementFactory::new(document.clone());
        let store = StateStore::with_config(document.clone(), config);
        (document, factory, store)
    }

    fn span(factory: &ElementFactory) -> NodeId {
        factory.create("span", Attributes::new(), "").unwrap()
    }

    #[test]
    fn get_state_returns_an_independent_copy() {
        let (_, _, store) = setup();
        store.set_state(json!({"a": 1})).unwrap();

        let mut copy = store.get_state();
        copy.insert("a".into(), json!(99));
        copy.insert("b".into(), json!(2));

        assert_eq!(Value::Object(store.get_state()), json!({"a": 1}));
    }

    #[test]
    fn set_state_merges_and_reset_clears() {
        let (_, _, store) = setup();
        store.set_state(json!({"a": 1})).unwrap();
        store.set_state(json!({"b": 2})).unwrap();
        assert_eq!(Value::Object(store.get_state()), json!({"a": 1, "b": 2}));

        store.set_state(json!({"a": "x"})).unwrap();
        assert_eq!(store.get("a"), Some(json!("x")));

        store.reset_state();
        assert!(store.get_state().is_empty());
    }

    #[test]
    fn reset_wipes_initial_state_too() {
        let document = MemoryDocument::shared();
        let store =
            StateStore::with_state(document, StoreConfig::default(), json!({"seed": true}))
                .unwrap();
        assert_eq!(store.get("seed"), Some(json!(true)));
        store.reset_state();
        assert_eq!(store.get("seed"), None);
    }

    #[test]
    fn rejects_non_mapping_state() {
        let (_, _, store) = setup();
        for partial in [json!(1), json!("text"), json!([1, 2]), Value::Null] {
            assert!(matches!(
                store.set_state(partial),
                Err(Error::InvalidState(_))
            ));
        }
        let document = MemoryDocument::shared();
        assert!(matches!(
            StateStore::with_state(document, StoreConfig::default(), 5),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn accepts_serializable_structs() {
        #[derive(Serialize)]
        struct Profile {
            name: &'static str,
            age: u8,
        }

        let (_, _, store) = setup();
        store.set_state(Profile { name: "Ada", age: 36 }).unwrap();
        assert_eq!(Value::Object(store.get_state()), json!({"name": "Ada", "age": 36}));
    }

    #[test]
    fn listeners_run_in_registration_order_with_new_state() {
        let (_, _, store) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            store.add_listener(move |state| {
                seen.borrow_mut().push((tag, state.get("n").cloned()));
                Ok(())
            });
        }

        store.set_state(json!({"n": 1})).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![("first", Some(json!(1))), ("second", Some(json!(1)))]
        );
    }

    #[test]
    fn failing_listener_does_not_stop_later_listeners() {
        let (_, _, store) = setup();
        let reached = Rc::new(RefCell::new(false));
        store.add_listener(|_| Err("boom".into()));
        store.add_listener({
            let reached = Rc::clone(&reached);
            move |_| {
                *reached.borrow_mut() = true;
                Ok(())
            }
        });

        let report = store.set_state(json!({"x": 1})).unwrap();

        assert!(*reached.borrow());
        assert_eq!(report.listeners.succeeded(), 1);
        assert_eq!(report.listeners.failures().len(), 1);
        assert_eq!(report.listeners.failures()[0].message(), "boom");
        assert!(!report.is_clean());
    }

    #[test]
    fn removed_listener_is_not_called() {
        let (_, _, store) = setup();
        let calls = Rc::new(RefCell::new(0));
        let id = store.add_listener({
            let calls = Rc::clone(&calls);
            move |_| {
                *calls.borrow_mut() += 1;
                Ok(())
            }
        });

        store.set_state(json!({})).unwrap();
        assert!(store.remove_listener(id));
        assert!(!store.remove_listener(id));
        store.set_state(json!({})).unwrap();

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn empty_update_still_runs_a_full_pass() {
        let (document, factory, store) = setup();
        let node = span(&factory);
        store.set_state(json!({"k": "v"})).unwrap();
        store.bind(node, "title", "k").unwrap();
        store.add_listener(|_| Ok(()));

        let report = store.set_state(json!({})).unwrap();

        assert_eq!(Value::Object(store.get_state()), json!({"k": "v"}));
        assert_eq!(report.passes, 1);
        assert_eq!(report.listeners.succeeded(), 1);
        assert_eq!(report.bindings.succeeded(), 1);
        assert_eq!(document.attribute(node, "title").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn text_binding_round_trip() {
        let (document, factory, store) = setup();
        let node = span(&factory);
        store.set_state(json!({"k": "x"})).unwrap();
        store.bind(node, TEXT_CONTENT, "k").unwrap();
        assert_eq!(document.text_content(node).unwrap(), "x");

        store.set_state(json!({"k": "y"})).unwrap();
        assert_eq!(document.text_content(node).unwrap(), "y");

        store.set_state(json!({"k": null})).unwrap();
        assert_eq!(document.text_content(node).unwrap(), "");
    }

    #[test]
    fn style_binding_merges_declarations() {
        let (document, factory, store) = setup();
        let node = factory
            .create(
                "div",
                Attributes::new().style(crate::Style::new().with("color", "red")),
                "",
            )
            .unwrap();

        store
            .set_state(json!({"look": {"zIndex": 4, "opacity": 0.5}}))
            .unwrap();
        store.bind(node, "style", "look").unwrap();

        assert_eq!(
            document.style(node).unwrap(),
            vec![
                ("color".to_owned(), "red".to_owned()),
                ("z-index".to_owned(), "4".to_owned()),
                ("opacity".to_owned(), "0.5".to_owned()),
            ]
        );

        store.set_state(json!({"look": {"opacity": null}})).unwrap();
        assert_eq!(document.style_property(node, "opacity").unwrap(), None);
        assert_eq!(
            document.style_property(node, "z-index").unwrap().as_deref(),
            Some("4")
        );
    }

    #[test]
    fn non_map_style_value_sets_the_attribute() {
        let (document, factory, store) = setup();
        let node = span(&factory);
        store.set_state(json!({"css": "color: blue"})).unwrap();
        store.bind(node, "style", "css").unwrap();
        assert_eq!(
            document.style_property(node, "color").unwrap().as_deref(),
            Some("blue")
        );
    }

    #[test]
    fn attribute_binding_coerces_to_string() {
        let (document, factory, store) = setup();
        let node = span(&factory);
        store
            .set_state(json!({"count": 3, "on": true, "tags": ["a", "b"]}))
            .unwrap();
        store.bind(node, "data-count", "count").unwrap();
        store.bind(node, "data-on", "on").unwrap();
        store.bind(node, "data-tags", "tags").unwrap();

        assert_eq!(
            document.attributes(node).unwrap(),
            vec![
                ("data-count".to_owned(), "3".to_owned()),
                ("data-on".to_owned(), "true".to_owned()),
                ("data-tags".to_owned(), "a,b".to_owned()),
            ]
        );
    }

    #[test]
    fn strict_bind_rejects_absent_keys() {
        let (_, factory, store) = setup();
        let node = span(&factory);
        assert_eq!(
            store.bind(node, TEXT_CONTENT, "missing"),
            Err(Error::UnknownStateKey("missing".into()))
        );
        assert_eq!(store.binding_count(), 0);
    }

    #[test]
    fn lenient_bind_waits_for_the_key() {
        let config = StoreConfig::new().with_unknown_key_policy(UnknownKeyPolicy::Ignore);
        let (document, factory, store) = setup_with(config);
        let node = span(&factory);

        let report = store.bind(node, TEXT_CONTENT, "later").unwrap();
        assert_eq!(report.skipped(), 1);
        assert_eq!(document.text_content(node).unwrap(), "");

        store.set_state(json!({"later": "now"})).unwrap();
        assert_eq!(document.text_content(node).unwrap(), "now");
    }

    #[test]
    fn bind_validates_node_and_keys() {
        let (_, _, store) = setup();
        store.set_state(json!({"k": 1})).unwrap();
        let stray = NodeId::from_raw(500);
        assert_eq!(store.bind(stray, "title", "k"), Err(Error::InvalidNode(stray)));

        let root = store.document().root();
        assert!(matches!(
            store.bind(root, "", "k"),
            Err(Error::InvalidKey { role: "property", .. })
        ));
        assert!(matches!(
            store.bind(root, "bad name", "k"),
            Err(Error::InvalidKey { role: "property", .. })
        ));
        assert!(matches!(
            store.bind(root, "title", ""),
            Err(Error::InvalidKey { role: "state key", .. })
        ));
    }

    #[test]
    fn keys_removed_by_reset_are_skipped() {
        let (document, factory, store) = setup();
        let node = span(&factory);
        store.set_state(json!({"k": "kept"})).unwrap();
        store.bind(node, TEXT_CONTENT, "k").unwrap();

        let report = store.reset_state();

        assert_eq!(report.bindings.skipped(), 1);
        assert!(report.is_clean());
        assert_eq!(document.text_content(node).unwrap(), "kept");
    }

    /// Logs every attribute write before handing it to a [`MemoryDocument`].
    #[derive(Debug, Default)]
    struct Recording {
        inner: MemoryDocument,
        writes: RefCell<Vec<(NodeId, String)>>,
    }

    impl Document for Recording {
        fn root(&self) -> NodeId {
            self.inner.root()
        }

        fn create_element(&self, tag: &str) -> Result<NodeId, DocumentError> {
            self.inner.create_element(tag)
        }

        fn contains(&self, node: NodeId) -> bool {
            self.inner.contains(node)
        }

        fn tag_name(&self, node: NodeId) -> Result<String, DocumentError> {
            self.inner.tag_name(node)
        }

        fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
            self.inner.append_child(parent, child)
        }

        fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
            self.inner.remove_child(parent, child)
        }

        fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DocumentError> {
            self.inner.children(node)
        }

        fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DocumentError> {
            self.inner.parent(node)
        }

        fn set_attribute(
            &self,
            node: NodeId,
            name: &str,
            value: &str,
        ) -> Result<(), DocumentError> {
            self.writes.borrow_mut().push((node, name.to_owned()));
            self.inner.set_attribute(node, name, value)
        }

        fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DocumentError> {
            self.inner.attribute(node, name)
        }

        fn add_class(&self, node: NodeId, class: &str) -> Result<(), DocumentError> {
            self.inner.add_class(node, class)
        }

        fn set_style_property(
            &self,
            node: NodeId,
            name: &str,
            value: &str,
        ) -> Result<(), DocumentError> {
            self.inner.set_style_property(node, name, value)
        }

        fn remove_style_property(&self, node: NodeId, name: &str) -> Result<(), DocumentError> {
            self.inner.remove_style_property(node, name)
        }

        fn style_property(
            &self,
            node: NodeId,
            name: &str,
        ) -> Result<Option<String>, DocumentError> {
            self.inner.style_property(node, name)
        }

        fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), DocumentError> {
            self.inner.set_text_content(node, text)
        }

        fn text_content(&self, node: NodeId) -> Result<String, DocumentError> {
            self.inner.text_content(node)
        }

        fn input_value(&self, node: NodeId) -> Result<String, DocumentError> {
            self.inner.input_value(node)
        }

        fn set_input_value(&self, node: NodeId, value: &str) -> Result<(), DocumentError> {
            self.inner.set_input_value(node, value)
        }

        fn add_event_listener(
            &self,
            node: NodeId,
            event: &str,
            handler: EventHandler,
        ) -> Result<EventListenerId, DocumentError> {
            self.inner.add_event_listener(node, event, handler)
        }

        fn remove_event_listener(&self, listener: EventListenerId) -> Result<(), DocumentError> {
            self.inner.remove_event_listener(listener)
        }
    }

    #[test]
    fn bindings_apply_grouped_by_node() {
        let document = Rc::new(Recording::default());
        let factory = ElementFactory::new(document.clone());
        let store = StateStore::new(document.clone());
        let first = span(&factory);
        let second = span(&factory);
        store.set_state(json!({"k": "v"})).unwrap();

        store.bind(first, "a", "k").unwrap();
        store.bind(second, "b", "k").unwrap();
        store.bind(first, "c", "k").unwrap();
        assert_eq!(
            store.bindings_for(first),
            vec![
                Binding {
                    property: "a".into(),
                    state_key: "k".into()
                },
                Binding {
                    property: "c".into(),
                    state_key: "k".into()
                },
            ]
        );

        document.writes.borrow_mut().clear();
        let report = store.set_state(json!({"k": "w"})).unwrap();

        assert_eq!(report.bindings.succeeded(), 3);
        assert_eq!(
            *document.writes.borrow(),
            vec![
                (first, String::from("a")),
                (first, String::from("c")),
                (second, String::from("b")),
            ]
        );
        assert_eq!(document.attribute(second, "b").unwrap().as_deref(), Some("w"));
    }

    #[test]
    fn broken_binding_does_not_block_others() {
        let (document, factory, store) = setup();
        let node = span(&factory);
        store.set_state(json!({"look": {"bad name": 1}, "k": "ok"})).unwrap();
        store.bind(node, "style", "look").unwrap();
        store.bind(node, TEXT_CONTENT, "k").unwrap();

        let report = store.set_state(json!({"k": "still ok"})).unwrap();

        assert_eq!(report.bindings.failures().len(), 1);
        assert_eq!(report.bindings.succeeded(), 1);
        assert_eq!(document.text_content(node).unwrap(), "still ok");
    }

    #[test]
    fn unbind_stops_updates() {
        let (document, factory, store) = setup();
        let node = span(&factory);
        store.set_state(json!({"k": "a", "t": "x"})).unwrap();
        store.bind(node, TEXT_CONTENT, "k").unwrap();
        store.bind(node, "title", "t").unwrap();

        assert_eq!(store.unbind(node, Some(TEXT_CONTENT), None), 1);
        store.set_state(json!({"k": "b", "t": "y"})).unwrap();
        assert_eq!(document.text_content(node).unwrap(), "a");
        assert_eq!(document.attribute(node, "title").unwrap().as_deref(), Some("y"));

        assert_eq!(store.unbind_node(node), 1);
        assert_eq!(store.unbind_node(node), 0);
        assert_eq!(store.binding_count(), 0);
    }

    #[test]
    fn reentrant_updates_are_deferred() {
        let (_, _, store) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));

        store.add_listener({
            let store = store.clone();
            move |state| {
                if state.get("step") == Some(&json!(1)) {
                    let nested = store.set_state(json!({"step": 2}))?;
                    assert!(nested.deferred);
                }
                Ok(())
            }
        });
        store.add_listener({
            let seen = Rc::clone(&seen);
            move |state| {
                seen.borrow_mut().push(state["step"].clone());
                Ok(())
            }
        });

        let report = store.set_state(json!({"step": 1})).unwrap();

        assert_eq!(*seen.borrow(), vec![json!(1), json!(2)]);
        assert_eq!(report.passes, 2);
        assert_eq!(store.get("step"), Some(json!(2)));
    }

    #[test]
    fn runaway_reentrancy_is_bounded() {
        let config = StoreConfig::new().with_max_deferred_passes(3);
        let (_, _, store) = setup_with(config);
        store.add_listener({
            let store = store.clone();
            move |state| {
                let n = state["n"].as_u64().unwrap_or_default();
                store.set_state(json!({"n": n + 1}))?;
                Ok(())
            }
        });

        let report = store.set_state(json!({"n": 0})).unwrap();

        assert_eq!(report.passes, 4);
        assert_eq!(report.dropped, 1);
        assert!(!report.is_clean());
        assert_eq!(store.get("n"), Some(json!(3)));

        // The store accepts new mutations afterwards.
        let report = store.set_state(json!({"n": 100})).unwrap();
        assert!(!report.deferred);
    }
}
