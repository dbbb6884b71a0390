// ============================================================================
// spark-emitter - Observable
// Reactive properties on top of an embedded emitter
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::core::constants::change_event;
use crate::core::types::{Callback, EmitterId, Target};
use crate::core::value::Value;
use crate::primitives::bind::{Dependency, SourceEntry};
use crate::primitives::emitter::{Emitter, EmitterCapable};
use crate::reactivity::equality::{EqualsFn, strict_equals};

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for creating an observable.
pub struct ObservableOptions {
    /// Decides whether a write is a change. Defaults to [`strict_equals`].
    pub equals: Option<EqualsFn>,
}

impl Default for ObservableOptions {
    fn default() -> Self {
        Self { equals: None }
    }
}

// =============================================================================
// INTERNAL STORAGE
// =============================================================================

/// Property storage in declaration order.
#[derive(Default)]
pub(crate) struct Properties {
    values: HashMap<Rc<str>, Value>,
    order: Vec<Rc<str>>,
}

impl Properties {
    /// Declare `name`. Returns false if it was already declared.
    fn declare(&mut self, name: &str) -> bool {
        if self.values.contains_key(name) {
            return false;
        }
        let key: Rc<str> = Rc::from(name);
        self.order.push(key.clone());
        self.values.insert(key, Value::Undefined);
        true
    }

    fn get(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or_default()
    }
}

pub(crate) struct ObservableInner {
    pub(crate) emitter: Emitter,
    equals: EqualsFn,
    properties: RefCell<Properties>,
    /// Bound target → its declared (source, property) pairs
    pub(crate) bindings: RefCell<HashMap<Target, Vec<Dependency>>>,
    /// Source → property → dependents, one change listener per pair
    pub(crate) listener_index: RefCell<HashMap<EmitterId, SourceEntry>>,
}

impl ObservableInner {
    pub(crate) fn get(&self, name: &str) -> Value {
        self.properties.borrow().get(name)
    }
}

// =============================================================================
// OBSERVABLE - The public handle
// =============================================================================

/// An emitter whose named properties fire `change:<name>` when written.
///
/// Properties are declared on first [`set`](Self::set) (or explicitly with
/// [`property`](Self::property)) and read back with [`get`](Self::get).
/// A write that is equal to the stored value is ignored.
///
/// `Observable` is a cheap handle; clones share state.
///
/// # Example
///
/// ```
/// use spark_emitter::{Callback, EmitterCapable, Observable, Value};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let user = Observable::new();
/// let changes = Rc::new(RefCell::new(Vec::new()));
///
/// user.on("change:name", Callback::new({
///     let changes = changes.clone();
///     move |_event, args| changes.borrow_mut().push(args.to_vec())
/// }));
///
/// user.set("name", "Ada");
/// user.set("name", "Ada");
/// user.set("name", "Grace");
///
/// assert_eq!(
///     *changes.borrow(),
///     vec![
///         vec![Value::from("Ada"), Value::Undefined],
///         vec![Value::from("Grace"), Value::from("Ada")],
///     ]
/// );
/// ```
#[derive(Clone)]
pub struct Observable {
    pub(crate) inner: Rc<ObservableInner>,
}

impl Observable {
    pub fn new() -> Self {
        Self::with_options(ObservableOptions::default())
    }

    /// Create an observable with a custom change detector.
    ///
    /// # Example
    ///
    /// ```
    /// use spark_emitter::{never_equals, Observable, ObservableOptions};
    ///
    /// let always = Observable::with_options(ObservableOptions { equals: Some(never_equals) });
    /// assert!(always.set("x", 1));
    /// assert!(always.set("x", 1));
    /// ```
    pub fn with_options(options: ObservableOptions) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                emitter: Emitter::new(),
                equals: options.equals.unwrap_or(strict_equals),
                properties: RefCell::new(Properties::default()),
                bindings: RefCell::new(HashMap::new()),
                listener_index: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Read a property. Undeclared properties read as [`Value::Undefined`].
    pub fn get(&self, name: &str) -> Value {
        self.inner.get(name)
    }

    /// Write a property, firing `change:<name>` with `(new, old)` if the value
    /// changed. Returns whether it changed.
    ///
    /// The first write declares the property.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        let old = {
            let mut properties = self.inner.properties.borrow_mut();
            properties.declare(name);
            let Some(slot) = properties.values.get_mut(name) else {
                return false;
            };
            if (self.inner.equals)(slot, &value) {
                return false;
            }
            std::mem::replace(slot, value.clone())
        };

        trace!(observable = %self.id(), property = name, "property changed");
        self.inner.emitter.fire(&change_event(name), &[value, old]);
        true
    }

    /// Declare `name` and return an accessor handle for it.
    ///
    /// Declaring twice is harmless; both handles address the same slot.
    ///
    /// # Example
    ///
    /// ```
    /// use spark_emitter::{Observable, Value};
    ///
    /// let obs = Observable::new();
    /// let foo = obs.property("foo");
    ///
    /// assert!(obs.has("foo"));
    /// assert_eq!(foo.get(), Value::Undefined);
    ///
    /// foo.set("b");
    /// assert_eq!(obs.get("foo"), Value::from("b"));
    /// ```
    pub fn property(&self, name: &str) -> Property {
        self.inner.properties.borrow_mut().declare(name);
        Property {
            owner: self.clone(),
            name: Rc::from(name),
        }
    }

    /// Whether `name` has been declared.
    pub fn has(&self, name: &str) -> bool {
        self.inner.properties.borrow().values.contains_key(name)
    }

    /// Declared property names, in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .properties
            .borrow()
            .order
            .iter()
            .map(|key| key.to_string())
            .collect()
    }

    /// Identity of the embedded emitter.
    pub fn id(&self) -> &EmitterId {
        self.inner.emitter.id()
    }

    pub fn ptr_eq(&self, other: &Observable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<ObservableInner> {
        Rc::downgrade(&self.inner)
    }
}

impl Default for Observable {
    fn default() -> Self {
        Self::new()
    }
}

impl EmitterCapable for Observable {
    fn emitter(&self) -> &Emitter {
        &self.inner.emitter
    }

    // The removal forms can withdraw binding listeners, so the binding index
    // is reconciled after each of them.

    fn stop_listening<R>(&self, remote: &R, name: &str, callback: &Callback)
    where
        R: EmitterCapable + ?Sized,
    {
        self.inner.emitter.stop_listening(remote, name, callback);
        self.prune_listener_index();
    }

    fn stop_listening_event<R>(&self, remote: &R, name: &str)
    where
        R: EmitterCapable + ?Sized,
    {
        self.inner.emitter.stop_listening_event(remote, name);
        self.prune_listener_index();
    }

    fn stop_listening_to<R>(&self, remote: &R)
    where
        R: EmitterCapable + ?Sized,
    {
        self.inner.emitter.stop_listening_to(remote);
        self.prune_listener_index();
    }

    fn stop_listening_all(&self) {
        self.inner.emitter.stop_listening_all();
        self.prune_listener_index();
    }
}

impl std::fmt::Debug for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let properties = self.inner.properties.borrow();
        let mut map = f.debug_map();
        for key in &properties.order {
            map.entry(&key, &properties.get(key));
        }
        map.finish()
    }
}

// =============================================================================
// PROPERTY - Accessor handle
// =============================================================================

/// Accessor for one declared property of an [`Observable`].
///
/// Writing through the handle behaves exactly like
/// [`Observable::set`].
#[derive(Clone)]
pub struct Property {
    owner: Observable,
    name: Rc<str>,
}

impl Property {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> Value {
        self.owner.get(&self.name)
    }

    pub fn set(&self, value: impl Into<Value>) -> bool {
        self.owner.set(&self.name, value)
    }

    /// The observable this property belongs to.
    pub fn owner(&self) -> &Observable {
        &self.owner
    }
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value", &self.get())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
