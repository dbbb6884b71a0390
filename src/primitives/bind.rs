// ============================================================================
// spark-emitter - One-Way Bindings
// Multiplex target callbacks over deduplicated property-change listeners
// ============================================================================
//
// A binding declares that a target callback depends on one or more
// (source observable, property) pairs. Whenever any of those properties
// changes, the target is re-invoked with the current values of *all* its
// pairs, in the order it declared them.
//
// The binding observable keeps two structures:
//
// - bindings:       target → declared pairs
// - listener_index: source → property → (change listener, dependent targets)
//
// Exactly one `change:<property>` subscription exists per (source, property)
// pair, no matter how many targets depend on it. The subscription is created
// by the first dependent and withdrawn with the last.
// ============================================================================

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::core::constants::change_event;
use crate::core::types::{Callback, EmitterId, Target};
use crate::core::value::Value;
use crate::error::BindError;
use crate::primitives::emitter::EmitterCapable;
use crate::primitives::observable::{Observable, ObservableInner};

// =============================================================================
// GRAPH STORAGE
// =============================================================================

/// One declared (source, property) pair of a target.
#[derive(Clone)]
pub(crate) struct Dependency {
    source: Weak<ObservableInner>,
    source_id: EmitterId,
    property: Rc<str>,
}

impl Dependency {
    /// Current value of the pair. A dropped source reads as undefined.
    fn current(&self) -> Value {
        self.source
            .upgrade()
            .map(|source| source.get(&self.property))
            .unwrap_or_default()
    }
}

/// The single change listener for a pair, and the targets it serves.
pub(crate) struct PropertyEntry {
    listener: Callback,
    targets: Vec<Target>,
}

/// All listened properties of one source.
#[derive(Default)]
pub(crate) struct SourceEntry {
    properties: HashMap<Rc<str>, PropertyEntry>,
}

// =============================================================================
// BIND ARGUMENTS
// =============================================================================

/// One element of the flat `(observable, property, observable, property, ..)`
/// list accepted by [`Binder::to`].
///
/// Build lists with the [`sources!`](crate::sources) macro or the `From`
/// impls.
#[derive(Clone, Debug)]
pub enum BindArg {
    Source(Observable),
    Property(Rc<str>),
    /// Any other value; only a string is accepted, and only at a property position
    Value(Value),
}

impl From<Observable> for BindArg {
    fn from(source: Observable) -> Self {
        BindArg::Source(source)
    }
}

impl From<&Observable> for BindArg {
    fn from(source: &Observable) -> Self {
        BindArg::Source(source.clone())
    }
}

impl From<&str> for BindArg {
    fn from(property: &str) -> Self {
        BindArg::Property(Rc::from(property))
    }
}

impl From<String> for BindArg {
    fn from(property: String) -> Self {
        BindArg::Property(Rc::from(property))
    }
}

impl From<Value> for BindArg {
    fn from(value: Value) -> Self {
        BindArg::Value(value)
    }
}

/// Validate a flat argument list and collapse repeated pairs.
///
/// Pairs keep the order of their first declaration.
fn parse_sources(args: &[BindArg]) -> Result<Vec<(Observable, Rc<str>)>, BindError> {
    if args.len() < 2 {
        return Err(BindError::invalid(format!(
            "expected at least one (observable, property) pair, got {} argument(s)",
            args.len()
        )));
    }

    let mut pairs: Vec<(Observable, Rc<str>)> = Vec::with_capacity(args.len() / 2);
    for (index, chunk) in args.chunks(2).enumerate() {
        let position = index * 2;
        let source = match &chunk[0] {
            BindArg::Source(source) => source,
            _ => {
                return Err(BindError::invalid(format!(
                    "expected an observable at position {position}"
                )));
            }
        };
        let property: Rc<str> = match chunk.get(1) {
            Some(BindArg::Property(name)) => name.clone(),
            Some(BindArg::Value(Value::Str(name))) => name.clone(),
            _ => {
                return Err(BindError::invalid(format!(
                    "expected a property name at position {}",
                    position + 1
                )));
            }
        };

        let seen = pairs
            .iter()
            .any(|(known, name)| known.ptr_eq(source) && *name == property);
        if !seen {
            pairs.push((source.clone(), property));
        }
    }
    Ok(pairs)
}

// =============================================================================
// BINDER
// =============================================================================

/// Pending binding returned by [`Observable::bind`].
///
/// Nothing is registered until [`to`](Self::to) succeeds.
#[must_use = "a binder does nothing until `to` is called"]
pub struct Binder<'a> {
    owner: &'a Observable,
    target: Target,
}

impl Binder<'_> {
    /// Declare the target's sources and invoke it once with their current
    /// values.
    ///
    /// `args` alternates observable and property name. On error nothing is
    /// registered.
    ///
    /// # Example
    ///
    /// ```
    /// use spark_emitter::{sources, Observable, Target, Value};
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    ///
    /// let a = Observable::new();
    /// let b = Observable::new();
    /// a.set("p1", 1);
    /// b.set("p2", "x");
    ///
    /// let calls = Rc::new(RefCell::new(Vec::new()));
    /// let target = Target::new({
    ///     let calls = calls.clone();
    ///     move |values| calls.borrow_mut().push(values.to_vec())
    /// });
    ///
    /// let view = Observable::new();
    /// view.bind(&target).unwrap().to(&sources![&a, "p1", &b, "p2"]).unwrap();
    /// a.set("p1", 2);
    ///
    /// assert_eq!(
    ///     *calls.borrow(),
    ///     vec![
    ///         vec![Value::from(1), Value::from("x")],
    ///         vec![Value::from(2), Value::from("x")],
    ///     ]
    /// );
    /// ```
    pub fn to(self, args: &[BindArg]) -> Result<(), BindError> {
        let pairs = parse_sources(args)?;
        self.owner.connect(&self.target, pairs)
    }

    /// Typed form of [`to`](Self::to) taking explicit pairs.
    pub fn to_pairs(self, pairs: &[(&Observable, &str)]) -> Result<(), BindError> {
        let args: Vec<BindArg> = pairs
            .iter()
            .flat_map(|(source, property)| [BindArg::from(*source), BindArg::from(*property)])
            .collect();
        self.to(&args)
    }
}

// =============================================================================
// OBSERVABLE BINDING API
// =============================================================================

impl Observable {
    /// Start binding `target`.
    ///
    /// Fails with [`BindError::DuplicateBinding`] if `target` is already bound
    /// through this observable.
    pub fn bind(&self, target: &Target) -> Result<Binder<'_>, BindError> {
        if self.is_bound(target) {
            return Err(BindError::DuplicateBinding);
        }
        Ok(Binder {
            owner: self,
            target: target.clone(),
        })
    }

    /// Remove `target` and withdraw every change listener it was the last
    /// dependent of. No-op if `target` is not bound.
    pub fn unbind(&self, target: &Target) {
        let Some(dependencies) = self.inner.bindings.borrow().get(target).cloned() else {
            return;
        };

        for dependency in &dependencies {
            let released = {
                let mut index = self.inner.listener_index.borrow_mut();
                let Some(source_entry) = index.get_mut(&dependency.source_id) else {
                    continue;
                };
                let Some(property_entry) = source_entry.properties.get_mut(&dependency.property)
                else {
                    continue;
                };
                property_entry.targets.retain(|known| known != target);
                if !property_entry.targets.is_empty() {
                    continue;
                }
                let released = source_entry.properties.remove(&dependency.property);
                if source_entry.properties.is_empty() {
                    index.remove(&dependency.source_id);
                }
                released
            };

            if let Some(entry) = released {
                self.inner.emitter.stop_listening_id(
                    &dependency.source_id,
                    &change_event(&dependency.property),
                    &entry.listener,
                );
                debug!(
                    observable = %self.id(),
                    source = %dependency.source_id,
                    property = &*dependency.property,
                    "change listener released"
                );
            }
        }

        let removed = self.inner.bindings.borrow_mut().remove(target);
        debug!(observable = %self.id(), target = ?target, "unbound");
        drop(removed);
    }

    /// Whether `target` is currently bound through this observable.
    pub fn is_bound(&self, target: &Target) -> bool {
        self.inner.bindings.borrow().contains_key(target)
    }

    /// Number of targets currently bound through this observable.
    pub fn binding_count(&self) -> usize {
        self.inner.bindings.borrow().len()
    }

    /// Number of (source, property) pairs this observable listens to.
    pub fn listened_pair_count(&self) -> usize {
        self.inner
            .listener_index
            .borrow()
            .values()
            .map(|entry| entry.properties.len())
            .sum()
    }

    fn connect(&self, target: &Target, pairs: Vec<(Observable, Rc<str>)>) -> Result<(), BindError> {
        if self.is_bound(target) {
            return Err(BindError::DuplicateBinding);
        }

        let mut dependencies = Vec::with_capacity(pairs.len());
        for (source, property) in pairs {
            let event = change_event(&property);
            let has_listener = self
                .inner
                .listener_index
                .borrow()
                .get(source.id())
                .is_some_and(|entry| entry.properties.contains_key(&property));

            if !has_listener {
                let listener = change_listener(self.downgrade(), source.id().clone(), property.clone());
                self.listen_to(&source, &event, listener.clone());
                self.inner
                    .listener_index
                    .borrow_mut()
                    .entry(source.id().clone())
                    .or_default()
                    .properties
                    .insert(
                        property.clone(),
                        PropertyEntry {
                            listener,
                            targets: Vec::new(),
                        },
                    );
                debug!(observable = %self.id(), source = %source.id(), property = &*property, "change listener created");
            }

            if let Some(entry) = self
                .inner
                .listener_index
                .borrow_mut()
                .get_mut(source.id())
                .and_then(|entry| entry.properties.get_mut(&property))
            {
                if !entry.targets.contains(target) {
                    entry.targets.push(target.clone());
                }
            }

            dependencies.push(Dependency {
                source: source.downgrade(),
                source_id: source.id().clone(),
                property,
            });
        }

        let values: Vec<Value> = dependencies.iter().map(Dependency::current).collect();
        debug!(observable = %self.id(), target = ?target, pairs = dependencies.len(), "bound");
        self.inner.bindings.borrow_mut().insert(target.clone(), dependencies);

        target.call(&values);
        Ok(())
    }
}

impl Observable {
    /// Forget index entries whose change listener was withdrawn through the
    /// plain emitter surface (`stop_listening*` on this observable).
    ///
    /// Targets that depended on a forgotten pair stay bound but are no longer
    /// notified for it; a later binding of the pair installs a fresh listener.
    pub(crate) fn prune_listener_index(&self) {
        let released: Vec<PropertyEntry> = {
            let mut index = self.inner.listener_index.borrow_mut();
            let mut released = Vec::new();
            index.retain(|source, entry| {
                let stale: Vec<Rc<str>> = entry
                    .properties
                    .iter()
                    .filter(|(property, listed)| {
                        !self
                            .inner
                            .emitter
                            .is_subscribed(source, &change_event(property), &listed.listener)
                    })
                    .map(|(property, _)| property.clone())
                    .collect();
                for property in stale {
                    if let Some(listed) = entry.properties.remove(&property) {
                        debug!(observable = %self.id(), source = %source, property = &*property, "change listener withdrawn");
                        released.push(listed);
                    }
                }
                !entry.properties.is_empty()
            });
            released
        };
        drop(released);
    }
}

impl ObservableInner {
    /// Current values of every pair `target` declared, or None if unbound.
    fn collect_values(&self, target: &Target) -> Option<Vec<Value>> {
        let dependencies = self.bindings.borrow().get(target).cloned()?;
        Some(dependencies.iter().map(Dependency::current).collect())
    }

    fn dependents(&self, source: &EmitterId, property: &str) -> Vec<Target> {
        self.listener_index
            .borrow()
            .get(source)
            .and_then(|entry| entry.properties.get(property))
            .map(|entry| entry.targets.clone())
            .unwrap_or_default()
    }
}

/// The one listener installed per (source, property) pair.
///
/// Holds the binding observable weakly, so a listener left on a source never
/// keeps its owner alive.
fn change_listener(owner: Weak<ObservableInner>, source: EmitterId, property: Rc<str>) -> Callback {
    Callback::new(move |_event, _args| {
        let Some(owner) = owner.upgrade() else {
            return;
        };
        for target in owner.dependents(&source, &property) {
            // A target unbound by an earlier one in this round is skipped
            if let Some(values) = owner.collect_values(&target) {
                target.call(&values);
            }
        }
    })
}

// =============================================================================
// TESTS
// =============================================================================
