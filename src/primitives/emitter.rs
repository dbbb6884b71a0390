// ============================================================================
// spark-emitter - Emitter
// Named-event subscription lists, cross-object bookkeeping and dispatch
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::core::context::{DispatchGuard, with_context};
use crate::core::types::{Callback, EmitterId};
use crate::core::value::Value;
use crate::primitives::event::EmitterEvent;

// =============================================================================
// INTERNAL STORAGE
// =============================================================================
//
// Every listen_to creates one registration, identified by a thread-unique id.
// The registration lives in two places:
//
// - the remote's `events[name]` list (what actually runs on fire)
// - the listener's `subscribed_to[remote]` list (what stop_listening walks)
//
// Both sides are always added and removed together. The listener side holds
// only a weak reference to the remote, and the remote side only a weak
// reference to the listener, so the bookkeeping never keeps anything alive.
// =============================================================================

/// An entry of a remote's event list.
#[derive(Clone)]
struct Registration {
    id: u64,
    callback: Callback,
    listener: Weak<EmitterInner>,
}

/// An entry of a listener's bookkeeping for one remote.
struct Subscription {
    id: u64,
    event: Rc<str>,
    callback: Callback,
}

struct RemoteEntry {
    remote: Weak<EmitterInner>,
    subscriptions: Vec<Subscription>,
}

struct EmitterInner {
    id: EmitterId,
    events: RefCell<HashMap<Rc<str>, Vec<Registration>>>,
    subscribed_to: RefCell<HashMap<EmitterId, RemoteEntry>>,
}

impl EmitterInner {
    /// Remove the registration with `id` from `events[name]`.
    ///
    /// The removed registration is returned rather than dropped in place:
    /// dropping a callback can drop the last handle of another emitter, whose
    /// own teardown may need to borrow this event map.
    fn remove_registration(&self, name: &str, id: u64) -> Option<Registration> {
        let mut events = self.events.borrow_mut();
        let list = events.get_mut(name)?;
        let pos = list.iter().position(|reg| reg.id == id)?;
        let removed = list.remove(pos);
        if list.is_empty() {
            events.remove(name);
        }
        Some(removed)
    }

    /// Remove the bookkeeping entry for registration `id` on `remote`.
    fn remove_subscription(&self, remote: &EmitterId, id: u64) -> Option<Subscription> {
        let mut subscribed_to = self.subscribed_to.borrow_mut();
        let entry = subscribed_to.get_mut(remote)?;
        let pos = entry.subscriptions.iter().position(|sub| sub.id == id)?;
        let removed = entry.subscriptions.remove(pos);
        if entry.subscriptions.is_empty() {
            subscribed_to.remove(remote);
        }
        Some(removed)
    }

    fn listen_to(self: &Rc<Self>, remote: &Rc<EmitterInner>, name: &str, callback: Callback) {
        let id = with_context(|ctx| ctx.allocate_registration());
        let event: Rc<str> = Rc::from(name);

        remote
            .events
            .borrow_mut()
            .entry(event.clone())
            .or_default()
            .push(Registration {
                id,
                callback: callback.clone(),
                listener: Rc::downgrade(self),
            });

        self.subscribed_to
            .borrow_mut()
            .entry(remote.id.clone())
            .or_insert_with(|| RemoteEntry {
                remote: Rc::downgrade(remote),
                subscriptions: Vec::new(),
            })
            .subscriptions
            .push(Subscription { id, event, callback });

        debug!(listener = %self.id, remote = %remote.id, event = name, registration = id, "listen_to");
    }

    /// Most specific removal: first registration of `callback` for `name` on `remote`.
    fn stop_listening(&self, remote: &EmitterId, name: &str, callback: &Callback) {
        let removed = {
            let mut subscribed_to = self.subscribed_to.borrow_mut();
            let Some(entry) = subscribed_to.get_mut(remote) else {
                return;
            };
            let Some(pos) = entry
                .subscriptions
                .iter()
                .position(|sub| &*sub.event == name && &sub.callback == callback)
            else {
                return;
            };
            let removed = entry.subscriptions.remove(pos);
            let remote_inner = entry.remote.upgrade();
            if entry.subscriptions.is_empty() {
                subscribed_to.remove(remote);
            }
            (removed, remote_inner)
        };

        let (subscription, remote_inner) = removed;
        let registration = remote_inner
            .as_ref()
            .and_then(|inner| inner.remove_registration(name, subscription.id));

        debug!(listener = %self.id, remote = %remote, event = name, registration = subscription.id, "stop_listening");
        drop(registration);
    }

    /// Every callback registered for `name` on `remote`.
    fn stop_listening_event(&self, remote: &EmitterId, name: &str) {
        let callbacks: Vec<Callback> = match self.subscribed_to.borrow().get(remote) {
            Some(entry) => entry
                .subscriptions
                .iter()
                .filter(|sub| &*sub.event == name)
                .map(|sub| sub.callback.clone())
                .collect(),
            None => return,
        };
        for callback in &callbacks {
            self.stop_listening(remote, name, callback);
        }
    }

    /// Every subscription held on `remote`.
    fn stop_listening_to(&self, remote: &EmitterId) {
        let names: Vec<Rc<str>> = match self.subscribed_to.borrow().get(remote) {
            Some(entry) => {
                let mut names: Vec<Rc<str>> = Vec::new();
                for sub in &entry.subscriptions {
                    if !names.contains(&sub.event) {
                        names.push(sub.event.clone());
                    }
                }
                names
            }
            None => return,
        };
        for name in &names {
            self.stop_listening_event(remote, name);
        }
    }

    fn stop_listening_all(&self) {
        let remotes: Vec<EmitterId> = self.subscribed_to.borrow().keys().cloned().collect();
        for remote in &remotes {
            self.stop_listening_to(remote);
        }
    }

    fn fire(&self, name: &str, args: &[Value]) {
        let snapshot: Vec<Registration> = match self.events.borrow().get(name) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => return,
        };

        let guard = DispatchGuard::enter();
        trace!(emitter = %self.id, event = name, callbacks = snapshot.len(), depth = guard.depth, "fire");

        for registration in snapshot {
            let mut event = EmitterEvent::new(name);
            registration.callback.call(&mut event, args);

            if event.is_detached() {
                trace!(emitter = %self.id, event = name, registration = registration.id, "callback detached");
                self.detach(name, &registration);
            }
            if event.is_stopped() {
                trace!(emitter = %self.id, event = name, registration = registration.id, "dispatch stopped");
                break;
            }
        }
    }

    /// Drop a registration from both the live list and its listener's bookkeeping.
    fn detach(&self, name: &str, registration: &Registration) {
        let live = self.remove_registration(name, registration.id);
        let bookkeeping = registration
            .listener
            .upgrade()
            .and_then(|listener| listener.remove_subscription(&self.id, registration.id));
        drop((live, bookkeeping));
    }

    fn listener_count(&self, name: &str) -> usize {
        self.events.borrow().get(name).map_or(0, Vec::len)
    }

    fn is_subscribed(&self, remote: &EmitterId, name: &str, callback: &Callback) -> bool {
        self.subscribed_to.borrow().get(remote).is_some_and(|entry| {
            entry
                .subscriptions
                .iter()
                .any(|sub| &*sub.event == name && &sub.callback == callback)
        })
    }
}

impl Drop for EmitterInner {
    /// Withdraw this emitter's registrations from remotes that are still
    /// alive, and clear the bookkeeping that live listeners hold on it.
    fn drop(&mut self) {
        let registrations: Vec<Registration> = self
            .events
            .get_mut()
            .drain()
            .flat_map(|(_, list)| list)
            .collect();

        let mut released = Vec::new();
        for registration in &registrations {
            let Some(listener) = registration.listener.upgrade() else {
                continue;
            };
            let Ok(mut subscribed_to) = listener.subscribed_to.try_borrow_mut() else {
                continue;
            };
            if let Some(entry) = subscribed_to.get_mut(&self.id) {
                if let Some(pos) = entry.subscriptions.iter().position(|sub| sub.id == registration.id) {
                    released.push(entry.subscriptions.remove(pos));
                }
                if entry.subscriptions.is_empty() {
                    subscribed_to.remove(&self.id);
                }
            }
        }
        if !registrations.is_empty() {
            debug!(emitter = %self.id, registrations = registrations.len(), "dropped with live registrations");
        }
        drop(released);
        drop(registrations);

        let entries: Vec<RemoteEntry> = self
            .subscribed_to
            .get_mut()
            .drain()
            .map(|(_, entry)| entry)
            .collect();

        let mut removed = Vec::new();
        for entry in entries {
            let Some(remote) = entry.remote.upgrade() else {
                continue;
            };
            let Ok(mut events) = remote.events.try_borrow_mut() else {
                continue;
            };
            for sub in &entry.subscriptions {
                if let Some(list) = events.get_mut(&sub.event) {
                    if let Some(pos) = list.iter().position(|reg| reg.id == sub.id) {
                        removed.push(list.remove(pos));
                    }
                    if list.is_empty() {
                        events.remove(&sub.event);
                    }
                }
            }
        }
        drop(removed);
    }
}

// =============================================================================
// EMITTER - The public handle
// =============================================================================

/// A synchronous, single-threaded event emitter.
///
/// `Emitter` is a cheap handle: clones share the same subscription lists and
/// the same identity. All operations are provided by the [`EmitterCapable`]
/// trait, which any type embedding an `Emitter` can implement to acquire the
/// same surface.
///
/// When the last handle is dropped, every registration this emitter made on
/// other (still alive) emitters is withdrawn.
///
/// # Example
///
/// ```
/// use spark_emitter::{Callback, Emitter, EmitterCapable, Value};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let emitter = Emitter::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let log = Callback::new({
///     let seen = seen.clone();
///     move |_event, args| seen.borrow_mut().extend_from_slice(args)
/// });
/// emitter.on("x", log.clone());
///
/// emitter.fire("x", &[Value::from(1), Value::from("a")]);
/// assert_eq!(*seen.borrow(), vec![Value::from(1), Value::from("a")]);
///
/// emitter.off("x", &log);
/// emitter.fire("x", &[Value::from(2)]);
/// assert_eq!(seen.borrow().len(), 2);
/// ```
#[derive(Clone)]
pub struct Emitter {
    inner: Rc<EmitterInner>,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(EmitterInner {
                id: EmitterId::fresh(),
                events: RefCell::new(HashMap::new()),
                subscribed_to: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Identity of this emitter.
    pub fn id(&self) -> &EmitterId {
        &self.inner.id
    }

    /// Whether two handles refer to the same emitter.
    pub fn ptr_eq(&self, other: &Emitter) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// [`EmitterCapable::stop_listening`] for a remote known only by id,
    /// which also works after the remote was dropped.
    pub(crate) fn stop_listening_id(&self, remote: &EmitterId, name: &str, callback: &Callback) {
        self.inner.stop_listening(remote, name, callback);
    }

    /// Whether `callback` is still registered for `name` on `remote`.
    pub(crate) fn is_subscribed(&self, remote: &EmitterId, name: &str, callback: &Callback) -> bool {
        self.inner.is_subscribed(remote, name, callback)
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("id", &self.inner.id)
            .field("events", &self.inner.events.borrow().len())
            .field("subscribed_to", &self.inner.subscribed_to.borrow().len())
            .finish()
    }
}

// =============================================================================
// EMITTER CAPABILITY
// =============================================================================

/// The emitter surface, acquired by embedding an [`Emitter`].
///
/// Implementors only provide [`emitter`](Self::emitter); every other method
/// forwards to it.
///
/// # Example
///
/// ```
/// use spark_emitter::{Callback, Emitter, EmitterCapable};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// struct Door {
///     events: Emitter,
/// }
///
/// impl EmitterCapable for Door {
///     fn emitter(&self) -> &Emitter {
///         &self.events
///     }
/// }
///
/// let door = Door { events: Emitter::new() };
/// let opened = Rc::new(Cell::new(0));
/// door.on("open", Callback::new({
///     let opened = opened.clone();
///     move |_, _| opened.set(opened.get() + 1)
/// }));
///
/// door.fire("open", &[]);
/// assert_eq!(opened.get(), 1);
/// ```
pub trait EmitterCapable {
    /// The embedded emitter all calls are delegated to.
    fn emitter(&self) -> &Emitter;

    /// Register `callback` for this instance's own `name` events.
    fn on(&self, name: &str, callback: Callback) {
        let inner = &self.emitter().inner;
        inner.listen_to(inner, name, callback);
    }

    /// Remove one registration of `callback` for `name`. No-op if absent.
    fn off(&self, name: &str, callback: &Callback) {
        let inner = &self.emitter().inner;
        inner.stop_listening(&inner.id, name, callback);
    }

    /// Invoke every callback registered for `name`, in registration order.
    ///
    /// Callbacks run against a snapshot of the list, so registrations added
    /// during the dispatch wait for the next `fire`, and registrations removed
    /// during the dispatch still run this time.
    fn fire(&self, name: &str, args: &[Value]) {
        self.emitter().inner.fire(name, args);
    }

    /// Register `callback` on `remote` and remember it for bulk removal.
    ///
    /// The same callback may be registered any number of times; every
    /// registration is independent.
    fn listen_to<R>(&self, remote: &R, name: &str, callback: Callback)
    where
        R: EmitterCapable + ?Sized,
    {
        self.emitter()
            .inner
            .listen_to(&remote.emitter().inner, name, callback);
    }

    /// Remove the first registration of `callback` for `name` on `remote`.
    fn stop_listening<R>(&self, remote: &R, name: &str, callback: &Callback)
    where
        R: EmitterCapable + ?Sized,
    {
        self.emitter()
            .inner
            .stop_listening(remote.emitter().id(), name, callback);
    }

    /// Remove every callback this instance registered for `name` on `remote`.
    fn stop_listening_event<R>(&self, remote: &R, name: &str)
    where
        R: EmitterCapable + ?Sized,
    {
        self.emitter()
            .inner
            .stop_listening_event(remote.emitter().id(), name);
    }

    /// Remove every subscription this instance holds on `remote`.
    fn stop_listening_to<R>(&self, remote: &R)
    where
        R: EmitterCapable + ?Sized,
    {
        self.emitter().inner.stop_listening_to(remote.emitter().id());
    }

    /// Remove every subscription this instance holds, on every emitter.
    fn stop_listening_all(&self) {
        self.emitter().inner.stop_listening_all();
    }

    /// Number of registrations for `name` on this instance.
    fn listener_count(&self, name: &str) -> usize {
        self.emitter().inner.listener_count(name)
    }

    fn has_listeners(&self, name: &str) -> bool {
        self.listener_count(name) > 0
    }

    /// Number of registrations this instance holds on `remote`.
    fn subscription_count<R>(&self, remote: &R) -> usize
    where
        R: EmitterCapable + ?Sized,
    {
        self.emitter()
            .inner
            .subscribed_to
            .borrow()
            .get(remote.emitter().id())
            .map_or(0, |entry| entry.subscriptions.len())
    }
}

impl EmitterCapable for Emitter {
    fn emitter(&self) -> &Emitter {
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
