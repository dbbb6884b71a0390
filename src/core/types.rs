// ============================================================================
// spark-emitter - Type Definitions
// Callback handles and identities shared by emitters and observables
// ============================================================================

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::uid::uid;
use super::value::Value;
use crate::primitives::event::EmitterEvent;

// =============================================================================
// IDENTITY-COMPARED CALLBACKS
// =============================================================================
//
// Callbacks are stored as Rc<dyn Fn ...> and compared by pointer, not by
// behaviour. Registering "the same" callback twice means cloning the handle;
// two separately constructed closures are always distinct, even if their
// bodies are identical.
// =============================================================================

/// Signature of an event callback.
pub type CallbackFn = dyn Fn(&mut EmitterEvent, &[Value]);

/// Signature of a binding target.
pub type TargetFn = dyn Fn(&[Value]);

/// An event callback registered with [`on`](crate::EmitterCapable::on) or
/// [`listen_to`](crate::EmitterCapable::listen_to).
///
/// Cloning shares the underlying closure, and clones compare equal. Keep a
/// clone around to unregister later.
///
/// # Example
///
/// ```
/// use spark_emitter::Callback;
///
/// let a = Callback::new(|_event, _args| {});
/// let b = a.clone();
/// let c = Callback::new(|_event, _args| {});
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Clone)]
pub struct Callback(Rc<CallbackFn>);

impl Callback {
    pub fn new(f: impl Fn(&mut EmitterEvent, &[Value]) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self, event: &mut EmitterEvent, args: &[Value]) {
        (self.0)(event, args)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", self.addr())
    }
}

/// A binding target: receives the current values of every declared
/// (source, property) pair, in declaration order.
///
/// Like [`Callback`], targets are compared by identity, which is what makes
/// [`unbind`](crate::Observable::unbind) and duplicate detection work.
#[derive(Clone)]
pub struct Target(Rc<TargetFn>);

impl Target {
    pub fn new(f: impl Fn(&[Value]) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, values: &[Value]) {
        (self.0)(values)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({:p})", self.addr())
    }
}

// =============================================================================
// EMITTER IDENTITY
// =============================================================================

/// Opaque identity of an emitter, used as the key of cross-object
/// subscription bookkeeping.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(Rc<str>);

impl EmitterId {
    /// Allocate a fresh identity.
    pub fn fresh() -> Self {
        Self(Rc::from(uid()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmitterId({})", self.0)
    }
}

impl fmt::Display for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
