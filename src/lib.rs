// ============================================================================
// spark-emitter - Event Emitters and Observable Properties for Rust
// ============================================================================
//
// Synchronous, single-threaded publish/subscribe with cross-object
// subscription bookkeeping, plus observables whose property writes fire
// `change:<name>` and drive one-way bindings.
// ============================================================================

//! Synchronous event emitters and observable properties.
//!
//! - [`Emitter`]: named events, registration-ordered dispatch, and
//!   bookkeeping of every subscription an emitter holds on others so it can
//!   drop them in bulk.
//! - [`Observable`]: an emitter with properties; writes fire
//!   `change:<name>` with `(new, old)`.
//! - Bindings: [`Observable::bind`] attaches a [`Target`] to any number of
//!   (observable, property) pairs and re-invokes it with all current values
//!   whenever one of them changes.
//!
//! ```
//! use spark_emitter::{sources, Observable, Target, Value};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let first = Observable::new();
//! let last = Observable::new();
//! first.set("name", "Ada");
//! last.set("name", "Lovelace");
//!
//! let label = Rc::new(RefCell::new(String::new()));
//! let render = Target::new({
//!     let label = label.clone();
//!     move |values| {
//!         let parts: Vec<&str> = values.iter().filter_map(Value::as_str).collect();
//!         *label.borrow_mut() = parts.join(" ");
//!     }
//! });
//!
//! let view = Observable::new();
//! view.bind(&render).unwrap().to(&sources![&first, "name", &last, "name"]).unwrap();
//! assert_eq!(*label.borrow(), "Ada Lovelace");
//!
//! first.set("name", "Augusta");
//! assert_eq!(*label.borrow(), "Augusta Lovelace");
//! ```

#[macro_use]
mod macros;

pub mod core;
pub mod error;
pub mod primitives;
pub mod reactivity;

// Re-export core items at crate root for ergonomic access
pub use core::constants::{CHANGE_EVENT_PREFIX, change_event, changed_property};
pub use core::context::{dispatch_depth, is_dispatching};
pub use core::types::{Callback, EmitterId, Target};
pub use core::uid::uid;
pub use core::value::Value;

pub use error::BindError;

pub use primitives::bind::{BindArg, Binder};
pub use primitives::emitter::{Emitter, EmitterCapable};
pub use primitives::event::EmitterEvent;
pub use primitives::observable::{Observable, ObservableOptions, Property};

pub use reactivity::equality::{EqualsFn, never_equals, same_value_equals, strict_equals};

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn dispatch_depth_tracks_nested_fire() {
        let emitter = Emitter::new();
        let depths = Rc::new(RefCell::new(Vec::new()));
        emitter.on("outer", Callback::new(cloned!(emitter, depths => move |_, _| {
            depths.borrow_mut().push(dispatch_depth());
            emitter.fire("inner", &[]);
        })));
        emitter.on("inner", Callback::new(cloned!(depths => move |_, _| {
            depths.borrow_mut().push(dispatch_depth());
        })));

        assert!(!is_dispatching());
        emitter.fire("outer", &[]);
        assert_eq!(*depths.borrow(), vec![1, 2]);
        assert!(!is_dispatching());
    }

    #[test]
    fn observable_exposes_full_emitter_surface() {
        let obs = Observable::new();
        let other = Emitter::new();
        let count = Rc::new(Cell::new(0));
        let spy = Callback::new(cloned!(count => move |_, _| count.set(count.get() + 1)));

        obs.on("custom", spy.clone());
        obs.listen_to(&other, "ping", spy.clone());
        obs.fire("custom", &[]);
        other.fire("ping", &[]);
        assert_eq!(count.get(), 2);

        obs.off("custom", &spy);
        obs.stop_listening(&other, "ping", &spy);
        obs.fire("custom", &[]);
        other.fire("ping", &[]);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn change_events_use_reserved_prefix() {
        let obs = Observable::new();
        let names = Rc::new(RefCell::new(Vec::new()));
        for property in ["a", "b"] {
            obs.on(&change_event(property), Callback::new(cloned!(names => move |event, _| {
                names.borrow_mut().push(changed_property(event.name()).map(str::to_string));
            })));
        }

        obs.set("a", 1);
        obs.set("b", 1);
        assert_eq!(
            *names.borrow(),
            vec![Some("a".to_string()), Some("b".to_string())]
        );
    }

    #[test]
    fn operations_run_under_a_tracing_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let source = Observable::new();
            let view = Observable::new();
            let target = Target::new(|_| {});

            view.bind(&target).unwrap().to_pairs(&[(&source, "p")]).unwrap();
            source.set("p", 1);
            view.unbind(&target);
            source.set("p", 2);

            assert_eq!(view.listened_pair_count(), 0);
        });
    }

    #[test]
    fn emitter_ids_come_from_uid() {
        let emitter = Emitter::new();
        assert_eq!(emitter.id().as_str().len(), uid().len());
        assert_ne!(emitter.id(), Emitter::new().id());
    }
}
