// ============================================================================
// spark-emitter - Primitives Module
// Emitter, dispatch events, observables and bindings
// ============================================================================

pub mod bind;
pub mod emitter;
pub mod event;
pub mod observable;

// Re-export for convenience
pub use bind::{BindArg, Binder};
pub use emitter::{Emitter, EmitterCapable};
pub use event::EmitterEvent;
pub use observable::{Observable, ObservableOptions, Property};
