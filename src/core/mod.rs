// ============================================================================
// spark-emitter - Core Module
// Values, callback handles, identities and dispatch context
// ============================================================================

pub mod constants;
pub mod context;
pub mod types;
pub mod uid;
pub mod value;

// Re-export commonly used items
pub use constants::{CHANGE_EVENT_PREFIX, change_event, changed_property};
pub use context::{DispatchContext, dispatch_depth, is_dispatching, with_context};
pub use types::{Callback, CallbackFn, EmitterId, Target, TargetFn};
pub use uid::uid;
pub use value::Value;
