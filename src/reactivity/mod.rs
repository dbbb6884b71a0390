// ============================================================================
// spark-emitter - Reactivity Module
// Change detection for observable properties
// ============================================================================

pub mod equality;

pub use equality::{EqualsFn, never_equals, same_value_equals, strict_equals};
