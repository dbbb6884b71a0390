// ============================================================================
// spark-emitter - Identifier Generator
// ============================================================================

use std::cell::RefCell;

use ulid::{Generator, Ulid};

thread_local! {
    static GENERATOR: RefCell<Generator> = const { RefCell::new(Generator::new()) };
}

/// Generate a fresh opaque identifier.
///
/// Identifiers are ULIDs drawn from a per-thread monotonic generator, so two
/// calls on the same thread never return the same token.
///
/// # Example
///
/// ```
/// use spark_emitter::uid;
///
/// assert_ne!(uid(), uid());
/// assert_eq!(uid().len(), 26);
/// ```
pub fn uid() -> String {
    GENERATOR
        .with(|generator| generator.borrow_mut().generate())
        // The monotonic counter only overflows after 2^80 ids in one millisecond
        .unwrap_or_else(|_| Ulid::new())
        .to_string()
}
