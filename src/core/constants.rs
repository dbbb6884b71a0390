// ============================================================================
// spark-emitter - Constants
// Reserved event names
// ============================================================================

// =============================================================================
// CHANGE EVENTS
// =============================================================================

/// Prefix of the event fired when an observable property changes.
///
/// `set("foo", ..)` fires `change:foo` with `(new_value, old_value)`.
pub const CHANGE_EVENT_PREFIX: &str = "change:";

/// Separator between the prefix and the property name.
pub const CHANGE_EVENT_SEPARATOR: char = ':';

/// Build the change event name for `property`.
///
/// # Example
///
/// ```
/// use spark_emitter::change_event;
///
/// assert_eq!(change_event("foo"), "change:foo");
/// ```
pub fn change_event(property: &str) -> String {
    let mut name = String::with_capacity(CHANGE_EVENT_PREFIX.len() + property.len());
    name.push_str(CHANGE_EVENT_PREFIX);
    name.push_str(property);
    name
}

/// Extract the property name from a change event name.
pub fn changed_property(event: &str) -> Option<&str> {
    event.strip_prefix(CHANGE_EVENT_PREFIX)
}

// =============================================================================
// TESTS
// =============================================================================
