// ============================================================================
// spark-emitter - Emitter Event
// The per-callback control token handed out during dispatch
// ============================================================================

/// Token passed to every callback invoked by [`Emitter::fire`](crate::Emitter::fire).
///
/// A fresh event is created for each callback in a dispatch. The two control
/// signals only influence the dispatch that created the event:
///
/// - [`stop`](Self::stop): no further callbacks run for this `fire` call.
/// - [`off`](Self::off): this registration is removed once the callback
///   returns, so it will not run on later `fire` calls.
///
/// # Example
///
/// ```
/// use spark_emitter::{Callback, Emitter, EmitterCapable};
///
/// let emitter = Emitter::new();
/// emitter.on("tick", Callback::new(|event, _args| {
///     assert_eq!(event.name(), "tick");
///     event.off();
/// }));
///
/// emitter.fire("tick", &[]);
/// assert_eq!(emitter.listener_count("tick"), 0);
/// ```
#[derive(Debug)]
pub struct EmitterEvent {
    name: String,
    stopped: bool,
    detached: bool,
}

impl EmitterEvent {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stopped: false,
            detached: false,
        }
    }

    /// Name of the event being dispatched.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Halt the dispatch after the current callback returns.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Unregister the current callback after it returns.
    pub fn off(&mut self) {
        self.detached = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}
