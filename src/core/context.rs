// ============================================================================
// spark-emitter - Dispatch Context
// Thread-local state shared by every emitter on the thread
// ============================================================================

use std::cell::Cell;

// =============================================================================
// DISPATCH CONTEXT
// =============================================================================

/// Thread-local context holding the global counters used by dispatch.
pub struct DispatchContext {
    /// Source of registration ids, unique per thread
    pub next_registration: Cell<u64>,

    /// Number of `fire` calls currently on the stack
    pub depth: Cell<u32>,
}

impl DispatchContext {
    pub fn new() -> Self {
        Self {
            next_registration: Cell::new(1),
            depth: Cell::new(0),
        }
    }

    /// Allocate the next registration id. Wraps after `u64::MAX`.
    pub fn allocate_registration(&self) -> u64 {
        let id = self.next_registration.get();
        self.next_registration.set(id.wrapping_add(1));
        id
    }

    /// Enter a dispatch, returning the new depth
    pub fn enter(&self) -> u32 {
        let depth = self.depth.get().saturating_add(1);
        self.depth.set(depth);
        depth
    }

    pub fn exit(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static CONTEXT: DispatchContext = DispatchContext::new();
}

/// Access the thread-local dispatch context.
pub fn with_context<R>(f: impl FnOnce(&DispatchContext) -> R) -> R {
    CONTEXT.with(f)
}

/// Current nesting depth of `fire` calls on this thread.
pub fn dispatch_depth() -> u32 {
    with_context(|ctx| ctx.depth.get())
}

/// Whether a dispatch is in progress on this thread.
pub fn is_dispatching() -> bool {
    dispatch_depth() > 0
}

// =============================================================================
// DISPATCH GUARD
// =============================================================================

/// Keeps the depth counter balanced even if a callback panics.
pub(crate) struct DispatchGuard {
    pub depth: u32,
}

impl DispatchGuard {
    pub fn enter() -> Self {
        Self {
            depth: with_context(|ctx| ctx.enter()),
        }
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        with_context(|ctx| ctx.exit());
    }
}
