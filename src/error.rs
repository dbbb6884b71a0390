// ============================================================================
// spark-emitter - Errors
// ============================================================================

use thiserror::Error;

/// Errors raised while declaring a binding.
///
/// Removal operations (`off`, `stop_listening*`, `unbind`) never fail, and
/// neither does firing an event nobody listens to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The argument list given to [`Binder::to`](crate::Binder::to) is not a
    /// sequence of (observable, property name) pairs.
    #[error("invalid source definition: {reason}")]
    InvalidSourceDefinition { reason: String },

    /// The target callback is already bound; unbind it first.
    #[error("target callback is already bound")]
    DuplicateBinding,
}

impl BindError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        BindError::InvalidSourceDefinition {
            reason: reason.into(),
        }
    }
}
