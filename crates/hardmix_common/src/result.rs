//! Common result and error types for hardmix.

/// The result type for operations that can only fail through an internal bug.
pub type HardmixResult<T> = Result<T, InternalError>;

/// An internal error: a broken invariant inside hardmix, not bad input.
///
/// Bad architecture data or configuration is reported through the typed
/// errors of each crate. This one exists for states that valid input can
/// never reach, such as an [`Ident`](crate::Ident) that does not belong to
/// the architecture's interner.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
