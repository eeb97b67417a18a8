//! Terminal states of a unit of work and the errors they raise.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A cheaply cloneable fault payload.
///
/// One fault fans out to every clone of a [`crate::chain::Job`] and every
/// continuation registered on it, so the underlying error is shared rather
/// than copied.
#[derive(Clone)]
pub struct Fault(Arc<anyhow::Error>);

impl Fault {
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Fault(Arc::new(error.into()))
    }

    /// Wrap a panic payload captured from a continuation body.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "continuation panicked".to_string());
        Fault(Arc::new(anyhow::anyhow!("{message}")))
    }

    pub fn error(&self) -> &anyhow::Error {
        &self.0
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Error raised when a faulted or canceled outcome is re-raised at an await
/// point, by [`Outcome::into_result`] or [`crate::chain::preserve_culture`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    /// The antecedent task faulted.
    #[error("chained task faulted: {0}")]
    Faulted(#[source] Fault),

    /// The antecedent task was canceled.
    #[error("chained task was canceled")]
    Canceled,
}

/// The terminal state of a unit of work.
///
/// Continuations registered through [`crate::chain::Job::then`] and
/// [`crate::chain::Job::continue_with_preserved_culture`] receive the
/// outcome verbatim, whichever variant it is; the chaining layer never
/// converts between them.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The work produced a value.
    Completed(T),
    /// The work failed with an error.
    Faulted(Fault),
    /// The work was abandoned before producing a value.
    Canceled,
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, Outcome::Faulted(_))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Outcome::Canceled)
    }

    /// The completed value, if any.
    pub fn completed(&self) -> Option<&T> {
        match self {
            Outcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// Re-raise this outcome: `Completed` becomes `Ok`, the other two
    /// terminal states become the matching [`ChainError`].
    pub fn into_result(self) -> Result<T, ChainError> {
        match self {
            Outcome::Completed(value) => Ok(value),
            Outcome::Faulted(fault) => Err(ChainError::Faulted(fault)),
            Outcome::Canceled => Err(ChainError::Canceled),
        }
    }

    /// Map the completed value, leaving fault and cancellation untouched.
    pub fn map<R>(self, f: impl FnOnce(T) -> R) -> Outcome<R> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Faulted(fault) => Outcome::Faulted(fault),
            Outcome::Canceled => Outcome::Canceled,
        }
    }
}

impl PartialEq for Fault {
    /// Faults compare by shared identity; two independently constructed
    /// faults are never equal.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
