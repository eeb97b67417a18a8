//! Snapshot and scoped restore of the ambient locale context.
//!
//! `CultureSnapshot` is captured on the thread that registers a
//! continuation and applied on whichever pool thread eventually runs it.
//! Restoration is driven by [`CultureGuard`]'s `Drop`, so the bracket holds
//! on every exit path, including unwinds out of the continuation body.

use std::marker::PhantomData;

use crate::culture::LocaleContext;

/// An immutable capture of a thread's ambient [`LocaleContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CultureSnapshot {
    context: LocaleContext,
}

impl CultureSnapshot {
    /// Capture the calling thread's current ambient context.
    pub fn capture() -> Self {
        Self {
            context: LocaleContext::current(),
        }
    }

    /// A snapshot of an explicit context rather than the ambient one.
    pub fn of(context: LocaleContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &LocaleContext {
        &self.context
    }

    /// Set the calling thread's ambient context to this snapshot.
    pub fn apply(&self) {
        LocaleContext::set_current(self.context.clone());
    }

    /// Apply this snapshot and return a guard that restores the thread's
    /// prior context when dropped.
    #[must_use = "dropping the guard immediately restores the prior context"]
    pub fn applied(&self) -> CultureGuard {
        let prior = LocaleContext::current();
        self.apply();
        CultureGuard {
            prior: Some(prior),
            _not_send: PhantomData,
        }
    }

    /// Run `body` with this snapshot applied, restoring the thread's prior
    /// context on the way out. A panic from `body` propagates after the
    /// restore has happened.
    pub fn with_applied<R>(&self, body: impl FnOnce() -> R) -> R {
        let _restore = self.applied();
        body()
    }
}

/// Restores the context recorded at [`CultureSnapshot::applied`] time when
/// dropped. Not `Send`: the restore must happen on the thread that was
/// modified.
pub struct CultureGuard {
    prior: Option<LocaleContext>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for CultureGuard {
    fn drop(&mut self) {
        if let Some(prior) = self.prior.take() {
            LocaleContext::set_current(prior);
        }
    }
}
