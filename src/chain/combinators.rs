//! Continuation registration with locale preservation.
//!
//! Registering a continuation captures a [`CultureSnapshot`] on the calling
//! thread and closes it over the continuation; when the antecedent job
//! reaches a terminal state the continuation runs on whatever worker the
//! runtime picked, bracketed by apply/restore of that snapshot. The bracket
//! is identical for completed, faulted, and canceled antecedents, and for
//! antecedents that were already terminal at registration time.

use std::panic::{self, AssertUnwindSafe};

use crate::chain::job::{CompletionSource, Job};
use crate::chain::outcome::{Fault, Outcome};
use crate::culture::CultureSnapshot;

impl<T: Clone + Send + 'static> Job<T> {
    /// Register `f` to run after this job reaches any terminal state.
    ///
    /// `f` receives the antecedent's [`Outcome`] verbatim and runs with the
    /// registering thread's locale context applied; the worker's prior
    /// context is restored when `f` returns or panics. The returned job
    /// completes with `f`'s value, or faults if `f` panics.
    ///
    /// Dispatch always goes through the runtime, even when this job is
    /// already terminal, so registration timing never changes where or how
    /// the continuation runs.
    pub fn then<R, F>(self, f: F) -> Job<R>
    where
        R: Send + 'static,
        F: FnOnce(Outcome<T>) -> R + Send + 'static,
    {
        let snapshot = CultureSnapshot::capture();
        self.dispatch(move |outcome| snapshot.with_applied(|| f(outcome)))
    }

    /// Register `f` to run after this job reaches any terminal state, for
    /// callers that branch on the completed antecedent.
    ///
    /// Identical preservation and triggering semantics to [`Job::then`]:
    /// the continuation runs for completed, faulted, and canceled
    /// antecedents alike, under the snapshot captured here.
    pub fn continue_with_preserved_culture<R, F>(self, f: F) -> Job<R>
    where
        R: Send + 'static,
        F: FnOnce(Outcome<T>) -> R + Send + 'static,
    {
        self.then(f)
    }

    /// Register `f` without capturing a locale snapshot.
    ///
    /// The continuation observes whatever ambient context the executing
    /// worker thread already carries, which for an untouched pool thread is
    /// the process default. This is the non-preserving registration used
    /// for background work chained off [`crate::chain::delay`].
    pub fn continue_with<R, F>(self, f: F) -> Job<R>
    where
        R: Send + 'static,
        F: FnOnce(Outcome<T>) -> R + Send + 'static,
    {
        self.dispatch(f)
    }

    /// Await the antecedent on a spawned task and run `body` with its
    /// outcome, converting a panic into a fault on the returned job.
    fn dispatch<R, F>(self, body: F) -> Job<R>
    where
        R: Send + 'static,
        F: FnOnce(Outcome<T>) -> R + Send + 'static,
    {
        let (source, job) = CompletionSource::new();
        tokio::spawn(async move {
            let outcome = self.await;
            match panic::catch_unwind(AssertUnwindSafe(|| body(outcome))) {
                Ok(value) => {
                    source.complete(value);
                }
                Err(payload) => {
                    let fault = Fault::from_panic(payload);
                    tracing::warn!(error = %fault, "Continuation panicked; faulting chained job");
                    source.fault_with(fault);
                }
            }
        });
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::{self, LocaleContext};

    fn zh() -> LocaleContext {
        LocaleContext::new("zh-Hans", "zh-CN")
    }

    #[tokio::test]
    async fn test_then_applies_the_registration_snapshot() {
        culture::set_process_default(LocaleContext::default());
        LocaleContext::set_current(zh());

        let chained = Job::from_result(()).then(|_| LocaleContext::current());

        assert_eq!(chained.await, Outcome::Completed(zh()));
    }

    #[tokio::test]
    async fn test_continuation_restores_the_workers_prior_context() {
        // Single-threaded runtime: the continuation runs on this thread, so
        // its pre-apply context is observable before and after.
        culture::set_process_default(LocaleContext::default());
        LocaleContext::set_current(zh());

        let (source, job) = CompletionSource::new();
        let chained = job.then(|_| LocaleContext::current());

        // The worker's own context changes after registration; the
        // continuation must still observe the snapshot and put this back.
        LocaleContext::set_current(LocaleContext::uniform("fr-FR"));
        source.complete(());

        assert_eq!(chained.await, Outcome::Completed(zh()));
        assert_eq!(LocaleContext::current(), LocaleContext::uniform("fr-FR"));
    }

    #[tokio::test]
    async fn test_continuation_runs_for_faulted_and_canceled_antecedents() {
        culture::set_process_default(LocaleContext::default());
        LocaleContext::set_current(zh());

        let on_fault = Job::<()>::faulted(anyhow::anyhow!("boom"))
            .continue_with_preserved_culture(|outcome| {
                (outcome.is_faulted(), LocaleContext::current())
            });
        let on_cancel = Job::<()>::canceled()
            .continue_with_preserved_culture(|outcome| {
                (outcome.is_canceled(), LocaleContext::current())
            });

        assert_eq!(on_fault.await, Outcome::Completed((true, zh())));
        assert_eq!(on_cancel.await, Outcome::Completed((true, zh())));
    }

    #[tokio::test]
    async fn test_panicking_continuation_faults_the_chained_job() {
        culture::set_process_default(LocaleContext::default());
        LocaleContext::set_current(zh());

        let chained = Job::from_result(()).then(|_| -> () { panic!("formatting blew up") });
        let outcome = chained.await;

        match outcome {
            Outcome::Faulted(fault) => assert_eq!(fault.to_string(), "formatting blew up"),
            other => panic!("expected fault, got {other:?}"),
        }
        // The panic unwound through the guard: this thread kept its context.
        assert_eq!(LocaleContext::current(), zh());
    }

    #[tokio::test]
    async fn test_continue_with_does_not_capture_a_snapshot() {
        // Register while zh is applied in a bounded scope; by the time the
        // pending antecedent completes the scope is gone, so the plain
        // continuation sees the worker's own (default) context.
        culture::set_process_default(LocaleContext::default());

        let (source, job) = CompletionSource::new();
        let snapshot = crate::culture::CultureSnapshot::of(zh());
        let chained = snapshot.with_applied(|| job.continue_with(|_| LocaleContext::current()));

        source.complete(());
        assert_eq!(chained.await, Outcome::Completed(LocaleContext::default()));
    }
}
