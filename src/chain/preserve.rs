//! Locale preservation across await-style suspension.
//!
//! [`Preserved`] is the await-side counterpart of [`Job::then`]: it captures
//! a [`CultureSnapshot`] when constructed and brackets every poll of the
//! wrapped future with apply/restore, so the resumption body after each
//! inner await observes the captured context and the polling worker gets
//! its own context back before control returns to the scheduler. In a
//! poll-based model the resumption is the remainder of the enclosing poll,
//! so the wrapper goes around the future that contains the resumption code;
//! [`preserve_culture`] is the job-shaped entry point that additionally
//! re-raises a faulted or canceled outcome at the resumption point.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::chain::job::Job;
use crate::chain::outcome::ChainError;
use crate::culture::CultureSnapshot;

/// A future whose every poll runs under the locale context captured at
/// construction time.
///
/// Brackets nest without accumulation: each layer restores exactly the
/// context it found on poll entry, whether the inner poll returns, yields,
/// or unwinds.
pub struct Preserved<F> {
    snapshot: CultureSnapshot,
    inner: Pin<Box<F>>,
}

impl<F: Future> Preserved<F> {
    /// Wrap `inner`, capturing the calling thread's current context.
    pub fn new(inner: F) -> Self {
        Self::with_snapshot(inner, CultureSnapshot::capture())
    }

    /// Wrap `inner` with an explicit snapshot instead of the ambient one.
    pub fn with_snapshot(inner: F, snapshot: CultureSnapshot) -> Self {
        Self {
            snapshot,
            inner: Box::pin(inner),
        }
    }

    pub fn snapshot(&self) -> &CultureSnapshot {
        &self.snapshot
    }
}

impl<F: Future> Future for Preserved<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Boxed inner keeps `Preserved` itself `Unpin`.
        let this = self.get_mut();
        let _applied = this.snapshot.applied();
        this.inner.as_mut().poll(cx)
    }
}

/// Extension wrapping any future in [`Preserved`].
pub trait PreserveCultureExt: Future + Sized {
    /// Run every poll of `self` under the locale context current at the
    /// time of this call.
    fn preserve_culture(self) -> Preserved<Self> {
        Preserved::new(self)
    }
}

impl<F: Future> PreserveCultureExt for F {}

/// Await `job` under the locale context current at the time of this call,
/// re-raising a faulted or canceled outcome as [`ChainError`] at the
/// resumption point.
pub fn preserve_culture<T>(
    job: Job<T>,
) -> Preserved<impl Future<Output = Result<T, ChainError>>>
where
    T: Clone,
{
    Preserved::new(async move { job.await.into_result() })
}

impl<T: Clone> Job<T> {
    /// Await this job under the caller's current locale context; see
    /// [`preserve_culture`].
    pub fn preserve_culture(self) -> Preserved<impl Future<Output = Result<T, ChainError>>> {
        preserve_culture(self)
    }
}
