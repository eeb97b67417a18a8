//! The unit of work tracked by the chaining layer.
//!
//! A [`Job`] is the consumer half of a completion pair: it can be awaited
//! (yielding its [`Outcome`]) and cloned, with every clone observing the
//! same terminal state. The producer half is [`CompletionSource`], which
//! drives the first and only state transition.

use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use parking_lot::Mutex;

use crate::chain::outcome::{Fault, Outcome};

enum JobState<T> {
    Pending { wakers: Vec<Waker> },
    Done(Outcome<T>),
}

struct JobShared<T> {
    state: Mutex<JobState<T>>,
}

/// A future result in one of the terminal states `Completed`, `Faulted`,
/// or `Canceled`, reachable from an initial pending state.
///
/// Awaiting a job yields its [`Outcome`] without re-raising; callers that
/// want error propagation chain [`Outcome::into_result`] or go through
/// [`crate::chain::preserve_culture`].
pub struct Job<T> {
    shared: Arc<JobShared<T>>,
}

impl<T> Clone for Job<T> {
    fn clone(&self) -> Self {
        Job {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Job<T> {
    fn terminal(outcome: Outcome<T>) -> Self {
        Job {
            shared: Arc::new(JobShared {
                state: Mutex::new(JobState::Done(outcome)),
            }),
        }
    }

    /// An already-completed job holding `value`.
    ///
    /// The synchronous fast path: registering a continuation on the result
    /// behaves identically to registering on a job that completes later,
    /// including scheduler dispatch.
    pub fn from_result(value: T) -> Self {
        Self::terminal(Outcome::Completed(value))
    }

    /// An already-faulted job.
    pub fn faulted(error: impl Into<anyhow::Error>) -> Self {
        Self::terminal(Outcome::Faulted(Fault::new(error)))
    }

    /// An already-canceled job.
    pub fn canceled() -> Self {
        Self::terminal(Outcome::Canceled)
    }

    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(*self.shared.state.lock(), JobState::Done(_))
    }

    /// The outcome, if the job is already terminal.
    pub fn try_outcome(&self) -> Option<Outcome<T>>
    where
        T: Clone,
    {
        match &*self.shared.state.lock() {
            JobState::Done(outcome) => Some(outcome.clone()),
            JobState::Pending { .. } => None,
        }
    }
}

impl<T: Clone> Future for Job<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.state.lock();
        match &mut *state {
            JobState::Done(outcome) => Poll::Ready(outcome.clone()),
            JobState::Pending { wakers } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

/// Producer half of a [`Job`].
///
/// The first of `complete`/`fault`/`cancel` wins; later calls are ignored
/// and report `false`. Dropping a source whose job is still pending cancels
/// the job, so an abandoned producer never strands its consumers.
pub struct CompletionSource<T> {
    shared: Arc<JobShared<T>>,
}

impl<T> CompletionSource<T> {
    /// Create a pending job and the source that drives it.
    pub fn new() -> (CompletionSource<T>, Job<T>) {
        let shared = Arc::new(JobShared {
            state: Mutex::new(JobState::Pending { wakers: Vec::new() }),
        });
        (
            CompletionSource {
                shared: Arc::clone(&shared),
            },
            Job { shared },
        )
    }

    /// Transition the job to `Completed(value)`.
    pub fn complete(&self, value: T) -> bool {
        self.transition(Outcome::Completed(value))
    }

    /// Transition the job to `Faulted`.
    pub fn fault(&self, error: impl Into<anyhow::Error>) -> bool {
        self.transition(Outcome::Faulted(Fault::new(error)))
    }

    /// Transition the job to `Faulted` with an existing fault payload.
    pub fn fault_with(&self, fault: Fault) -> bool {
        self.transition(Outcome::Faulted(fault))
    }

    /// Transition the job to `Canceled`.
    pub fn cancel(&self) -> bool {
        self.transition(Outcome::Canceled)
    }

    fn transition(&self, outcome: Outcome<T>) -> bool {
        let transitioned = self.try_transition(outcome);
        if !transitioned {
            tracing::debug!("Completion ignored; job already terminal");
        }
        transitioned
    }

    fn try_transition(&self, outcome: Outcome<T>) -> bool {
        let wakers = {
            let mut state = self.shared.state.lock();
            match &mut *state {
                JobState::Done(_) => return false,
                JobState::Pending { wakers } => {
                    let wakers = mem::take(wakers);
                    *state = JobState::Done(outcome);
                    wakers
                }
            }
        };
        for waker in wakers {
            waker.wake();
        }
        true
    }
}

impl<T> Drop for CompletionSource<T> {
    fn drop(&mut self) {
        if self.try_transition(Outcome::Canceled) {
            tracing::trace!("Completion source dropped while pending; job canceled");
        }
    }
}
