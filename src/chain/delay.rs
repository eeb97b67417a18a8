//! Timer-driven jobs with no locale inheritance.

use std::time::Duration;

use crate::chain::job::{CompletionSource, Job};

/// A job that completes at least `duration` after the call, driven by the
/// runtime timer.
///
/// Deliberately captures no [`crate::culture::CultureSnapshot`]: the
/// completion callback and anything chained through the plain
/// [`Job::continue_with`] observe the executing worker's own ambient
/// context, not the caller's. Periodic and background work must not
/// inherit whatever locale the scheduling code happened to carry;
/// preservation is opt-in per link via [`Job::then`] or
/// [`crate::chain::preserve_culture`].
pub fn delay(duration: Duration) -> Job<()> {
    let (source, job) = CompletionSource::new();
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        source.complete(());
    });
    job
}
