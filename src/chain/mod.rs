//! Continuation chaining with ambient locale propagation.
//!
//! The dispatch layer of the Relay server schedules continuations on a
//! shared worker pool; this module guarantees that a continuation observes
//! the locale context of the thread that registered it, not of the worker
//! that happens to run it. Propagation is opt-in per link: [`Job::then`]
//! and [`preserve_culture`] carry the caller's context, [`Job::continue_with`]
//! and [`delay`] do not.

mod combinators;
mod delay;
mod job;
mod outcome;
mod preserve;

pub use delay::delay;
pub use job::{CompletionSource, Job};
pub use outcome::{ChainError, Fault, Outcome};
pub use preserve::{preserve_culture, PreserveCultureExt, Preserved};
