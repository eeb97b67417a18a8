pub mod chain;
pub mod culture;

pub use chain::{
    delay, preserve_culture, ChainError, CompletionSource, Fault, Job, Outcome,
    PreserveCultureExt, Preserved,
};
pub use culture::{CultureGuard, CultureSnapshot, Locale, LocaleContext};
