//! A [`TerminationCondition`] is polled by the search while it runs. It indicates when the search
//! should give up, even though neither a model nor a refutation has been found. The most common
//! example is [`TimeBudget`], which gives the search a fixed amount of wall-clock time.
//!
//! Besides the conditions polled by the search, the [`Engine`](crate::Engine) itself checks a
//! [`CancellationToken`] at the top of the propagation loop and before every decision. The token
//! can be set from another thread, e.g. by a signal handler.

mod cancellation_token;
mod combinator;
mod decision_budget;
mod indefinite;
mod time_budget;

pub use cancellation_token::CancellationToken;
pub use combinator::Combinator;
pub use decision_budget::DecisionBudget;
pub use indefinite::Indefinite;
pub use time_budget::TimeBudget;

/// The central trait that defines a termination condition. A termination condition determines when
/// the search should give up.
pub trait TerminationCondition {
    /// Returns `true` when the search should stop, `false` otherwise.
    fn should_stop(&mut self) -> bool;
    fn decision_has_been_made(&mut self) {}
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        match self {
            Some(t) => t.should_stop(),
            None => false,
        }
    }

    fn decision_has_been_made(&mut self) {
        if let Some(t) = self {
            t.decision_has_been_made()
        }
    }
}
