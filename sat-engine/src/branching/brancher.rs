use crate::basic_types::Literal;
use crate::engine::EngineListener;
use crate::engine::Trail;

/// A strategy for picking the next decision.
///
/// The brancher does not assert the decision itself; it returns the literal and the caller hands
/// it to [`Engine::assert_decision`](crate::Engine::assert_decision).
pub trait Brancher: EngineListener {
    /// Returns an unassigned literal to decide on, or [`None`] if every variable is assigned.
    fn next_decision(&mut self, trail: &Trail) -> Option<Literal>;
}
