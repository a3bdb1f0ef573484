use std::fmt::Display;

use crate::sat_assert_simple;

/// The observable state of an [`Engine`](crate::Engine).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SolverState {
    /// Idle and ready to accept decisions, clauses and restarts.
    #[default]
    Unknown,
    /// A clause is false on the trail. The engine stays in this state until the caller
    /// backjumps and returns it to [`SolverState::Unknown`].
    Conflict,
    /// Every variable is assigned and no clause is violated.
    Satisfiable,
    /// The empty clause was derived.
    Unsatisfiable,
}

impl SolverState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SolverState::Satisfiable | SolverState::Unsatisfiable
        )
    }
}

impl Display for SolverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverState::Unknown => write!(f, "UNKNOWN"),
            SolverState::Conflict => write!(f, "CONFLICT"),
            SolverState::Satisfiable => write!(f, "SATISFIABLE"),
            SolverState::Unsatisfiable => write!(f, "UNSATISFIABLE"),
        }
    }
}

/// Guards the transitions between the [`SolverState`]s.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EngineState {
    internal_state: SolverState,
}

impl EngineState {
    pub(crate) fn get(&self) -> SolverState {
        self.internal_state
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.internal_state == SolverState::Unknown
    }

    pub(crate) fn is_conflicting(&self) -> bool {
        self.internal_state == SolverState::Conflict
    }

    pub(crate) fn is_infeasible(&self) -> bool {
        self.internal_state == SolverState::Unsatisfiable
    }

    pub(crate) fn declare_ready(&mut self) {
        sat_assert_simple!(
            !self.internal_state.is_terminal(),
            "cannot leave the terminal state {}",
            self.internal_state
        );
        self.internal_state = SolverState::Unknown;
    }

    pub(crate) fn declare_conflict(&mut self) {
        sat_assert_simple!(
            self.is_ready(),
            "a conflict can only be raised from the idle state, not from {}",
            self.internal_state
        );
        self.internal_state = SolverState::Conflict;
    }

    pub(crate) fn declare_infeasible(&mut self) {
        sat_assert_simple!(self.internal_state != SolverState::Satisfiable);
        self.internal_state = SolverState::Unsatisfiable;
    }

    pub(crate) fn declare_solution_found(&mut self) {
        sat_assert_simple!(
            self.is_ready(),
            "a solution can only be declared from the idle state, not from {}",
            self.internal_state
        );
        self.internal_state = SolverState::Satisfiable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_returns_to_idle() {
        let mut state = EngineState::default();

        state.declare_conflict();
        assert!(state.is_conflicting());

        state.declare_ready();
        assert!(state.is_ready());
    }

    #[test]
    #[should_panic(expected = "cannot leave the terminal state")]
    fn terminal_states_are_final() {
        let mut state = EngineState::default();
        state.declare_infeasible();

        state.declare_ready();
    }
}
