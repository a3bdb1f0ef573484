use thiserror::Error;

/// The errors which an embedder can trigger through the [`Engine`](crate::Engine) API.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The formula is already known to be unsatisfiable, nothing can be added to it.
    #[error("the engine is in an inconsistent state, the formula is unsatisfiable")]
    InconsistentSolver,
    /// `0` is used to terminate clauses and is not a literal.
    #[error("{0} is not a valid literal")]
    InvalidLiteral(i32),
    /// The literal refers to a variable above the current maximum.
    #[error("literal {literal} refers to a variable above the maximum variable {max_variable}")]
    UnknownVariable { literal: i32, max_variable: u32 },
}
