//! A complete CDCL search on top of the [`Engine`](crate::Engine).
mod restart_policy;
mod solver;

pub(crate) use restart_policy::RestartPolicy;
pub use solver::SolveOutcome;
pub use solver::Solver;
