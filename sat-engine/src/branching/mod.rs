//! Decision heuristics which drive the [`Solver`](crate::search::Solver).
//!
//! A [`Brancher`] is an [`EngineListener`](crate::engine::EngineListener): it learns about the
//! search through the events of the [`Engine`](crate::Engine) and is asked for the next decision
//! whenever the engine is idle.
mod brancher;
mod vsids_brancher;

pub use brancher::Brancher;
pub use vsids_brancher::VsidsBrancher;
