//! # sat-engine
//! A conflict-driven clause-learning (CDCL) kernel for propositional satisfiability.
//!
//! The kernel is built around the [`Engine`], a state machine which owns the assignment
//! [`Trail`](engine::Trail), a pluggable [`ClauseStore`](clause_stores::ClauseStore) and the
//! first-UIP [`ConflictAnalyzer`](engine::ConflictAnalyzer). The engine does not decide which
//! literal to branch on, nor does it mandate how clauses are indexed; both are supplied from the
//! outside. A decision procedure drives the engine through [`Engine::assert_decision`],
//! [`Engine::backjump_to_level`] and [`Engine::restart`], and observes every state transition by
//! registering an [`EngineListener`](engine::EngineListener).
//!
//! # Solving a formula
//! The [`Solver`](search::Solver) combines an [`Engine`] with a
//! [`Brancher`](branching::Brancher) and a restart policy into a complete CDCL search:
//! ```rust
//! # use sat_engine::Engine;
//! # use sat_engine::EngineConfig;
//! # use sat_engine::branching::VsidsBrancher;
//! # use sat_engine::search::Solver;
//! # use sat_engine::search::SolveOutcome;
//! # use sat_engine::termination::Indefinite;
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.set_max_variable(2);
//!
//! let _ = engine.add_model_clause(&[1, 2]).expect("valid clause");
//! let _ = engine.add_model_clause(&[-1, 2]).expect("valid clause");
//! let _ = engine.add_model_clause(&[-2, 1]).expect("valid clause");
//!
//! let brancher = engine.add_listener(VsidsBrancher::new(engine.config()));
//! let mut solver = Solver::new(engine.config());
//!
//! let outcome = solver.solve(&mut engine, brancher, &mut Indefinite);
//!
//! assert_eq!(outcome, SolveOutcome::Satisfiable);
//! assert_eq!(engine.get_return_code(), 10);
//! ```
//!
//! # Driving the engine directly
//! Bridges which need fine-grained control can use the [`Engine`] operations themselves:
//! ```rust
//! # use sat_engine::Engine;
//! # use sat_engine::EngineConfig;
//! # use sat_engine::SolverState;
//! # use sat_engine::basic_types::Literal;
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.set_max_variable(2);
//! let clause = engine
//!     .add_model_clause(&[1, 2])
//!     .expect("valid clause")
//!     .expect("clause is stored");
//!
//! engine.assert_decision(Literal::from_dimacs(-1), 1);
//!
//! let trail = engine.trail();
//! let implied = Literal::from_dimacs(2).variable();
//! assert!(trail.is_set(implied));
//! assert!(!trail.is_decision(implied));
//! assert_eq!(trail.get_antecedent(implied), clause);
//! assert_eq!(engine.current_state(), SolverState::Unknown);
//! ```
pub(crate) mod sat_asserts;

pub mod basic_types;
pub mod branching;
pub mod clause_stores;
pub mod containers;
pub mod engine;
pub mod results;
pub mod search;
pub mod statistics;
pub mod termination;

mod error;

pub use convert_case;
pub use rand;

pub use crate::engine::Engine;
pub use crate::engine::EngineConfig;
pub use crate::engine::SolverState;
pub use crate::error::EngineError;

pub mod asserts {
    //! Contract checks of the engine; the level is raised in tests and with the `debug-checks`
    //! feature.
    pub use crate::sat_asserts::SAT_ASSERT_ADVANCED;
    pub use crate::sat_asserts::SAT_ASSERT_EXTREME;
    pub use crate::sat_asserts::SAT_ASSERT_LEVEL_DEFINITION;
    pub use crate::sat_asserts::SAT_ASSERT_MODERATE;
    pub use crate::sat_asserts::SAT_ASSERT_SIMPLE;
}
