//! Clause stores hold the clauses of the formula and the learned clauses, and perform unit
//! propagation over them.
//!
//! The [`Engine`](crate::Engine) only depends on the [`ClauseStore`] trait. The
//! [`CompositeClauseStore`] combines several specialised stores; by default a
//! [`BinaryClauseStore`] for two-literal clauses and a [`WatchedClauseStore`] for all others.
mod binary_clause_store;
mod clause_store;
mod composite_clause_store;
mod watched_clause_store;

pub use binary_clause_store::BinaryClauseStore;
pub use clause_store::ClauseStore;
pub use composite_clause_store::ClauseStoreKind;
pub use composite_clause_store::CompositeClauseStore;
pub use watched_clause_store::WatchedClauseStore;
