use std::fmt::Debug;

use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use crate::basic_types::ClauseId;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::engine::ExplanationClause;
use crate::engine::PropagationContext;
use crate::engine::Trail;
use crate::statistics::StatisticLogger;

/// A repository of clauses which performs unit propagation on behalf of the
/// [`Engine`](crate::Engine).
///
/// The engine never looks inside a clause. It hands every literal that becomes true to
/// [`ClauseStore::assert_literal`], and the store reports implied literals and conflicts through
/// the [`PropagationContext`]. During conflict analysis the store writes its clauses into the
/// [`ExplanationClause`] under construction.
///
/// Identifiers returned by [`ClauseStore::add_clause`] stay valid until the clause is removed.
/// A store may reuse the identifier of a removed clause.
pub trait ClauseStore: Downcast + Debug {
    /// Make room for literals over the variables `1..=num_variables`.
    fn grow(&mut self, num_variables: u32);

    /// Whether the store wants to hold clauses with `num_literals` literals. Used to route
    /// clauses between the components of a [`CompositeClauseStore`](super::CompositeClauseStore).
    fn accepts(&self, _num_literals: usize) -> bool {
        true
    }

    /// Add a clause over distinct variables without complementary literals.
    ///
    /// The clause is checked against the current assignment: if all but one literal are false the
    /// remaining literal is implied, and if every literal is false a conflict is reported on the
    /// new clause.
    fn add_clause(
        &mut self,
        literals: &[Literal],
        is_model_clause: bool,
        context: &mut PropagationContext<'_>,
    ) -> ClauseId;

    /// Whether `clause` may be removed: learned clauses can be removed unless they are the
    /// antecedent of an assigned literal.
    fn can_remove(&self, clause: ClauseId, trail: &Trail) -> bool;

    /// Remove `clause`. Only allowed if [`ClauseStore::can_remove`] holds.
    fn remove_clause(&mut self, clause: ClauseId, trail: &Trail);

    /// Propagate the consequences of `literal` having become true. Stops at the first conflict.
    fn assert_literal(&mut self, literal: Literal, context: &mut PropagationContext<'_>);

    /// Insert every literal of the conflicting `clause` into `target`.
    fn explain_conflict(&self, clause: ClauseId, target: &mut ExplanationClause);

    /// Resolve `target` with `clause`, the antecedent of `pivot`.
    fn resolve_with(&self, clause: ClauseId, pivot: Variable, target: &mut ExplanationClause);

    /// Undo the bookkeeping which depends on levels above `level`. Called after the trail has
    /// been undone.
    fn backjump(&mut self, _level: u32, _trail: &Trail) {}

    /// Remove roughly `fraction` of the removable learned clauses, least useful first. Returns the
    /// number of removed clauses.
    fn forget(&mut self, fraction: f64, trail: &Trail) -> usize;

    /// Record that `clause` took part in conflict analysis.
    fn bump_activity(&mut self, clause: ClauseId);

    /// Age all activities, making future bumps weigh more.
    fn decay_activities(&mut self) {}

    /// The number of stored clauses.
    fn num_clauses(&self) -> usize;

    /// The literals of `clause`.
    fn literals(&self, clause: ClauseId) -> &[Literal];

    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

impl_downcast!(ClauseStore);

/// Whether a clause with `literals`, stored as `clause`, is the antecedent of one of its
/// assigned literals.
pub(crate) fn is_antecedent(literals: &[Literal], clause: ClauseId, trail: &Trail) -> bool {
    literals.iter().any(|&literal| {
        let variable = literal.variable();
        trail.is_literal_true(literal)
            && !trail.is_decision(variable)
            && trail.get_antecedent(variable) == clause
    })
}

/// Orders `literals` so that the two literals to watch come first: true literals, then unassigned
/// literals, then false literals by decreasing level.
pub(crate) fn order_for_watching(literals: &mut [Literal], trail: &Trail) {
    literals.sort_by_key(|&literal| match trail.literal_value(literal) {
        Some(true) => (0, 0),
        None => (1, 0),
        Some(false) => (2, u32::MAX - trail.get_level(literal.variable())),
    });
}
