use std::collections::VecDeque;

use super::listeners::ListenerRegistry;
use super::EngineStatistics;
use super::Trail;
use crate::basic_types::ClauseId;
use crate::basic_types::Literal;
use crate::sat_assert_simple;

/// The view of the engine which a [`ClauseStore`](crate::clause_stores::ClauseStore) receives
/// while it propagates.
///
/// A store reads the assignment through the context and reports its findings with
/// [`PropagationContext::imply`] and [`PropagationContext::conflict`]. After a conflict is
/// reported the store must stop propagating and return.
#[derive(Debug)]
pub struct PropagationContext<'a> {
    trail: &'a mut Trail,
    pending: &'a mut VecDeque<Literal>,
    listeners: &'a mut ListenerRegistry,
    statistics: &'a mut EngineStatistics,
    conflict: Option<ClauseId>,
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(
        trail: &'a mut Trail,
        pending: &'a mut VecDeque<Literal>,
        listeners: &'a mut ListenerRegistry,
        statistics: &'a mut EngineStatistics,
    ) -> PropagationContext<'a> {
        PropagationContext {
            trail,
            pending,
            listeners,
            statistics,
            conflict: None,
        }
    }

    pub fn trail(&self) -> &Trail {
        self.trail
    }

    pub fn current_level(&self) -> u32 {
        self.trail.current_level()
    }

    pub fn literal_value(&self, literal: Literal) -> Option<bool> {
        self.trail.literal_value(literal)
    }

    pub fn is_literal_true(&self, literal: Literal) -> bool {
        self.trail.is_literal_true(literal)
    }

    pub fn is_literal_false(&self, literal: Literal) -> bool {
        self.trail.is_literal_false(literal)
    }

    /// The level of an assigned literal.
    pub fn level_of(&self, literal: Literal) -> u32 {
        self.trail.get_level(literal.variable())
    }

    /// Record that `antecedent` implies `literal` at the current level. The literal is queued to
    /// be propagated in turn.
    pub fn imply(&mut self, literal: Literal, antecedent: ClauseId) {
        sat_assert_simple!(
            self.conflict.is_none(),
            "cannot propagate {literal} after the conflict on {antecedent}"
        );

        let level = self.trail.current_level();
        self.trail.assert_implied(literal, level, antecedent);
        self.statistics.num_propagations += 1;
        self.listeners.notify_propagate(literal, antecedent);
        self.pending.push_back(literal);
    }

    /// Report that every literal of `clause` is false.
    pub fn conflict(&mut self, clause: ClauseId) {
        sat_assert_simple!(
            self.conflict.is_none(),
            "a second conflict {clause} was reported"
        );
        self.conflict = Some(clause);
    }

    pub fn has_conflict(&self) -> bool {
        self.conflict.is_some()
    }

    pub(crate) fn into_conflict(self) -> Option<ClauseId> {
        self.conflict
    }
}

#[cfg(test)]
pub(crate) mod test_context {
    use std::collections::VecDeque;

    use super::*;
    use crate::basic_types::Variable;

    /// Owns everything a [`PropagationContext`] borrows, so that clause stores can be tested
    /// without an engine.
    #[derive(Debug, Default)]
    pub(crate) struct TestContext {
        pub(crate) trail: Trail,
        pub(crate) pending: VecDeque<Literal>,
        pub(crate) listeners: ListenerRegistry,
        pub(crate) statistics: EngineStatistics,
    }

    impl TestContext {
        pub(crate) fn with_variables(num_variables: u32) -> TestContext {
            let mut context = TestContext::default();
            context.trail.add_variable(Variable::new(num_variables));
            context
        }

        pub(crate) fn context(&mut self) -> PropagationContext<'_> {
            PropagationContext::new(
                &mut self.trail,
                &mut self.pending,
                &mut self.listeners,
                &mut self.statistics,
            )
        }

        /// Record `literal` as a decision one level above the current one.
        pub(crate) fn decide(&mut self, code: i32) -> Literal {
            let literal = Literal::from_dimacs(code);
            let level = self.trail.current_level() + 1;
            self.trail.assert_decision(literal, level);
            literal
        }
    }
}
