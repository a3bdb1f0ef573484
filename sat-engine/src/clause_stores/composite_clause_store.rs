use std::fmt::Display;

use clap::ValueEnum;
use log::warn;

use super::BinaryClauseStore;
use super::ClauseStore;
use super::WatchedClauseStore;
use crate::basic_types::ClauseId;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::engine::EngineConfig;
use crate::engine::ExplanationClause;
use crate::engine::PropagationContext;
use crate::engine::Trail;
use crate::sat_assert_simple;
use crate::statistics::StatisticLogger;

/// The kinds of clause store which can be wired into a [`CompositeClauseStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum ClauseStoreKind {
    /// Implication lists for clauses of two literals.
    Binary,
    /// Two watched literals, for clauses of any length.
    Watched,
}

impl ClauseStoreKind {
    fn create(self, component: usize, config: &EngineConfig) -> Box<dyn ClauseStore> {
        match self {
            ClauseStoreKind::Binary => {
                Box::new(BinaryClauseStore::default().in_component(component))
            }
            ClauseStoreKind::Watched => {
                Box::new(WatchedClauseStore::new(config).in_component(component))
            }
        }
    }
}

impl Display for ClauseStoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClauseStoreKind::Binary => write!(f, "binary"),
            ClauseStoreKind::Watched => write!(f, "watched"),
        }
    }
}

/// A [`ClauseStore`] which routes every clause to the first of its components that accepts it.
///
/// The index of the owning component is kept in [`ClauseId::component`], so that removal and
/// resolution can be forwarded without a lookup. Propagation visits the components in order and
/// stops at the first conflict.
#[derive(Debug)]
pub struct CompositeClauseStore {
    components: Vec<Box<dyn ClauseStore>>,
}

impl CompositeClauseStore {
    /// Create the components listed in [`EngineConfig::clause_stores`]. A watched store is added
    /// at the end if no component accepts clauses of every length.
    pub fn new(config: &EngineConfig) -> CompositeClauseStore {
        let mut kinds = config.clause_stores.clone();
        if !kinds.contains(&ClauseStoreKind::Watched) {
            warn!("No watched clause store is configured, appending one");
            kinds.push(ClauseStoreKind::Watched);
        }
        sat_assert_simple!(
            kinds.len() <= ClauseId::MAX_COMPONENTS,
            "at most {} clause stores can be combined",
            ClauseId::MAX_COMPONENTS
        );

        let components = kinds
            .iter()
            .enumerate()
            .map(|(component, kind)| kind.create(component, config))
            .collect();

        CompositeClauseStore { components }
    }

    /// The component at `index`, if it is of type `Store`.
    pub fn component<Store: ClauseStore>(&self, index: usize) -> Option<&Store> {
        self.components
            .get(index)
            .and_then(|component| component.downcast_ref::<Store>())
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    fn owner(&self, clause: ClauseId) -> &dyn ClauseStore {
        self.components[clause.component() as usize].as_ref()
    }

    fn owner_mut(&mut self, clause: ClauseId) -> &mut dyn ClauseStore {
        self.components[clause.component() as usize].as_mut()
    }
}

impl ClauseStore for CompositeClauseStore {
    fn grow(&mut self, num_variables: u32) {
        for component in &mut self.components {
            component.grow(num_variables);
        }
    }

    fn add_clause(
        &mut self,
        literals: &[Literal],
        is_model_clause: bool,
        context: &mut PropagationContext<'_>,
    ) -> ClauseId {
        let num_literals = literals.len();
        let Some(component) = self
            .components
            .iter_mut()
            .find(|component| component.accepts(num_literals))
        else {
            panic!("no clause store accepts a clause of {num_literals} literals");
        };

        component.add_clause(literals, is_model_clause, context)
    }

    fn can_remove(&self, clause: ClauseId, trail: &Trail) -> bool {
        self.owner(clause).can_remove(clause, trail)
    }

    fn remove_clause(&mut self, clause: ClauseId, trail: &Trail) {
        self.owner_mut(clause).remove_clause(clause, trail);
    }

    fn assert_literal(&mut self, literal: Literal, context: &mut PropagationContext<'_>) {
        for component in &mut self.components {
            component.assert_literal(literal, context);
            if context.has_conflict() {
                return;
            }
        }
    }

    fn explain_conflict(&self, clause: ClauseId, target: &mut ExplanationClause) {
        self.owner(clause).explain_conflict(clause, target);
    }

    fn resolve_with(&self, clause: ClauseId, pivot: Variable, target: &mut ExplanationClause) {
        self.owner(clause).resolve_with(clause, pivot, target);
    }

    fn backjump(&mut self, level: u32, trail: &Trail) {
        for component in &mut self.components {
            component.backjump(level, trail);
        }
    }

    fn forget(&mut self, fraction: f64, trail: &Trail) -> usize {
        self.components
            .iter_mut()
            .map(|component| component.forget(fraction, trail))
            .sum()
    }

    fn bump_activity(&mut self, clause: ClauseId) {
        self.owner_mut(clause).bump_activity(clause);
    }

    fn decay_activities(&mut self) {
        for component in &mut self.components {
            component.decay_activities();
        }
    }

    fn num_clauses(&self) -> usize {
        self.components
            .iter()
            .map(|component| component.num_clauses())
            .sum()
    }

    fn literals(&self, clause: ClauseId) -> &[Literal] {
        self.owner(clause).literals(clause)
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        for (index, component) in self.components.iter().enumerate() {
            component.log_statistics(statistic_logger.attach_to_prefix(format!("store_{index}")));
        }
    }
}
