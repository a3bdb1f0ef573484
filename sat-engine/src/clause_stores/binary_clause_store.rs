use super::clause_store::is_antecedent;
use super::ClauseStore;
use crate::basic_types::ClauseId;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;
use crate::engine::ExplanationClause;
use crate::engine::PropagationContext;
use crate::engine::Trail;
use crate::sat_assert_simple;
use crate::statistics::StatisticLogger;

/// A clause store dedicated to clauses of exactly two literals.
///
/// A binary clause `(a b)` is stored as two implications: `!a -> b` and `!b -> a`. Propagating a
/// literal walks its implication list without touching clause memory, which makes binary clauses
/// considerably cheaper than in a [`WatchedClauseStore`](super::WatchedClauseStore).
///
/// Learned binary clauses are never forgotten.
#[derive(Debug, Default)]
pub struct BinaryClauseStore {
    component: usize,
    clauses: KeyedVec<ClauseId, Option<[Literal; 2]>>,
    free_slots: Vec<ClauseId>,
    /// `implications[l]` holds `(o, c)` for every clause `c = (l o)`; when `l` becomes false, `o`
    /// is implied.
    implications: KeyedVec<Literal, Vec<(Literal, ClauseId)>>,
    num_learned_clauses: usize,
}

impl BinaryClauseStore {
    pub fn in_component(mut self, component: usize) -> BinaryClauseStore {
        sat_assert_simple!(component < ClauseId::MAX_COMPONENTS);
        self.component = component;
        self
    }

    pub fn num_learned_clauses(&self) -> usize {
        self.num_learned_clauses
    }

    fn stored(&self, clause: ClauseId) -> [Literal; 2] {
        match self.clauses[clause] {
            Some(literals) => literals,
            None => panic!("binary clause {clause} was removed"),
        }
    }
}

impl ClauseStore for BinaryClauseStore {
    fn grow(&mut self, num_variables: u32) {
        if num_variables > 0 {
            self.implications
                .accommodate(Variable::new(num_variables).negative(), vec![]);
        }
    }

    fn accepts(&self, num_literals: usize) -> bool {
        num_literals == 2
    }

    fn add_clause(
        &mut self,
        literals: &[Literal],
        is_model_clause: bool,
        context: &mut PropagationContext<'_>,
    ) -> ClauseId {
        sat_assert_simple!(
            literals.len() == 2,
            "binary clause store cannot hold a clause of {} literals",
            literals.len()
        );

        let pair = [literals[0], literals[1]];
        let id = match self.free_slots.pop() {
            Some(id) => {
                self.clauses[id] = Some(pair);
                id
            }
            None => self.clauses.push(Some(pair)),
        }
        .with_component(self.component as u8);

        self.implications[pair[0]].push((pair[1], id));
        self.implications[pair[1]].push((pair[0], id));
        if !is_model_clause {
            self.num_learned_clauses += 1;
        }

        match (context.literal_value(pair[0]), context.literal_value(pair[1])) {
            (Some(false), Some(false)) => context.conflict(id),
            (Some(false), None) => context.imply(pair[1], id),
            (None, Some(false)) => context.imply(pair[0], id),
            _ => {}
        }

        id
    }

    fn can_remove(&self, clause: ClauseId, trail: &Trail) -> bool {
        self.clauses[clause].is_some_and(|literals| !is_antecedent(&literals, clause, trail))
    }

    fn remove_clause(&mut self, clause: ClauseId, trail: &Trail) {
        sat_assert_simple!(
            self.can_remove(clause, trail),
            "clause {clause} cannot be removed"
        );

        for literal in self.stored(clause) {
            self.implications[literal].retain(|&(_, id)| id != clause);
        }
        self.clauses[clause] = None;
        self.free_slots.push(clause);
    }

    fn assert_literal(&mut self, true_literal: Literal, context: &mut PropagationContext<'_>) {
        for &(other, clause) in &self.implications[!true_literal] {
            match context.literal_value(other) {
                Some(true) => {}
                None => context.imply(other, clause),
                Some(false) => {
                    context.conflict(clause);
                    return;
                }
            }
        }
    }

    fn explain_conflict(&self, clause: ClauseId, target: &mut ExplanationClause) {
        for literal in self.stored(clause) {
            target.insert(literal);
        }
    }

    fn resolve_with(&self, clause: ClauseId, pivot: Variable, target: &mut ExplanationClause) {
        target.resolve(pivot, self.stored(clause));
    }

    fn forget(&mut self, _fraction: f64, _trail: &Trail) -> usize {
        0
    }

    fn bump_activity(&mut self, _clause: ClauseId) {}

    fn num_clauses(&self) -> usize {
        self.clauses.len() - self.free_slots.len()
    }

    fn literals(&self, clause: ClauseId) -> &[Literal] {
        match &self.clauses[clause] {
            Some(literals) => literals,
            None => &[],
        }
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        statistic_logger
            .attach_to_prefix("num_clauses")
            .log_statistic(self.num_clauses());
        statistic_logger
            .attach_to_prefix("num_learned_clauses")
            .log_statistic(self.num_learned_clauses);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::propagation_context::test_context::TestContext;

    fn lit(code: i32) -> Literal {
        Literal::from_dimacs(code)
    }

    fn store_with_variables(num_variables: u32) -> (BinaryClauseStore, TestContext) {
        let mut store = BinaryClauseStore::default();
        store.grow(num_variables);
        (store, TestContext::with_variables(num_variables))
    }

    #[test]
    fn falsifying_one_literal_implies_the_other() {
        let (mut store, mut test) = store_with_variables(2);
        let clause = store.add_clause(&[lit(1), lit(-2)], true, &mut test.context());

        let decision = test.decide(2);
        store.assert_literal(decision, &mut test.context());

        assert!(test.trail.is_literal_true(lit(1)));
        assert_eq!(clause, test.trail.get_antecedent(Variable::new(1)));
    }

    #[test]
    fn conflicting_implications_are_reported() {
        let (mut store, mut test) = store_with_variables(2);
        let _ = store.add_clause(&[lit(1), lit(2)], true, &mut test.context());
        let clause = store.add_clause(&[lit(1), lit(-2)], true, &mut test.context());

        let decision = test.decide(-1);
        let mut context = test.context();
        store.assert_literal(decision, &mut context);

        assert_eq!(Some(clause), context.into_conflict());
    }

    #[test]
    fn removed_clause_no_longer_propagates() {
        let (mut store, mut test) = store_with_variables(2);
        let clause = store.add_clause(&[lit(1), lit(2)], false, &mut test.context());
        store.remove_clause(clause, &test.trail);

        let decision = test.decide(-1);
        store.assert_literal(decision, &mut test.context());

        assert!(!test.trail.is_set(Variable::new(2)));
        assert_eq!(0, store.num_clauses());
        assert!(store.literals(clause).is_empty());
    }

    #[test]
    fn component_is_encoded_in_the_identifier() {
        let (store, mut test) = store_with_variables(2);
        let mut store = store.in_component(3);

        let clause = store.add_clause(&[lit(1), lit(2)], true, &mut test.context());

        assert_eq!(3, clause.component());
        assert_eq!(&[lit(1), lit(2)], store.literals(clause));
    }
}
