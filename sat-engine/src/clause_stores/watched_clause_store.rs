use std::fmt::Display;

use itertools::Itertools;

use super::clause_store::is_antecedent;
use super::clause_store::order_for_watching;
use super::ClauseStore;
use crate::basic_types::ClauseId;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;
use crate::create_statistics_struct;
use crate::engine::EngineConfig;
use crate::engine::ExplanationClause;
use crate::engine::PropagationContext;
use crate::engine::Trail;
use crate::sat_assert_advanced;
use crate::sat_assert_simple;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// Learned clauses with at most this many distinct decision levels are never forgotten.
const GLUE_LBD: u32 = 2;

create_statistics_struct!(WatchedClauseStoreStatistics {
    num_clauses_added: u64,
    num_clauses_removed: u64,
    num_watcher_visits: u64,
    num_activity_rebases: u64,
});

/// A clause store for clauses of any length, based on two watched literals.
///
/// Each clause of at least two literals is watched by its first two literals. When a watched
/// literal becomes false the store looks for a replacement among the remaining literals; if there
/// is none the clause is unit (the other watched literal is implied) or false (a conflict). Unit
/// clauses are kept without watchers, they only serve as antecedents.
///
/// Learned clauses carry an activity, bumped whenever the clause takes part in conflict analysis,
/// and the literal block distance (LBD) it had when it was learned; both decide which learned
/// clauses are removed by [`ClauseStore::forget`].
#[derive(Debug)]
pub struct WatchedClauseStore {
    /// The component bits put in every [`ClauseId`] handed out.
    component: usize,
    clauses: KeyedVec<ClauseId, StoredClause>,
    /// Slots of removed clauses, reused before new slots are allocated.
    free_slots: Vec<ClauseId>,
    watch_lists: KeyedVec<Literal, Vec<ClauseWatcher>>,
    learned_clauses: Vec<ClauseId>,
    activity_increment: f64,
    activity_decay: f64,
    activity_rebase_threshold: f64,
    statistics: WatchedClauseStoreStatistics,
}

impl WatchedClauseStore {
    pub fn new(config: &EngineConfig) -> WatchedClauseStore {
        WatchedClauseStore {
            component: 0,
            clauses: KeyedVec::default(),
            free_slots: vec![],
            watch_lists: KeyedVec::default(),
            learned_clauses: vec![],
            activity_increment: config.clause_activity_bump,
            activity_decay: config.clause_activity_decay,
            activity_rebase_threshold: config.clause_activity_rebase_threshold,
            statistics: WatchedClauseStoreStatistics::default(),
        }
    }

    /// Tag every handed out [`ClauseId`] with `component`.
    pub fn in_component(mut self, component: usize) -> WatchedClauseStore {
        sat_assert_simple!(component < ClauseId::MAX_COMPONENTS);
        self.component = component;
        self
    }

    pub fn num_learned_clauses(&self) -> usize {
        self.learned_clauses.len()
    }

    pub fn is_learned(&self, clause: ClauseId) -> bool {
        self.clauses[clause].is_learned
    }

    pub fn activity(&self, clause: ClauseId) -> f64 {
        self.clauses[clause].activity
    }

    fn allocate(&mut self, clause: StoredClause) -> ClauseId {
        let id = match self.free_slots.pop() {
            Some(id) => {
                self.clauses[id] = clause;
                id
            }
            None => {
                sat_assert_simple!(
                    self.clauses.len() <= ClauseId::MAX_SLOT as usize,
                    "clause store is full"
                );
                self.clauses.push(clause)
            }
        };
        id.with_component(self.component as u8)
    }

    fn start_watching(&mut self, clause: ClauseId) {
        let literals = &self.clauses[clause].literals;
        sat_assert_simple!(literals.len() >= 2);

        let (first, second) = (literals[0], literals[1]);
        self.watch_lists[first].push(ClauseWatcher {
            cached_literal: second,
            clause,
        });
        self.watch_lists[second].push(ClauseWatcher {
            cached_literal: first,
            clause,
        });
    }

    fn stop_watching(&mut self, clause: ClauseId) {
        let literals = &self.clauses[clause].literals;
        if literals.len() < 2 {
            return;
        }

        let (first, second) = (literals[0], literals[1]);
        for watched in [first, second] {
            self.watch_lists[watched].retain(|watcher| watcher.clause != clause);
        }
    }

    /// Drop `clause` and free its slot, leaving the list of learned clauses untouched.
    fn delete(&mut self, clause: ClauseId) {
        self.stop_watching(clause);
        let stored = &mut self.clauses[clause];
        stored.is_deleted = true;
        stored.literals.clear();
        self.free_slots.push(clause);
        self.statistics.num_clauses_removed += 1;
    }

    /// The number of distinct non-root levels among `literals`.
    fn compute_lbd(literals: &[Literal], trail: &Trail) -> u32 {
        literals
            .iter()
            .filter(|&&literal| trail.is_set(literal.variable()))
            .map(|&literal| trail.get_level(literal.variable()))
            .filter(|&level| level > 0)
            .unique()
            .count() as u32
    }

    fn rebase_activities(&mut self) {
        for &clause in &self.learned_clauses {
            self.clauses[clause].activity /= self.activity_rebase_threshold;
        }
        self.activity_increment /= self.activity_rebase_threshold;
        self.statistics.num_activity_rebases += 1;
    }

    fn debug_check_watchers(&self) -> bool {
        self.watch_lists.keys().all(|literal| {
            self.watch_lists[literal].iter().all(|watcher| {
                let clause = &self.clauses[watcher.clause];
                !clause.is_deleted && clause.literals[..2].contains(&literal)
            })
        })
    }
}

impl ClauseStore for WatchedClauseStore {
    fn grow(&mut self, num_variables: u32) {
        if num_variables > 0 {
            self.watch_lists
                .accommodate(Variable::new(num_variables).negative(), vec![]);
            self.watch_lists
                .accommodate(Variable::new(num_variables).positive(), vec![]);
        }
    }

    fn add_clause(
        &mut self,
        literals: &[Literal],
        is_model_clause: bool,
        context: &mut PropagationContext<'_>,
    ) -> ClauseId {
        sat_assert_simple!(!literals.is_empty(), "the empty clause cannot be stored");

        let mut literals = literals.to_vec();
        order_for_watching(&mut literals, context.trail());

        let lbd = if is_model_clause {
            0
        } else {
            WatchedClauseStore::compute_lbd(&literals, context.trail()) + 1
        };
        let first = literals[0];
        let second = literals.get(1).copied();

        let id = self.allocate(StoredClause {
            literals,
            is_learned: !is_model_clause,
            is_deleted: false,
            lbd,
            activity: 0.0,
        });
        if !is_model_clause {
            self.learned_clauses.push(id);
        }
        if second.is_some() {
            self.start_watching(id);
        }
        self.statistics.num_clauses_added += 1;

        if context.is_literal_false(first) {
            context.conflict(id);
        } else if context.literal_value(first).is_none()
            && second.map_or(true, |literal| context.is_literal_false(literal))
        {
            context.imply(first, id);
        }

        id
    }

    fn can_remove(&self, clause: ClauseId, trail: &Trail) -> bool {
        let stored = &self.clauses[clause];
        stored.is_learned && !stored.is_deleted && !is_antecedent(&stored.literals, clause, trail)
    }

    fn remove_clause(&mut self, clause: ClauseId, trail: &Trail) {
        sat_assert_simple!(
            self.can_remove(clause, trail),
            "clause {clause} cannot be removed"
        );

        self.delete(clause);
        self.learned_clauses.retain(|&learned| learned != clause);
    }

    fn assert_literal(&mut self, true_literal: Literal, context: &mut PropagationContext<'_>) {
        let false_literal = !true_literal;
        if self.watch_lists[false_literal].is_empty() {
            return;
        }

        // The watch list is compacted in place: watchers which stay are copied to `end_index`,
        // watchers which move to another literal are skipped.
        let mut end_index = 0;
        let mut current_index = 0;
        while current_index < self.watch_lists[false_literal].len() {
            self.statistics.num_watcher_visits += 1;
            let watcher = self.watch_lists[false_literal][current_index];

            if context.is_literal_true(watcher.cached_literal) {
                self.watch_lists[false_literal][end_index] = watcher;
                current_index += 1;
                end_index += 1;
                continue;
            }

            let clause = &mut self.clauses[watcher.clause].literals;

            // Keep the falsified watch at position 1.
            if clause[0] == false_literal {
                clause.swap(0, 1);
            }

            if context.is_literal_true(clause[0]) {
                self.watch_lists[false_literal][end_index] = ClauseWatcher {
                    cached_literal: clause[0],
                    clause: watcher.clause,
                };
                current_index += 1;
                end_index += 1;
                continue;
            }

            let replacement =
                (2..clause.len()).find(|&index| !context.is_literal_false(clause[index]));
            if let Some(index) = replacement {
                clause.swap(1, index);
                let new_watch = clause[1];
                let cached_literal = clause[0];
                self.watch_lists[new_watch].push(ClauseWatcher {
                    cached_literal,
                    clause: watcher.clause,
                });
                current_index += 1;
                continue;
            }

            let other_watch = clause[0];
            self.watch_lists[false_literal][end_index] = watcher;
            end_index += 1;
            current_index += 1;

            if context.literal_value(other_watch).is_none() {
                context.imply(other_watch, watcher.clause);
            } else {
                context.conflict(watcher.clause);

                while current_index < self.watch_lists[false_literal].len() {
                    self.watch_lists[false_literal][end_index] =
                        self.watch_lists[false_literal][current_index];
                    current_index += 1;
                    end_index += 1;
                }
            }
        }
        self.watch_lists[false_literal].truncate(end_index);

        sat_assert_advanced!(self.debug_check_watchers());
    }

    fn explain_conflict(&self, clause: ClauseId, target: &mut ExplanationClause) {
        for &literal in &self.clauses[clause].literals {
            target.insert(literal);
        }
    }

    fn resolve_with(&self, clause: ClauseId, pivot: Variable, target: &mut ExplanationClause) {
        target.resolve(pivot, self.clauses[clause].literals.iter().copied());
    }

    fn forget(&mut self, fraction: f64, trail: &Trail) -> usize {
        let mut candidates = self
            .learned_clauses
            .iter()
            .copied()
            .filter(|&clause| self.clauses[clause].lbd > GLUE_LBD && self.can_remove(clause, trail))
            .collect::<Vec<_>>();
        candidates.sort_by(|&a, &b| {
            self.clauses[a]
                .activity
                .total_cmp(&self.clauses[b].activity)
        });

        let num_to_remove = (candidates.len() as f64 * fraction.clamp(0.0, 1.0)) as usize;
        for &clause in &candidates[..num_to_remove] {
            self.delete(clause);
        }
        self.learned_clauses
            .retain(|&clause| !self.clauses[clause].is_deleted);
        num_to_remove
    }

    fn bump_activity(&mut self, clause: ClauseId) {
        if !self.clauses[clause].is_learned {
            return;
        }

        if self.clauses[clause].activity + self.activity_increment > self.activity_rebase_threshold
        {
            self.rebase_activities();
        }
        self.clauses[clause].activity += self.activity_increment;
    }

    fn decay_activities(&mut self) {
        self.activity_increment /= self.activity_decay;
    }

    fn num_clauses(&self) -> usize {
        self.clauses.len() - self.free_slots.len()
    }

    fn literals(&self, clause: ClauseId) -> &[Literal] {
        &self.clauses[clause].literals
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

#[derive(Clone, Copy, Debug)]
struct ClauseWatcher {
    /// Another literal of the clause; if it is true the clause does not need to be visited.
    cached_literal: Literal,
    clause: ClauseId,
}

#[derive(Debug, Clone)]
struct StoredClause {
    literals: Vec<Literal>,
    is_learned: bool,
    is_deleted: bool,
    lbd: u32,
    activity: f64,
}

impl Display for StoredClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({})[learned: {}, lbd: {}]",
            self.literals.iter().join(" "),
            self.is_learned,
            self.lbd
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::propagation_context::test_context::TestContext;

    fn lit(code: i32) -> Literal {
        Literal::from_dimacs(code)
    }

    fn store_with_variables(num_variables: u32) -> (WatchedClauseStore, TestContext) {
        let mut store = WatchedClauseStore::new(&EngineConfig::default());
        store.grow(num_variables);
        (store, TestContext::with_variables(num_variables))
    }

    #[test]
    fn last_unassigned_literal_is_implied() {
        let (mut store, mut test) = store_with_variables(3);
        let clause = store.add_clause(&[lit(1), lit(2), lit(3)], true, &mut test.context());

        let first = test.decide(-1);
        store.assert_literal(first, &mut test.context());
        assert!(test.pending.is_empty());

        let second = test.decide(-2);
        let mut context = test.context();
        store.assert_literal(second, &mut context);
        assert!(!context.has_conflict());

        assert!(test.trail.is_literal_true(lit(3)));
        assert_eq!(clause, test.trail.get_antecedent(Variable::new(3)));
        assert_eq!(vec![lit(3)], test.pending.iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn all_false_clause_is_a_conflict() {
        let (mut store, mut test) = store_with_variables(2);
        let clause = store.add_clause(&[lit(1), lit(2)], true, &mut test.context());

        let _ = test.decide(-1);
        test.trail
            .assert_implied(lit(-2), 1, ClauseId::for_component(0, 7));

        let mut context = test.context();
        store.assert_literal(lit(-1), &mut context);

        assert_eq!(Some(clause), context.into_conflict());
    }

    #[test]
    fn adding_a_unit_clause_implies_its_literal() {
        let (mut store, mut test) = store_with_variables(2);

        let clause = store.add_clause(&[lit(-2)], true, &mut test.context());

        assert!(test.trail.is_literal_true(lit(-2)));
        assert_eq!(clause, test.trail.get_antecedent(Variable::new(2)));
        assert_eq!(1, store.num_clauses());
    }

    #[test]
    fn learned_clause_is_watched_on_asserting_and_highest_false_literal() {
        let (mut store, mut test) = store_with_variables(3);
        let _ = test.decide(-1);
        let _ = test.decide(-2);

        let clause = store.add_clause(&[lit(1), lit(3), lit(2)], false, &mut test.context());

        assert_eq!(&[lit(3), lit(2), lit(1)], store.literals(clause));
        assert!(test.trail.is_literal_true(lit(3)));
        assert!(store.is_learned(clause));
    }

    #[test]
    fn antecedents_cannot_be_removed_until_unassigned() {
        let (mut store, mut test) = store_with_variables(2);
        let _ = test.decide(-1);
        let clause = store.add_clause(&[lit(1), lit(2)], false, &mut test.context());

        assert!(!store.can_remove(clause, &test.trail));

        test.trail.backjump(0);

        assert!(store.can_remove(clause, &test.trail));
        store.remove_clause(clause, &test.trail);
        assert_eq!(0, store.num_clauses());
        assert_eq!(0, store.num_learned_clauses());
    }

    #[test]
    fn removed_slots_are_reused() {
        let (mut store, mut test) = store_with_variables(4);
        let first = store.add_clause(&[lit(1), lit(2), lit(3)], false, &mut test.context());
        store.remove_clause(first, &test.trail);

        let second = store.add_clause(&[lit(2), lit(3), lit(4)], false, &mut test.context());

        assert_eq!(first, second);
        assert_eq!(&[lit(2), lit(3), lit(4)], store.literals(second));
    }

    #[test]
    fn forget_removes_least_active_learned_clauses() {
        let (mut store, mut test) = store_with_variables(8);
        let model = store.add_clause(&[lit(1), lit(2), lit(3)], true, &mut test.context());

        // Learned at level 3 with three distinct levels below, so none of them is glue.
        for code in 4..=6 {
            let _ = test.decide(code);
        }
        let _ = test.decide(-7);
        let active = store.add_clause(&[lit(-4), lit(-5), lit(-6), lit(7)], false, &mut test.context());
        test.trail.backjump(0);
        let _ = test.decide(-8);
        for code in 4..=6 {
            let level = test.trail.current_level() + 1;
            test.trail.assert_decision(lit(code), level);
        }
        let inactive =
            store.add_clause(&[lit(-4), lit(-5), lit(-6), lit(8)], false, &mut test.context());
        test.trail.backjump(0);
        store.bump_activity(active);
        store.bump_activity(model);

        let removed = store.forget(0.5, &test.trail);

        assert_eq!(1, removed);
        assert_eq!(1, store.num_learned_clauses());
        assert!(store.clauses[inactive].is_deleted);
        assert!(!store.clauses[active].is_deleted);
        assert_eq!(0.0, store.activity(model));
    }

    #[test]
    fn activities_are_rebased_before_exceeding_threshold() {
        let config = EngineConfig {
            clause_activity_rebase_threshold: 10.0,
            clause_activity_bump: 4.0,
            ..EngineConfig::default()
        };
        let mut store = WatchedClauseStore::new(&config);
        store.grow(3);
        let mut test = TestContext::with_variables(3);
        let clause = store.add_clause(&[lit(1), lit(2), lit(3)], false, &mut test.context());

        for _ in 0..3 {
            store.bump_activity(clause);
        }

        assert!(store.activity(clause) <= 10.0);
        assert_eq!(1, store.statistics.num_activity_rebases);
    }
}
