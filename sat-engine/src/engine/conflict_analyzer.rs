use super::Explanation;
use super::ExplanationClause;
use super::Trail;
use crate::basic_types::moving_averages::CumulativeMovingAverage;
use crate::basic_types::BufferPool;
use crate::basic_types::ClauseId;
use crate::basic_types::Literal;
use crate::clause_stores::ClauseStore;
use crate::sat_assert_advanced;
use crate::sat_assert_simple;

/// Derives an asserting clause from a conflict with the first unique implication point (1UIP)
/// scheme.
#[derive(Debug, Default)]
pub struct ConflictAnalyzer {
    /// The number of resolution steps per analysis.
    average_num_resolutions: CumulativeMovingAverage,
}

impl ConflictAnalyzer {
    /// Analyse the conflict on `conflict`, a clause which is false on `trail`.
    ///
    /// Starting from the conflicting clause, the literal at the conflict level which was assigned
    /// last is resolved away with its antecedent until exactly one literal at the conflict level
    /// is left. That literal is the asserting literal of the returned [`Explanation`]. Every
    /// clause used along the way has its activity bumped in `store`.
    ///
    /// Returns `None` if every literal of the conflict was assigned at the root level, in which
    /// case the formula is unsatisfiable.
    pub fn analyze(
        &mut self,
        conflict: ClauseId,
        trail: &Trail,
        store: &mut dyn ClauseStore,
        pool: &mut BufferPool,
    ) -> Option<Explanation> {
        let level_of = |literal: Literal| trail.get_level(literal.variable());

        let mut clause = ExplanationClause::new(pool.acquire());
        store.explain_conflict(conflict, &mut clause);
        store.bump_activity(conflict);
        let _ = clause.take_added();

        sat_assert_simple!(
            clause.iter().all(|literal| trail.is_literal_false(literal)),
            "the conflicting clause {conflict} is not false on the trail"
        );

        let conflict_level = clause.iter().map(level_of).max().unwrap_or(0);
        if conflict_level == 0 {
            pool.release(clause.into_buffer());
            return None;
        }

        let mut num_at_conflict_level = clause
            .iter()
            .filter(|&literal| level_of(literal) == conflict_level)
            .count();
        let mut num_resolutions = 0;

        // Literals of the conflict level occupy a suffix of the trail, and each resolution only
        // adds literals assigned before the pivot, so one downward scan visits every pivot.
        let mut position = trail.size();
        while num_at_conflict_level > 1 {
            position -= 1;
            let variable = trail.literal_at(position).variable();
            if !clause.contains(variable) {
                continue;
            }
            sat_assert_simple!(trail.get_level(variable) == conflict_level);
            sat_assert_simple!(
                !trail.is_decision(variable),
                "the decision {variable} is not the last literal of its level in the explanation"
            );

            let antecedent = trail.get_antecedent(variable);
            store.resolve_with(antecedent, variable, &mut clause);
            store.bump_activity(antecedent);
            num_resolutions += 1;

            num_at_conflict_level -= 1;
            num_at_conflict_level += clause
                .take_added()
                .filter(|&literal| level_of(literal) == conflict_level)
                .count();
        }
        self.average_num_resolutions.add_term(num_resolutions);

        clause.retain(|literal| level_of(literal) > 0);

        let asserted_literal = clause
            .iter()
            .find(|&literal| level_of(literal) == conflict_level)
            .expect("one literal at the conflict level remains");
        let backjump_level = clause
            .iter()
            .filter(|&literal| literal != asserted_literal)
            .map(level_of)
            .max()
            .unwrap_or(0);

        sat_assert_advanced!(clause.iter().all(|literal| trail.is_literal_false(literal)));

        let (explanation, buffer) = clause.finish(
            pool.acquire(),
            asserted_literal,
            backjump_level,
            conflict_level,
            level_of,
        );
        pool.release(buffer);

        Some(explanation)
    }

    pub fn average_num_resolutions(&self) -> f64 {
        self.average_num_resolutions.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Variable;
    use crate::clause_stores::WatchedClauseStore;
    use crate::engine::propagation_context::test_context::TestContext;
    use crate::engine::EngineConfig;

    fn lit(code: i32) -> Literal {
        Literal::from_dimacs(code)
    }

    /// Adds `clauses`, then decides each of `decisions` on a new level and propagates, stopping
    /// at the first conflict.
    fn run_until_conflict(
        num_variables: u32,
        clauses: &[&[i32]],
        decisions: &[i32],
    ) -> (WatchedClauseStore, TestContext, Option<ClauseId>) {
        let mut store = WatchedClauseStore::new(&EngineConfig::default());
        store.grow(num_variables);
        let mut test = TestContext::with_variables(num_variables);

        for clause in clauses {
            let literals = clause.iter().map(|&code| lit(code)).collect::<Vec<_>>();
            let _ = store.add_clause(&literals, true, &mut test.context());
        }

        for &decision in decisions {
            let decision = test.decide(decision);
            test.pending.push_back(decision);
            while let Some(literal) = test.pending.pop_front() {
                let mut context = test.context();
                store.assert_literal(literal, &mut context);
                if let Some(conflict) = context.into_conflict() {
                    return (store, test, Some(conflict));
                }
            }
        }

        (store, test, None)
    }

    #[test]
    fn resolves_to_first_uip_and_backjumps_below_conflict_level() {
        // Deciding 1 and then 2 implies 3, then 4 and 5, which violate the last clause.
        let (mut store, test, conflict) = run_until_conflict(
            5,
            &[&[-2, 3], &[-1, -3, 4], &[-3, -4, 5], &[-4, -5]],
            &[1, 2],
        );
        let conflict = conflict.expect("the decisions lead to a conflict");

        let explanation = ConflictAnalyzer::default()
            .analyze(conflict, &test.trail, &mut store, &mut BufferPool::default())
            .expect("conflict above the root");

        assert_eq!(lit(-3), explanation.asserted_literal());
        assert_eq!(&[lit(-3), lit(-1)], explanation.literals());
        assert_eq!(1, explanation.backjump_level());
        assert_eq!(2, explanation.conflict_level());
    }

    #[test]
    fn explanation_is_false_and_has_a_single_literal_at_the_conflict_level() {
        let (mut store, test, conflict) = run_until_conflict(
            6,
            &[&[-1, 2], &[-3, 4], &[-2, -4, 5], &[-2, -4, 6], &[-5, -6]],
            &[1, 3],
        );
        let conflict = conflict.expect("the decisions lead to a conflict");

        let explanation = ConflictAnalyzer::default()
            .analyze(conflict, &test.trail, &mut store, &mut BufferPool::default())
            .expect("conflict above the root");

        let conflict_level = explanation.conflict_level();
        assert!(explanation
            .literals()
            .iter()
            .all(|&literal| test.trail.is_literal_false(literal)));
        assert_eq!(
            1,
            explanation
                .literals()
                .iter()
                .filter(|literal| test.trail.get_level(literal.variable()) == conflict_level)
                .count()
        );
        assert!(explanation.backjump_level() < conflict_level);
        assert_eq!(lit(-4), explanation.asserted_literal());
    }

    #[test]
    fn root_level_literals_are_dropped() {
        let (mut store, test, conflict) =
            run_until_conflict(3, &[&[-1], &[1, -2, 3], &[1, -2, -3]], &[2]);
        let conflict = conflict.expect("deciding 2 is a conflict");

        let explanation = ConflictAnalyzer::default()
            .analyze(conflict, &test.trail, &mut store, &mut BufferPool::default())
            .expect("conflict above the root");

        assert_eq!(&[lit(-2)], explanation.literals());
        assert_eq!(0, explanation.backjump_level());
        assert!(!explanation
            .literals()
            .iter()
            .any(|literal| literal.variable() == Variable::new(1)));
    }

    #[test]
    fn conflict_at_root_level_has_no_explanation() {
        let mut store = WatchedClauseStore::new(&EngineConfig::default());
        store.grow(2);
        let mut test = TestContext::with_variables(2);
        let _ = store.add_clause(&[lit(-1)], true, &mut test.context());
        let _ = store.add_clause(&[lit(-2)], true, &mut test.context());
        let mut context = test.context();
        let conflict = store.add_clause(&[lit(1), lit(2)], true, &mut context);
        assert_eq!(Some(conflict), context.into_conflict());

        let explanation = ConflictAnalyzer::default().analyze(
            conflict,
            &test.trail,
            &mut store,
            &mut BufferPool::default(),
        );

        assert_eq!(None, explanation);
    }
}
