use std::fmt::Display;

use itertools::Itertools;

use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::HashMap;
use crate::sat_assert_simple;

/// A clause under construction during conflict analysis.
///
/// The clause holds at most one literal per variable. While it is being built every literal in it
/// is false on the trail, so a variable can never appear with both polarities. Literals are
/// remembered in insertion order so that the analysis is deterministic.
#[derive(Debug)]
pub struct ExplanationClause {
    literals: HashMap<Variable, Literal>,
    order: Vec<Literal>,
    /// Literals inserted since the last call to [`ExplanationClause::take_added`].
    added: Vec<Literal>,
}

impl ExplanationClause {
    /// Create an empty clause which uses `buffer` to track newly added literals.
    pub fn new(buffer: Vec<Literal>) -> ExplanationClause {
        ExplanationClause {
            literals: HashMap::default(),
            order: vec![],
            added: buffer,
        }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn contains(&self, variable: Variable) -> bool {
        self.literals.contains_key(&variable)
    }

    /// The literal over `variable` in the clause, if any.
    pub fn literal(&self, variable: Variable) -> Option<Literal> {
        self.literals.get(&variable).copied()
    }

    /// Add `literal` to the clause. Adding a literal that is already present has no effect.
    pub fn insert(&mut self, literal: Literal) {
        match self.literals.get(&literal.variable()) {
            Some(&existing) => {
                sat_assert_simple!(
                    existing == literal,
                    "explanation contains both {literal} and {existing}"
                );
            }
            None => {
                let _ = self.literals.insert(literal.variable(), literal);
                self.order.push(literal);
                self.added.push(literal);
            }
        }
    }

    /// Resolve the clause with `antecedent` on `pivot`: the literal over `pivot` is removed and
    /// every other literal of the antecedent is added.
    pub fn resolve(&mut self, pivot: Variable, antecedent: impl IntoIterator<Item = Literal>) {
        sat_assert_simple!(
            self.contains(pivot),
            "cannot resolve on {pivot}, it is not in the explanation"
        );

        // The stale entry in `order` is skipped when iterating.
        let _ = self.literals.remove(&pivot);

        for literal in antecedent {
            if literal.variable() != pivot {
                self.insert(literal);
            }
        }
    }

    /// The literals inserted since the previous call.
    pub fn take_added(&mut self) -> std::vec::Drain<'_, Literal> {
        self.added.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|literal| self.literals.get(&literal.variable()) == Some(literal))
            .unique()
    }

    /// Remove every literal for which `predicate` returns false.
    pub fn retain(&mut self, mut predicate: impl FnMut(Literal) -> bool) {
        self.order.retain(|&literal| predicate(literal));
        self.literals.retain(|_, literal| predicate(*literal));
    }

    /// Give up the clause, returning the buffer which tracked added literals.
    pub fn into_buffer(mut self) -> Vec<Literal> {
        self.added.clear();
        self.added
    }

    /// Freeze the clause into an [`Explanation`]. The literals are written into `buffer` with
    /// `asserted_literal` first, followed by the remaining literals by decreasing `level_of`.
    ///
    /// Also returns the buffer which tracked added literals, so it can be reused.
    pub fn finish(
        mut self,
        mut buffer: Vec<Literal>,
        asserted_literal: Literal,
        backjump_level: u32,
        conflict_level: u32,
        mut level_of: impl FnMut(Literal) -> u32,
    ) -> (Explanation, Vec<Literal>) {
        sat_assert_simple!(
            self.literal(asserted_literal.variable()) == Some(asserted_literal),
            "the asserted literal {asserted_literal} is not part of the explanation"
        );

        buffer.clear();
        buffer.push(asserted_literal);
        buffer.extend(
            self.iter()
                .filter(|&literal| literal != asserted_literal)
                .sorted_by_key(|&literal| std::cmp::Reverse(level_of(literal))),
        );

        self.added.clear();
        let explanation = Explanation {
            literals: buffer,
            asserted_literal,
            backjump_level,
            conflict_level,
        };
        (explanation, self.added)
    }
}

/// The result of analysing one conflict.
///
/// The literals form a clause that is false on the trail at the moment of the conflict. The first
/// literal is the asserted literal, the only literal at the conflict level. The second literal, if
/// any, is a literal at the backjump level. After backjumping the clause is unit and implies the
/// asserted literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    literals: Vec<Literal>,
    asserted_literal: Literal,
    backjump_level: u32,
    conflict_level: u32,
}

impl Explanation {
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// The literal that becomes true once the explanation is learned after backjumping.
    pub fn asserted_literal(&self) -> Literal {
        self.asserted_literal
    }

    /// The level to backjump to, strictly below the conflict level.
    pub fn backjump_level(&self) -> u32 {
        self.backjump_level
    }

    /// The level at which the conflict was found.
    pub fn conflict_level(&self) -> u32 {
        self.conflict_level
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Give up the literal buffer, e.g. to return it to a [`BufferPool`].
    ///
    /// [`BufferPool`]: crate::basic_types::BufferPool
    pub fn into_literals(self) -> Vec<Literal> {
        self.literals
    }
}

impl Display for Explanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}) asserting {} at level {}",
            self.literals.iter().join(" "),
            self.asserted_literal,
            self.backjump_level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(code: i32) -> Literal {
        Literal::from_dimacs(code)
    }

    #[test]
    fn resolution_removes_pivot_and_adds_the_rest() {
        let mut clause = ExplanationClause::new(vec![]);
        clause.insert(lit(-1));
        clause.insert(lit(-2));

        clause.resolve(Variable::new(2), [lit(2), lit(-3), lit(-1)]);

        assert_eq!(vec![lit(-1), lit(-3)], clause.iter().collect::<Vec<_>>());
        assert!(!clause.contains(Variable::new(2)));
    }

    #[test]
    fn added_literals_are_reported_once() {
        let mut clause = ExplanationClause::new(vec![]);
        clause.insert(lit(4));
        clause.insert(lit(4));

        assert_eq!(vec![lit(4)], clause.take_added().collect::<Vec<_>>());
        assert_eq!(0, clause.take_added().count());
    }

    #[test]
    #[should_panic(expected = "explanation contains both")]
    fn opposite_polarities_are_a_contract_violation() {
        let mut clause = ExplanationClause::new(vec![]);
        clause.insert(lit(4));
        clause.insert(lit(-4));
    }

    #[test]
    fn finished_explanation_puts_asserted_literal_first_then_highest_level() {
        let mut clause = ExplanationClause::new(vec![]);
        clause.insert(lit(-1));
        clause.insert(lit(-5));
        clause.insert(lit(-3));

        let levels = |literal: Literal| match literal.to_dimacs() {
            -1 => 1,
            -3 => 2,
            _ => 4,
        };
        let (explanation, _) = clause.finish(vec![], lit(-5), 2, 4, levels);

        assert_eq!(&[lit(-5), lit(-3), lit(-1)], explanation.literals());
        assert_eq!(2, explanation.backjump_level());
        assert_eq!(4, explanation.conflict_level());
    }
}
