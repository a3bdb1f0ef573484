use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::num::NonZeroI32;
use std::ops::Not;

use crate::containers::StorageKey;
use crate::sat_assert_simple;

/// A propositional variable, identified by a positive integer in `1..=max_variable`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    id: u32,
}

impl Variable {
    pub fn new(id: u32) -> Variable {
        sat_assert_simple!(id > 0, "variable ids start at 1");
        sat_assert_simple!(id <= i32::MAX as u32, "variable id {id} cannot be used in a literal");
        Variable { id }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn positive(self) -> Literal {
        Literal::new(self, true)
    }

    pub fn negative(self) -> Literal {
        Literal::new(self, false)
    }
}

/// Variables are stored densely: variable `v` has index `v - 1`.
impl StorageKey for Variable {
    fn index(&self) -> usize {
        self.id as usize - 1
    }

    fn create_from_index(index: usize) -> Self {
        Variable::new(index as u32 + 1)
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}

impl Debug for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// A variable together with a polarity. Internally the literal is its DIMACS code: the absolute
/// value is the variable and the sign is the polarity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    code: NonZeroI32,
}

impl Literal {
    pub fn new(variable: Variable, is_positive: bool) -> Literal {
        let magnitude = variable.id() as i32;
        let code = if is_positive { magnitude } else { -magnitude };

        Literal {
            code: NonZeroI32::new(code).expect("variable ids are positive"),
        }
    }

    /// Convert a DIMACS literal into a [`Literal`]; the code must be non-zero.
    pub fn from_dimacs(code: i32) -> Literal {
        Literal::try_from_dimacs(code).expect("a DIMACS literal cannot be 0")
    }

    pub fn try_from_dimacs(code: i32) -> Option<Literal> {
        if code == i32::MIN {
            return None;
        }

        NonZeroI32::new(code).map(|code| Literal { code })
    }

    pub fn to_dimacs(self) -> i32 {
        self.code.get()
    }

    pub fn variable(self) -> Variable {
        Variable::new(self.code.unsigned_abs().get())
    }

    pub fn is_positive(self) -> bool {
        self.code.get() > 0
    }

    pub fn is_negative(self) -> bool {
        !self.is_positive()
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal { code: -self.code }
    }
}

/// Literals index watch lists: the positive literal of the variable with index `i` has index
/// `2i` and the negative literal has index `2i + 1`.
impl StorageKey for Literal {
    fn index(&self) -> usize {
        2 * self.variable().index() + usize::from(self.is_negative())
    }

    fn create_from_index(index: usize) -> Self {
        Literal::new(Variable::create_from_index(index / 2), index % 2 == 0)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl Debug for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_positive() {
            write!(f, "{}", self.variable())
        } else {
            write!(f, "~{}", self.variable())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_flips_polarity_but_keeps_variable() {
        let literal = Literal::from_dimacs(-4);

        assert!(literal.is_negative());
        assert!((!literal).is_positive());
        assert_eq!(literal.variable(), (!literal).variable());
        assert_eq!(4, (!literal).to_dimacs());
    }

    #[test]
    fn storage_index_round_trips_for_both_polarities() {
        let variable = Variable::new(7);

        for literal in [variable.positive(), variable.negative()] {
            assert_eq!(literal, Literal::create_from_index(literal.index()));
        }
        assert_ne!(variable.positive().index(), variable.negative().index());
    }

    #[test]
    fn zero_is_not_a_literal() {
        assert_eq!(None, Literal::try_from_dimacs(0));
        assert_eq!(None, Literal::try_from_dimacs(i32::MIN));
    }
}
