#![allow(clippy::double_parens, reason = "originates inside the bitfield macro")]

use bitfield_struct::bitfield;

use crate::basic_types::ClauseId;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::sat_assert_moderate;
use crate::sat_assert_simple;

/// The assignment of a single variable, packed into one word so that the propagation loop touches
/// a single cache line per lookup.
#[bitfield(u32)]
struct AssignmentRecord {
    is_assigned: bool,
    truth_value: bool,
    is_decision: bool,
    #[bits(29)]
    level: u32,
}

/// The assignment trail: the value, decision level and reason of every variable, together with
/// the order in which the variables were assigned.
///
/// Levels are non-decreasing along the trail, which is what allows [`Trail::backjump`] to undo a
/// level by truncating a suffix.
#[derive(Debug, Default)]
pub struct Trail {
    records: KeyedVec<Variable, AssignmentRecord>,
    /// The clause which implied a variable. Only meaningful while the variable is assigned by
    /// propagation; it is cleared as soon as the variable is unassigned.
    antecedents: KeyedVec<Variable, Option<ClauseId>>,
    assignment_order: Vec<Literal>,
    /// `level_starts[i]` is the position on the trail at which level `i + 1` starts.
    level_starts: Vec<usize>,
}

impl Trail {
    /// The number of variables known to the trail.
    pub fn num_variables(&self) -> usize {
        self.records.len()
    }

    /// Make `variable`, and every variable with a smaller id, known to the trail.
    pub fn add_variable(&mut self, variable: Variable) {
        self.records.accommodate(variable, AssignmentRecord::new());
        self.antecedents.accommodate(variable, None);
    }

    /// Reserve room for `num_variables` variables so that adding them does not reallocate.
    pub fn ensure_capacity(&mut self, num_variables: usize) {
        let additional = num_variables.saturating_sub(self.records.len());
        self.records.reserve(additional);
        self.antecedents.reserve(additional);
        self.assignment_order
            .reserve(num_variables.saturating_sub(self.assignment_order.len()));
    }

    /// The highest decision level opened on the trail.
    pub fn current_level(&self) -> u32 {
        self.level_starts.len() as u32
    }

    /// The number of assigned variables.
    pub fn size(&self) -> usize {
        self.assignment_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignment_order.is_empty()
    }

    /// Record `literal` as a decision which opens `level`. Any level between the current level and
    /// `level` is opened as an empty level.
    pub fn assert_decision(&mut self, literal: Literal, level: u32) {
        sat_assert_simple!(
            level > self.current_level(),
            "decision level {level} must exceed the current level {}",
            self.current_level()
        );

        while self.current_level() < level {
            self.level_starts.push(self.assignment_order.len());
        }

        self.record(literal, level, true);
    }

    /// Record `literal` as implied at `level` by the clause `antecedent`.
    pub fn assert_implied(&mut self, literal: Literal, level: u32, antecedent: ClauseId) {
        sat_assert_simple!(
            level == self.current_level(),
            "implied literals are asserted at the current level {}, not at {level}",
            self.current_level()
        );

        self.record(literal, level, false);
        self.antecedents[literal.variable()] = Some(antecedent);
    }

    fn record(&mut self, literal: Literal, level: u32, is_decision: bool) {
        let variable = literal.variable();
        sat_assert_simple!(
            !self.is_set(variable),
            "variable {variable} is already assigned"
        );

        self.records[variable] = AssignmentRecord::new()
            .with_is_assigned(true)
            .with_truth_value(literal.is_positive())
            .with_is_decision(is_decision)
            .with_level(level);
        self.assignment_order.push(literal);
    }

    /// Undo the most recent assignment, which must be the assignment of `variable`.
    pub fn unset(&mut self, variable: Variable) {
        sat_assert_simple!(
            self.assignment_order.last().map(|literal| literal.variable()) == Some(variable),
            "only the most recently assigned variable can be unset"
        );

        let _ = self.assignment_order.pop();
        self.records[variable] = AssignmentRecord::new();
        self.antecedents[variable] = None;
    }

    /// Unassign every variable with a level greater than `level`, in reverse assignment order.
    pub fn backjump(&mut self, level: u32) {
        sat_assert_simple!(
            level < self.current_level(),
            "cannot backjump to level {level} from level {}",
            self.current_level()
        );

        let new_size = self.level_starts[level as usize];
        while self.assignment_order.len() > new_size {
            let variable = self.assignment_order[self.assignment_order.len() - 1].variable();
            self.unset(variable);
        }
        self.level_starts.truncate(level as usize);

        sat_assert_moderate!(self.debug_check_levels());
    }

    pub fn is_set(&self, variable: Variable) -> bool {
        self.records
            .get(variable)
            .is_some_and(|record| record.is_assigned())
    }

    pub fn get_level(&self, variable: Variable) -> u32 {
        sat_assert_simple!(self.is_set(variable), "variable {variable} is unassigned");
        self.records[variable].level()
    }

    pub fn is_decision(&self, variable: Variable) -> bool {
        sat_assert_simple!(self.is_set(variable), "variable {variable} is unassigned");
        self.records[variable].is_decision()
    }

    /// The clause which implied `variable`.
    pub fn get_antecedent(&self, variable: Variable) -> ClauseId {
        sat_assert_simple!(self.is_set(variable), "variable {variable} is unassigned");

        match self.antecedents[variable] {
            Some(antecedent) if !self.records[variable].is_decision() => antecedent,
            _ => panic!("only implied literals have antecedents, {variable} is a decision"),
        }
    }

    /// The truth value of `variable`, if it is assigned.
    pub fn value(&self, variable: Variable) -> Option<bool> {
        self.records
            .get(variable)
            .filter(|record| record.is_assigned())
            .map(|record| record.truth_value())
    }

    /// The truth value of `literal`, if its variable is assigned.
    pub fn literal_value(&self, literal: Literal) -> Option<bool> {
        self.value(literal.variable())
            .map(|value| value == literal.is_positive())
    }

    pub fn is_literal_true(&self, literal: Literal) -> bool {
        self.literal_value(literal) == Some(true)
    }

    pub fn is_literal_false(&self, literal: Literal) -> bool {
        self.literal_value(literal) == Some(false)
    }

    /// The literal assigned at `position`, counting from the bottom of the trail.
    pub fn literal_at(&self, position: usize) -> Literal {
        self.assignment_order[position]
    }

    /// The assigned literals, in assignment order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Literal> + '_ {
        self.assignment_order.iter().copied()
    }

    /// The literals assigned at `level`.
    pub fn literals_at_level(&self, level: u32) -> &[Literal] {
        sat_assert_simple!(level <= self.current_level());

        let start = if level == 0 {
            0
        } else {
            self.level_starts[level as usize - 1]
        };
        let end = self
            .level_starts
            .get(level as usize)
            .copied()
            .unwrap_or(self.assignment_order.len());

        &self.assignment_order[start..end]
    }

    /// The variables known to the trail, in increasing order of id.
    pub fn variables(&self) -> impl Iterator<Item = Variable> {
        (0..self.records.len()).map(Variable::create_from_index)
    }

    fn debug_check_levels(&self) -> bool {
        self.assignment_order
            .windows(2)
            .all(|pair| self.get_level(pair[0].variable()) <= self.get_level(pair[1].variable()))
    }
}
