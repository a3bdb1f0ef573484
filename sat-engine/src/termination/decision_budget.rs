use super::TerminationCondition;

/// A [`TerminationCondition`] which triggers once the given number of decisions has been made.
#[derive(Debug, Copy, Clone)]
pub struct DecisionBudget {
    budget: u64,
    num_decisions: u64,
}

impl DecisionBudget {
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            num_decisions: 0,
        }
    }
}

impl TerminationCondition for DecisionBudget {
    fn should_stop(&mut self) -> bool {
        self.num_decisions >= self.budget
    }

    fn decision_has_been_made(&mut self) {
        self.num_decisions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_after_budget_is_spent() {
        let mut budget = DecisionBudget::new(2);

        budget.decision_has_been_made();
        assert!(!budget.should_stop());

        budget.decision_has_been_made();
        assert!(budget.should_stop());
    }
}
