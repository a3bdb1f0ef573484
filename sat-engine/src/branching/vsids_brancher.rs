use enumset::enum_set;
use enumset::EnumSet;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use super::Brancher;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyValueHeap;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::create_statistics_struct;
use crate::engine::EngineConfig;
use crate::engine::EngineEvent;
use crate::engine::EngineListener;
use crate::engine::Explanation;
use crate::engine::Trail;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// Activities are rescaled once one of them would reach this value.
const MAX_ACTIVITY: f64 = 1e100;
/// Initial activities are drawn from `[0, INITIAL_ACTIVITY_NOISE)` to break ties between fresh
/// variables.
const INITIAL_ACTIVITY_NOISE: f64 = 1e-5;

create_statistics_struct!(VsidsStatistics {
    num_bumps: u64,
    num_rescales: u64,
});

/// A [`Brancher`] which implements VSIDS with phase saving.
///
/// Every variable in a learned clause has its activity bumped, and the bump grows after every
/// conflict so that recent conflicts weigh more. The unassigned variable with the highest activity
/// is decided on, with the polarity it had when it was last unassigned.
#[derive(Debug)]
pub struct VsidsBrancher {
    heap: KeyValueHeap<Variable, f64>,
    increment: f64,
    decay_factor: f64,
    /// The polarity each variable had when it was last assigned.
    saved_phases: KeyedVec<Variable, bool>,
    rng: SmallRng,
    statistics: VsidsStatistics,
}

impl VsidsBrancher {
    pub fn new(config: &EngineConfig) -> VsidsBrancher {
        VsidsBrancher {
            heap: KeyValueHeap::default(),
            increment: 1.0,
            decay_factor: config.variable_activity_decay,
            saved_phases: KeyedVec::default(),
            rng: SmallRng::seed_from_u64(config.random_seed),
            statistics: VsidsStatistics::default(),
        }
    }

    pub fn activity(&self, variable: Variable) -> f64 {
        if variable.index() < self.heap.len() {
            self.heap.get_value(variable)
        } else {
            0.0
        }
    }

    /// Make room for the variables `1..=num_variables`.
    fn grow(&mut self, num_variables: usize) {
        while self.heap.len() < num_variables {
            let variable = Variable::new(self.heap.len() as u32 + 1);
            let noise = self.rng.gen::<f64>() * INITIAL_ACTIVITY_NOISE;
            self.heap.accommodate(variable, 0.0);
            self.heap.increment(variable, noise);
            self.saved_phases.accommodate(variable, false);
        }
    }

    fn bump_activity(&mut self, variable: Variable) {
        if self.heap.get_value(variable) + self.increment >= MAX_ACTIVITY {
            self.heap.divide_values(MAX_ACTIVITY);
            self.increment /= MAX_ACTIVITY;
            self.statistics.num_rescales += 1;
        }
        self.heap.increment(variable, self.increment);
        self.statistics.num_bumps += 1;
    }

    fn decay_activities(&mut self) {
        self.increment *= 1.0 / self.decay_factor;
    }
}

impl EngineListener for VsidsBrancher {
    fn subscribe_to_events(&self) -> EnumSet<EngineEvent> {
        enum_set!(EngineEvent::Explanation | EngineEvent::Backjump)
    }

    fn on_explanation(&mut self, explanation: &Explanation) {
        let max_variable = explanation
            .literals()
            .iter()
            .map(|literal| literal.variable().id() as usize)
            .max()
            .unwrap_or(0);
        self.grow(max_variable);

        for literal in explanation.literals() {
            self.bump_activity(literal.variable());
        }
        self.decay_activities();
    }

    fn on_backjump(&mut self, level: u32, trail: &Trail) {
        self.grow(trail.num_variables());

        for literal in trail
            .iter()
            .rev()
            .take_while(|literal| trail.get_level(literal.variable()) > level)
        {
            let variable = literal.variable();
            self.saved_phases[variable] = literal.is_positive();
            self.heap.restore_key(variable);
        }
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger.attach_to_prefix("vsids"));
    }
}

impl Brancher for VsidsBrancher {
    fn next_decision(&mut self, trail: &Trail) -> Option<Literal> {
        self.grow(trail.num_variables());

        while let Some((candidate, _)) = self.heap.peek_max() {
            if trail.is_set(candidate) {
                let _ = self.heap.pop_max();
            } else {
                return Some(Literal::new(candidate, self.saved_phases[candidate]));
            }
        }

        None
    }
}
