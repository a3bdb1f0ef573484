use std::fmt::Display;
use std::time::Duration;

use itertools::Itertools;

use crate::basic_types::sequence_generators::SequenceGeneratorType;
use crate::clause_stores::ClauseStoreKind;

/// The tunables of an [`Engine`](crate::Engine) and of the collaborators created from it.
///
/// The configuration is read when the engine and its collaborators are constructed and never
/// changes afterwards.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The initial amount by which the activity of a learned clause is bumped.
    pub clause_activity_bump: f64,
    /// The bump grows by `1 / clause_activity_decay` after every conflict, so that recent
    /// conflicts weigh more.
    pub clause_activity_decay: f64,
    /// Clause activities are scaled down once one of them would exceed this value.
    pub clause_activity_rebase_threshold: f64,
    /// Variable activities decay by this factor after every conflict.
    pub variable_activity_decay: f64,
    /// The sequence which spaces out restarts.
    pub restart_sequence: SequenceGeneratorType,
    /// The number of conflicts before the first restart; the sequence is scaled by it.
    pub restart_initial_conflicts: u64,
    /// The ratio between consecutive restart intervals of a geometric sequence.
    pub restart_growth_factor: f64,
    /// Forgetting is requested after every this many restarts; 0 disables forgetting.
    pub forget_interval: u64,
    /// The fraction of removable learned clauses that a forget removes.
    pub forget_fraction: f64,
    /// The number of literal buffers kept for reuse.
    pub buffer_pool_capacity: usize,
    /// The capacity with which literal buffers are allocated.
    pub buffer_capacity: usize,
    /// 0 is quiet; higher values log progress of the search.
    pub verbosity: u8,
    /// The wall-clock time after which the engine stops, if any.
    pub timeout: Option<Duration>,
    /// Seeds every random choice of the search.
    pub random_seed: u64,
    /// The clause stores to combine, in routing order.
    pub clause_stores: Vec<ClauseStoreKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            clause_activity_bump: 1.0,
            clause_activity_decay: 0.999,
            clause_activity_rebase_threshold: 1e20,
            variable_activity_decay: 0.95,
            restart_sequence: SequenceGeneratorType::Luby,
            restart_initial_conflicts: 50,
            restart_growth_factor: 1.5,
            forget_interval: 4,
            forget_fraction: 0.5,
            buffer_pool_capacity: 16,
            buffer_capacity: 64,
            verbosity: 0,
            timeout: None,
            random_seed: 42,
            clause_stores: vec![ClauseStoreKind::Binary, ClauseStoreKind::Watched],
        }
    }
}

impl Display for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "clause_activity_bump={}", self.clause_activity_bump)?;
        writeln!(f, "clause_activity_decay={}", self.clause_activity_decay)?;
        writeln!(
            f,
            "clause_activity_rebase_threshold={}",
            self.clause_activity_rebase_threshold
        )?;
        writeln!(f, "variable_activity_decay={}", self.variable_activity_decay)?;
        writeln!(f, "restart_sequence={}", self.restart_sequence)?;
        writeln!(
            f,
            "restart_initial_conflicts={}",
            self.restart_initial_conflicts
        )?;
        writeln!(f, "restart_growth_factor={}", self.restart_growth_factor)?;
        writeln!(f, "forget_interval={}", self.forget_interval)?;
        writeln!(f, "forget_fraction={}", self.forget_fraction)?;
        writeln!(f, "buffer_pool_capacity={}", self.buffer_pool_capacity)?;
        writeln!(f, "buffer_capacity={}", self.buffer_capacity)?;
        writeln!(f, "verbosity={}", self.verbosity)?;
        match self.timeout {
            Some(timeout) => writeln!(f, "timeout={}s", timeout.as_secs_f64())?,
            None => writeln!(f, "timeout=none")?,
        }
        writeln!(f, "random_seed={}", self.random_seed)?;
        write!(f, "clause_stores={}", self.clause_stores.iter().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_is_printed_on_its_own_line() {
        let config = EngineConfig {
            timeout: Some(Duration::from_millis(1500)),
            ..EngineConfig::default()
        };

        let printed = config.to_string();
        let lines = printed.lines().collect::<Vec<_>>();

        assert_eq!(15, lines.len());
        assert!(lines.contains(&"timeout=1.5s"));
        assert!(lines.contains(&"restart_sequence=luby"));
        assert_eq!(Some(&"clause_stores=binary,watched"), lines.last());
    }
}
