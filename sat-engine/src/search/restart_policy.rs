use crate::basic_types::sequence_generators::SequenceGenerator;
use crate::engine::EngineConfig;

/// Decides after how many conflicts the search restarts, and after how many restarts learned
/// clauses are forgotten.
///
/// The restart intervals follow [`EngineConfig::restart_sequence`], scaled by
/// [`EngineConfig::restart_initial_conflicts`].
#[derive(Debug)]
pub(crate) struct RestartPolicy {
    sequence_generator: Box<dyn SequenceGenerator>,
    num_conflicts_since_restart: u64,
    num_conflicts_until_restart: u64,
    /// Forgetting is requested every this many restarts; 0 never requests it.
    forget_interval: u64,
    num_restarts: u64,
}

impl RestartPolicy {
    pub(crate) fn new(config: &EngineConfig) -> RestartPolicy {
        let mut sequence_generator = config.restart_sequence.create(
            config.restart_initial_conflicts.max(1),
            config.restart_growth_factor,
        );
        let num_conflicts_until_restart = sequence_generator.next();

        RestartPolicy {
            sequence_generator,
            num_conflicts_since_restart: 0,
            num_conflicts_until_restart,
            forget_interval: config.forget_interval,
            num_restarts: 0,
        }
    }

    pub(crate) fn notify_conflict(&mut self) {
        self.num_conflicts_since_restart += 1;
    }

    pub(crate) fn should_restart(&self) -> bool {
        self.num_conflicts_since_restart >= self.num_conflicts_until_restart
    }

    /// Record a restart and return whether learned clauses should be forgotten at it.
    pub(crate) fn notify_restart(&mut self) -> bool {
        self.num_restarts += 1;
        self.num_conflicts_since_restart = 0;
        self.num_conflicts_until_restart = self.sequence_generator.next();

        self.forget_interval > 0 && self.num_restarts % self.forget_interval == 0
    }

    pub(crate) fn num_restarts(&self) -> u64 {
        self.num_restarts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::sequence_generators::SequenceGeneratorType;

    fn conflicts_until_restart(policy: &mut RestartPolicy) -> u64 {
        let mut num_conflicts = 0;
        while !policy.should_restart() {
            policy.notify_conflict();
            num_conflicts += 1;
        }
        num_conflicts
    }

    #[test]
    fn luby_intervals_are_scaled() {
        let mut policy = RestartPolicy::new(&EngineConfig {
            restart_sequence: SequenceGeneratorType::Luby,
            restart_initial_conflicts: 10,
            ..EngineConfig::default()
        });

        let mut intervals = vec![];
        for _ in 0..4 {
            intervals.push(conflicts_until_restart(&mut policy));
            let _ = policy.notify_restart();
        }

        assert_eq!(vec![10, 10, 20, 10], intervals);
        assert_eq!(4, policy.num_restarts());
    }

    #[test]
    fn forgetting_is_requested_every_interval() {
        let mut policy = RestartPolicy::new(&EngineConfig {
            forget_interval: 3,
            ..EngineConfig::default()
        });

        let requests = (0..6).map(|_| policy.notify_restart()).collect::<Vec<_>>();

        assert_eq!(vec![false, false, true, false, false, true], requests);
    }

    #[test]
    fn zero_interval_never_forgets() {
        let mut policy = RestartPolicy::new(&EngineConfig {
            forget_interval: 0,
            ..EngineConfig::default()
        });

        assert!((0..10).all(|_| !policy.notify_restart()));
    }
}
