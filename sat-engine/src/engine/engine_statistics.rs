use crate::basic_types::moving_averages::CumulativeMovingAverage;
use crate::create_statistics_struct;

create_statistics_struct!(
    /// Counters of the search performed through the [`Engine`](crate::Engine).
    EngineStatistics {
        /// The number of decisions asserted
        num_decisions: u64,
        /// The number of literals implied by clauses
        num_propagations: u64,
        /// The number of conflicts encountered
        num_conflicts: u64,
        /// The number of restarts performed
        num_restarts: u64,
        /// The number of learned clauses added to the clause store
        num_learned_clauses: u64,
        /// The number of learned clauses removed by forgetting
        num_forgotten_clauses: u64,
        /// The average length of the learned clauses
        average_learned_clause_length: CumulativeMovingAverage,
        /// The average number of levels undone by a backjump
        average_backjump_distance: CumulativeMovingAverage,
        /// The time spent between start and stop, in milliseconds
        time_spent_in_engine: u64,
});
