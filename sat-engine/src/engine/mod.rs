//! The CDCL kernel: the [`Engine`] state machine and the parts it is assembled from.
mod cdcl_engine;
mod conflict_analyzer;
mod engine_config;
mod engine_state;
mod engine_statistics;
mod explanation;
mod listeners;
pub(crate) mod propagation_context;
mod trail;

pub use cdcl_engine::Engine;
pub use conflict_analyzer::ConflictAnalyzer;
pub use engine_config::EngineConfig;
pub use engine_state::SolverState;
pub use engine_statistics::EngineStatistics;
pub use explanation::Explanation;
pub use explanation::ExplanationClause;
pub use listeners::EngineEvent;
pub use listeners::EngineListener;
pub use listeners::ListenerHandle;
pub use propagation_context::PropagationContext;
pub use trail::Trail;
