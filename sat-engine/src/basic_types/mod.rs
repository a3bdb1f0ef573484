//! The value types shared by every part of the engine.
mod buffer_pool;
mod clause_id;
mod literal;
pub mod moving_averages;
pub mod sequence_generators;

pub use buffer_pool::BufferPool;
pub use clause_id::ClauseId;
pub use literal::Literal;
pub use literal::Variable;
