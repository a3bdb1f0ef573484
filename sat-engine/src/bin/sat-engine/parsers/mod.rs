//! Readers for the instance formats accepted by the binary.
pub(crate) mod dimacs;
