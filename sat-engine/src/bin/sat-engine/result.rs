use std::fmt::Display;

use thiserror::Error;

use crate::parsers::dimacs::DimacsParseError;

pub(crate) type SatEngineResult<T> = Result<T, SatEngineError>;

#[derive(Error, Debug)]
pub(crate) enum SatEngineError {
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Failed to read file {1}, more details: {0}")]
    FileReadingError(std::io::Error, String),
    #[error("The file {0} is not supported.")]
    InvalidInstanceFile(String),
    #[error("The dimacs file was invalid, more details: {0}")]
    InvalidDimacs(#[from] DimacsParseError),
}

impl SatEngineError {
    pub(crate) fn invalid_instance(path: impl Display) -> Self {
        Self::InvalidInstanceFile(format!("{path}"))
    }
}
