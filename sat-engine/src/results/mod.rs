//! Reporting the outcome of a search in the format of the SAT competitions.
mod solution_printer;

pub use solution_printer::SolutionPrinter;
pub use solution_printer::DEFAULT_LINE_WIDTH;
