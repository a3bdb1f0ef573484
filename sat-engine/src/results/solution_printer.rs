use std::io::Write;

use crate::engine::Trail;
use crate::Engine;
use crate::SolverState;

/// The column at which value lines are wrapped.
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// Writes the status line `s <STATUS>` and, for a satisfiable formula, the model as `v` lines.
///
/// The model lists one literal per variable in increasing order of variable, and ends with `0`.
/// Lines never exceed the line width and no literal is split across lines.
#[derive(Clone, Copy, Debug)]
pub struct SolutionPrinter {
    line_width: usize,
}

impl Default for SolutionPrinter {
    fn default() -> Self {
        SolutionPrinter::new(DEFAULT_LINE_WIDTH)
    }
}

impl SolutionPrinter {
    pub fn new(line_width: usize) -> SolutionPrinter {
        SolutionPrinter { line_width }
    }

    pub fn print(&self, engine: &Engine, output: &mut impl Write) -> std::io::Result<()> {
        self.print_status(engine.current_state(), output)?;
        if engine.current_state() == SolverState::Satisfiable {
            self.print_model(engine.trail(), output)?;
        }
        output.flush()
    }

    pub fn print_status(&self, state: SolverState, output: &mut impl Write) -> std::io::Result<()> {
        match state {
            SolverState::Satisfiable => writeln!(output, "s SATISFIABLE"),
            SolverState::Unsatisfiable => writeln!(output, "s UNSATISFIABLE"),
            SolverState::Unknown | SolverState::Conflict => writeln!(output, "s UNKNOWN"),
        }
    }

    /// Write the value of every assigned variable of `trail`.
    pub fn print_model(&self, trail: &Trail, output: &mut impl Write) -> std::io::Result<()> {
        let literals = trail
            .variables()
            .filter_map(|variable| {
                trail
                    .value(variable)
                    .map(|value| if value { variable.positive() } else { variable.negative() })
            })
            .map(|literal| literal.to_dimacs().to_string())
            .chain(std::iter::once("0".to_owned()));

        let mut line = String::from("v");
        for literal in literals {
            if line.len() + 1 + literal.len() > self.line_width && line.len() > 1 {
                writeln!(output, "{line}")?;
                line.truncate(1);
            }
            line.push(' ');
            line.push_str(&literal);
        }
        writeln!(output, "{line}")
    }
}
