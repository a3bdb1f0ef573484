//! Integer sequences which space out restarts.
mod constant_sequence;
mod geometric_sequence;
mod luby_sequence;

use std::fmt::Debug;
use std::fmt::Display;

use clap::ValueEnum;
pub use constant_sequence::ConstantSequence;
pub use geometric_sequence::GeometricSequence;
pub use luby_sequence::LubySequence;

/// An unbounded sequence of positive integers.
pub trait SequenceGenerator: Debug {
    fn next(&mut self) -> u64;
}

/// The kinds of sequence which can be selected from the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SequenceGeneratorType {
    Constant,
    Geometric,
    #[default]
    Luby,
}

impl SequenceGeneratorType {
    /// Create the generator, where `base` is the first element (or multiplier, for Luby) and
    /// `growth_factor` is only used by the geometric sequence.
    pub fn create(self, base: u64, growth_factor: f64) -> Box<dyn SequenceGenerator> {
        match self {
            SequenceGeneratorType::Constant => Box::new(ConstantSequence::new(base)),
            SequenceGeneratorType::Geometric => {
                Box::new(GeometricSequence::new(base, growth_factor))
            }
            SequenceGeneratorType::Luby => Box::new(LubySequence::new(base)),
        }
    }
}

impl Display for SequenceGeneratorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceGeneratorType::Constant => write!(f, "constant"),
            SequenceGeneratorType::Geometric => write!(f, "geometric"),
            SequenceGeneratorType::Luby => write!(f, "luby"),
        }
    }
}
