use super::SequenceGenerator;

/// `f(0) = start` and `f(i) = floor(f(i - 1) * factor)`.
///
/// Since every element is rounded down before the next one is computed, this differs from
/// `start * factor^i` when the factor is fractional. The sequence saturates at [`u64::MAX`].
#[derive(Debug, Copy, Clone)]
pub struct GeometricSequence {
    current: u64,
    factor: f64,
}

impl GeometricSequence {
    pub fn new(start: u64, factor: f64) -> GeometricSequence {
        GeometricSequence {
            current: start,
            factor,
        }
    }
}

impl SequenceGenerator for GeometricSequence {
    fn next(&mut self) -> u64 {
        let value = self.current;
        // Float-to-int casts saturate.
        self.current = (self.current as f64 * self.factor) as u64;
        value
    }
}
