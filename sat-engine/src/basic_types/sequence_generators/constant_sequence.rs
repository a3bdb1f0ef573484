use super::SequenceGenerator;

/// Repeats the same value forever.
#[derive(Debug, Copy, Clone)]
pub struct ConstantSequence {
    value: u64,
}

impl ConstantSequence {
    pub fn new(value: u64) -> ConstantSequence {
        ConstantSequence { value }
    }
}

impl SequenceGenerator for ConstantSequence {
    fn next(&mut self) -> u64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_never_changes() {
        let mut sequence = ConstantSequence::new(100);
        assert!((0..1000).all(|_| sequence.next() == 100));
    }
}
