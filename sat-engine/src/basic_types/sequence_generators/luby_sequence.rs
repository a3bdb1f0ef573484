use super::SequenceGenerator;

/// The Luby sequence `1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, ...` scaled by a constant.
///
/// Each element is produced in constant time with Knuth's "reluctant doubling" pair `(u, v)`.
#[derive(Debug, Copy, Clone)]
pub struct LubySequence {
    u: i64,
    v: u64,
    scale: u64,
}

impl LubySequence {
    pub fn new(scale: u64) -> LubySequence {
        LubySequence { u: 1, v: 1, scale }
    }
}

impl SequenceGenerator for LubySequence {
    fn next(&mut self) -> u64 {
        let value = self.v;

        if (self.u & -self.u) as u64 == self.v {
            self.u += 1;
            self.v = 1;
        } else {
            self.v *= 2;
        }

        value.saturating_mul(self.scale)
    }
}
