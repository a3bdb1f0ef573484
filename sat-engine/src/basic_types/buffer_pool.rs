use super::Literal;

/// A pool of reusable literal buffers.
///
/// Conflict analysis and clause learning need short-lived literal arrays on every conflict. The
/// pool hands out cleared buffers and takes them back once the caller is done, so that the
/// allocations are reused across conflicts. The pool is owned by a single [`Engine`] and is not
/// shared between threads.
///
/// [`Engine`]: crate::Engine
#[derive(Debug, Default)]
pub struct BufferPool {
    free: Vec<Vec<Literal>>,
    /// The capacity with which fresh buffers are allocated.
    buffer_capacity: usize,
    /// Buffers returned beyond this many are dropped instead of pooled.
    max_pooled: usize,
}

impl BufferPool {
    pub fn new(buffer_capacity: usize, max_pooled: usize) -> BufferPool {
        BufferPool {
            free: Vec::with_capacity(max_pooled),
            buffer_capacity,
            max_pooled,
        }
    }

    /// Take an empty buffer from the pool, allocating one if the pool is empty.
    pub fn acquire(&mut self) -> Vec<Literal> {
        self.free
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.buffer_capacity))
    }

    /// Return a buffer to the pool; its contents are discarded.
    pub fn release(&mut self, mut buffer: Vec<Literal>) {
        if self.free.len() < self.max_pooled {
            buffer.clear();
            self.free.push(buffer);
        }
    }

    pub fn num_pooled(&self) -> usize {
        self.free.len()
    }
}
