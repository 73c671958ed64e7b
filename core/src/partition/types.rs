use std::ops::Range;

use crate::types::EngineError;

/// One fixed-size byte range of the input and output buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunk {
    pub index: usize,
    pub offset: usize,
    pub len: usize,
}

impl Chunk {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Deterministic division of a buffer into chunks plus an untouched tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    buffer_len: usize,
    chunk_size: usize,
    chunk_count: usize,
}

impl Partition {
    pub fn new(buffer_len: usize, chunk_size: usize) -> Result<Self, EngineError> {
        if chunk_size == 0 {
            return Err(EngineError::Validation("chunk size must be at least 1".into()));
        }
        Ok(Self {
            buffer_len,
            chunk_size,
            chunk_count: buffer_len / chunk_size,
        })
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_count == 0
    }

    /// Bytes that belong to some chunk.
    pub fn covered_len(&self) -> usize {
        self.chunk_count * self.chunk_size
    }

    pub fn tail_len(&self) -> usize {
        self.buffer_len - self.covered_len()
    }

    /// Trailing range left untransformed (empty when `N` divides evenly).
    pub fn tail_range(&self) -> Range<usize> {
        self.covered_len()..self.buffer_len
    }

    pub fn chunk(&self, index: usize) -> Option<Chunk> {
        (index < self.chunk_count).then(|| Chunk {
            index,
            offset: index * self.chunk_size,
            len: self.chunk_size,
        })
    }

    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        (0..self.chunk_count).filter_map(move |i| self.chunk(i))
    }
}
