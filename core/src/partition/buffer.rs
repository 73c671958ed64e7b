use bytes::{Bytes, BytesMut};

use crate::partition::types::{Chunk, Partition};
use crate::transform::BlockTransform;
use crate::types::EngineError;

/// A chunk ready for dispatch: a zero-copy view of its input bytes and
/// exclusive ownership of its output range.
#[derive(Debug)]
pub struct ChunkTask {
    chunk: Chunk,
    input: Bytes,
    output: BytesMut,
}

impl ChunkTask {
    pub fn chunk(&self) -> Chunk {
        self.chunk
    }

    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// Run the transform straight into this task's output range.
    pub fn run(mut self, transform: &dyn BlockTransform) -> Result<CompletedChunk, EngineError> {
        transform
            .apply(&self.input, &mut self.output)
            .map_err(|source| EngineError::Transform {
                chunk_index: self.chunk.index,
                source,
            })?;

        Ok(CompletedChunk {
            chunk: self.chunk,
            output: self.output,
        })
    }
}

/// A transformed output range on its way back to the reassembler.
#[derive(Debug)]
pub struct CompletedChunk {
    chunk: Chunk,
    output: BytesMut,
}

impl CompletedChunk {
    pub fn chunk(&self) -> Chunk {
        self.chunk
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

/// Collects completed ranges in any order and stitches them back into the
/// output buffer they were split from.
#[derive(Debug)]
pub struct Reassembler {
    partition: Partition,
    slots: Vec<Option<BytesMut>>,
    tail: BytesMut,
    completed: usize,
}

impl Reassembler {
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn pending(&self) -> usize {
        self.slots.len() - self.completed
    }

    pub fn place(&mut self, done: CompletedChunk) -> Result<(), EngineError> {
        let index = done.chunk.index;
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            EngineError::Reassembly(format!("chunk index {index} outside partition"))
        })?;
        if slot.is_some() {
            return Err(EngineError::Reassembly(format!("chunk {index} completed twice")));
        }
        if done.output.len() != done.chunk.len {
            return Err(EngineError::Reassembly(format!(
                "chunk {index} returned {} bytes, expected {}",
                done.output.len(),
                done.chunk.len
            )));
        }
        *slot = Some(done.output);
        self.completed += 1;
        Ok(())
    }

    /// Join every range back in partition order. Ranges are contiguous
    /// pieces of one allocation, so this does not copy.
    pub fn finish(self) -> Result<Bytes, EngineError> {
        if self.completed != self.slots.len() {
            return Err(EngineError::Reassembly(format!(
                "{} of {} chunks missing",
                self.slots.len() - self.completed,
                self.slots.len()
            )));
        }

        let mut out = BytesMut::new();
        for (index, slot) in self.slots.into_iter().enumerate() {
            let part = slot
                .ok_or_else(|| EngineError::Reassembly(format!("chunk {index} missing")))?;
            out.unsplit(part);
        }
        out.unsplit(self.tail);

        if out.len() != self.partition.buffer_len() {
            return Err(EngineError::Reassembly(format!(
                "reassembled {} bytes, expected {}",
                out.len(),
                self.partition.buffer_len()
            )));
        }
        Ok(out.freeze())
    }
}

impl Partition {
    /// Allocate the zero-filled output buffer and carve it into one task per
    /// chunk. The tail, if any, stays with the reassembler untouched.
    pub fn split(&self, input: Bytes) -> Result<(Vec<ChunkTask>, Reassembler), EngineError> {
        if input.len() != self.buffer_len() {
            return Err(EngineError::Validation(format!(
                "input is {} bytes but partition expects {}",
                input.len(),
                self.buffer_len()
            )));
        }

        let mut rest = BytesMut::zeroed(self.buffer_len());
        let mut tasks = Vec::with_capacity(self.chunk_count());
        for chunk in self.chunks() {
            tasks.push(ChunkTask {
                chunk,
                input: input.slice(chunk.range()),
                output: rest.split_to(chunk.len),
            });
        }

        let reassembler = Reassembler {
            partition: *self,
            slots: (0..self.chunk_count()).map(|_| None).collect(),
            tail: rest,
            completed: 0,
        };
        Ok((tasks, reassembler))
    }
}
