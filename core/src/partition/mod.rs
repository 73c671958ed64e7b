//! Partitioning of a buffer into fixed-size chunks and the shared output
//! buffer contract.
//!
//! A partition of a buffer of length `N` with chunk size `C` is
//! `floor(N / C)` chunks covering `[0, floor(N / C) * C)`, in increasing
//! offset order. The `N mod C` trailing bytes belong to no chunk: they are
//! never transformed and the output keeps them zero-filled.
//!
//! Output buffer contract:
//! - one zero-filled allocation of exactly `N` bytes per call
//! - every chunk task owns its own disjoint output range (no locks, no
//!   shared `&mut`)
//! - reassembly stitches the ranges back in partition order without copying

pub mod types;
pub mod buffer;

pub use types::{
    Chunk,
    Partition,
};

pub use buffer::{
    ChunkTask,
    CompletedChunk,
    Reassembler,
};
