//! Byte-block transforms applied to one chunk at a time.
//!
//! A transform is:
//! - shared by `Arc` across every task of a call
//! - invoked concurrently without synchronization
//! - length preserving (output.len() == input.len())
//!
//! The `Send + Sync` bound on [`BlockTransform`] is the reentrancy contract:
//! an implementation that keeps per-call mutable state must guard it itself.

pub mod types;
pub mod des_ecb;

pub use types::{
    BlockTransform,
    Direction,
    IdentityTransform,
    TransformError,
};

pub use des_ecb::{
    DesEcb,
    DesTransformProvider,
    SecretKey,
};
