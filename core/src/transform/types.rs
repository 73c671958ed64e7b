use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// Input is not a whole number of cipher blocks.
    #[error("input length {len} is not a multiple of the {block_len}-byte block")]
    NotBlockAligned { len: usize, block_len: usize },

    /// Output slice does not match the input slice it should receive.
    #[error("output length mismatch: input={input}, output={output}")]
    LengthMismatch { input: usize, output: usize },

    /// Key material has the wrong length for the cipher.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Anything else a transform wants to report.
    #[error("transform failure: {0}")]
    Failure(String),
}

/// Which way a transform runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Inverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Forward => "forward",
            Direction::Inverse => "inverse",
        };
        f.write_str(name)
    }
}

/// A stateless, length-preserving chunk transform.
///
/// Same input chunk must give the same output chunk regardless of call order
/// or how many other calls run at the same time.
pub trait BlockTransform: Send + Sync {
    /// Transform `input` into `output`. Both slices have the same length.
    fn apply(&self, input: &[u8], output: &mut [u8]) -> Result<(), TransformError>;

    /// Allocating convenience over [`BlockTransform::apply`].
    fn apply_to_vec(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut out = vec![0u8; input.len()];
        self.apply(input, &mut out)?;
        Ok(out)
    }
}

/// Copies input to output. Measures pure dispatch overhead and makes the
/// partition visible in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl BlockTransform for IdentityTransform {
    fn apply(&self, input: &[u8], output: &mut [u8]) -> Result<(), TransformError> {
        ensure_same_len(input, output)?;
        output.copy_from_slice(input);
        Ok(())
    }
}

pub(crate) fn ensure_same_len(input: &[u8], output: &[u8]) -> Result<(), TransformError> {
    if input.len() != output.len() {
        return Err(TransformError::LengthMismatch {
            input: input.len(),
            output: output.len(),
        });
    }
    Ok(())
}
