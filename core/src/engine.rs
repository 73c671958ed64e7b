//! Stable public API: DES-ECB over a buffer, serially or through a
//! concurrency strategy.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::config::EngineConfig;
use crate::strategy::ConcurrencyStrategy;
use crate::transform::{BlockTransform, DesTransformProvider, SecretKey, TransformError};
use crate::types::EngineError;

/// Encrypts and decrypts buffers with one long-lived DES key.
///
/// `chunk_size` is the number of bytes handed to one task, not the cipher
/// block size. It should be a multiple of 8; a chunk that is not fails the
/// call with a transform error. Bytes past the last full chunk are left zero
/// in the output.
#[derive(Debug)]
pub struct DesEngine {
    provider: DesTransformProvider,
}

impl DesEngine {
    /// `None` generates a fresh random key.
    pub fn new(key: Option<SecretKey>) -> Result<Self, EngineError> {
        let provider = DesTransformProvider::new(key).map_err(|e| EngineError::Config(e.to_string()))?;
        Ok(Self { provider })
    }

    pub fn secret_key(&self) -> &SecretKey {
        self.provider.secret_key()
    }

    pub fn encryptor(&self) -> Arc<dyn BlockTransform> {
        self.provider.encryptor()
    }

    pub fn decryptor(&self) -> Arc<dyn BlockTransform> {
        self.provider.decryptor()
    }

    pub fn encrypt_parallel(
        &self,
        input: impl Into<Bytes>,
        worker_count: usize,
        chunk_size: usize,
        strategy: &dyn ConcurrencyStrategy,
    ) -> Result<Bytes, EngineError> {
        let input = input.into();
        debug!(strategy = %strategy.kind(), len = input.len(), "encrypt");
        strategy.encode(self.encryptor(), input, worker_count, chunk_size)
    }

    pub fn decrypt_parallel(
        &self,
        input: impl Into<Bytes>,
        worker_count: usize,
        chunk_size: usize,
        strategy: &dyn ConcurrencyStrategy,
    ) -> Result<Bytes, EngineError> {
        let input = input.into();
        debug!(strategy = %strategy.kind(), len = input.len(), "decrypt");
        strategy.decode(self.decryptor(), input, worker_count, chunk_size)
    }

    /// Encrypt with the strategy, workers, chunk size and deadline of `config`.
    pub fn encrypt_with(&self, input: impl Into<Bytes>, config: &EngineConfig) -> Result<Bytes, EngineError> {
        let strategy = config.build_strategy()?;
        self.encrypt_parallel(input, config.worker_count, config.chunk_size, strategy.as_ref())
    }

    /// Decrypt with the strategy, workers, chunk size and deadline of `config`.
    pub fn decrypt_with(&self, input: impl Into<Bytes>, config: &EngineConfig) -> Result<Bytes, EngineError> {
        let strategy = config.build_strategy()?;
        self.decrypt_parallel(input, config.worker_count, config.chunk_size, strategy.as_ref())
    }

    /// Single-threaded baseline over the whole buffer. No truncation: the
    /// buffer must be a whole number of DES blocks.
    pub fn encrypt_serial(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.provider.apply_forward(input)
    }

    /// Single-threaded baseline over the whole buffer.
    pub fn decrypt_serial(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.provider.apply_inverse(input)
    }
}
