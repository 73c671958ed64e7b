//! DES in electronic-codebook mode, no padding.
//!
//! Design notes:
//! - Blocks are independent, so any block-aligned chunk can be processed on
//!   any thread in any order and still match a serial pass.
//! - One key schedule is built per provider and shared by the encrypt and
//!   decrypt capabilities. `Des` holds only round keys and is `Sync`.
//! - Inputs that are not a whole number of 8-byte blocks are rejected rather
//!   than padded.

use std::fmt;
use std::sync::Arc;

use ::des::cipher::generic_array::GenericArray;
use ::des::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use ::des::Des;
use rand::RngCore;

use crate::constants::{DES_BLOCK_LEN, DES_KEY_LEN};
use crate::transform::types::{ensure_same_len, BlockTransform, Direction, TransformError};

/// 8-byte DES key. Debug output never includes the key bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; DES_KEY_LEN]);

impl SecretKey {
    /// Fresh random key with odd parity in every byte.
    pub fn generate() -> Self {
        let mut key = [0u8; DES_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        for b in key.iter_mut() {
            *b = with_odd_parity(*b);
        }
        Self(key)
    }

    pub fn from_slice(key: &[u8]) -> Result<Self, TransformError> {
        if key.len() != DES_KEY_LEN {
            return Err(TransformError::InvalidKeyLength {
                expected: DES_KEY_LEN,
                actual: key.len(),
            });
        }
        let mut arr = [0u8; DES_KEY_LEN];
        arr.copy_from_slice(key);
        Ok(Self(arr))
    }

    pub fn from_hex(s: &str) -> Result<Self, TransformError> {
        let raw = hex::decode(s.trim())
            .map_err(|e| TransformError::Failure(format!("invalid hex key: {e}")))?;
        Self::from_slice(&raw)
    }

    pub fn as_bytes(&self) -> &[u8; DES_KEY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// True when every byte has an odd number of set bits.
    pub fn has_odd_parity(&self) -> bool {
        self.0.iter().all(|b| b.count_ones() % 2 == 1)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Low bit of each DES key byte is parity over the upper seven.
fn with_odd_parity(b: u8) -> u8 {
    let high = b & 0xFE;
    high | ((high.count_ones() as u8 + 1) & 1)
}

/// DES-ECB over a shared key schedule, fixed to one direction.
#[derive(Clone)]
pub struct DesEcb {
    cipher: Arc<Des>,
    direction: Direction,
}

impl fmt::Debug for DesEcb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesEcb")
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

impl BlockTransform for DesEcb {
    fn apply(&self, input: &[u8], output: &mut [u8]) -> Result<(), TransformError> {
        ensure_same_len(input, output)?;
        if input.len() % DES_BLOCK_LEN != 0 {
            return Err(TransformError::NotBlockAligned {
                len: input.len(),
                block_len: DES_BLOCK_LEN,
            });
        }

        output.copy_from_slice(input);
        match self.direction {
            Direction::Forward => {
                for block in output.chunks_exact_mut(DES_BLOCK_LEN) {
                    self.cipher.encrypt_block(GenericArray::from_mut_slice(block));
                }
            }
            Direction::Inverse => {
                for block in output.chunks_exact_mut(DES_BLOCK_LEN) {
                    self.cipher.decrypt_block(GenericArray::from_mut_slice(block));
                }
            }
        }
        Ok(())
    }
}

/// Owns a secret key and hands out the encrypt/decrypt capabilities built
/// from it. Constructed once and reused across many calls.
pub struct DesTransformProvider {
    key: SecretKey,
    encryptor: Arc<DesEcb>,
    decryptor: Arc<DesEcb>,
}

impl DesTransformProvider {
    /// `None` generates a fresh random key.
    pub fn new(key: Option<SecretKey>) -> Result<Self, TransformError> {
        let key = key.unwrap_or_else(SecretKey::generate);
        let cipher = Des::new_from_slice(key.as_bytes()).map_err(|_| {
            TransformError::InvalidKeyLength {
                expected: DES_KEY_LEN,
                actual: key.as_bytes().len(),
            }
        })?;
        let cipher = Arc::new(cipher);

        Ok(Self {
            key,
            encryptor: Arc::new(DesEcb {
                cipher: Arc::clone(&cipher),
                direction: Direction::Forward,
            }),
            decryptor: Arc::new(DesEcb {
                cipher,
                direction: Direction::Inverse,
            }),
        })
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.key
    }

    /// Shared encrypting capability for the concurrency strategies.
    pub fn encryptor(&self) -> Arc<dyn BlockTransform> {
        self.encryptor.clone()
    }

    /// Shared decrypting capability for the concurrency strategies.
    pub fn decryptor(&self) -> Arc<dyn BlockTransform> {
        self.decryptor.clone()
    }

    /// Encrypt a whole block-aligned buffer on the calling thread.
    pub fn apply_forward(&self, bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.encryptor.apply_to_vec(bytes)
    }

    /// Decrypt a whole block-aligned buffer on the calling thread.
    pub fn apply_inverse(&self, bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.decryptor.apply_to_vec(bytes)
    }
}

impl fmt::Debug for DesTransformProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesTransformProvider")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_fix_sets_low_bit() {
        assert_eq!(with_odd_parity(0x00), 0x01);
        assert_eq!(with_odd_parity(0x01), 0x01);
        assert_eq!(with_odd_parity(0x03), 0x02);
        assert_eq!(with_odd_parity(0xFE), 0xFE);
    }

    #[test]
    fn debug_hides_key_material() {
        let key = SecretKey::from_slice(&[0xAB; DES_KEY_LEN]).unwrap();
        let dbg = format!("{:?}", key);
        assert!(!dbg.contains("171"));
        assert!(!dbg.to_lowercase().contains("ab"));
    }
}
