#[cfg(test)]
mod tests {
    use des_parallel_core::engine::DesEngine;
    use des_parallel_core::transform::{BlockTransform, DesTransformProvider, SecretKey, TransformError};

    const KEY_HEX: &str = "133457799BBCDFF1";
    const PLAINTEXT: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];
    const CIPHERTEXT: [u8; 8] = [0x85, 0xE8, 0x13, 0x54, 0x0F, 0x0A, 0xB4, 0x05];

    fn known_provider() -> DesTransformProvider {
        DesTransformProvider::new(Some(SecretKey::from_hex(KEY_HEX).unwrap())).unwrap()
    }

    #[test]
    fn known_answer_single_block() {
        let p = known_provider();
        assert_eq!(p.apply_forward(&PLAINTEXT).unwrap(), CIPHERTEXT);
        assert_eq!(p.apply_inverse(&CIPHERTEXT).unwrap(), PLAINTEXT);
    }

    #[test]
    fn ecb_blocks_are_independent() {
        let p = known_provider();
        let mut two = PLAINTEXT.to_vec();
        two.extend_from_slice(&PLAINTEXT);

        let ct = p.apply_forward(&two).unwrap();
        assert_eq!(&ct[..8], &CIPHERTEXT);
        assert_eq!(&ct[8..], &CIPHERTEXT);
    }

    #[test]
    fn misaligned_input_is_rejected() {
        let p = known_provider();
        let err = p.apply_forward(&[0u8; 13]).unwrap_err();
        assert_eq!(err, TransformError::NotBlockAligned { len: 13, block_len: 8 });
    }

    #[test]
    fn output_length_must_match_input() {
        let p = known_provider();
        let mut out = [0u8; 8];
        let err = p.encryptor().apply(&[0u8; 16], &mut out).unwrap_err();
        assert_eq!(err, TransformError::LengthMismatch { input: 16, output: 8 });
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let p = known_provider();
        assert!(p.apply_forward(&[]).unwrap().is_empty());
    }

    #[test]
    fn shared_capabilities_match_whole_buffer_calls() {
        let p = known_provider();
        let fwd = p.encryptor().apply_to_vec(&PLAINTEXT).unwrap();
        let inv = p.decryptor().apply_to_vec(&fwd).unwrap();
        assert_eq!(fwd, CIPHERTEXT);
        assert_eq!(inv, PLAINTEXT);
    }

    #[test]
    fn generated_keys_have_odd_parity_and_differ() {
        let a = SecretKey::generate();
        let b = SecretKey::generate();
        assert!(a.has_odd_parity());
        assert!(b.has_odd_parity());
        assert_ne!(a, b);
    }

    #[test]
    fn key_hex_round_trips() {
        let key = SecretKey::from_hex(KEY_HEX).unwrap();
        assert_eq!(key.to_hex(), KEY_HEX.to_lowercase());
        assert!(key.has_odd_parity());
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        assert_eq!(
            SecretKey::from_slice(&[1u8; 7]).unwrap_err(),
            TransformError::InvalidKeyLength { expected: 8, actual: 7 }
        );
        assert!(SecretKey::from_hex("zz").is_err());
    }

    #[test]
    fn engine_serial_round_trip_keeps_key() {
        let key = SecretKey::from_hex(KEY_HEX).unwrap();
        let engine = DesEngine::new(Some(key.clone())).unwrap();
        assert_eq!(engine.secret_key(), &key);

        let data: Vec<u8> = (0..8 * 512).map(|i| (i * 7) as u8).collect();
        let ct = engine.encrypt_serial(&data).unwrap();
        assert_ne!(ct, data);
        assert_eq!(engine.decrypt_serial(&ct).unwrap(), data);
    }

    #[test]
    fn different_keys_give_different_ciphertext() {
        let a = DesEngine::new(None).unwrap();
        let b = DesEngine::new(None).unwrap();
        let data = [0u8; 64];
        assert_ne!(a.encrypt_serial(&data).unwrap(), b.encrypt_serial(&data).unwrap());
    }
}
