// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Tests for the base64 AES-GCM helpers
// Ciphertexts carry the 16-byte tag and no AAD, as Web Crypto produces them

use base64::{engine::general_purpose::STANDARD, Engine as _};
use lnc_session::crypto::{
    auth_decrypt, auth_encrypt, generate_credentials_key, CryptoError, KeyUsage,
    SoftwareKeyProvider, SymmetricKeyProvider, IV_LEN,
};

#[cfg(test)]
mod aes_gcm_tests {
    use super::*;

    /// Test 1: Round trip with a generated credentials key
    #[tokio::test]
    async fn test_encrypt_decrypt_roundtrip() {
        let provider = SoftwareKeyProvider::new();
        let key = generate_credentials_key(&provider).await.unwrap();
        let plaintext = br#"{"localKey":"aa","remoteKey":"bb","pairingPhrase":"cc","serverHost":"dd"}"#;

        let payload = auth_encrypt(&provider, &key, plaintext).await.unwrap();
        let decrypted = auth_decrypt(&provider, &key, &payload.ciphertext_b64, &payload.iv_b64)
            .await
            .unwrap();

        assert_eq!(decrypted, plaintext);
    }

    /// Test 2: Output layout is ciphertext plus tag, IV is 12 bytes
    #[tokio::test]
    async fn test_payload_layout() {
        let provider = SoftwareKeyProvider::new();
        let key = generate_credentials_key(&provider).await.unwrap();

        let payload = auth_encrypt(&provider, &key, b"0123456789").await.unwrap();

        assert_eq!(STANDARD.decode(&payload.iv_b64).unwrap().len(), IV_LEN);
        assert_eq!(STANDARD.decode(&payload.ciphertext_b64).unwrap().len(), 10 + 16);
    }

    /// Test 3: Every call draws a fresh IV
    #[tokio::test]
    async fn test_iv_is_never_reused() {
        let provider = SoftwareKeyProvider::new();
        let key = generate_credentials_key(&provider).await.unwrap();

        let first = auth_encrypt(&provider, &key, b"same input").await.unwrap();
        let second = auth_encrypt(&provider, &key, b"same input").await.unwrap();

        assert_ne!(first.iv_b64, second.iv_b64);
        assert_ne!(first.ciphertext_b64, second.ciphertext_b64);
    }

    /// Test 4: Wrong key fails authentication
    #[tokio::test]
    async fn test_decrypt_wrong_key() {
        let provider = SoftwareKeyProvider::new();
        let key = generate_credentials_key(&provider).await.unwrap();
        let other = generate_credentials_key(&provider).await.unwrap();

        let payload = auth_encrypt(&provider, &key, b"secret").await.unwrap();
        let err = auth_decrypt(&provider, &other, &payload.ciphertext_b64, &payload.iv_b64)
            .await
            .unwrap_err();

        assert!(matches!(err, CryptoError::DecryptionFailed { .. }));
        assert!(err.to_string().starts_with("Credential decryption failed"));
    }

    /// Test 5: Corrupted ciphertext fails authentication
    #[tokio::test]
    async fn test_decrypt_corrupted_ciphertext() {
        let provider = SoftwareKeyProvider::new();
        let key = generate_credentials_key(&provider).await.unwrap();
        let payload = auth_encrypt(&provider, &key, b"data to corrupt").await.unwrap();

        let mut raw = STANDARD.decode(&payload.ciphertext_b64).unwrap();
        raw[3] ^= 0xFF;
        let corrupted = STANDARD.encode(raw);

        let result = auth_decrypt(&provider, &key, &corrupted, &payload.iv_b64).await;
        assert!(matches!(result, Err(CryptoError::DecryptionFailed { .. })));
    }

    /// Test 6: Malformed base64 and IV sizes are decryption failures
    #[tokio::test]
    async fn test_decrypt_malformed_inputs() {
        let provider = SoftwareKeyProvider::new();
        let key = generate_credentials_key(&provider).await.unwrap();
        let payload = auth_encrypt(&provider, &key, b"x").await.unwrap();

        let bad_base64 = auth_decrypt(&provider, &key, "not base64!!", &payload.iv_b64).await;
        assert!(matches!(bad_base64, Err(CryptoError::DecryptionFailed { .. })));

        let short_iv = STANDARD.encode([0u8; 8]);
        let bad_iv = auth_decrypt(&provider, &key, &payload.ciphertext_b64, &short_iv).await;
        assert!(matches!(bad_iv, Err(CryptoError::DecryptionFailed { .. })));
    }

    /// Test 7: Wrap-only keys cannot encrypt data
    #[tokio::test]
    async fn test_wrap_only_key_rejected_for_data() {
        let provider = SoftwareKeyProvider::new();
        let wrap_only = provider.generate_key(false, KeyUsage::WrapUnwrap).await.unwrap();

        let result = auth_encrypt(&provider, &wrap_only, b"data").await;
        assert!(matches!(result, Err(CryptoError::EncryptionFailed { .. })));
    }
}
