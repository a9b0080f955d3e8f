//! cipher.rs — at-rest encryption for biometric descriptor vectors.
//!
//! AES-256-GCM with a random 96-bit nonce per encryption. The key comes from
//! the caller's secret-provisioning capability; construction refuses an
//! all-zero key so the evaluator can never silently run with a known default.
//! Ciphertext is carried as a hex-encoded value object so it can live in any
//! JSON document the surrounding application stores.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expected descriptor length (face embedding size of the capture model).
pub const DESCRIPTOR_LEN: usize = 128;

/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("refusing to operate with an all-zero encryption key")]
    WeakKey,
    #[error("descriptor has wrong length: expected {DESCRIPTOR_LEN}, got {0}")]
    DescriptorLength(usize),
    #[error("descriptor contains a non-finite element at index {0}")]
    NonFiniteElement(usize),
    #[error("invalid {field} hex: {source}")]
    Hex {
        field: &'static str,
        source: hex::FromHexError,
    },
    #[error("invalid nonce length: expected {NONCE_LEN}, got {0}")]
    NonceLength(usize),
    #[error("encryption failed")]
    Encrypt,
    #[error("decryption failed: wrong key or corrupted ciphertext")]
    Decrypt,
    #[error("decrypted payload is not a valid descriptor")]
    Payload,
}

/// Encrypted payload: hex-encoded nonce + ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedDescriptor {
    pub nonce: String,
    pub ciphertext: String,
}

/// Symmetric cipher for descriptor vectors and sensitive metadata strings.
pub struct DescriptorCipher {
    cipher: Aes256Gcm,
}

impl DescriptorCipher {
    /// Build from a 32-byte key. An all-zero key is rejected.
    pub fn new(key: &[u8; 32]) -> Result<Self, CipherError> {
        if key.iter().all(|b| *b == 0) {
            return Err(CipherError::WeakKey);
        }
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::Encrypt)?;
        Ok(Self { cipher })
    }

    /// Encrypt a descriptor vector. Length and finiteness are validated
    /// before any ciphertext is produced.
    pub fn encrypt_descriptor(
        &self,
        descriptor: &[f32],
    ) -> Result<EncryptedDescriptor, CipherError> {
        validate_descriptor(descriptor)?;
        let plaintext =
            serde_json::to_vec(descriptor).map_err(|_| CipherError::Encrypt)?;
        self.encrypt_bytes(&plaintext)
    }

    /// Decrypt and re-validate a stored descriptor.
    pub fn decrypt_descriptor(
        &self,
        encrypted: &EncryptedDescriptor,
    ) -> Result<Vec<f32>, CipherError> {
        let plaintext = self.decrypt_bytes(encrypted)?;
        let descriptor: Vec<f32> =
            serde_json::from_slice(&plaintext).map_err(|_| CipherError::Payload)?;
        validate_descriptor(&descriptor)?;
        Ok(descriptor)
    }

    /// Encrypt an arbitrary sensitive-metadata string (e.g. a capture-device
    /// identifier the application stores next to the descriptor).
    pub fn encrypt_text(&self, text: &str) -> Result<EncryptedDescriptor, CipherError> {
        self.encrypt_bytes(text.as_bytes())
    }

    pub fn decrypt_text(&self, encrypted: &EncryptedDescriptor) -> Result<String, CipherError> {
        let plaintext = self.decrypt_bytes(encrypted)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::Payload)
    }

    fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<EncryptedDescriptor, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CipherError::Encrypt)?;

        Ok(EncryptedDescriptor {
            nonce: hex::encode(nonce_bytes),
            ciphertext: hex::encode(ciphertext),
        })
    }

    fn decrypt_bytes(&self, encrypted: &EncryptedDescriptor) -> Result<Vec<u8>, CipherError> {
        let nonce_bytes = hex::decode(&encrypted.nonce).map_err(|source| CipherError::Hex {
            field: "nonce",
            source,
        })?;
        let ciphertext =
            hex::decode(&encrypted.ciphertext).map_err(|source| CipherError::Hex {
                field: "ciphertext",
                source,
            })?;

        if nonce_bytes.len() != NONCE_LEN {
            return Err(CipherError::NonceLength(nonce_bytes.len()));
        }

        let nonce = Nonce::from_slice(&nonce_bytes);
        self.cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| CipherError::Decrypt)
    }
}

/// Reject anything that is not a well-formed descriptor before it reaches a
/// distance computation or the cipher.
pub fn validate_descriptor(descriptor: &[f32]) -> Result<(), CipherError> {
    if descriptor.len() != DESCRIPTOR_LEN {
        return Err(CipherError::DescriptorLength(descriptor.len()));
    }
    if let Some(i) = descriptor.iter().position(|v| !v.is_finite()) {
        return Err(CipherError::NonFiniteElement(i));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> DescriptorCipher {
        DescriptorCipher::new(&[7u8; 32]).unwrap()
    }

    fn sample_descriptor() -> Vec<f32> {
        (0..DESCRIPTOR_LEN).map(|i| (i as f32) * 0.01 - 0.5).collect()
    }

    #[test]
    fn descriptor_roundtrip() {
        let cipher = test_cipher();
        let d = sample_descriptor();
        let enc = cipher.encrypt_descriptor(&d).unwrap();
        let dec = cipher.decrypt_descriptor(&enc).unwrap();
        assert_eq!(dec, d);
    }

    #[test]
    fn text_roundtrip() {
        let cipher = test_cipher();
        let enc = cipher.encrypt_text("registered at RT 04 / RW 09").unwrap();
        assert_eq!(
            cipher.decrypt_text(&enc).unwrap(),
            "registered at RT 04 / RW 09"
        );
    }

    #[test]
    fn zero_key_is_refused() {
        assert!(matches!(
            DescriptorCipher::new(&[0u8; 32]),
            Err(CipherError::WeakKey)
        ));
    }

    #[test]
    fn wrong_length_descriptor_is_rejected_before_encryption() {
        let cipher = test_cipher();
        let short = vec![0.1f32; 64];
        assert!(matches!(
            cipher.encrypt_descriptor(&short),
            Err(CipherError::DescriptorLength(64))
        ));
    }

    #[test]
    fn non_finite_descriptor_is_rejected() {
        let cipher = test_cipher();
        let mut d = sample_descriptor();
        d[10] = f32::NAN;
        assert!(matches!(
            cipher.encrypt_descriptor(&d),
            Err(CipherError::NonFiniteElement(10))
        ));
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let enc = test_cipher().encrypt_descriptor(&sample_descriptor()).unwrap();
        let other = DescriptorCipher::new(&[9u8; 32]).unwrap();
        assert!(matches!(
            other.decrypt_descriptor(&enc),
            Err(CipherError::Decrypt)
        ));
    }

    #[test]
    fn corrupted_ciphertext_fails() {
        let cipher = test_cipher();
        let mut enc = cipher.encrypt_descriptor(&sample_descriptor()).unwrap();
        enc.ciphertext = "not-hex".to_string();
        assert!(cipher.decrypt_descriptor(&enc).is_err());

        let mut enc2 = cipher.encrypt_descriptor(&sample_descriptor()).unwrap();
        // Flip one hex digit inside the ciphertext.
        let flipped = if enc2.ciphertext.starts_with('0') { "1" } else { "0" };
        enc2.ciphertext.replace_range(0..1, flipped);
        assert!(matches!(
            cipher.decrypt_descriptor(&enc2),
            Err(CipherError::Decrypt)
        ));
    }

    #[test]
    fn same_plaintext_gets_distinct_nonces() {
        let cipher = test_cipher();
        let d = sample_descriptor();
        let a = cipher.encrypt_descriptor(&d).unwrap();
        let b = cipher.encrypt_descriptor(&d).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }
}
