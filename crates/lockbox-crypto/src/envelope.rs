//! AES-256-GCM envelope seal/open.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lockbox_core::models::secret::Envelope;

use crate::error::CryptoError;

/// 96-bit nonce, as recommended for GCM.
pub const NONCE_LEN: usize = 12;

/// 128-bit GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Process-wide 256-bit symmetric key, supplied once at startup.
#[derive(Clone)]
pub struct EnvelopeKey([u8; 32]);

impl EnvelopeKey {
    /// Decode a base64-encoded key, rejecting anything that is not
    /// exactly 32 bytes. A misconfigured key is a fatal startup
    /// condition for the server.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::KeyDecode(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength)?;
        Ok(Self(key))
    }
}

impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("EnvelopeKey(..)")
    }
}

/// Seals and opens secret values under the process-wide key.
///
/// Every seal draws a fresh random nonce, so sealing the same
/// plaintext twice yields different ciphertexts.
#[derive(Clone)]
pub struct EnvelopeManager {
    key: EnvelopeKey,
}

impl EnvelopeManager {
    pub fn new(key: EnvelopeKey) -> Self {
        Self { key }
    }

    /// Encrypt a plaintext into a (ciphertext, nonce, tag) triple.
    ///
    /// The ciphertext has the same length as the plaintext; the tag is
    /// split off and kept as a separate field.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Envelope, CryptoError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key.0));
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let mut ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

        // The AEAD API appends the tag to the ciphertext.
        let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

        Ok(Envelope {
            ciphertext,
            nonce: nonce_bytes.to_vec(),
            tag,
        })
    }

    /// Decrypt an envelope, verifying the tag before returning any
    /// plaintext. Any corruption of ciphertext, nonce, or tag — or a
    /// wrong key — fails with [`CryptoError::Integrity`].
    pub fn open(&self, envelope: &Envelope) -> Result<Vec<u8>, CryptoError> {
        if envelope.nonce.len() != NONCE_LEN || envelope.tag.len() != TAG_LEN {
            return Err(CryptoError::Integrity);
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key.0));
        let nonce = Nonce::from_slice(&envelope.nonce);

        let mut combined = envelope.ciphertext.clone();
        combined.extend_from_slice(&envelope.tag);

        cipher
            .decrypt(nonce, combined.as_ref())
            .map_err(|_| CryptoError::Integrity)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn manager() -> EnvelopeManager {
        EnvelopeManager::new(EnvelopeKey::from_bytes(&[42u8; 32]).unwrap())
    }

    #[test]
    fn seal_open_roundtrip() {
        let mgr = manager();
        let plaintext = b"sk-live-0123456789";
        let envelope = mgr.seal(plaintext).unwrap();
        let opened = mgr.open(&envelope).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn ciphertext_length_equals_plaintext_length() {
        let mgr = manager();
        for len in [0usize, 1, 16, 17, 255, 4096] {
            let plaintext = vec![0xABu8; len];
            let envelope = mgr.seal(&plaintext).unwrap();
            assert_eq!(envelope.ciphertext.len(), len);
            assert_eq!(envelope.nonce.len(), NONCE_LEN);
            assert_eq!(envelope.tag.len(), TAG_LEN);
        }
    }

    #[test]
    fn bit_flip_in_ciphertext_fails() {
        let mgr = manager();
        let mut envelope = mgr.seal(b"critical").unwrap();
        envelope.ciphertext[0] ^= 0x01;
        assert!(matches!(
            mgr.open(&envelope).unwrap_err(),
            CryptoError::Integrity
        ));
    }

    #[test]
    fn bit_flip_in_nonce_fails() {
        let mgr = manager();
        let mut envelope = mgr.seal(b"critical").unwrap();
        envelope.nonce[3] ^= 0x80;
        assert!(matches!(
            mgr.open(&envelope).unwrap_err(),
            CryptoError::Integrity
        ));
    }

    #[test]
    fn bit_flip_in_tag_fails() {
        let mgr = manager();
        let mut envelope = mgr.seal(b"critical").unwrap();
        envelope.tag[TAG_LEN - 1] ^= 0x01;
        assert!(matches!(
            mgr.open(&envelope).unwrap_err(),
            CryptoError::Integrity
        ));
    }

    #[test]
    fn wrong_key_fails() {
        let mgr = manager();
        let envelope = mgr.seal(b"secret").unwrap();

        let other = EnvelopeManager::new(EnvelopeKey::from_bytes(&[99u8; 32]).unwrap());
        assert!(matches!(
            other.open(&envelope).unwrap_err(),
            CryptoError::Integrity
        ));
    }

    #[test]
    fn truncated_nonce_or_tag_rejected() {
        let mgr = manager();
        let envelope = mgr.seal(b"secret").unwrap();

        let mut short_nonce = envelope.clone();
        short_nonce.nonce.pop();
        assert!(mgr.open(&short_nonce).is_err());

        let mut short_tag = envelope;
        short_tag.tag.pop();
        assert!(mgr.open(&short_tag).is_err());
    }

    #[test]
    fn nonces_are_pairwise_distinct() {
        let mgr = manager();
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let envelope = mgr.seal(b"same plaintext").unwrap();
            assert!(seen.insert(envelope.nonce), "nonce repeated");
        }
    }

    #[test]
    fn sealing_same_plaintext_twice_differs() {
        let mgr = manager();
        let a = mgr.seal(b"sk-123").unwrap();
        let b = mgr.seal(b"sk-123").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn key_from_base64_validates_length() {
        let ok = STANDARD.encode([7u8; 32]);
        assert!(EnvelopeKey::from_base64(&ok).is_ok());

        let short = STANDARD.encode([7u8; 16]);
        assert!(matches!(
            EnvelopeKey::from_base64(&short).unwrap_err(),
            CryptoError::InvalidKeyLength
        ));

        assert!(matches!(
            EnvelopeKey::from_base64("not base64!!").unwrap_err(),
            CryptoError::KeyDecode(_)
        ));
    }
}
