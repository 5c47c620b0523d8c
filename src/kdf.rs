//! Password-based key derivation
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 and can only ever be used as
//! AES-256-GCM keys for one purpose: a [`DerivedKey<Seal>`] encrypts, a
//! [`DerivedKey<Open>`] decrypts, and no key does both.
//!
//! Parameters are fixed because envelopes do not carry them:
//! - salt: 16 bytes
//! - iterations: 600,000
//! - key: 32 bytes
//! - nonce: 12 bytes, tag: 16 bytes (AES-GCM)

use std::fmt;
use std::marker::PhantomData;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, Result, SealnoteError};

/// Length of salt in bytes
pub const SALT_LEN: usize = 16;

/// Length of the AES-GCM nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of derived key in bytes
pub const KEY_LEN: usize = 32;

/// Length of the AES-GCM authentication tag appended to every ciphertext
pub const TAG_LEN: usize = 16;

/// PBKDF2 iteration count
pub const PBKDF2_ROUNDS: u32 = 600_000;

mod private {
    pub trait Sealed {}
}

/// What a [`DerivedKey`] may be used for. Implemented only by [`Seal`] and [`Open`].
pub trait KeyPurpose: private::Sealed {}

/// Marker for encrypt-only keys.
#[derive(Debug)]
pub enum Seal {}

/// Marker for decrypt-only keys.
#[derive(Debug)]
pub enum Open {}

impl private::Sealed for Seal {}
impl private::Sealed for Open {}
impl KeyPurpose for Seal {}
impl KeyPurpose for Open {}

/// AES-256-GCM key material restricted to a single purpose.
///
/// The raw bytes are wiped when the key is dropped and are never exposed.
pub struct DerivedKey<P: KeyPurpose> {
    key: Zeroizing<[u8; KEY_LEN]>,
    _purpose: PhantomData<P>,
}

impl<P: KeyPurpose> fmt::Debug for DerivedKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Derive a single-purpose key from a password and salt.
///
/// Identical inputs always produce the identical key, which is what lets
/// decryption reproduce the encryption key from the salt in the envelope.
/// Empty passwords are accepted.
pub fn derive_key<P: KeyPurpose>(password: &str, salt: &[u8; SALT_LEN]) -> DerivedKey<P> {
    tracing::trace!(rounds = PBKDF2_ROUNDS, "deriving key");

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key[..]);

    DerivedKey {
        key,
        _purpose: PhantomData,
    }
}

impl<P: KeyPurpose> DerivedKey<P> {
    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key[..])
            .map_err(|_| SealnoteError::internal("derived key has invalid length for AES-256-GCM"))
    }
}

impl DerivedKey<Seal> {
    /// Encrypt `plaintext` without associated data.
    ///
    /// Returns the ciphertext with the 16-byte tag appended.
    pub fn seal(&self, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.cipher()?
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|_| SealnoteError::internal("AES-GCM encryption failed"))
    }
}

impl DerivedKey<Open> {
    /// Verify and decrypt `ciphertext` (which must include the trailing tag).
    pub fn open(&self, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.cipher()?
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                SealnoteError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::AuthenticationFailed,
                    "corrupt input, tampered-with data, or bad password",
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: [u8; SALT_LEN] = [0x42; SALT_LEN];
    const NONCE: [u8; NONCE_LEN] = [0x24; NONCE_LEN];

    #[test]
    fn test_seal_then_open_with_same_inputs() {
        let sealing = derive_key::<Seal>("correct-horse", &SALT);
        let opening = derive_key::<Open>("correct-horse", &SALT);

        let ciphertext = sealing.seal(&NONCE, b"hello world").unwrap();
        assert_eq!(ciphertext.len(), b"hello world".len() + TAG_LEN);

        let plaintext = opening.open(&NONCE, &ciphertext).unwrap();
        assert_eq!(plaintext, b"hello world");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_key::<Seal>("pw", &SALT).seal(&NONCE, b"x").unwrap();
        let b = derive_key::<Seal>("pw", &SALT).seal(&NONCE, b"x").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_known_answer() {
        // Empty password, empty plaintext, all-zero salt and nonce. Matches
        // WebCrypto PBKDF2(SHA-256, 600000) + AES-GCM-256.
        let key = derive_key::<Seal>("", &[0u8; SALT_LEN]);
        let ciphertext = key.seal(&[0u8; NONCE_LEN], b"").unwrap();

        #[rustfmt::skip]
        let expected: [u8; TAG_LEN] = [
            0xe1, 0x67, 0xe6, 0x45, 0x3a, 0xa3, 0x97, 0x7d,
            0xdb, 0x12, 0x40, 0xd0, 0x0a, 0xb1, 0xd4, 0xc2,
        ];
        assert_eq!(ciphertext, expected);
    }

    #[test]
    fn test_different_salt_fails_authentication() {
        let ciphertext = derive_key::<Seal>("pw", &SALT)
            .seal(&NONCE, b"hello")
            .unwrap();

        let err = derive_key::<Open>("pw", &[0x43; SALT_LEN])
            .open(&NONCE, &ciphertext)
            .unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
    }

    #[test]
    fn test_every_single_bit_flip_fails_authentication() {
        let sealing = derive_key::<Seal>("pw", &SALT);
        let opening = derive_key::<Open>("pw", &SALT);
        let ciphertext = sealing.seal(&NONCE, b"hello world").unwrap();

        for byte in 0..ciphertext.len() {
            for bit in 0..8 {
                let mut tampered = ciphertext.clone();
                tampered[byte] ^= 1 << bit;
                let err = opening.open(&NONCE, &tampered).unwrap_err();
                assert_eq!(
                    err.kind,
                    Some(ErrorKind::AuthenticationFailed),
                    "bit {} of byte {} was not detected",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn test_open_rejects_truncated_ciphertext() {
        let opening = derive_key::<Open>("pw", &SALT);
        let err = opening.open(&NONCE, &[0u8; TAG_LEN - 1]).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = derive_key::<Open>("pw", &SALT);
        assert_eq!(format!("{:?}", key), r#"DerivedKey { key: "<redacted>" }"#);
    }
}
