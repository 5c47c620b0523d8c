//! Encryption/decryption of text secrets using PBKDF2 + AES-256-GCM
//!
//! This module implements password-based encryption using:
//! - PBKDF2-HMAC-SHA256 (600,000 rounds) for key derivation from a password
//!   and a random 16-byte salt
//! - AES-256-GCM with a random 12-byte nonce for authenticated encryption
//!
//! The output is an [`Envelope`] encoded as text. Each call is independent:
//! salts, nonces and keys never outlive the call that created them.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::envelope::Envelope;
use crate::error::{ErrorCategory, ErrorKind, Result, SealnoteError};
use crate::kdf::{NONCE_LEN, Open, SALT_LEN, Seal, derive_key};

/// Encrypt `plaintext` with `password` using a fresh salt and nonce from the
/// operating system's secure random source.
///
/// Returns the encoded envelope.
pub fn encrypt(plaintext: &str, password: &str) -> Result<String> {
    encrypt_with_rng(&mut OsRng, plaintext, password)
}

/// Encrypt using salt and nonce drawn from the given random source.
///
/// A failing source aborts the call with
/// [`ErrorKind::PrimitiveUnavailable`] and no output.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    plaintext: &str,
    password: &str,
) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(rng, &mut salt)?;

    let mut nonce = [0u8; NONCE_LEN];
    fill_random(rng, &mut nonce)?;

    encrypt_deterministic(plaintext, password, &salt, &nonce)
}

/// Encrypt plaintext with a password using provided salt and nonce
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `encrypt()` which generates random salt/nonce.
pub fn encrypt_deterministic(
    plaintext: &str,
    password: &str,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<String> {
    Ok(seal(plaintext, password, salt, nonce)?.encode())
}

fn seal(
    plaintext: &str,
    password: &str,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Envelope> {
    let key = derive_key::<Seal>(password, salt);
    let ciphertext = key.seal(nonce, plaintext.as_bytes())?;

    tracing::debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "sealed secret"
    );

    Ok(Envelope::new(ciphertext, *salt, *nonce))
}

/// Decrypt an encoded envelope with a password.
///
/// The possible failures are [`ErrorKind::EmptyInput`],
/// [`ErrorKind::MalformedEnvelope`] and [`ErrorKind::AuthenticationFailed`].
/// A wrong password and a tampered envelope both produce the latter.
pub fn decrypt(envelope: &str, password: &str) -> Result<String> {
    Envelope::decode(envelope)
        .and_then(|envelope| open(&envelope, password))
        .inspect_err(|e| tracing::debug!(kind = ?e.kind, "decryption failed"))
}

/// Decrypt an already decoded envelope with a password.
pub fn open(envelope: &Envelope, password: &str) -> Result<String> {
    let key = derive_key::<Open>(password, envelope.salt());
    let plaintext = key.open(envelope.nonce(), envelope.ciphertext())?;

    String::from_utf8(plaintext).map_err(|e| {
        let cause = e.utf8_error();
        e.into_bytes().zeroize();
        SealnoteError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            "decrypted secret is not valid UTF-8 text",
            cause,
        )
    })
}

fn fill_random<R: RngCore + CryptoRng>(rng: &mut R, buf: &mut [u8]) -> Result<()> {
    rng.try_fill_bytes(buf).map_err(|e| {
        SealnoteError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::PrimitiveUnavailable,
            format!("secure random source unavailable: {}", e),
            e,
        )
    })
}
