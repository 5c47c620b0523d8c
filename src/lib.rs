//! Sealnote - Password-based encryption envelopes for short text secrets
//!
//! A secret is encrypted with AES-256-GCM under a key derived from a
//! password with PBKDF2-HMAC-SHA256, and packed into a single text token:
//!
//! ```text
//! base64(ciphertext) "." base64(salt) "." base64(nonce)
//! ```
//!
//! ```no_run
//! let envelope = sealnote::encrypt("hello world", "correct-horse")?;
//! assert_eq!(sealnote::decrypt(&envelope, "correct-horse")?, "hello world");
//! # Ok::<(), sealnote::SealnoteError>(())
//! ```

#![forbid(unsafe_code)]

pub mod envelope;
pub mod error;
pub mod file_ops;
pub mod kdf;
pub mod passphrase;
pub mod secretcrypt;

pub use envelope::Envelope;
pub use error::{ErrorCategory, ErrorKind, Result, SealnoteError};
pub use secretcrypt::{decrypt, encrypt};
