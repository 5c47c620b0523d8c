//! Text encoding of encrypted secrets
//!
//! An envelope is the only artifact that leaves the encrypting party:
//!
//! ```text
//! base64(ciphertext) "." base64(salt) "." base64(nonce)
//! ```
//!
//! Each component uses the standard base64 alphabet with padding. None of
//! them can contain `.`, so splitting is unambiguous. The envelope carries
//! everything except the password needed to decrypt it.

use std::fmt;
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{ErrorCategory, ErrorKind, Result, SealnoteError};
use crate::kdf::{NONCE_LEN, SALT_LEN, TAG_LEN};

/// Separator between the three envelope components
pub const DELIMITER: char = '.';

/// Number of components in every envelope
const COMPONENTS: usize = 3;

/// Decoded form of an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    ciphertext: Vec<u8>,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
}

impl Envelope {
    pub fn new(ciphertext: Vec<u8>, salt: [u8; SALT_LEN], nonce: [u8; NONCE_LEN]) -> Self {
        Self {
            ciphertext,
            salt,
            nonce,
        }
    }

    /// AES-GCM output including the trailing tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Encode as the transportable text token.
    pub fn encode(&self) -> String {
        format!(
            "{}{DELIMITER}{}{DELIMITER}{}",
            STANDARD.encode(&self.ciphertext),
            STANDARD.encode(self.salt),
            STANDARD.encode(self.nonce),
        )
    }

    /// Parse a text token.
    ///
    /// Surrounding whitespace is ignored. Fails with
    /// [`ErrorKind::EmptyInput`] when nothing is left, and with
    /// [`ErrorKind::MalformedEnvelope`] for a wrong component count, invalid
    /// base64, or components of the wrong size. No partial decoding is
    /// attempted once the component count is wrong.
    pub fn decode(token: &str) -> Result<Self> {
        let [ciphertext, salt, nonce] = split_components(token)?;

        let ciphertext = decode_component("ciphertext", ciphertext)?;
        if ciphertext.len() < TAG_LEN {
            return Err(SealnoteError::malformed(format!(
                "ciphertext is {} bytes; shorter than the {} byte authentication tag",
                ciphertext.len(),
                TAG_LEN
            )));
        }

        let salt = decode_fixed::<SALT_LEN>("salt", salt)?;
        let nonce = decode_fixed::<NONCE_LEN>("nonce", nonce)?;

        Ok(Self::new(ciphertext, salt, nonce))
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Envelope {
    type Err = SealnoteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

/// Structural check for parties that store envelopes without decrypting them.
///
/// Accepts any token with exactly three non-empty components. The
/// components are not base64-decoded.
pub fn check_shape(token: &str) -> Result<()> {
    let components = split_components(token)?;
    if let Some(position) = components.iter().position(|c| c.is_empty()) {
        return Err(SealnoteError::malformed(format!(
            "envelope component {} is empty",
            position + 1
        )));
    }
    Ok(())
}

fn split_components(token: &str) -> Result<[&str; COMPONENTS]> {
    let token = token.trim();
    if token.is_empty() {
        return Err(SealnoteError::with_kind(
            ErrorCategory::User,
            ErrorKind::EmptyInput,
            "no envelope provided",
        ));
    }

    let components: Vec<&str> = token.split(DELIMITER).collect();
    let found = components.len();
    components.try_into().map_err(|_| {
        SealnoteError::malformed(format!(
            "envelope has {} components; expected {}",
            found, COMPONENTS
        ))
    })
}

fn decode_component(name: &str, encoded: &str) -> Result<Vec<u8>> {
    STANDARD.decode(encoded).map_err(|e| {
        SealnoteError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            format!("base64 decoding of {} failed: {}", name, e),
            e,
        )
    })
}

fn decode_fixed<const N: usize>(name: &str, encoded: &str) -> Result<[u8; N]> {
    let bytes = decode_component(name, encoded)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        SealnoteError::malformed(format!("{} is {} bytes; expected {}", name, len, N))
    })
}
