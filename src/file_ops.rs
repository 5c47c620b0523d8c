//! File encryption/decryption operations
//!
//! High-level operations that read secrets and envelopes from files, take
//! the password from a [`PassphraseReader`], and write results with
//! owner-only permissions.

use crate::error::{ErrorCategory, ErrorKind, Result, SealnoteError};
use crate::passphrase::PassphraseReader;
use crate::secretcrypt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use zeroize::Zeroizing;

/// Encrypt a text file with a password
///
/// Reads UTF-8 plaintext from `input_path`, encrypts it using a password from
/// `passphrase_reader`, and writes the envelope to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let plaintext = read_text(input_path)?;
    let passphrase = passphrase_reader.read_passphrase()?;
    let envelope = secretcrypt::encrypt(&plaintext, &passphrase)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(output_path, envelope.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    tracing::debug!(output = %output_path.display(), "wrote envelope");
    Ok(())
}

/// Decrypt an envelope file with a password
///
/// Reads the envelope from `input_path`, decrypts it using a password from
/// `passphrase_reader`, and writes the plaintext to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let envelope = read_text(input_path)?;
    let passphrase = passphrase_reader.read_passphrase()?;
    let plaintext = Zeroizing::new(
        secretcrypt::decrypt(&envelope, &passphrase)
            .map_err(|e| e.with_context("failed to decrypt"))?,
    );
    write_file_secure(output_path, plaintext.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    tracing::debug!(output = %output_path.display(), "wrote decrypted secret");
    Ok(())
}

/// Replace the secret in an envelope file while keeping the same password
///
/// This function:
/// 1. Decrypts the existing envelope at `crypt_path` to validate the password
/// 2. Reads new plaintext from `plain_path`
/// 3. Encrypts the new plaintext with the validated password (fresh salt and nonce)
/// 4. Atomically writes to `crypt_path` (tempfile + fsync + rename)
///
/// Either the old envelope or the new one exists afterwards, never a
/// partially written file.
pub fn update_file(
    plain_path: &Path,
    crypt_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let existing = read_text(crypt_path)?;
    let passphrase = passphrase_reader.read_passphrase()?;

    // Validate password by decrypting existing envelope (discard plaintext)
    let _verified = Zeroizing::new(
        secretcrypt::decrypt(&existing, &passphrase)
            .map_err(|e| e.with_context("failed to decrypt"))?,
    );

    let new_plaintext = read_text(plain_path)?;
    let envelope = secretcrypt::encrypt(&new_plaintext, &passphrase)
        .map_err(|e| e.with_context("failed to encrypt"))?;

    replace_atomically(crypt_path, envelope.as_bytes())?;

    tracing::debug!(output = %crypt_path.display(), "replaced envelope");
    Ok(())
}

fn replace_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        SealnoteError::with_kind(
            ErrorCategory::User,
            ErrorKind::Io,
            "crypt_path has no parent directory",
        )
    })?;
    let mut temp_file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to create tempfile", e))?;

    temp_file
        .write_all(contents)
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to flush tempfile", e))?;
    temp_file.as_file().sync_all().map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                io_error(
                    ErrorCategory::Internal,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }

    temp_file.persist(path).map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            format!("failed to rename to target file {}", path.display()),
            e.error,
        )
    })?;
    Ok(())
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;

        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| io_error(ErrorCategory::User, format!("failed to open {}", path.display()), e))?
    };

    #[cfg(not(unix))]
    let mut file = fs::File::create(path)
        .map_err(|e| io_error(ErrorCategory::User, format!("failed to open {}", path.display()), e))?;

    file.write_all(contents).map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            format!("failed to write {}", path.display()),
            e,
        )
    })
}

/// Read a whole file as UTF-8 text
fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        let category = if e.kind() == io::ErrorKind::NotFound {
            ErrorCategory::User
        } else {
            ErrorCategory::Internal
        };
        io_error(category, format!("failed to read from {}", path.display()), e)
    })?;
    String::from_utf8(bytes).map_err(|e| {
        SealnoteError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("{} is not valid UTF-8 text", path.display()),
            e.utf8_error(),
        )
    })
}

fn io_error(category: ErrorCategory, msg: impl Into<String>, err: io::Error) -> SealnoteError {
    SealnoteError::with_kind_and_source(category, ErrorKind::Io, msg, err)
}
