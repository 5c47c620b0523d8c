use std::error::Error as StdError;

use thiserror::Error;

/// The one message callers should show for any failed decryption attempt.
///
/// Empty input, malformed envelopes and authentication failures all map to
/// this text so that a user interface never reveals which of them occurred.
pub const GENERIC_DECRYPT_MESSAGE: &str = "unable to decrypt - check your password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// In particular this means that use of Internal is never a guarantee
    /// the error is not, for example due to a user error - merely that it
    /// cannot be confidently determined by the code.
    Internal,

    /// The user provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No envelope was supplied at all.
    EmptyInput,
    /// The envelope does not have three components, a component is not
    /// valid base64, or a decoded component has the wrong size.
    MalformedEnvelope,
    /// The AEAD tag did not verify. Wrong passwords and tampered envelopes
    /// are deliberately indistinguishable.
    AuthenticationFailed,
    /// A platform primitive (such as the secure random source) failed.
    PrimitiveUnavailable,
    /// Passphrase could not be obtained from the configured reader.
    PassphraseUnavailable,
    /// Unexpected state reached within sealnote logic.
    InternalInvariant,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct SealnoteError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl SealnoteError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorCategory::User, ErrorKind::MalformedEnvelope, msg)
    }

    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorCategory::Internal, ErrorKind::InternalInvariant, msg)
    }

    /// The detailed message carried by the error.
    ///
    /// This may reveal why a decryption failed; use [`Self::user_message`]
    /// for anything shown to the person holding the password.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// True for the expected, user-recoverable outcomes of a decryption
    /// attempt: empty input, malformed envelope, failed authentication.
    pub fn is_decrypt_failure(&self) -> bool {
        matches!(
            self.kind,
            Some(ErrorKind::EmptyInput)
                | Some(ErrorKind::MalformedEnvelope)
                | Some(ErrorKind::AuthenticationFailed)
        )
    }

    /// Message suitable for display to an end user.
    ///
    /// All decryption failures collapse into [`GENERIC_DECRYPT_MESSAGE`].
    pub fn user_message(&self) -> &str {
        if self.is_decrypt_failure() {
            GENERIC_DECRYPT_MESSAGE
        } else {
            &self.msg
        }
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SealnoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_preserves_kind_and_category() {
        let err = SealnoteError::malformed("bad base64").with_context("failed to decrypt");

        assert_eq!(err.category, ErrorCategory::User);
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        assert_eq!(err.message(), "failed to decrypt");
        assert_eq!(err.source_error().unwrap().to_string(), "bad base64");
    }

    #[test]
    fn test_user_message_hides_decrypt_failure_reason() {
        let kinds = [
            ErrorKind::EmptyInput,
            ErrorKind::MalformedEnvelope,
            ErrorKind::AuthenticationFailed,
        ];
        for kind in kinds {
            let err = SealnoteError::with_kind(ErrorCategory::User, kind, "detail");
            assert!(err.is_decrypt_failure());
            assert_eq!(err.user_message(), GENERIC_DECRYPT_MESSAGE);
        }
    }

    #[test]
    fn test_user_message_passes_through_other_errors() {
        let err = SealnoteError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::PrimitiveUnavailable,
            "secure random source unavailable",
        );
        assert!(!err.is_decrypt_failure());
        assert_eq!(err.user_message(), "secure random source unavailable");

        let err = SealnoteError::new(ErrorCategory::Internal, "untagged");
        assert!(!err.is_decrypt_failure());
        assert_eq!(err.user_message(), "untagged");
    }
}
