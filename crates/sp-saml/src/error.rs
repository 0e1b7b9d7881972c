//! SAML error types.
//!
//! [`SamlError`] covers failures while building a [`crate::Response`] or
//! loading settings. [`ValidationError`] is the typed reason a Response was
//! rejected by the validation pipeline.

use std::fmt;

use sp_crypto::CryptoError;
use thiserror::Error;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML processing errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// The payload or options cannot produce a Response.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Settings could not be read or parsed.
    #[error("settings error: {0}")]
    Settings(String),

    /// Cryptographic operation error.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The Response failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<roxmltree::Error> for SamlError {
    fn from(err: roxmltree::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<toml::de::Error> for SamlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Settings(err.to_string())
    }
}

/// Why a Response was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Malformed XML, missing mandatory elements, or an ambiguous signature layout.
    Structure,
    /// No settings, or settings without a usable certificate or fingerprint.
    MissingTrustAnchor,
    /// The recomputed digest differs from `DigestValue`.
    DigestMismatch,
    /// Signature verification failed, or the signing certificate is not trusted.
    SignatureInvalid,
    /// The assertion is outside its `NotBefore`/`NotOnOrAfter` window.
    ConditionsNotMet,
    /// The SP entity ID is not among the assertion's audiences.
    AudienceMismatch,
    /// The top-level status code is not `Success`.
    StatusNotSuccess,
}

impl ValidationErrorKind {
    /// Returns a stable code for logs and machine-readable output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "STRUCTURE",
            Self::MissingTrustAnchor => "MISSING_TRUST_ANCHOR",
            Self::DigestMismatch => "DIGEST_MISMATCH",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::ConditionsNotMet => "CONDITIONS_NOT_MET",
            Self::AudienceMismatch => "AUDIENCE_MISMATCH",
            Self::StatusNotSuccess => "STATUS_NOT_SUCCESS",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation failure with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Failure category.
    pub kind: ValidationErrorKind,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error.
    #[must_use]
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a [`ValidationErrorKind::Structure`] error.
    #[must_use]
    pub fn structure(message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::Structure, message)
    }

    /// Creates a [`ValidationErrorKind::SignatureInvalid`] error.
    #[must_use]
    pub fn signature(message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::SignatureInvalid, message)
    }
}
