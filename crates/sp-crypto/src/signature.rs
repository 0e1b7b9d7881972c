//! RSA signature verification.

use aws_lc_rs::signature::{self, UnparsedPublicKey, VerificationAlgorithm};
use thiserror::Error;

use crate::algorithm::RsaAlgorithm;

/// Errors produced by certificate handling and signature verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The certificate could not be decoded or parsed.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// The public key is unusable for the requested operation.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The algorithm is not supported.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The signature did not verify.
    #[error("signature verification failed: {0}")]
    Verification(String),
}

/// Verifies an RSA PKCS#1 v1.5 signature.
///
/// # Arguments
///
/// * `public_key` - RSA public key as a DER `RSAPublicKey` (PKCS#1), the
///   form carried in a certificate's `subjectPublicKey` bit string
/// * `data` - Original data that was signed
/// * `sig` - Signature to verify
/// * `algorithm` - Signature algorithm
///
/// # Errors
///
/// Returns [`CryptoError::Verification`] if the signature does not match.
pub fn rsa_verify(
    public_key: &[u8],
    data: &[u8],
    sig: &[u8],
    algorithm: RsaAlgorithm,
) -> Result<(), CryptoError> {
    if public_key.is_empty() {
        return Err(CryptoError::InvalidKey("empty RSA public key".to_string()));
    }

    let params: &'static dyn VerificationAlgorithm = match algorithm {
        RsaAlgorithm::RsaSha1 => &signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY,
        RsaAlgorithm::RsaSha256 => &signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY,
        RsaAlgorithm::RsaSha384 => &signature::RSA_PKCS1_2048_8192_SHA384,
        RsaAlgorithm::RsaSha512 => &signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY,
    };

    UnparsedPublicKey::new(params, public_key)
        .verify(data, sig)
        .map_err(|_| CryptoError::Verification(format!("{} signature mismatch", algorithm.uri())))
}
