//! Digest and signature verification.
//!
//! The cryptographic checks sit behind [`SignatureVerifier`] so the
//! Response pipeline can run with a substitute verifier in tests, while
//! canonicalization, certificate selection and fingerprint pinning stay in
//! [`verify_signed_element`] and always run.

use std::fmt;

use sp_crypto::{Certificate, CryptoError, HashAlgorithm, RsaAlgorithm};
use tracing::debug;

use super::locator::SignedElement;
use super::XmlSignature;
use crate::error::{ValidationError, ValidationErrorKind};
use crate::settings::TrustAnchor;

/// Cryptographic checks used by signature validation.
pub trait SignatureVerifier: fmt::Debug + Send + Sync {
    /// Returns true if `canonical` hashes to `expected` under `algorithm`.
    fn digest_matches(&self, algorithm: HashAlgorithm, canonical: &[u8], expected: &[u8]) -> bool;

    /// Verifies `signature` over `message` with the certificate's key.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature does not verify.
    fn verify_signature(
        &self,
        certificate: &Certificate,
        algorithm: RsaAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError>;
}

/// XML-DSig verification backed by `sp-crypto`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDsigVerifier;

impl SignatureVerifier for XmlDsigVerifier {
    fn digest_matches(&self, algorithm: HashAlgorithm, canonical: &[u8], expected: &[u8]) -> bool {
        sp_crypto::digest(algorithm, canonical) == expected
    }

    fn verify_signature(
        &self,
        certificate: &Certificate,
        algorithm: RsaAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        certificate.verify(algorithm, message, signature)
    }
}

/// Verifies one located signature against the trust anchor.
///
/// Order: the referenced element is canonicalized and its digest compared,
/// then the signing certificate is chosen (the configured one, or the
/// `KeyInfo` certificate after its fingerprint matched), then the signature
/// over `SignedInfo` is checked.
///
/// # Errors
///
/// Returns [`ValidationErrorKind::DigestMismatch`] for a digest mismatch and
/// [`ValidationErrorKind::SignatureInvalid`] for every other failure.
pub fn verify_signed_element(
    signed: &SignedElement<'_, '_>,
    anchor: &TrustAnchor,
    verifier: &dyn SignatureVerifier,
) -> Result<(), ValidationError> {
    let signature = XmlSignature::parse(signed.signature)?;

    let canonical = signature
        .reference
        .canonicalizer(signed.signature)
        .canonicalize(signed.element)?;
    if !verifier.digest_matches(
        signature.reference.digest_algorithm,
        &canonical,
        &signature.reference.digest_value,
    ) {
        debug!(
            reference = %signature.reference.uri,
            algorithm = %signature.reference.digest_algorithm,
            "digest mismatch"
        );
        return Err(ValidationError::new(
            ValidationErrorKind::DigestMismatch,
            "Digest mismatch",
        ));
    }

    let certificate = signing_certificate(&signature, anchor)?;

    let algorithm = signature.algorithm.rsa().ok_or_else(|| {
        ValidationError::signature(format!(
            "Unsupported signature algorithm: {}",
            signature.algorithm.uri()
        ))
    })?;

    let signed_info = signature.canonical_signed_info()?;
    verifier
        .verify_signature(
            &certificate,
            algorithm,
            &signed_info,
            &signature.signature_value,
        )
        .map_err(|e| {
            debug!(error = %e, "signature value rejected");
            ValidationError::signature("Signature verification failed")
        })
}

fn signing_certificate(
    signature: &XmlSignature<'_, '_>,
    anchor: &TrustAnchor,
) -> Result<Certificate, ValidationError> {
    match anchor {
        TrustAnchor::Certificate(cert) => Ok(cert.clone()),
        TrustAnchor::Fingerprint { value, algorithm } => {
            let embedded = signature.certificate.as_deref().ok_or_else(|| {
                ValidationError::signature("No X509Certificate in signature KeyInfo")
            })?;
            let cert = Certificate::from_base64(embedded).map_err(|e| {
                ValidationError::signature(format!("Invalid X509Certificate in KeyInfo: {e}"))
            })?;
            if !cert.matches_fingerprint(value, *algorithm) {
                debug!(
                    expected = %value,
                    actual = %cert.fingerprint(*algorithm),
                    "certificate fingerprint mismatch"
                );
                return Err(ValidationError::signature("Fingerprint mismatch"));
            }
            Ok(cert)
        }
    }
}
