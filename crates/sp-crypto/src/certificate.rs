//! X.509 certificates used as trust anchors.
//!
//! A [`Certificate`] keeps the DER encoding it was built from and is only
//! constructed after x509-parser accepted that encoding, so every instance
//! refers to a structurally valid certificate.

use std::fmt;

use base64::Engine;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::{FromDer, X509Certificate};
use x509_parser::public_key::PublicKey;

use crate::algorithm::{HashAlgorithm, RsaAlgorithm};
use crate::hash::{self, normalize_fingerprint};
use crate::signature::{rsa_verify, CryptoError};

/// A parsed X.509 certificate.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
}

impl Certificate {
    /// Builds a certificate from its DER encoding.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidCertificate`] if the bytes are not an
    /// X.509 certificate.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let der = der.into();
        let subject = {
            let (_, cert) = X509Certificate::from_der(&der)
                .map_err(|e| CryptoError::InvalidCertificate(e.to_string()))?;
            cert.subject().to_string()
        };
        Ok(Self { der, subject })
    }

    /// Builds a certificate from a PEM `CERTIFICATE` block.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidCertificate`] if no PEM block can be read.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let (_, pem) = parse_x509_pem(pem.trim().as_bytes())
            .map_err(|e| CryptoError::InvalidCertificate(format!("bad PEM: {e}")))?;
        if pem.label != "CERTIFICATE" {
            return Err(CryptoError::InvalidCertificate(format!(
                "expected CERTIFICATE PEM block, found {}",
                pem.label
            )));
        }
        Self::from_der(pem.contents)
    }

    /// Builds a certificate from bare base64 DER, as found in
    /// `ds:X509Certificate` elements. Embedded whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidCertificate`] if decoding or parsing fails.
    pub fn from_base64(data: &str) -> Result<Self, CryptoError> {
        let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
        let der = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| CryptoError::InvalidCertificate(format!("bad base64: {e}")))?;
        Self::from_der(der)
    }

    /// Builds a certificate from either PEM or bare base64 text.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidCertificate`] if neither form parses.
    pub fn parse(text: &str) -> Result<Self, CryptoError> {
        if text.contains("-----BEGIN") {
            Self::from_pem(text)
        } else {
            Self::from_base64(text)
        }
    }

    /// Returns the DER encoding.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the subject distinguished name.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the colon-separated uppercase hex fingerprint of the DER encoding.
    #[must_use]
    pub fn fingerprint(&self, algorithm: HashAlgorithm) -> String {
        hash::fingerprint(algorithm, &self.der)
    }

    /// Compares the certificate's fingerprint against a configured value,
    /// ignoring case and colons.
    #[must_use]
    pub fn matches_fingerprint(&self, expected: &str, algorithm: HashAlgorithm) -> bool {
        let expected = normalize_fingerprint(expected);
        !expected.is_empty() && hex::encode(hash::digest(algorithm, &self.der)) == expected
    }

    /// Returns the RSA public key as a DER `RSAPublicKey`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the certificate does not carry
    /// an RSA key.
    pub fn public_key(&self) -> Result<Vec<u8>, CryptoError> {
        let (_, cert) = X509Certificate::from_der(&self.der)
            .map_err(|e| CryptoError::InvalidCertificate(e.to_string()))?;
        let spki = cert.public_key();
        match spki.parsed() {
            Ok(PublicKey::RSA(_)) => Ok(spki.subject_public_key.data.to_vec()),
            Ok(_) => Err(CryptoError::InvalidKey("certificate key is not RSA".to_string())),
            Err(e) => Err(CryptoError::InvalidKey(e.to_string())),
        }
    }

    /// Verifies `sig` over `data` with this certificate's public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unusable or the signature does not match.
    pub fn verify(&self, algorithm: RsaAlgorithm, data: &[u8], sig: &[u8]) -> Result<(), CryptoError> {
        rsa_verify(&self.public_key()?, data, sig, algorithm)
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("sha1", &self.fingerprint(HashAlgorithm::Sha1))
            .finish()
    }
}
