//! XML Signature support.
//!
//! - [`locator`] decides which `ds:Signature` elements take part in
//!   validation and which assertion they make authoritative
//! - [`verifier`] checks their digests and signatures
//!
//! # Signature Algorithms
//!
//! RSA PKCS#1 v1.5 with SHA-1, SHA-256, SHA-384 or SHA-512. ECDSA URIs are
//! recognized but rejected as unsupported.

pub mod locator;
pub mod verifier;

use base64::Engine;
use roxmltree::Node;
use sp_crypto::{HashAlgorithm, RsaAlgorithm};

use crate::c14n::{CanonicalizationAlgorithm, Canonicalizer};
use crate::constants::{transforms, EXC_C14N_NS};
use crate::error::ValidationError;
use crate::extract::{find_all, find_first, is_element, paths, text_content};

/// Signature algorithm named by `SignatureMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// An RSA PKCS#1 v1.5 algorithm.
    Rsa(RsaAlgorithm),
    /// ECDSA with SHA-256.
    EcdsaSha256,
    /// ECDSA with SHA-384.
    EcdsaSha384,
    /// ECDSA with SHA-512.
    EcdsaSha512,
}

impl SignatureAlgorithm {
    /// Parses a signature algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        if let Some(rsa) = RsaAlgorithm::from_uri(uri) {
            return Some(Self::Rsa(rsa));
        }
        match uri {
            "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256" => Some(Self::EcdsaSha256),
            "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha384" => Some(Self::EcdsaSha384),
            "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha512" => Some(Self::EcdsaSha512),
            _ => None,
        }
    }

    /// Returns the URI for this algorithm.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Rsa(rsa) => rsa.uri(),
            Self::EcdsaSha256 => "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256",
            Self::EcdsaSha384 => "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha384",
            Self::EcdsaSha512 => "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha512",
        }
    }

    /// Returns the RSA algorithm, if this is one.
    #[must_use]
    pub const fn rsa(self) -> Option<RsaAlgorithm> {
        match self {
            Self::Rsa(rsa) => Some(rsa),
            _ => None,
        }
    }
}

/// A `ds:Transform` applied to the referenced element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Removes the enclosing Signature from the signed element.
    EnvelopedSignature,
    /// Canonicalizes the element.
    Canonicalize {
        /// Algorithm.
        algorithm: CanonicalizationAlgorithm,
        /// `InclusiveNamespaces` prefix list.
        inclusive_prefixes: Vec<String>,
    },
}

/// The single `ds:Reference` of a SAML signature.
#[derive(Debug, Clone)]
pub struct Reference {
    /// The `URI` attribute, e.g. `#_abc123`.
    pub uri: String,
    /// Transforms in document order.
    pub transforms: Vec<Transform>,
    /// Digest algorithm.
    pub digest_algorithm: HashAlgorithm,
    /// Decoded `DigestValue`.
    pub digest_value: Vec<u8>,
}

impl Reference {
    /// Builds the canonicalizer the transforms describe for a signature
    /// enveloped in the referenced element.
    ///
    /// Without an explicit canonicalization transform, Canonical XML 1.0 is
    /// applied, as XML-DSig requires when a node set becomes octets.
    #[must_use]
    pub fn canonicalizer(&self, signature: Node<'_, '_>) -> Canonicalizer {
        let mut canonicalizer = Canonicalizer::new(CanonicalizationAlgorithm::Inclusive);
        for transform in &self.transforms {
            if let Transform::Canonicalize {
                algorithm,
                inclusive_prefixes,
            } = transform
            {
                canonicalizer =
                    Canonicalizer::new(*algorithm).with_inclusive_prefixes(inclusive_prefixes.clone());
            }
        }
        if self.transforms.contains(&Transform::EnvelopedSignature) {
            canonicalizer = canonicalizer.excluding(signature);
        }
        canonicalizer
    }
}

/// A parsed `ds:Signature` element.
#[derive(Debug, Clone)]
pub struct XmlSignature<'a, 'input> {
    /// The `ds:SignedInfo` element.
    pub signed_info: Node<'a, 'input>,
    /// `SignedInfo` canonicalization algorithm.
    pub canonicalization: CanonicalizationAlgorithm,
    /// `SignedInfo` canonicalization prefix list.
    pub inclusive_prefixes: Vec<String>,
    /// Signature algorithm.
    pub algorithm: SignatureAlgorithm,
    /// The signed reference.
    pub reference: Reference,
    /// Decoded `SignatureValue`.
    pub signature_value: Vec<u8>,
    /// Base64 DER of the first `X509Certificate` in `KeyInfo`, if any.
    pub certificate: Option<String>,
}

impl<'a, 'input> XmlSignature<'a, 'input> {
    /// Parses a `ds:Signature` element.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ValidationErrorKind::SignatureInvalid`] error for
    /// missing parts, unknown algorithms or transforms, and undecodable values.
    pub fn parse(signature: Node<'a, 'input>) -> Result<Self, ValidationError> {
        let signed_info = single(signature, paths::SIGNED_INFO, "SignedInfo")?;

        let c14n_method = single(signature, paths::CANONICALIZATION_METHOD, "CanonicalizationMethod")?;
        let canonicalization = c14n_algorithm(c14n_method)?;
        let inclusive_prefixes = prefix_list(c14n_method);

        let method = single(signature, paths::SIGNATURE_METHOD, "SignatureMethod")?;
        let method_uri = method.attribute("Algorithm").unwrap_or_default();
        let algorithm = SignatureAlgorithm::from_uri(method_uri).ok_or_else(|| {
            ValidationError::signature(format!("Unsupported signature algorithm: {method_uri}"))
        })?;

        let reference = single(signature, paths::REFERENCE, "Reference")?;
        let reference = parse_reference(reference)?;

        let signature_value = single(signature, paths::SIGNATURE_VALUE, "SignatureValue")?;
        let signature_value = decode_base64(&text_content(signature_value), "SignatureValue")?;

        let certificate = find_first(signature, paths::X509_CERTIFICATE)
            .map(text_content)
            .map(|c| c.chars().filter(|ch| !ch.is_whitespace()).collect::<String>())
            .filter(|c| !c.is_empty());

        Ok(Self {
            signed_info,
            canonicalization,
            inclusive_prefixes,
            algorithm,
            reference,
            signature_value,
            certificate,
        })
    }

    /// Canonicalizes `SignedInfo`, the octets the signature value covers.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ValidationErrorKind::SignatureInvalid`] error when
    /// canonicalization fails.
    pub fn canonical_signed_info(&self) -> Result<Vec<u8>, ValidationError> {
        Canonicalizer::new(self.canonicalization)
            .with_inclusive_prefixes(self.inclusive_prefixes.clone())
            .canonicalize(self.signed_info)
    }
}

fn single<'a, 'input>(
    root: Node<'a, 'input>,
    path: crate::extract::FixedPath,
    what: &str,
) -> Result<Node<'a, 'input>, ValidationError> {
    let mut found = find_all(root, path);
    if found.len() != 1 {
        return Err(ValidationError::signature(format!(
            "Malformed signature: expected one {what}, found {}",
            found.len()
        )));
    }
    Ok(found.remove(0))
}

fn c14n_algorithm(method: Node<'_, '_>) -> Result<CanonicalizationAlgorithm, ValidationError> {
    let uri = method.attribute("Algorithm").unwrap_or_default();
    CanonicalizationAlgorithm::from_uri(uri)
        .ok_or_else(|| ValidationError::signature(format!("Unsupported canonicalization: {uri}")))
}

fn prefix_list(method: Node<'_, '_>) -> Vec<String> {
    method
        .children()
        .find(|n| is_element(*n, EXC_C14N_NS, "InclusiveNamespaces"))
        .and_then(|n| n.attribute("PrefixList"))
        .map(|list| list.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn parse_reference(reference: Node<'_, '_>) -> Result<Reference, ValidationError> {
    let uri = reference.attribute("URI").unwrap_or_default().to_string();

    let mut steps = Vec::new();
    for transform in find_all(reference, paths::TRANSFORM) {
        let alg = transform.attribute("Algorithm").unwrap_or_default();
        if alg == transforms::ENVELOPED_SIGNATURE {
            steps.push(Transform::EnvelopedSignature);
        } else if let Some(algorithm) = CanonicalizationAlgorithm::from_uri(alg) {
            steps.push(Transform::Canonicalize {
                algorithm,
                inclusive_prefixes: prefix_list(transform),
            });
        } else {
            return Err(ValidationError::signature(format!("Unsupported transform: {alg}")));
        }
    }

    let digest_method = single(reference, paths::DIGEST_METHOD, "DigestMethod")?;
    let digest_uri = digest_method.attribute("Algorithm").unwrap_or_default();
    let digest_algorithm = HashAlgorithm::from_digest_uri(digest_uri).ok_or_else(|| {
        ValidationError::signature(format!("Unsupported digest algorithm: {digest_uri}"))
    })?;

    let digest_value = single(reference, paths::DIGEST_VALUE, "DigestValue")?;
    let digest_value = decode_base64(&text_content(digest_value), "DigestValue")?;

    Ok(Reference {
        uri,
        transforms: steps,
        digest_algorithm,
        digest_value,
    })
}

fn decode_base64(text: &str, what: &str) -> Result<Vec<u8>, ValidationError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| ValidationError::signature(format!("Malformed {what}: {e}")))
}
