//! # sp-crypto
//!
//! Cryptographic primitives used to validate SAML 2.0 responses, built on
//! aws-lc-rs and x509-parser.
//!
//! ## Legacy algorithms
//!
//! Identity providers in the wild still sign with RSA-SHA1 and publish SHA-1
//! certificate fingerprints. Those algorithms are accepted here because a
//! service provider does not choose what its IdP emits; callers that want to
//! refuse them can inspect [`HashAlgorithm::is_legacy`] before verifying.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod algorithm;
pub mod certificate;
pub mod hash;
pub mod signature;

pub use algorithm::{HashAlgorithm, RsaAlgorithm};
pub use certificate::Certificate;
pub use hash::{digest, fingerprint, normalize_fingerprint, sha1, sha256, sha384, sha512};
pub use signature::{rsa_verify, CryptoError};
