//! Hash functions and certificate fingerprints.

use aws_lc_rs::digest as lc;

use crate::algorithm::HashAlgorithm;

/// Computes a hash of the input data.
#[must_use]
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    let alg = match algorithm {
        HashAlgorithm::Sha1 => &lc::SHA1_FOR_LEGACY_USE_ONLY,
        HashAlgorithm::Sha256 => &lc::SHA256,
        HashAlgorithm::Sha384 => &lc::SHA384,
        HashAlgorithm::Sha512 => &lc::SHA512,
    };

    lc::digest(alg, data).as_ref().to_vec()
}

/// Computes a SHA-1 hash of the input data.
#[must_use]
pub fn sha1(data: &[u8]) -> Vec<u8> {
    digest(HashAlgorithm::Sha1, data)
}

/// Computes a SHA-256 hash of the input data.
#[must_use]
pub fn sha256(data: &[u8]) -> Vec<u8> {
    digest(HashAlgorithm::Sha256, data)
}

/// Computes a SHA-384 hash of the input data.
#[must_use]
pub fn sha384(data: &[u8]) -> Vec<u8> {
    digest(HashAlgorithm::Sha384, data)
}

/// Computes a SHA-512 hash of the input data.
#[must_use]
pub fn sha512(data: &[u8]) -> Vec<u8> {
    digest(HashAlgorithm::Sha512, data)
}

/// Computes the colon-separated uppercase hex fingerprint of DER bytes.
///
/// This is the form IdP metadata and admin consoles usually display,
/// e.g. `AB:CD:01:...`.
#[must_use]
pub fn fingerprint(algorithm: HashAlgorithm, der: &[u8]) -> String {
    digest(algorithm, der)
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Normalizes a configured fingerprint for comparison.
///
/// Colons and surrounding whitespace are dropped and hex digits lowercased,
/// so `AB:CD` and `abcd` compare equal.
#[must_use]
pub fn normalize_fingerprint(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| *c != ':' && !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
