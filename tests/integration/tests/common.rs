//! Common test utilities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sp_crypto::{Certificate, CryptoError, HashAlgorithm, RsaAlgorithm};
use sp_integration_tests::{during_validity, fixture, AUDIENCE, IDP_CERT_SHA1};
use sp_saml::{Response, ResponseOptions, Settings, SignatureVerifier, XmlDsigVerifier};

/// Initializes tracing once for the test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("sp_saml=debug")
        .with_test_writer()
        .try_init();
}

/// Settings trusting the test IdP by SHA-1 fingerprint.
pub fn idp_settings() -> Settings {
    Settings::default()
        .with_fingerprint(IDP_CERT_SHA1)
        .with_sp_entity_id(AUDIENCE)
}

/// Options with the clock inside the fixtures' validity window.
pub fn in_window() -> ResponseOptions {
    ResponseOptions::default().at(during_validity())
}

/// Loads a fixture as a Response with the test IdP trusted.
pub fn load(name: &str) -> anyhow::Result<Response> {
    init_tracing();
    Ok(Response::new(&fixture(name)?, in_window())?.with_settings(idp_settings()))
}

/// The real verifier, counting how often it is consulted.
#[derive(Debug, Default)]
pub struct CountingVerifier {
    calls: AtomicUsize,
}

impl CountingVerifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SignatureVerifier for CountingVerifier {
    fn digest_matches(&self, algorithm: HashAlgorithm, canonical: &[u8], expected: &[u8]) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        XmlDsigVerifier.digest_matches(algorithm, canonical, expected)
    }

    fn verify_signature(
        &self,
        certificate: &Certificate,
        algorithm: RsaAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        XmlDsigVerifier.verify_signature(certificate, algorithm, message, signature)
    }
}
