//! Shared fixtures for the end-to-end tests.
//!
//! The fixtures under `fixtures/` are SAML Responses signed with the test
//! IdP key whose certificate is `fixtures/idp-cert.pem`.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};

/// SHA-1 fingerprint of `idp-cert.pem`.
pub const IDP_CERT_SHA1: &str = "E3:9E:12:0C:89:64:A8:97:66:A9:DC:7E:62:75:E2:6B:DA:D9:1B:10";

/// SHA-256 fingerprint of `idp-cert.pem`.
pub const IDP_CERT_SHA256: &str =
    "FE:44:16:22:70:19:0F:75:51:84:AD:88:7C:A0:39:0D:C1:BD:CD:27:85:3F:B7:4E:8E:57:78:81:F2:0D:A1:D5";

/// Audience the fixtures are issued for.
pub const AUDIENCE: &str = "audience";

/// Returns the path of a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

/// Reads a fixture file.
pub fn fixture(name: &str) -> anyhow::Result<String> {
    let path = fixture_path(name);
    std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
}

/// The test IdP certificate, PEM encoded.
pub fn idp_cert_pem() -> anyhow::Result<String> {
    fixture("idp-cert.pem")
}

/// An instant inside the fixtures' `Conditions` window.
pub fn during_validity() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2011, 6, 14, 18, 25, 0)
        .single()
        .unwrap_or_default()
}
