//! Signature and digest verification over signed fixtures.

use base64::Engine;
use sp_integration_tests::{fixture, idp_cert_pem, IDP_CERT_SHA256};
use sp_saml::{
    Response, ResponseOptions, Settings, ValidationErrorKind, ValidationStage,
};
use sp_crypto::HashAlgorithm;

use crate::common::{idp_settings, in_window, init_tracing, load};

#[test]
fn signed_assertion_validates_with_sha1_fingerprint() -> anyhow::Result<()> {
    let response = load("response_signed_assertion.xml")?;
    response.validate()?;
    assert!(response.is_valid());
    assert_eq!(response.validation_outcome().stage, ValidationStage::Valid);
    Ok(())
}

#[test]
fn sha256_fingerprint_in_any_notation() -> anyhow::Result<()> {
    init_tracing();
    let compact = IDP_CERT_SHA256.replace(':', "").to_lowercase();
    for fingerprint in [IDP_CERT_SHA256.to_string(), compact] {
        let settings = Settings::default()
            .with_fingerprint(fingerprint)
            .with_fingerprint_algorithm(HashAlgorithm::Sha256);
        let response = Response::new(&fixture("response_signed_assertion.xml")?, in_window())?
            .with_settings(settings);
        response.validate()?;
    }
    Ok(())
}

#[test]
fn configured_certificate_is_used() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::default().with_idp_cert(idp_cert_pem()?);
    let response = Response::new(&fixture("response_signed_assertion.xml")?, in_window())?
        .with_settings(settings);
    response.validate()?;
    Ok(())
}

#[test]
fn base64_payloads_are_decoded() -> anyhow::Result<()> {
    init_tracing();
    let xml = fixture("response_signed_assertion.xml")?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&xml);
    let wrapped: String = encoded
        .as_bytes()
        .chunks(76)
        .map(|line| format!("{}\r\n", String::from_utf8_lossy(line)))
        .collect();

    for payload in [encoded, wrapped] {
        let response = Response::new(&payload, in_window())?.with_settings(idp_settings());
        assert_eq!(response.xml(), xml);
        response.validate()?;
    }
    Ok(())
}

#[test]
fn response_level_signature_with_inclusive_c14n_and_sha1() -> anyhow::Result<()> {
    init_tracing();
    let response = Response::new(
        &fixture("response_signed_response.xml")?,
        ResponseOptions::default(),
    )?
    .with_settings(idp_settings());
    response.validate()?;
    assert_eq!(response.name_id().as_deref(), Some("someone@example.com"));
    assert_eq!(response.issuer().as_deref(), Some("https://idp.example.com/metadata"));
    assert_eq!(response.session_index().as_deref(), Some("_session2"));
    Ok(())
}

#[test]
fn response_and_assertion_signatures_both_checked() -> anyhow::Result<()> {
    let response = load("response_double_signed.xml")?;
    response.validate()?;

    // Breaking the response signature alone must fail validation.
    let xml = fixture("response_double_signed.xml")?.replace(
        "<samlp:StatusCode Value",
        "<samlp:StatusCode Extra=\"1\" Value",
    );
    let tampered = Response::new(&xml, in_window())?.with_settings(idp_settings());
    assert_eq!(
        tampered.validate().unwrap_err().kind,
        ValidationErrorKind::DigestMismatch
    );
    Ok(())
}

#[test]
fn tampered_content_is_a_digest_mismatch() -> anyhow::Result<()> {
    init_tracing();
    let xml = fixture("response_signed_assertion.xml")?.replace("emailAddress", "test");
    let response = Response::new(&xml, in_window())?.with_settings(idp_settings());
    let err = response.validate().unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::DigestMismatch);
    assert_eq!(err.message, "Digest mismatch");
    assert!(!response.is_valid());
    Ok(())
}

#[test]
fn foreign_certificate_fails_fingerprint_pinning() -> anyhow::Result<()> {
    let response = load("response_signed_by_other_key.xml")?;
    let err = response.validate().unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::SignatureInvalid);
    assert_eq!(err.message, "Fingerprint mismatch");
    Ok(())
}

#[test]
fn foreign_key_fails_against_configured_certificate() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::default().with_idp_cert(idp_cert_pem()?);
    let response = Response::new(&fixture("response_signed_by_other_key.xml")?, in_window())?
        .with_settings(settings);
    let err = response.validate().unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::SignatureInvalid);
    assert_eq!(err.message, "Signature verification failed");
    Ok(())
}

#[test]
fn wrong_fingerprint_is_rejected() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::default().with_fingerprint("00:11:22:33");
    let response = Response::new(&fixture("response_signed_assertion.xml")?, in_window())?
        .with_settings(settings);
    assert_eq!(
        response.validate().unwrap_err().kind,
        ValidationErrorKind::SignatureInvalid
    );
    Ok(())
}

#[test]
fn no_settings_is_never_valid() -> anyhow::Result<()> {
    init_tracing();
    for name in [
        "response_signed_assertion.xml",
        "response_signed_response.xml",
        "response_double_signed.xml",
    ] {
        let response = Response::new(&fixture(name)?, in_window())?;
        assert!(!response.is_valid(), "{name}");
        assert_eq!(
            response.validate().unwrap_err().kind,
            ValidationErrorKind::MissingTrustAnchor
        );
    }
    Ok(())
}

#[test]
fn is_valid_is_idempotent() -> anyhow::Result<()> {
    let valid = load("response_signed_assertion.xml")?;
    let invalid = load("response_signed_by_other_key.xml")?;
    for _ in 0..3 {
        assert!(valid.is_valid());
        assert!(!invalid.is_valid());
    }
    Ok(())
}

#[test]
fn malformed_payloads_never_validate() -> anyhow::Result<()> {
    init_tracing();
    let truncated = fixture("response_signed_assertion.xml")?;
    let truncated = &truncated[..truncated.len() / 2];
    for payload in ["", "<", "<html><body/></html>", "bm90IHhtbA==", truncated] {
        let response = Response::new(payload, in_window())?.with_settings(idp_settings());
        assert!(!response.is_valid());
        assert_eq!(
            response.validate().unwrap_err().kind,
            ValidationErrorKind::Structure
        );
    }
    Ok(())
}

#[test]
fn genuine_signature_fails_against_another_certificate() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::default().with_idp_cert(fixture("other-cert.pem")?);
    let response = Response::new(&fixture("response_signed_assertion.xml")?, in_window())?
        .with_settings(settings);
    let err = response.validate().unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::SignatureInvalid);
    assert_eq!(err.message, "Signature verification failed");
    Ok(())
}
