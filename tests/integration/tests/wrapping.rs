//! Signature wrapping and expression injection attempts.

use std::sync::Arc;

use sp_integration_tests::fixture;
use sp_saml::{Response, SignatureVerifier, ValidationErrorKind};

use crate::common::{idp_settings, in_window, init_tracing, load, CountingVerifier};

fn assert_rejected(name: &str, reason: &str) -> anyhow::Result<()> {
    let response = load(name)?;
    let err = response.validate().unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::Structure, "{name}");
    assert!(err.message.contains(reason), "{name}: {}", err.message);
    assert!(!response.is_valid());
    assert_eq!(response.name_id(), None);
    assert!(response.attributes().is_empty());
    Ok(())
}

#[test]
fn injected_unsigned_assertion_is_ignored() -> anyhow::Result<()> {
    let response = load("response_injected_assertion.xml")?;
    response.validate()?;
    assert_eq!(response.name_id().as_deref(), Some("test@onelogin.com"));
    assert_eq!(response.assertion_id().as_deref(), Some("_a1"));
    assert_eq!(response.attributes().single("uid"), Some("demo"));
    Ok(())
}

#[test]
fn signed_assertion_moved_into_wrapper_is_rejected() -> anyhow::Result<()> {
    assert_rejected("response_wrapped_assertion.xml", "neither the response")
}

#[test]
fn duplicated_assertion_id_is_rejected() -> anyhow::Result<()> {
    assert_rejected("response_duplicate_id.xml", "not unique")
}

#[test]
fn copied_signature_is_rejected() -> anyhow::Result<()> {
    assert_rejected("response_copied_signature.xml", "not enveloped")
}

#[test]
fn reference_uris_are_never_evaluated() -> anyhow::Result<()> {
    init_tracing();
    let original = fixture("response_signed_assertion.xml")?;
    for uri in [
        "#_a1' or '1'='1",
        "#xpointer(//*[@ID='_a1'])",
        "#_a1\" | //*[local-name()='Assertion']",
        "#']/ancestor::*[1]|//*[@ID='",
    ] {
        let escaped = uri.replace('"', "&quot;");
        let xml = original.replace("URI=\"#_a1\"", &format!("URI=\"{escaped}\""));
        let verifier = CountingVerifier::new();
        let response = Response::new(&xml, in_window())?
            .with_settings(idp_settings())
            .with_verifier(Arc::clone(&verifier) as Arc<dyn SignatureVerifier>);

        let err = response.validate().unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Structure, "{uri}");
        assert_eq!(verifier.calls(), 0, "{uri}");
        assert_eq!(response.name_id(), None);
    }
    Ok(())
}

#[test]
fn counting_verifier_sees_genuine_signatures() -> anyhow::Result<()> {
    init_tracing();
    let verifier = CountingVerifier::new();
    let response = Response::new(&fixture("response_double_signed.xml")?, in_window())?
        .with_settings(idp_settings())
        .with_verifier(Arc::clone(&verifier) as Arc<dyn SignatureVerifier>);
    response.validate()?;
    assert_eq!(verifier.calls(), 4);
    Ok(())
}
