//! Time window, audience, status and identity projections.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sp_integration_tests::{fixture, IDP_CERT_SHA1};
use sp_saml::{
    Response, ResponseOptions, Settings, ValidationErrorKind, ValidationStage,
};

use crate::common::{idp_settings, in_window, init_tracing, load};

fn at(h: u32, m: u32, s: u32, millis: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2011, 6, 14, h, m, s).unwrap() + Duration::milliseconds(millis)
}

fn signed_assertion(options: ResponseOptions) -> anyhow::Result<Response> {
    init_tracing();
    Ok(Response::new(&fixture("response_signed_assertion.xml")?, options)?
        .with_settings(idp_settings()))
}

#[test]
fn clock_drift_widens_not_before() -> anyhow::Result<()> {
    let early = ResponseOptions::default().at(at(18, 21, 1, 0));

    let err = signed_assertion(early.clone())?.validate().unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::ConditionsNotMet);
    assert!(err.message.contains("NotBefore"), "{}", err.message);

    assert!(!signed_assertion(early.clone().with_clock_drift(0.515))?.is_valid());
    assert!(signed_assertion(early.with_clock_drift(0.516))?.is_valid());
    Ok(())
}

#[test]
fn not_on_or_after_is_exclusive() -> anyhow::Result<()> {
    assert!(signed_assertion(ResponseOptions::default().at(at(18, 31, 1, 515)))?.is_valid());

    let err = signed_assertion(ResponseOptions::default().at(at(18, 31, 1, 516)))?
        .validate()
        .unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::ConditionsNotMet);
    assert!(err.message.contains("NotOnOrAfter"), "{}", err.message);

    let late = ResponseOptions::default().at(at(18, 31, 2, 0)).with_clock_drift(1.0);
    assert!(signed_assertion(late)?.is_valid());
    Ok(())
}

#[test]
fn expired_assertion_fails_against_system_clock() -> anyhow::Result<()> {
    let response = signed_assertion(ResponseOptions::default())?;
    let outcome = response.validation_outcome();
    assert!(!outcome.is_valid());
    assert_eq!(outcome.stage, ValidationStage::AudienceChecked);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].kind, ValidationErrorKind::ConditionsNotMet);
    Ok(())
}

#[test]
fn conditions_can_be_skipped() -> anyhow::Result<()> {
    let response = signed_assertion(ResponseOptions::default().skip_conditions())?;
    response.validate()?;
    Ok(())
}

#[test]
fn audience_is_enforced_when_configured() -> anyhow::Result<()> {
    init_tracing();
    let xml = fixture("response_signed_assertion.xml")?;
    let unset = Settings::default().with_fingerprint(IDP_CERT_SHA1);
    Response::new(&xml, in_window())?
        .with_settings(unset.clone())
        .validate()?;

    let wrong = unset.clone().with_sp_entity_id("https://other-sp.example.com");
    let response = Response::new(&xml, in_window())?.with_settings(wrong.clone());
    let err = response.validate().unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::AudienceMismatch);
    assert!(err.message.starts_with("https://other-sp.example.com is not a valid audience"));

    Response::new(&xml, in_window().skip_audience())?
        .with_settings(wrong)
        .validate()?;
    Response::new(&xml, in_window())?
        .with_settings(unset.with_sp_entity_id("audience"))
        .validate()?;
    Ok(())
}

#[test]
fn every_protocol_failure_is_reported() -> anyhow::Result<()> {
    init_tracing();
    let xml = fixture("response_signed_assertion.xml")?.replace(
        "status:Success\"/>",
        "status:Requester\"/><samlp:StatusMessage> denied </samlp:StatusMessage>",
    );
    let settings = idp_settings().with_sp_entity_id("https://other-sp.example.com");
    let response = Response::new(&xml, ResponseOptions::default())?.with_settings(settings);

    let outcome = response.validation_outcome();
    assert_eq!(outcome.stage, ValidationStage::AudienceChecked);
    let kinds: Vec<_> = outcome.failures.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        [
            ValidationErrorKind::ConditionsNotMet,
            ValidationErrorKind::AudienceMismatch,
            ValidationErrorKind::StatusNotSuccess,
        ]
    );
    assert_eq!(
        outcome.failures[2].message,
        "The status code of the Response was not Success, was \
         urn:oasis:names:tc:SAML:2.0:status:Requester -> denied"
    );
    Ok(())
}

#[test]
fn status_is_read_from_the_response() -> anyhow::Result<()> {
    let response = load("response_signed_assertion.xml")?;
    assert!(response.is_success());
    assert_eq!(
        response.status_code().as_deref(),
        Some("urn:oasis:names:tc:SAML:2.0:status:Success")
    );
    assert_eq!(response.status_message(), None);

    let xml = fixture("response_signed_assertion.xml")?.replace(
        "status:Success\"/>",
        "status:Responder\"/><samlp:StatusMessage>\n  try later\n</samlp:StatusMessage>",
    );
    let failed = Response::new(&xml, in_window())?.with_settings(idp_settings());
    assert!(!failed.is_success());
    assert_eq!(failed.status_message().as_deref(), Some("try later"));
    assert_eq!(
        failed.validate().unwrap_err().kind,
        ValidationErrorKind::StatusNotSuccess
    );
    Ok(())
}

#[test]
fn identity_projections() -> anyhow::Result<()> {
    let response = load("response_signed_assertion.xml")?;
    assert_eq!(response.name_id().as_deref(), Some("test@onelogin.com"));
    assert_eq!(
        response.name_id_format().as_deref(),
        Some("urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress")
    );
    assert_eq!(response.issuer().as_deref(), Some("https://idp.example.com/metadata"));
    assert_eq!(response.assertion_id().as_deref(), Some("_a1"));
    assert_eq!(
        response.session_index().as_deref(),
        Some("_51be37965feb5579d803141076936dc2e9d1d98ebf")
    );
    assert_eq!(
        response.session_expires_at(),
        Some(Utc.with_ymd_and_hms(2011, 6, 17, 14, 54, 14).unwrap())
    );
    assert_eq!(response.not_before(), Some(at(18, 21, 1, 516)));
    assert_eq!(response.not_on_or_after(), Some(at(18, 31, 1, 516)));
    Ok(())
}

#[test]
fn projections_do_not_depend_on_validity() -> anyhow::Result<()> {
    init_tracing();
    let response = Response::new(
        &fixture("response_signed_assertion.xml")?,
        ResponseOptions::default(),
    )?;
    assert!(!response.is_valid());
    assert_eq!(response.name_id().as_deref(), Some("test@onelogin.com"));
    Ok(())
}

#[test]
fn signed_response_lends_its_issuer() -> anyhow::Result<()> {
    // The assertion here has no Issuer of its own.
    let response = load("response_signed_response.xml")?;
    assert_eq!(response.issuer().as_deref(), Some("https://idp.example.com/metadata"));
    assert_eq!(response.not_before(), None);
    Ok(())
}
