//! The Response façade.
//!
//! [`Response`] holds a decoded payload plus its options and trust settings.
//! Nothing is cached: validation and every projection re-parse the XML and
//! re-locate the signed assertion, so a `Response` can be shared across
//! threads and repeated calls always agree.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::attributes::Attributes;
use crate::audience::{audience_restrictions, validate_audience};
use crate::conditions::{parse_saml_time, Conditions};
use crate::constants::{status_codes, SAMLP_NS};
use crate::document::{decode_payload, SamlDocument};
use crate::error::{SamlError, SamlResult, ValidationError, ValidationErrorKind};
use crate::extract::{find_attribute, find_first, find_text, is_element, paths};
use crate::options::ResponseOptions;
use crate::outcome::{ValidationOutcome, ValidationStage};
use crate::settings::Settings;
use crate::signature::locator::{locate, SignedAssertion};
use crate::signature::verifier::{verify_signed_element, SignatureVerifier, XmlDsigVerifier};

/// A SAML Response received by the Service Provider.
#[derive(Debug, Clone)]
pub struct Response {
    xml: String,
    options: ResponseOptions,
    settings: Option<Settings>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl Response {
    /// Creates a Response from a Base64 or raw XML payload.
    ///
    /// Malformed payloads are accepted here and reported by validation.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::InvalidPayload`] if the options are unusable.
    pub fn new(payload: &str, options: ResponseOptions) -> SamlResult<Self> {
        options.validate()?;
        let xml = decode_payload(payload);
        tracing::debug!(bytes = xml.len(), "loaded SAML response payload");
        Ok(Self {
            xml,
            options,
            settings: None,
            verifier: Arc::new(XmlDsigVerifier),
        })
    }

    /// Creates a Response from raw payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::InvalidPayload`] if the bytes are not UTF-8 or
    /// the options are unusable.
    pub fn from_bytes(payload: &[u8], options: ResponseOptions) -> SamlResult<Self> {
        let payload = std::str::from_utf8(payload)
            .map_err(|e| SamlError::InvalidPayload(format!("payload is not UTF-8: {e}")))?;
        Self::new(payload, options)
    }

    /// Sets the trust settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the trust settings in place.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = Some(settings);
    }

    /// Replaces the cryptographic verifier.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// The decoded XML text.
    #[must_use]
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// The trust settings, if assigned.
    #[must_use]
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    /// The options the Response was created with.
    #[must_use]
    pub fn options(&self) -> &ResponseOptions {
        &self.options
    }

    /// Parses the decoded XML.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::XmlParse`] if the payload is not well-formed XML.
    pub fn document(&self) -> SamlResult<SamlDocument<'_>> {
        SamlDocument::parse(&self.xml)
    }

    /// Validates the Response, returning the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found by
    /// [`Response::validation_outcome`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validation_outcome().into_result()
    }

    /// Returns true if the Response passes validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validation_outcome().is_valid()
    }

    /// Runs the validation pipeline.
    ///
    /// Structure and signature failures stop the run. Once every signature
    /// has verified, the time window, audience and status are each checked
    /// and all failures are reported.
    #[must_use]
    pub fn validation_outcome(&self) -> ValidationOutcome {
        let doc = match self.document() {
            Ok(doc) => doc,
            Err(e) => {
                return stopped(
                    ValidationStage::Loaded,
                    ValidationError::structure(format!("Invalid SAML response: {e}")),
                )
            }
        };

        let located = match locate(&doc).and_then(|located| {
            check_structure(&located)?;
            Ok(located)
        }) {
            Ok(located) => located,
            Err(e) => return stopped(ValidationStage::Loaded, e),
        };
        tracing::debug!(
            signatures = located.signatures.len(),
            response_signed = located.response_signed(),
            "parsed SAML response"
        );

        let Some(settings) = self.settings.as_ref() else {
            return stopped(
                ValidationStage::Parsed,
                ValidationError::new(
                    ValidationErrorKind::MissingTrustAnchor,
                    "No settings on response",
                ),
            );
        };
        let anchor = match settings.trust_anchor() {
            Ok(anchor) => anchor,
            Err(e) => return stopped(ValidationStage::Parsed, e),
        };
        for signed in &located.signatures {
            if let Err(e) = verify_signed_element(signed, &anchor, self.verifier.as_ref()) {
                return stopped(ValidationStage::Parsed, e);
            }
        }
        tracing::debug!("SAML response signatures verified");

        let mut failures = Vec::new();
        if !self.options.skip_conditions {
            let checked = Conditions::from_assertion(located.assertion).and_then(|conditions| {
                conditions.map_or(Ok(()), |c| {
                    c.validate(self.options.clock.now(), self.options.clock_drift())
                })
            });
            failures.extend(checked.err());
        }
        if !self.options.skip_audience {
            let restrictions = audience_restrictions(located.assertion);
            failures.extend(validate_audience(&restrictions, settings.expected_audience()).err());
        }
        failures.extend(check_status(&located).err());

        for failure in &failures {
            tracing::warn!(kind = %failure.kind, "SAML response rejected: {}", failure.message);
        }
        if failures.is_empty() {
            tracing::info!(
                assertion_id = located.assertion.attribute("ID").unwrap_or_default(),
                "SAML response validated"
            );
            ValidationOutcome {
                stage: ValidationStage::Valid,
                failures,
            }
        } else {
            ValidationOutcome {
                stage: ValidationStage::AudienceChecked,
                failures,
            }
        }
    }

    /// Returns true if the top-level status code is `Success`.
    ///
    /// Independent of signature and condition checks.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code().as_deref() == Some(status_codes::SUCCESS)
    }

    /// The top-level `StatusCode` value.
    #[must_use]
    pub fn status_code(&self) -> Option<String> {
        let doc = self.document().ok()?;
        let root = response_root(&doc)?;
        find_attribute(root, paths::STATUS_CODE, "Value").map(|v| v.trim().to_string())
    }

    /// The top-level `StatusMessage`, trimmed.
    #[must_use]
    pub fn status_message(&self) -> Option<String> {
        let doc = self.document().ok()?;
        let root = response_root(&doc)?;
        find_text(root, paths::STATUS_MESSAGE).map(|m| m.trim().to_string())
    }

    /// The `NameID` of the signed assertion.
    #[must_use]
    pub fn name_id(&self) -> Option<String> {
        self.with_assertion(|signed| find_text(signed.assertion, paths::NAME_ID))
    }

    /// The `Format` of the signed assertion's `NameID`.
    #[must_use]
    pub fn name_id_format(&self) -> Option<String> {
        self.with_assertion(|signed| {
            find_attribute(signed.assertion, paths::NAME_ID, "Format").map(str::to_string)
        })
    }

    /// The issuer of the signed assertion.
    ///
    /// Falls back to the Response `Issuer` only when the Response itself is
    /// signed.
    #[must_use]
    pub fn issuer(&self) -> Option<String> {
        self.with_assertion(|signed| {
            find_text(signed.assertion, paths::ISSUER)
                .or_else(|| {
                    signed
                        .response_signed()
                        .then(|| find_text(signed.response, paths::ISSUER))
                        .flatten()
                })
                .map(|issuer| issuer.trim().to_string())
        })
    }

    /// The `ID` of the signed assertion.
    #[must_use]
    pub fn assertion_id(&self) -> Option<String> {
        self.with_assertion(|signed| signed.assertion.attribute("ID").map(str::to_string))
    }

    /// When the IdP session ends (`AuthnStatement/@SessionNotOnOrAfter`).
    #[must_use]
    pub fn session_expires_at(&self) -> Option<DateTime<Utc>> {
        self.with_assertion(|signed| {
            find_attribute(signed.assertion, paths::AUTHN_STATEMENT, "SessionNotOnOrAfter")
                .and_then(parse_saml_time)
        })
    }

    /// The IdP session index (`AuthnStatement/@SessionIndex`).
    #[must_use]
    pub fn session_index(&self) -> Option<String> {
        self.with_assertion(|signed| {
            find_attribute(signed.assertion, paths::AUTHN_STATEMENT, "SessionIndex")
                .map(str::to_string)
        })
    }

    /// `Conditions/@NotBefore` of the signed assertion.
    #[must_use]
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.conditions().and_then(|c| c.not_before)
    }

    /// `Conditions/@NotOnOrAfter` of the signed assertion.
    #[must_use]
    pub fn not_on_or_after(&self) -> Option<DateTime<Utc>> {
        self.conditions().and_then(|c| c.not_on_or_after)
    }

    /// Attributes of the signed assertion; empty if it cannot be located.
    #[must_use]
    pub fn attributes(&self) -> Attributes {
        let compat = self.options.single_value_compatibility;
        self.with_assertion(|signed| Some(Attributes::from_assertion(signed.assertion, compat)))
            .unwrap_or_else(|| Attributes::new(compat))
    }

    fn conditions(&self) -> Option<Conditions> {
        self.with_assertion(|signed| Conditions::from_assertion(signed.assertion).ok().flatten())
    }

    fn with_assertion<T>(&self, read: impl FnOnce(&SignedAssertion<'_, '_>) -> Option<T>) -> Option<T> {
        let doc = self.document().ok()?;
        let located = locate(&doc).ok()?;
        read(&located)
    }
}

fn stopped(stage: ValidationStage, error: ValidationError) -> ValidationOutcome {
    tracing::warn!(kind = %error.kind, %stage, "SAML response rejected: {}", error.message);
    ValidationOutcome::failed(stage, error)
}

fn response_root<'a, 'input>(doc: &'a SamlDocument<'input>) -> Option<roxmltree::Node<'a, 'input>> {
    let root = doc.root();
    is_element(root, SAMLP_NS, "Response").then_some(root)
}

fn check_structure(located: &SignedAssertion<'_, '_>) -> Result<(), ValidationError> {
    if find_first(located.response, paths::STATUS).is_none() {
        return Err(ValidationError::structure("Missing Status element"));
    }
    if find_first(located.assertion, paths::NAME_ID).is_none() {
        return Err(ValidationError::structure("Missing NameID element"));
    }
    Ok(())
}

fn check_status(located: &SignedAssertion<'_, '_>) -> Result<(), ValidationError> {
    let code = find_attribute(located.response, paths::STATUS_CODE, "Value")
        .map(str::trim)
        .unwrap_or_default();
    if code == status_codes::SUCCESS {
        return Ok(());
    }
    let mut message = format!("The status code of the Response was not Success, was {code}");
    if let Some(detail) = find_text(located.response, paths::STATUS_MESSAGE) {
        message.push_str(" -> ");
        message.push_str(detail.trim());
    }
    Err(ValidationError::new(ValidationErrorKind::StatusNotSuccess, message))
}
