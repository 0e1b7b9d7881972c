//! Trust settings for an Identity Provider.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sp_crypto::{Certificate, HashAlgorithm};

use crate::error::{SamlError, SamlResult, ValidationError, ValidationErrorKind};

/// How the IdP's signing certificate is trusted.
///
/// Settings are usually loaded from a TOML table:
///
/// ```toml
/// idp_cert_fingerprint = "E3:9E:12:0C:89:64:A8:97:66:A9:DC:7E:62:75:E2:6B:DA:D9:1B:10"
/// idp_cert_fingerprint_algorithm = "sha1"
/// sp_entity_id = "https://sp.example.com/metadata"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fingerprint of the IdP certificate, hex with or without `:` separators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idp_cert_fingerprint: Option<String>,

    /// Hash used for `idp_cert_fingerprint`.
    pub idp_cert_fingerprint_algorithm: HashAlgorithm,

    /// The IdP certificate, PEM or bare base64 DER. Takes precedence over
    /// the fingerprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idp_cert: Option<String>,

    /// The SP entity ID expected in `AudienceRestriction`. Empty disables
    /// the audience check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_entity_id: Option<String>,
}

impl Settings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Settings`] if the text is not valid settings TOML.
    pub fn from_toml_str(text: &str) -> SamlResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Settings`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> SamlResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SamlError::Settings(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Sets the certificate fingerprint.
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.idp_cert_fingerprint = Some(fingerprint.into());
        self
    }

    /// Sets the fingerprint hash algorithm.
    #[must_use]
    pub fn with_fingerprint_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.idp_cert_fingerprint_algorithm = algorithm;
        self
    }

    /// Sets the IdP certificate.
    #[must_use]
    pub fn with_idp_cert(mut self, cert: impl Into<String>) -> Self {
        self.idp_cert = Some(cert.into());
        self
    }

    /// Sets the expected audience.
    #[must_use]
    pub fn with_sp_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.sp_entity_id = Some(entity_id.into());
        self
    }

    /// Returns the audience to enforce, if any.
    #[must_use]
    pub fn expected_audience(&self) -> Option<&str> {
        self.sp_entity_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Resolves the trust anchor used for signature checks.
    ///
    /// A configured certificate wins over a fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrorKind::MissingTrustAnchor`] if neither is set
    /// or the certificate cannot be parsed.
    pub fn trust_anchor(&self) -> Result<TrustAnchor, ValidationError> {
        if let Some(cert) = self.idp_cert.as_deref().filter(|c| !c.trim().is_empty()) {
            return Certificate::parse(cert).map(TrustAnchor::Certificate).map_err(|e| {
                ValidationError::new(
                    ValidationErrorKind::MissingTrustAnchor,
                    format!("Configured idp_cert is unusable: {e}"),
                )
            });
        }

        match self
            .idp_cert_fingerprint
            .as_deref()
            .filter(|f| !f.trim().is_empty())
        {
            Some(fingerprint) => Ok(TrustAnchor::Fingerprint {
                value: fingerprint.to_string(),
                algorithm: self.idp_cert_fingerprint_algorithm,
            }),
            None => Err(ValidationError::new(
                ValidationErrorKind::MissingTrustAnchor,
                "No fingerprint or certificate on settings",
            )),
        }
    }
}

/// The effective trust anchor for one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustAnchor {
    /// Signatures must verify under this certificate.
    Certificate(Certificate),
    /// The certificate embedded in `KeyInfo` must have this fingerprint.
    Fingerprint {
        /// Expected fingerprint as configured.
        value: String,
        /// Hash algorithm of the fingerprint.
        algorithm: HashAlgorithm,
    },
}
