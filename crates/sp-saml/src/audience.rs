//! Audience restriction checks.

use roxmltree::Node;

use crate::error::{ValidationError, ValidationErrorKind};
use crate::extract::{find_all, paths, text_content};

/// One `AudienceRestriction` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudienceRestriction {
    /// `Audience` values, trimmed, in document order.
    pub audiences: Vec<String>,
}

/// Reads every `Conditions/AudienceRestriction` of an assertion.
#[must_use]
pub fn audience_restrictions(assertion: Node<'_, '_>) -> Vec<AudienceRestriction> {
    find_all(assertion, paths::AUDIENCE_RESTRICTION)
        .into_iter()
        .map(|restriction| AudienceRestriction {
            audiences: find_all(restriction, paths::AUDIENCE)
                .into_iter()
                .map(|a| text_content(a).trim().to_string())
                .collect(),
        })
        .collect()
}

/// Checks the SP entity ID against the assertion's audiences.
///
/// Passes when no entity ID is expected, or when the assertion carries no
/// `AudienceRestriction` at all. Otherwise the entity ID must equal one of
/// the listed audiences.
///
/// # Errors
///
/// Returns [`ValidationErrorKind::AudienceMismatch`] if the entity ID is
/// not listed.
pub fn validate_audience(
    restrictions: &[AudienceRestriction],
    expected: Option<&str>,
) -> Result<(), ValidationError> {
    let Some(expected) = expected.filter(|e| !e.is_empty()) else {
        return Ok(());
    };
    if restrictions.is_empty() {
        return Ok(());
    }

    if restrictions
        .iter()
        .any(|r| r.audiences.iter().any(|a| a == expected))
    {
        Ok(())
    } else {
        let listed: Vec<&str> = restrictions
            .iter()
            .flat_map(|r| r.audiences.iter().map(String::as_str))
            .collect();
        Err(ValidationError::new(
            ValidationErrorKind::AudienceMismatch,
            format!("{expected} is not a valid audience for this Response (audiences: {})", listed.join(", ")),
        ))
    }
}
