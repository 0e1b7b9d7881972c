//! Assertion time conditions.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use roxmltree::Node;

use crate::error::{ValidationError, ValidationErrorKind};
use crate::extract::{find_first, paths};

/// The `NotBefore`/`NotOnOrAfter` window of an assertion's `Conditions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conditions {
    /// Time before which the assertion is not valid.
    pub not_before: Option<DateTime<Utc>>,
    /// Time at or after which the assertion is not valid.
    pub not_on_or_after: Option<DateTime<Utc>>,
}

impl Conditions {
    /// Reads the `Conditions` element of an assertion.
    ///
    /// Returns `Ok(None)` when the assertion has no `Conditions`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrorKind::ConditionsNotMet`] if a bound is present
    /// but not a valid timestamp; such a window can never be satisfied.
    pub fn from_assertion(assertion: Node<'_, '_>) -> Result<Option<Self>, ValidationError> {
        let Some(conditions) = find_first(assertion, paths::CONDITIONS) else {
            return Ok(None);
        };
        Ok(Some(Self {
            not_before: bound(conditions, "NotBefore")?,
            not_on_or_after: bound(conditions, "NotOnOrAfter")?,
        }))
    }

    /// Checks `now` against the window, widening each bound by `drift`.
    ///
    /// Valid iff `now + drift >= NotBefore` and `now - drift < NotOnOrAfter`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrorKind::ConditionsNotMet`] when outside the window.
    pub fn validate(&self, now: DateTime<Utc>, drift: Duration) -> Result<(), ValidationError> {
        if let Some(not_before) = self.not_before {
            if now + drift < not_before {
                return Err(ValidationError::new(
                    ValidationErrorKind::ConditionsNotMet,
                    format!("Current time is earlier than NotBefore condition ({not_before})"),
                ));
            }
        }
        if let Some(not_on_or_after) = self.not_on_or_after {
            if now - drift >= not_on_or_after {
                return Err(ValidationError::new(
                    ValidationErrorKind::ConditionsNotMet,
                    format!("Current time is on or after NotOnOrAfter condition ({not_on_or_after})"),
                ));
            }
        }
        Ok(())
    }
}

fn bound(conditions: Node<'_, '_>, name: &str) -> Result<Option<DateTime<Utc>>, ValidationError> {
    conditions
        .attribute(name)
        .map(|value| {
            parse_saml_time(value).ok_or_else(|| {
                ValidationError::new(
                    ValidationErrorKind::ConditionsNotMet,
                    format!("Invalid {name} timestamp: {value}"),
                )
            })
        })
        .transpose()
}

/// Parses an `xs:dateTime` as used by SAML (UTC, usually with a `Z`
/// suffix). Values without an offset are taken as UTC.
#[must_use]
pub fn parse_saml_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|t| t.and_utc())
        })
}

/// Converts fractional seconds of clock drift into a [`Duration`].
///
/// Rounded to the nanosecond so that e.g. `0.516` is exactly 516 ms.
#[must_use]
pub fn drift_duration(seconds: f64) -> Duration {
    #[allow(clippy::cast_possible_truncation)]
    let nanos = (seconds * 1e9).round() as i64;
    Duration::nanoseconds(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn at(value: &str) -> DateTime<Utc> {
        parse_saml_time(value).unwrap()
    }

    fn window() -> Conditions {
        Conditions {
            not_before: Some(at("2011-06-14T18:21:01.516Z")),
            not_on_or_after: Some(at("2011-06-14T18:31:01.516Z")),
        }
    }

    #[test]
    fn parses_saml_timestamps() {
        assert_eq!(at("2011-06-14T18:21:01Z").timestamp(), 1_308_075_661);
        assert_eq!(at("2011-06-14T18:21:01.516Z").timestamp_subsec_millis(), 516);
        assert_eq!(at("2011-06-14T20:21:01+02:00"), at("2011-06-14T18:21:01Z"));
        assert_eq!(at("2011-06-14T18:21:01"), at("2011-06-14T18:21:01Z"));
        assert!(parse_saml_time("yesterday").is_none());
    }

    #[test]
    fn inside_window_is_valid() {
        window()
            .validate(at("2011-06-14T18:25:01.516Z"), Duration::zero())
            .unwrap();
    }

    #[test]
    fn before_window_is_rejected() {
        let err = window()
            .validate(at("2011-06-14T18:21:01Z"), Duration::zero())
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::ConditionsNotMet);
    }

    #[test]
    fn drift_boundary_is_inclusive() {
        let now = at("2011-06-14T18:21:01Z");
        assert!(window().validate(now, drift_duration(0.515)).is_err());
        assert!(window().validate(now, drift_duration(0.516)).is_ok());
    }

    #[test]
    fn not_on_or_after_is_exclusive() {
        let end = at("2011-06-14T18:31:01.516Z");
        assert!(window().validate(end, Duration::zero()).is_err());
        assert!(window().validate(end, drift_duration(0.001)).is_ok());
    }

    #[test]
    fn drift_rounds_to_nanoseconds() {
        assert_eq!(drift_duration(0.516), Duration::milliseconds(516));
        assert_eq!(drift_duration(0.0), Duration::zero());
        assert_eq!(drift_duration(1.5), Duration::milliseconds(1500));
    }

    #[test]
    fn reads_conditions_from_assertion() {
        let xml = r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"><saml:Conditions NotBefore="2011-06-14T18:21:01.516Z"/></saml:Assertion>"#;
        let doc = Document::parse(xml).unwrap();
        let conditions = Conditions::from_assertion(doc.root_element()).unwrap().unwrap();
        assert_eq!(conditions.not_before, Some(at("2011-06-14T18:21:01.516Z")));
        assert_eq!(conditions.not_on_or_after, None);
    }

    #[test]
    fn missing_conditions_are_none() {
        let xml = r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"/>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(Conditions::from_assertion(doc.root_element()).unwrap(), None);
    }

    #[test]
    fn malformed_bounds_fail_closed() {
        let xml = r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"><saml:Conditions NotOnOrAfter="soon"/></saml:Assertion>"#;
        let doc = Document::parse(xml).unwrap();
        let err = Conditions::from_assertion(doc.root_element()).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::ConditionsNotMet);
    }
}
