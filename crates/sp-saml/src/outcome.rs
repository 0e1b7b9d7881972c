//! Structured result of one validation run.

use std::fmt;

use crate::error::ValidationError;

/// Pipeline stages, in the order they are passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationStage {
    /// The payload was decoded.
    Loaded,
    /// The document parsed and the signed assertion was located.
    Parsed,
    /// Every participating signature verified.
    SignatureChecked,
    /// The time window was checked.
    ConditionsChecked,
    /// The audience restriction was checked.
    AudienceChecked,
    /// Every check passed.
    Valid,
}

impl ValidationStage {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Parsed => "parsed",
            Self::SignatureChecked => "signature_checked",
            Self::ConditionsChecked => "conditions_checked",
            Self::AudienceChecked => "audience_checked",
            Self::Valid => "valid",
        }
    }
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far validation got and what failed on the way.
///
/// `stage` is the last stage reached. A fatal failure stops the pipeline,
/// so `failures` then holds exactly that one error; the protocol checks
/// after the signature stage are independent and may each add one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// The last stage reached.
    pub stage: ValidationStage,
    /// Failures in the order they were found.
    pub failures: Vec<ValidationError>,
}

impl ValidationOutcome {
    /// An outcome stopped at `stage` by a fatal error.
    #[must_use]
    pub fn failed(stage: ValidationStage, error: ValidationError) -> Self {
        Self {
            stage,
            failures: vec![error],
        }
    }

    /// Returns true if nothing failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty() && self.stage == ValidationStage::Valid
    }

    /// The first failure, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<&ValidationError> {
        self.failures.first()
    }

    /// Converts into `Ok(())` or the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first recorded failure.
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.failures.into_iter().next() {
            Some(error) => Err(error),
            None if self.stage == ValidationStage::Valid => Ok(()),
            None => Err(ValidationError::structure(format!(
                "Validation stopped at stage {}",
                self.stage
            ))),
        }
    }
}
