//! Per-response validation options.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::conditions::drift_duration;
use crate::error::{SamlError, SamlResult};

/// Source of the current time for condition checks.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Options recognized by [`crate::Response::new`].
#[derive(Debug, Clone)]
pub struct ResponseOptions {
    /// Tolerated clock skew in seconds, applied to both condition bounds.
    pub allowed_clock_drift: f64,
    /// Whether [`crate::Attributes::get`] yields only the first value.
    pub single_value_compatibility: bool,
    /// Skips the `Conditions` time window check.
    pub skip_conditions: bool,
    /// Skips the audience restriction check.
    pub skip_audience: bool,
    /// Clock used for the time window check.
    pub clock: Arc<dyn Clock>,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            allowed_clock_drift: 0.0,
            single_value_compatibility: true,
            skip_conditions: false,
            skip_audience: false,
            clock: Arc::new(SystemClock),
        }
    }
}

impl ResponseOptions {
    /// Sets the allowed clock drift in seconds.
    #[must_use]
    pub fn with_clock_drift(mut self, seconds: f64) -> Self {
        self.allowed_clock_drift = seconds;
        self
    }

    /// Sets single-value compatibility mode.
    #[must_use]
    pub fn with_single_value_compatibility(mut self, enabled: bool) -> Self {
        self.single_value_compatibility = enabled;
        self
    }

    /// Skips the time window check.
    #[must_use]
    pub fn skip_conditions(mut self) -> Self {
        self.skip_conditions = true;
        self
    }

    /// Skips the audience check.
    #[must_use]
    pub fn skip_audience(mut self) -> Self {
        self.skip_audience = true;
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Pins the clock at `now`.
    #[must_use]
    pub fn at(self, now: DateTime<Utc>) -> Self {
        self.with_clock(FixedClock(now))
    }

    /// Checks the options are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::InvalidPayload`] if the clock drift is negative
    /// or not finite.
    pub fn validate(&self) -> SamlResult<()> {
        if !self.allowed_clock_drift.is_finite() || self.allowed_clock_drift < 0.0 {
            return Err(SamlError::InvalidPayload(format!(
                "allowed_clock_drift must be a non-negative number of seconds, got {}",
                self.allowed_clock_drift
            )));
        }
        Ok(())
    }

    /// The clock drift as a [`Duration`].
    #[must_use]
    pub fn clock_drift(&self) -> Duration {
        drift_duration(self.allowed_clock_drift)
    }
}
