// Domain rules - Business logic and policies

use crate::domain::errors::ValidationError;
use crate::domain::model::{MediaDuration, TimeSpec, TrimRequest, ValidatedRange};

/// Business rules for trim range validation
pub struct RangeValidator;

impl RangeValidator {
    /// Check a request against the media duration.
    ///
    /// First violated constraint wins: negative start, then end not after
    /// start, then end beyond duration. `TrimEnd::ToEnd` is clamped to the
    /// duration before the checks.
    pub fn validate(request: &TrimRequest, duration: MediaDuration) -> Result<(), ValidationError> {
        Self::resolve(request, duration).map(|_| ())
    }

    /// Validate and return the concrete range to extract
    pub fn resolve(
        request: &TrimRequest,
        duration: MediaDuration,
    ) -> Result<ValidatedRange, ValidationError> {
        let start = request.start().seconds;
        let end = request.end().resolve(duration);

        // Negated comparisons so NaN lands in the matching error
        if !(start >= 0.0) {
            return Err(ValidationError::NegativeStart {
                start: request.start(),
            });
        }
        if !(end > start) {
            return Err(ValidationError::EndBeforeStart {
                start: request.start(),
                end: TimeSpec::from_seconds(end),
            });
        }
        if end > duration.as_seconds() {
            return Err(ValidationError::EndBeyondDuration {
                end: TimeSpec::from_seconds(end),
                duration,
            });
        }

        Ok(ValidatedRange { start, end })
    }
}

#[cfg(test)]
mod tests;
