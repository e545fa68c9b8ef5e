//! Error types for the flight-plan engine.
//!
//! Nothing in this crate is fatal to the process: validation failures leave
//! state untouched and surface to the operator as warning events, and a
//! malformed snapshot simply skips one poll cycle.

use thiserror::Error;

/// Non-fatal failures raised by plan operations.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Waypoint altitude must be a non-negative number")]
    InvalidAltitude,
    #[error("Waypoint latitude out of range")]
    LatitudeOutOfRange,
    #[error("Waypoint longitude out of range")]
    LongitudeOutOfRange,
    #[error("Malformed waypoint snapshot: {0}")]
    MalformedSnapshot(#[from] serde_json::Error),
}

/// Validate a waypoint's live fields before transmission.
///
/// Altitude must be a non-negative finite number, latitude within ±90 and
/// longitude within ±180 degrees.
pub fn validate(alt: f64, lat: f64, lon: f64) -> Result<(), PlanError> {
    if !alt.is_finite() || alt < 0.0 {
        Err(PlanError::InvalidAltitude)
    } else if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        Err(PlanError::LatitudeOutOfRange)
    } else if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        Err(PlanError::LongitudeOutOfRange)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_bounds() {
        assert!(validate(100.0, 45.0, -120.0).is_ok());
        assert!(matches!(validate(-1.0, 0.0, 0.0), Err(PlanError::InvalidAltitude)));
        assert!(matches!(validate(f64::NAN, 0.0, 0.0), Err(PlanError::InvalidAltitude)));
        assert!(matches!(validate(10.0, 91.0, 0.0), Err(PlanError::LatitudeOutOfRange)));
        assert!(matches!(validate(10.0, 0.0, -181.0), Err(PlanError::LongitudeOutOfRange)));
    }
}
