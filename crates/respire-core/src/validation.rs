//! Input validation for raw sensor samples.

use thiserror::Error;

/// A chest-height proxy beyond this magnitude (meters) cannot come from a
/// tracked human body; treat it as sensor garbage.
pub const MAX_SAMPLE_MAGNITUDE: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("sample is not finite")]
    NotFinite,
    #[error("sample magnitude {0} exceeds {MAX_SAMPLE_MAGNITUDE}")]
    OutOfRange(f32),
}

/// Validate a raw sample before it reaches the detector.
pub fn validate_sample(value: f32) -> Result<(), SampleError> {
    if value.is_nan() || value.is_infinite() {
        return Err(SampleError::NotFinite);
    }
    if value.abs() > MAX_SAMPLE_MAGNITUDE {
        return Err(SampleError::OutOfRange(value));
    }
    Ok(())
}
