//! Input validation for rock records, sampling intervals and axes.
//!
//! Every check rejects NaN, +Inf and -Inf alongside its range condition, so
//! a bad velocity or interval never reaches the reflectivity or resampling
//! kernels. `name` identifies the offending quantity together with its unit
//! (e.g. `"vp (m/s)"`, `"wavelet dt (s)"`) and is echoed in the message.

use crate::error::SeisError;

/// Largest number of samples an axis, wavelet or frequency bank may hold.
///
/// 2²⁴ samples is over four hours of trace at 1 ms, far beyond any gather
/// this crate synthesizes, while still small enough to allocate.
pub(crate) const MAX_SAMPLES: usize = 1 << 24;

/// Require a strictly positive physical quantity such as a velocity,
/// density, thickness or sample interval.
pub(crate) fn validate_positive(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SeisError::InvalidInput {
            message: format!("{name} must be a positive finite quantity, got {value}"),
        });
    }
    Ok(value)
}

/// Require a quantity that may vanish, such as the shear velocity of a
/// fluid layer or a Monte-Carlo standard deviation.
pub(crate) fn validate_non_negative(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(SeisError::InvalidInput {
            message: format!("{name} must be zero or a positive finite quantity, got {value}"),
        });
    }
    Ok(value)
}

/// Require a finite signed quantity: an angle, a phase or a correlation.
pub(crate) fn validate_finite(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() {
        return Err(SeisError::InvalidInput {
            message: format!("{name} is not a finite number: {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is a volume fraction or saturation in \[0, 1\].
pub(crate) fn validate_fraction(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(SeisError::InvalidInput {
            message: format!("{name} must lie in [0, 1], got {value}"),
        });
    }
    Ok(value)
}

/// Convert a computed sample count to `usize`, rejecting counts above
/// [`MAX_SAMPLES`] before anything is allocated.
pub(crate) fn validate_sample_count(count: f64, name: &str) -> crate::error::Result<usize> {
    if !count.is_finite() || count < 0.0 || count > MAX_SAMPLES as f64 {
        return Err(SeisError::InvalidInput {
            message: format!("{name} would hold {count} samples, limit is {MAX_SAMPLES}"),
        });
    }
    Ok(count as usize)
}
