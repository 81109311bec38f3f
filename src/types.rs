//! Core domain types shared by earth models and seismic volumes.
//!
//! # Why no `Eq` on axes?
//! Axes wrap `f64` values, which do not implement `Eq` because `NaN` breaks
//! total ordering. We derive `PartialEq` only.

use serde::{Deserialize, Serialize};

use crate::error::{self, SeisError};
use crate::validate::{validate_finite, validate_positive, validate_sample_count};

/// Vertical axis of a model or volume.
///
/// # Examples
/// ```
/// use synthseis::types::Domain;
/// assert_eq!(Domain::default(), Domain::Depth);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Samples are spaced in metres.
    #[default]
    Depth,
    /// Samples are spaced in seconds of two-way time.
    Time,
}

impl Domain {
    /// Unit label of the sample interval (`"m"` or `"s"`).
    pub fn unit(self) -> &'static str {
        match self {
            Domain::Depth => "m",
            Domain::Time => "s",
        }
    }
}

/// Incidence-angle axis in degrees, specified as an inclusive `(min, max, step)`
/// triple or a single angle.
///
/// # Examples
/// ```
/// use synthseis::types::AngleAxis;
///
/// let axis = AngleAxis::range(0.0, 30.0, 10.0);
/// assert_eq!(axis.values().unwrap(), vec![0.0, 10.0, 20.0, 30.0]);
///
/// let single = AngleAxis::Single(15.0);
/// assert_eq!(single.values().unwrap(), vec![15.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleAxis {
    /// One incidence angle.
    Single(f64),
    /// Evenly spaced angles from `min` to `max` inclusive.
    Range {
        /// First angle (degrees).
        min: f64,
        /// Last angle (degrees), included when it lies on the grid.
        max: f64,
        /// Angle increment (degrees, > 0).
        step: f64,
    },
}

impl Default for AngleAxis {
    fn default() -> Self {
        AngleAxis::Single(0.0)
    }
}

impl AngleAxis {
    /// Shorthand for [`AngleAxis::Range`].
    pub fn range(min: f64, max: f64, step: f64) -> Self {
        AngleAxis::Range { min, max, step }
    }

    /// Materialize the axis as a list of angles in degrees.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] for non-finite bounds, a
    /// non-positive step, `max < min`, or a step so small the axis would
    /// exceed the sample limit.
    pub fn values(&self) -> error::Result<Vec<f64>> {
        match *self {
            AngleAxis::Single(theta) => {
                validate_finite(theta, "incidence angle (deg)")?;
                Ok(vec![theta])
            }
            AngleAxis::Range { min, max, step } => inclusive_range(min, max, step, "angle"),
        }
    }
}

/// Evenly spaced values `start, start + step, …` up to and including `end`
/// (within a relative tolerance of one part in 10⁹ of a step).
pub(crate) fn inclusive_range(
    start: f64,
    end: f64,
    step: f64,
    name: &str,
) -> error::Result<Vec<f64>> {
    validate_finite(start, name)?;
    validate_finite(end, name)?;
    validate_positive(step, "axis step")?;
    if end < start {
        return Err(SeisError::InvalidInput {
            message: format!("{name} range is reversed: {start} > {end}"),
        });
    }
    let n = validate_sample_count(((end - start) / step + 1e-9).floor() + 1.0, name)?;
    Ok((0..n).map(|i| start + step * i as f64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_includes_endpoint() {
        let v = AngleAxis::range(0.0, 45.0, 15.0).values().unwrap();
        assert_eq!(v, vec![0.0, 15.0, 30.0, 45.0]);
    }

    #[test]
    fn range_off_grid_endpoint_dropped() {
        let v = AngleAxis::range(0.0, 10.0, 3.0).values().unwrap();
        assert_eq!(v, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn range_rejects_bad_step() {
        assert!(AngleAxis::range(0.0, 10.0, 0.0).values().is_err());
        assert!(AngleAxis::range(10.0, 0.0, 1.0).values().is_err());
    }

    #[test]
    fn range_rejects_vanishing_step() {
        let err = AngleAxis::range(0.0, 80.0, 1e-18).values().unwrap_err();
        assert!(matches!(err, SeisError::InvalidInput { .. }));
        assert!(AngleAxis::range(0.0, 80.0, 1e-10).values().is_err());
        // a tiny step over an empty span is still one angle
        assert_eq!(AngleAxis::range(5.0, 5.0, 1e-18).values().unwrap(), vec![5.0]);
    }

    #[test]
    fn domain_serde_lowercase() {
        let json = serde_json::to_string(&Domain::Time).unwrap();
        assert_eq!(json, "\"time\"");
        assert_eq!(Domain::Depth.unit(), "m");
    }
}
