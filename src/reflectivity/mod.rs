//! Angle-dependent P-wave reflection coefficients at a two-layer interface.
//!
//! Every method is a pure function of the upper and lower
//! [`RockProperties`] and the incidence angle. The method set is closed and
//! selected through [`ReflectivityMethod`].
//!
//! ## Methods
//!
//! - [`Zoeppritz`](ReflectivityMethod::Zoeppritz): exact 4×4 boundary-condition solve
//! - [`AkiRichards`](ReflectivityMethod::AkiRichards): three-term linearization at the mean angle
//! - [`Fatti`](ReflectivityMethod::Fatti): impedance-contrast form, exact at normal incidence
//! - [`Shuey2`](ReflectivityMethod::Shuey2) / [`Shuey3`](ReflectivityMethod::Shuey3): Poisson's-ratio form
//! - [`Bortfeld`](ReflectivityMethod::Bortfeld): log-ratio form
//!
//! ## Post-critical policy
//!
//! Methods that compute the transmitted P angle through Snell's law
//! (Zoeppritz, Aki–Richards, Bortfeld) have no real solution once
//! `p · vp_lower ≥ 1`; Zoeppritz additionally requires `p · vs_lower < 1`.
//! Past that point [`reflectivity`] reports a coefficient of `0.0`, so a
//! gather never carries NaN. Use [`reflectivity_strict`] to get an error
//! instead.

mod bortfeld;
mod linear;
mod monte_carlo;
mod shuey;
mod zoeppritz;

pub use monte_carlo::{AvoStatistics, MonteCarloAvo};

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{self, SeisError};
use crate::rock::RockProperties;

/// Reflectivity algorithm.
///
/// # Examples
///
/// ```
/// use synthseis::reflectivity::ReflectivityMethod;
///
/// let m: ReflectivityMethod = "shuey3".parse()?;
/// assert_eq!(m, ReflectivityMethod::Shuey3);
/// assert_eq!(ReflectivityMethod::default(), ReflectivityMethod::Zoeppritz);
/// # Ok::<(), synthseis::SeisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReflectivityMethod {
    /// Exact elastic solution. Supports fluid (vs = 0) layers.
    #[default]
    Zoeppritz,
    /// Aki & Richards (1980) three-term linear approximation.
    #[serde(alias = "aki_richards")]
    AkiRichards,
    /// Fatti et al. (1994) impedance form.
    Fatti,
    /// Shuey (1985) two-term approximation.
    Shuey2,
    /// Shuey (1985) three-term approximation.
    Shuey3,
    /// Bortfeld (1961) approximation.
    Bortfeld,
}

impl ReflectivityMethod {
    /// Every available method, in registry order.
    pub const ALL: [ReflectivityMethod; 6] = [
        ReflectivityMethod::Zoeppritz,
        ReflectivityMethod::AkiRichards,
        ReflectivityMethod::Fatti,
        ReflectivityMethod::Shuey2,
        ReflectivityMethod::Shuey3,
        ReflectivityMethod::Bortfeld,
    ];

    /// Registry key of the method.
    pub fn name(self) -> &'static str {
        match self {
            ReflectivityMethod::Zoeppritz => "zoeppritz",
            ReflectivityMethod::AkiRichards => "akirichards",
            ReflectivityMethod::Fatti => "fatti",
            ReflectivityMethod::Shuey2 => "shuey2",
            ReflectivityMethod::Shuey3 => "shuey3",
            ReflectivityMethod::Bortfeld => "bortfeld",
        }
    }

    /// Whether the method computes the transmitted P angle and is
    /// therefore subject to the post-critical policy.
    pub fn uses_transmission_angle(self) -> bool {
        matches!(
            self,
            ReflectivityMethod::Zoeppritz
                | ReflectivityMethod::AkiRichards
                | ReflectivityMethod::Bortfeld
        )
    }

    /// Whether a layer with `vs = 0` is accepted.
    pub fn supports_fluids(self) -> bool {
        matches!(self, ReflectivityMethod::Zoeppritz)
    }

    /// Coefficient at one angle, inputs already validated.
    fn evaluate(self, upper: &RockProperties, lower: &RockProperties, theta: f64) -> Coefficient {
        match self {
            ReflectivityMethod::Zoeppritz => zoeppritz::rpp(upper, lower, theta),
            ReflectivityMethod::AkiRichards => linear::aki_richards(upper, lower, theta),
            ReflectivityMethod::Fatti => Coefficient::Real(linear::fatti(upper, lower, theta)),
            ReflectivityMethod::Shuey2 => Coefficient::Real(shuey::shuey2(upper, lower, theta)),
            ReflectivityMethod::Shuey3 => Coefficient::Real(shuey::shuey3(upper, lower, theta)),
            ReflectivityMethod::Bortfeld => bortfeld::bortfeld(upper, lower, theta),
        }
    }
}

impl fmt::Display for ReflectivityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReflectivityMethod {
    type Err = SeisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        ReflectivityMethod::ALL
            .into_iter()
            .find(|m| m.name() == key)
            .ok_or_else(|| SeisError::InvalidInput {
                message: format!("unknown reflectivity method {s:?}"),
            })
    }
}

/// Result of a single-angle evaluation before the post-critical policy is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Coefficient {
    Real(f64),
    /// Angle is at or beyond a critical angle of the interface.
    PostCritical,
    /// The boundary-condition system could not be solved.
    Singular,
}

/// Upper/lower rock pairing at one interface.
///
/// # Examples
///
/// ```
/// use synthseis::reflectivity::{Interface, ReflectivityMethod};
/// use synthseis::rock::RockProperties;
///
/// let upper = RockProperties::new(1500.0, 1200.0, 2000.0)?;
/// let lower = RockProperties::new(1800.0, 1400.0, 2200.0)?;
/// let iface = Interface::new(upper, lower);
///
/// let r0 = iface.reflectivity(&[0.0], ReflectivityMethod::Zoeppritz)?;
/// assert!((r0[0] - 0.96 / 6.96).abs() < 1e-12);
/// assert!(iface.critical_angle().is_some());
/// # Ok::<(), synthseis::SeisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    /// Medium above the interface (carries the incident wave).
    pub upper: RockProperties,
    /// Medium below the interface.
    pub lower: RockProperties,
}

impl Interface {
    /// Pair two rocks.
    pub fn new(upper: RockProperties, lower: RockProperties) -> Self {
        Self { upper, lower }
    }

    /// P-wave critical angle in degrees, `asin(vp_upper / vp_lower)`, or
    /// `None` when the lower medium is not faster.
    pub fn critical_angle(&self) -> Option<f64> {
        critical_angle(&self.upper, &self.lower)
    }

    /// Reflection coefficients at `theta` (degrees), post-critical samples set to zero.
    pub fn reflectivity(&self, theta: &[f64], method: ReflectivityMethod) -> error::Result<Vec<f64>> {
        reflectivity(&self.upper, &self.lower, theta, method)
    }

    /// The same interface seen from below, with the media exchanged.
    pub fn reversed(&self) -> Self {
        Self {
            upper: self.lower,
            lower: self.upper,
        }
    }
}

/// P-wave critical angle in degrees, or `None` when `vp_lower ≤ vp_upper`.
pub fn critical_angle(upper: &RockProperties, lower: &RockProperties) -> Option<f64> {
    if lower.vp() > upper.vp() {
        Some((upper.vp() / lower.vp()).asin().to_degrees())
    } else {
        None
    }
}

/// P-wave reflection coefficients for each incidence angle in `theta` (degrees).
///
/// Angles are solved independently. Post-critical angles yield `0.0`
/// (see the module documentation).
///
/// # Errors
/// Returns [`SeisError::InvalidInput`] for angles outside (−90°, 90°) or a
/// fluid layer passed to an approximation, and
/// [`SeisError::NumericalError`] if the Zoeppritz system is singular.
pub fn reflectivity(
    upper: &RockProperties,
    lower: &RockProperties,
    theta: &[f64],
    method: ReflectivityMethod,
) -> error::Result<Vec<f64>> {
    evaluate_all(upper, lower, theta, method, false)
}

/// Like [`reflectivity`] but fails with [`SeisError::NumericalError`] at the
/// first post-critical angle instead of reporting zero.
pub fn reflectivity_strict(
    upper: &RockProperties,
    lower: &RockProperties,
    theta: &[f64],
    method: ReflectivityMethod,
) -> error::Result<Vec<f64>> {
    evaluate_all(upper, lower, theta, method, true)
}

/// Single-angle convenience wrapper around [`reflectivity`].
pub fn reflectivity_at(
    upper: &RockProperties,
    lower: &RockProperties,
    theta: f64,
    method: ReflectivityMethod,
) -> error::Result<f64> {
    let r = evaluate_all(upper, lower, &[theta], method, false)?;
    Ok(r[0])
}

/// Element-wise reflectivity for many interfaces at many angles.
///
/// `upper` and `lower` must have equal length, or either may hold a single
/// rock that is broadcast against the other. Output is indexed
/// `[interface, angle]`.
///
/// # Errors
/// Returns [`SeisError::ShapeMismatch`] for incompatible lengths, and the
/// errors of [`reflectivity`].
pub fn reflectivity_series(
    upper: &[RockProperties],
    lower: &[RockProperties],
    theta: &[f64],
    method: ReflectivityMethod,
) -> error::Result<Array2<f64>> {
    let n = match (upper.len(), lower.len()) {
        (a, b) if a == b => a,
        (1, b) => b,
        (a, 1) => a,
        (a, b) => {
            return Err(SeisError::ShapeMismatch {
                message: format!("cannot broadcast {a} upper rocks against {b} lower rocks"),
            });
        }
    };
    let mut out = Array2::<f64>::zeros((n, theta.len()));
    for i in 0..n {
        let u = &upper[if upper.len() == 1 { 0 } else { i }];
        let l = &lower[if lower.len() == 1 { 0 } else { i }];
        let row = reflectivity(u, l, theta, method)?;
        for (j, r) in row.into_iter().enumerate() {
            out[[i, j]] = r;
        }
    }
    Ok(out)
}

fn evaluate_all(
    upper: &RockProperties,
    lower: &RockProperties,
    theta: &[f64],
    method: ReflectivityMethod,
    strict: bool,
) -> error::Result<Vec<f64>> {
    if !method.supports_fluids() && (upper.is_fluid() || lower.is_fluid()) {
        return Err(SeisError::InvalidInput {
            message: format!("{method} requires vs > 0 in both layers"),
        });
    }
    theta
        .iter()
        .map(|&t| {
            if !t.is_finite() || t.abs() >= 90.0 {
                return Err(SeisError::InvalidInput {
                    message: format!("incidence angle must lie in (-90, 90) degrees, got {t}"),
                });
            }
            match method.evaluate(upper, lower, t) {
                Coefficient::Real(r) => Ok(r),
                Coefficient::PostCritical if strict => Err(SeisError::NumericalError {
                    message: format!("{method}: angle {t} is beyond the critical angle"),
                }),
                Coefficient::PostCritical => Ok(0.0),
                Coefficient::Singular => Err(SeisError::NumericalError {
                    message: format!("{method}: boundary-condition system is singular at {t} degrees"),
                }),
            }
        })
        .collect()
}

/// Shared contrast terms of the linearized approximations.
pub(crate) struct Contrasts {
    pub vp: f64,
    pub vs: f64,
    pub rho: f64,
    pub dvp: f64,
    pub dvs: f64,
    pub drho: f64,
}

impl Contrasts {
    pub(crate) fn new(upper: &RockProperties, lower: &RockProperties) -> Self {
        Self {
            vp: 0.5 * (upper.vp() + lower.vp()),
            vs: 0.5 * (upper.vs() + lower.vs()),
            rho: 0.5 * (upper.rho() + lower.rho()),
            dvp: lower.vp() - upper.vp(),
            dvs: lower.vs() - upper.vs(),
            drho: lower.rho() - upper.rho(),
        }
    }
}

/// Transmitted P angle in radians from Snell's law, `None` at or past critical.
pub(crate) fn transmission_angle(upper: &RockProperties, lower: &RockProperties, theta1: f64) -> Option<f64> {
    let s = lower.vp() / upper.vp() * theta1.sin();
    if s.abs() >= 1.0 { None } else { Some(s.asin()) }
}
