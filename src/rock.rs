//! Rock and pore-fluid property records.
//!
//! [`RockProperties`] is the leaf value type of the crate: elastic parameters
//! `(vp, vs, rho)`, their standard deviations for stochastic realizations, and
//! the optional reservoir descriptors (porosity, clay volume, pore fluid)
//! needed by fluid substitution. Records are validated on construction and
//! on deserialization, and never mutated afterwards.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::conventions;
use crate::error::{self, SeisError};
use crate::validate::{validate_fraction, validate_non_negative, validate_positive};

/// Pore-fluid mixture of brine and hydrocarbon.
///
/// Densities in kg/m³, bulk moduli in Pa, `s_w` is the water saturation.
///
/// # Examples
/// ```
/// use synthseis::rock::Fluid;
///
/// let brine = Fluid::new(1090.0, 250.0, 2.8e9, 0.05e9, 1.0)?;
/// assert_eq!(brine.density(), 1090.0);
/// assert!((brine.bulk_modulus() - 2.8e9).abs() < 1.0);
/// # Ok::<(), synthseis::SeisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FluidRaw", into = "FluidRaw")]
pub struct Fluid {
    rho_w: f64,
    rho_hc: f64,
    k_w: f64,
    k_hc: f64,
    s_w: f64,
}

#[derive(Serialize, Deserialize)]
struct FluidRaw {
    rho_w: f64,
    rho_hc: f64,
    k_w: f64,
    k_hc: f64,
    s_w: f64,
}

impl TryFrom<FluidRaw> for Fluid {
    type Error = SeisError;
    fn try_from(raw: FluidRaw) -> Result<Self, Self::Error> {
        Self::new(raw.rho_w, raw.rho_hc, raw.k_w, raw.k_hc, raw.s_w)
    }
}

impl From<Fluid> for FluidRaw {
    fn from(f: Fluid) -> Self {
        Self {
            rho_w: f.rho_w,
            rho_hc: f.rho_hc,
            k_w: f.k_w,
            k_hc: f.k_hc,
            s_w: f.s_w,
        }
    }
}

impl Fluid {
    /// Create a fluid mixture.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] for non-positive densities or
    /// moduli, or a saturation outside \[0, 1\].
    pub fn new(rho_w: f64, rho_hc: f64, k_w: f64, k_hc: f64, s_w: f64) -> error::Result<Self> {
        validate_positive(rho_w, "brine density (kg/m³)")?;
        validate_positive(rho_hc, "hydrocarbon density (kg/m³)")?;
        validate_positive(k_w, "brine bulk modulus (Pa)")?;
        validate_positive(k_hc, "hydrocarbon bulk modulus (Pa)")?;
        validate_fraction(s_w, "water saturation")?;
        Ok(Self {
            rho_w,
            rho_hc,
            k_w,
            k_hc,
            s_w,
        })
    }

    /// Brine density.
    pub fn rho_w(&self) -> f64 {
        self.rho_w
    }

    /// Hydrocarbon density.
    pub fn rho_hc(&self) -> f64 {
        self.rho_hc
    }

    /// Brine bulk modulus.
    pub fn k_w(&self) -> f64 {
        self.k_w
    }

    /// Hydrocarbon bulk modulus.
    pub fn k_hc(&self) -> f64 {
        self.k_hc
    }

    /// Water saturation.
    pub fn s_w(&self) -> f64 {
        self.s_w
    }

    /// Saturation-weighted mixture density.
    pub fn density(&self) -> f64 {
        self.s_w * self.rho_w + (1.0 - self.s_w) * self.rho_hc
    }

    /// Wood (Reuss) mixture bulk modulus: 1/K = S_w/K_w + (1 − S_w)/K_hc.
    pub fn bulk_modulus(&self) -> f64 {
        1.0 / (self.s_w / self.k_w + (1.0 - self.s_w) / self.k_hc)
    }
}

/// Elastic and density parameters of one rock, with uncertainties.
///
/// Invariants: `vp > 0`, `rho > 0`, `vs ≥ 0` (zero only for fluids), all
/// standard deviations non-negative.
///
/// # Examples
/// ```
/// use synthseis::rock::RockProperties;
///
/// let shale = RockProperties::new(2400.0, 1100.0, 2450.0)?;
/// assert!(!shale.is_fluid());
/// assert_eq!(shale.impedance(), 2400.0 * 2450.0);
/// # Ok::<(), synthseis::SeisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RockRaw", into = "RockRaw")]
pub struct RockProperties {
    vp: f64,
    vs: f64,
    rho: f64,
    vp_std: f64,
    vs_std: f64,
    rho_std: f64,
    porosity: Option<f64>,
    vclay: Option<f64>,
    fluid: Option<Fluid>,
}

#[derive(Serialize, Deserialize)]
struct RockRaw {
    vp: f64,
    vs: f64,
    rho: f64,
    #[serde(default)]
    vp_std: f64,
    #[serde(default)]
    vs_std: f64,
    #[serde(default)]
    rho_std: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    porosity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vclay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fluid: Option<Fluid>,
}

impl TryFrom<RockRaw> for RockProperties {
    type Error = SeisError;
    fn try_from(raw: RockRaw) -> Result<Self, Self::Error> {
        let mut rock = Self::new(raw.vp, raw.vs, raw.rho)?.with_uncertainty(
            raw.vp_std,
            raw.vs_std,
            raw.rho_std,
        )?;
        if let Some(phi) = raw.porosity {
            rock.porosity = Some(validate_fraction(phi, "porosity")?);
        }
        if let Some(vclay) = raw.vclay {
            rock.vclay = Some(validate_fraction(vclay, "clay volume")?);
        }
        rock.fluid = raw.fluid;
        Ok(rock)
    }
}

impl From<RockProperties> for RockRaw {
    fn from(r: RockProperties) -> Self {
        Self {
            vp: r.vp,
            vs: r.vs,
            rho: r.rho,
            vp_std: r.vp_std,
            vs_std: r.vs_std,
            rho_std: r.rho_std,
            porosity: r.porosity,
            vclay: r.vclay,
            fluid: r.fluid,
        }
    }
}

impl RockProperties {
    /// Create a rock with exact (zero-uncertainty) properties.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] if `vp` or `rho` is not positive
    /// or `vs` is negative.
    pub fn new(vp: f64, vs: f64, rho: f64) -> error::Result<Self> {
        validate_positive(vp, "rock vp (m/s)")?;
        validate_non_negative(vs, "rock vs (m/s)")?;
        validate_positive(rho, "rock rho (kg/m³)")?;
        if vs >= vp {
            return Err(SeisError::InvalidInput {
                message: format!("vs must be less than vp, got vs={vs} >= vp={vp}"),
            });
        }
        Ok(Self {
            vp,
            vs,
            rho,
            vp_std: 0.0,
            vs_std: 0.0,
            rho_std: 0.0,
            porosity: None,
            vclay: None,
            fluid: None,
        })
    }

    /// Create a rock from P velocity alone, with `vs = vp / 2` and a Gardner
    /// density estimate.
    pub fn from_vp(vp: f64) -> error::Result<Self> {
        validate_positive(vp, "rock vp (m/s)")?;
        Self::new(vp, vp / 2.0, conventions::gardner_density(vp))
    }

    /// Attach standard deviations used for stochastic realizations.
    pub fn with_uncertainty(mut self, vp_std: f64, vs_std: f64, rho_std: f64) -> error::Result<Self> {
        self.vp_std = validate_non_negative(vp_std, "rock vp_std (m/s)")?;
        self.vs_std = validate_non_negative(vs_std, "rock vs_std (m/s)")?;
        self.rho_std = validate_non_negative(rho_std, "rock rho_std (kg/m³)")?;
        Ok(self)
    }

    /// Attach the reservoir descriptors needed by fluid substitution.
    pub fn with_reservoir(mut self, porosity: f64, vclay: f64, fluid: Fluid) -> error::Result<Self> {
        self.porosity = Some(validate_fraction(porosity, "porosity")?);
        self.vclay = Some(validate_fraction(vclay, "clay volume")?);
        self.fluid = Some(fluid);
        Ok(self)
    }

    /// P-wave velocity (m/s).
    pub fn vp(&self) -> f64 {
        self.vp
    }

    /// S-wave velocity (m/s).
    pub fn vs(&self) -> f64 {
        self.vs
    }

    /// Bulk density (kg/m³).
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Standard deviation of `vp`.
    pub fn vp_std(&self) -> f64 {
        self.vp_std
    }

    /// Standard deviation of `vs`.
    pub fn vs_std(&self) -> f64 {
        self.vs_std
    }

    /// Standard deviation of `rho`.
    pub fn rho_std(&self) -> f64 {
        self.rho_std
    }

    /// Porosity fraction, if known.
    pub fn porosity(&self) -> Option<f64> {
        self.porosity
    }

    /// Clay volume fraction, if known.
    pub fn vclay(&self) -> Option<f64> {
        self.vclay
    }

    /// In-situ pore fluid, if known.
    pub fn fluid(&self) -> Option<&Fluid> {
        self.fluid.as_ref()
    }

    /// True for a medium without shear strength (`vs == 0`).
    pub fn is_fluid(&self) -> bool {
        self.vs == 0.0
    }

    /// True when any of the standard deviations is non-zero.
    pub fn is_uncertain(&self) -> bool {
        self.vp_std > 0.0 || self.vs_std > 0.0 || self.rho_std > 0.0
    }

    /// Acoustic impedance vp · ρ.
    pub fn impedance(&self) -> f64 {
        conventions::acoustic_impedance(self.vp, self.rho)
    }

    /// Draw one Gaussian realization of `(vp, vs, rho)` around the means.
    ///
    /// The returned record carries zero uncertainty. Reservoir descriptors
    /// are copied unchanged.
    ///
    /// # Errors
    /// Returns [`SeisError::NumericalError`] if the draw produced a
    /// non-physical value (standard deviation too large for the mean).
    pub fn realize<R: Rng + ?Sized>(&self, rng: &mut R) -> error::Result<Self> {
        let vp = gaussian(self.vp, self.vp_std, rng);
        let vs = gaussian(self.vs, self.vs_std, rng);
        let rho = gaussian(self.rho, self.rho_std, rng);
        if vp <= 0.0 || rho <= 0.0 || vs < 0.0 || vs >= vp {
            return Err(SeisError::NumericalError {
                message: format!(
                    "perturbed rock is not physical: vp={vp}, vs={vs}, rho={rho}"
                ),
            });
        }
        Ok(Self {
            vp,
            vs,
            rho,
            vp_std: 0.0,
            vs_std: 0.0,
            rho_std: 0.0,
            ..*self
        })
    }
}

/// Sample N(mean, std²); a zero deviation returns the mean exactly.
pub(crate) fn gaussian<R: Rng + ?Sized>(mean: f64, std: f64, rng: &mut R) -> f64 {
    if std == 0.0 {
        return mean;
    }
    match Normal::new(mean, std) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    }
}

/// Independent generator for stream `stream` of a seeded computation.
///
/// Streams are decorrelated with a SplitMix64 finalizer so that work items
/// processed in any order (or in parallel) draw the same numbers.
pub(crate) fn stream_rng(seed: u64, stream: u64) -> StdRng {
    let mut z = seed ^ stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    StdRng::seed_from_u64(z ^ (z >> 31))
}
