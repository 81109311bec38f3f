//! Gassmann fluid substitution of layered models.
//!
//! [`smith_substitution`] swaps the pore fluid of one rock sample following
//! the Smith et al. (2003) recipe: back out the dry-frame modulus `K*` from
//! the in-situ saturated bulk modulus, then remix it with the new fluid.
//! The shear modulus is fluid-independent; only density changes `vs`.
//!
//! [`FluidSubModel`] applies the substitution to a layer stack in which
//! each layer may carry intervals of replacement fluid, and produces both
//! the original and the substituted logs plus their synthetics.
//!
//! # Degenerate samples
//!
//! A sample without porosity has no fluid to replace and is returned as is.
//! Otherwise every output property that is not finite is replaced by the
//! pre-substitution value of that property at that sample; so are
//! non-positive `vp` and `rho`, which arise when the new fluid drives the
//! density below zero.

use serde::{Deserialize, Serialize};

use crate::conventions::{bulk_modulus, shear_modulus};
use crate::earth::{EarthModel, Layer, PropertyGrid, layer_sample_counts};
use crate::error::{self, SeisError};
use crate::rock::{Fluid, RockProperties};
use crate::synth::{ForwardModel, SeismicVolume};
use crate::validate::validate_positive;

/// Default bulk modulus of clay minerals (Pa).
pub const K_CLAY: f64 = 25.0e9;
/// Default bulk modulus of quartz (Pa).
pub const K_QUARTZ: f64 = 37.0e9;

/// Bulk moduli of the two-mineral (clay + quartz) matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Minerals {
    /// Clay bulk modulus (Pa).
    pub k_clay: f64,
    /// Quartz bulk modulus (Pa).
    pub k_quartz: f64,
}

impl Default for Minerals {
    fn default() -> Self {
        Self {
            k_clay: K_CLAY,
            k_quartz: K_QUARTZ,
        }
    }
}

impl Minerals {
    /// Voigt-Reuss-Hill average modulus of the matrix at clay fraction `vclay`.
    ///
    /// ```
    /// use synthseis::fluidsub::Minerals;
    ///
    /// let m = Minerals::default();
    /// assert_eq!(m.vrh(0.0), 37.0e9);
    /// assert_eq!(m.vrh(1.0), 25.0e9);
    /// ```
    pub fn vrh(&self, vclay: f64) -> f64 {
        let vqtz = 1.0 - vclay;
        let voigt = vclay * self.k_clay + vqtz * self.k_quartz;
        let reuss = 1.0 / (vclay / self.k_clay + vqtz / self.k_quartz);
        0.5 * (voigt + reuss)
    }
}

/// One `(vp, vs, rho)` sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Elastic {
    /// P velocity (m/s).
    pub vp: f64,
    /// S velocity (m/s).
    pub vs: f64,
    /// Density (kg/m³).
    pub rho: f64,
}

/// Replace the pore fluid `old` of a rock sample by `new`.
///
/// Non-finite outputs, and non-positive `vp` or `rho`, fall back to the
/// corresponding input property.
///
/// # Examples
///
/// ```
/// use synthseis::fluidsub::{Elastic, Minerals, smith_substitution};
/// use synthseis::rock::Fluid;
///
/// let brine = Fluid::new(1090.0, 250.0, 2.8e9, 0.05e9, 1.0)?;
/// let gas = Fluid::new(1090.0, 250.0, 2.8e9, 0.05e9, 0.1)?;
/// let sand = Elastic { vp: 3000.0, vs: 1600.0, rho: 2250.0 };
///
/// let sub = smith_substitution(sand, 0.25, 0.1, &brine, &gas, &Minerals::default());
/// assert!(sub.vp < sand.vp);
/// assert!(sub.vs > sand.vs);
/// assert!((sub.rho - 2061.0).abs() < 1e-9);
/// # Ok::<(), synthseis::SeisError>(())
/// ```
pub fn smith_substitution(
    rock: Elastic,
    porosity: f64,
    vclay: f64,
    old: &Fluid,
    new: &Fluid,
    minerals: &Minerals,
) -> Elastic {
    if porosity == 0.0 {
        return rock;
    }
    let ksat = bulk_modulus(rock.vp, rock.vs, rock.rho);
    let mu = shear_modulus(rock.vs, rock.rho);
    let k0 = minerals.vrh(vclay);
    let phi = porosity;

    let kfl = old.bulk_modulus();
    let kstar = (ksat * (phi * k0 / kfl + 1.0 - phi) - k0) / (phi * k0 / kfl + ksat / k0 - 1.0 - phi);

    let kfl_new = new.bulk_modulus();
    let ksat_new = kstar + (1.0 - kstar / k0).powi(2) / (phi / kfl_new + (1.0 - phi) / k0 - kstar / (k0 * k0));
    let rho_new = rock.rho + phi * (new.density() - old.density());

    let vp_new = ((ksat_new + 4.0 / 3.0 * mu) / rho_new).sqrt();
    let vs_new = (mu / rho_new).sqrt();

    let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
    let positive_or = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
    Elastic {
        vp: positive_or(vp_new, rock.vp),
        vs: finite_or(vs_new, rock.vs),
        rho: positive_or(rho_new, rock.rho),
    }
}

/// Interval of replacement fluid, measured down from the top of its layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidInterval {
    /// Replacement fluid.
    pub fluid: Fluid,
    /// Interval thickness (metres).
    pub thickness: f64,
}

/// Layer of a fluid-substitution model.
///
/// Samples below the last interval keep their in-situ fluid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidSubLayer {
    /// Rock, with porosity, clay volume and in-situ fluid when
    /// `subfluids` is not empty.
    pub rock: RockProperties,
    /// Layer thickness (metres).
    pub thickness: f64,
    /// Replacement-fluid intervals, top first.
    #[serde(default)]
    pub subfluids: Vec<FluidInterval>,
}

/// Layer stack with per-layer fluid replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FluidSubModelRaw", into = "FluidSubModelRaw")]
pub struct FluidSubModel {
    layers: Vec<FluidSubLayer>,
    dz: f64,
    minerals: Minerals,
}

#[derive(Serialize, Deserialize)]
struct FluidSubModelRaw {
    layers: Vec<FluidSubLayer>,
    dz: f64,
    #[serde(default)]
    minerals: Minerals,
}

impl TryFrom<FluidSubModelRaw> for FluidSubModel {
    type Error = SeisError;
    fn try_from(raw: FluidSubModelRaw) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.layers, raw.dz)?.with_minerals(raw.minerals))
    }
}

impl From<FluidSubModel> for FluidSubModelRaw {
    fn from(m: FluidSubModel) -> Self {
        Self {
            layers: m.layers,
            dz: m.dz,
            minerals: m.minerals,
        }
    }
}

/// Original and substituted logs with their synthetics.
///
/// Logs are on the model's depth axis. Synthetics are truncated to a common
/// sample count, since the substituted column has a different travel time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidSubResult {
    /// In-situ logs.
    pub original: PropertyGrid,
    /// Logs after fluid replacement.
    pub substituted: PropertyGrid,
    /// Synthetic of the in-situ logs.
    pub synthetic: SeismicVolume,
    /// Synthetic of the substituted logs.
    pub synthetic_sub: SeismicVolume,
}

impl FluidSubModel {
    /// Validate a layer stack sampled every `dz` metres.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] for an invalid stack, an interval
    /// with non-positive thickness, or a layer with replacement intervals
    /// whose rock lacks porosity, clay volume or in-situ fluid.
    pub fn new(layers: Vec<FluidSubLayer>, dz: f64) -> error::Result<Self> {
        let thicknesses: Vec<f64> = layers.iter().map(|l| l.thickness).collect();
        layer_sample_counts(&thicknesses, dz)?;
        for (i, layer) in layers.iter().enumerate() {
            for interval in &layer.subfluids {
                validate_positive(interval.thickness, "fluid interval thickness (m)")?;
            }
            let r = &layer.rock;
            if !layer.subfluids.is_empty()
                && (r.porosity().is_none() || r.vclay().is_none() || r.fluid().is_none())
            {
                return Err(SeisError::InvalidInput {
                    message: format!(
                        "layer {i} has replacement fluids but its rock lacks porosity, clay volume or fluid"
                    ),
                });
            }
        }
        Ok(Self {
            layers,
            dz,
            minerals: Minerals::default(),
        })
    }

    /// Override the mineral moduli.
    pub fn with_minerals(mut self, minerals: Minerals) -> Self {
        self.minerals = minerals;
        self
    }

    /// Layers, top first.
    pub fn layers(&self) -> &[FluidSubLayer] {
        &self.layers
    }

    /// Depth step (metres).
    pub fn dz(&self) -> f64 {
        self.dz
    }

    /// Mineral moduli.
    pub fn minerals(&self) -> &Minerals {
        &self.minerals
    }

    /// The underlying single-trace earth model.
    pub fn earth_model(&self) -> error::Result<EarthModel> {
        let layers = self
            .layers
            .iter()
            .map(|l| Layer::new(l.rock, l.thickness))
            .collect::<error::Result<Vec<_>>>()?;
        EarthModel::from_layers(&layers, self.dz)
    }

    /// In-situ and substituted depth logs.
    ///
    /// With `seed`, the in-situ logs are a Gaussian realization of the rock
    /// uncertainties; otherwise they hold the layer means.
    ///
    /// # Errors
    /// Propagates model construction and realization errors.
    pub fn logs(&self, seed: Option<u64>) -> error::Result<(PropertyGrid, PropertyGrid)> {
        let model = self.earth_model()?;
        let original = match seed {
            Some(seed) => model.realize(seed)?,
            None => model.properties(),
        };
        let thicknesses: Vec<f64> = self.layers.iter().map(|l| l.thickness).collect();
        let counts = layer_sample_counts(&thicknesses, self.dz)?;

        let mut substituted = original.clone();
        let mut top = 0;
        for (layer, &n) in self.layers.iter().zip(&counts) {
            let r = &layer.rock;
            let (Some(phi), Some(vclay), Some(insitu)) = (r.porosity(), r.vclay(), r.fluid()) else {
                top += n;
                continue;
            };
            let mut start = top;
            for interval in &layer.subfluids {
                let len = (interval.thickness / self.dz - 1e-9).ceil() as usize;
                let end = start.saturating_add(len).min(top + n);
                for s in start..end {
                    let rock = Elastic {
                        vp: original.vp[[s, 0]],
                        vs: original.vs[[s, 0]],
                        rho: original.rho[[s, 0]],
                    };
                    let sub = smith_substitution(rock, phi, vclay, insitu, &interval.fluid, &self.minerals);
                    substituted.vp[[s, 0]] = sub.vp;
                    substituted.vs[[s, 0]] = sub.vs;
                    substituted.rho[[s, 0]] = sub.rho;
                }
                start = end;
            }
            top += n;
        }

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_samples = original.n_samples(),
            n_layers = self.layers.len(),
            n_intervals = self.layers.iter().map(|l| l.subfluids.len()).sum::<usize>(),
            "fluid substitution complete"
        );

        Ok((original, substituted))
    }

    /// Substitute fluids and synthesize both columns with `forward`.
    ///
    /// The stochastic flag of `forward` selects realized logs (seeded by
    /// its seed) instead of layer means.
    ///
    /// # Errors
    /// Propagates the errors of [`logs`](Self::logs) and of the forward model.
    pub fn run(&self, forward: &ForwardModel) -> error::Result<FluidSubResult> {
        let params = forward.params();
        let seed = params.stochastic.then_some(params.seed);
        let (original, substituted) = self.logs(seed)?;

        // logs are synthesized as given; realization already happened above
        let forward = forward.clone().stochastic(false);
        let synthetic = forward.run_properties(&original, 1.0)?;
        let synthetic_sub = forward.run_properties(&substituted, 1.0)?;
        let n = synthetic.data().dim().0.min(synthetic_sub.data().dim().0);

        Ok(FluidSubResult {
            original,
            substituted,
            synthetic: synthetic.truncate(n),
            synthetic_sub: synthetic_sub.truncate(n),
        })
    }
}
