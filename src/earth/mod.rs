//! Earth models: grids of rock classes on a depth or time axis.
//!
//! An [`EarthModel`] stores a 2-D grid of class indices indexed
//! `[sample, trace]` together with the rock assigned to each class. A
//! single-trace model is a one-column grid. Models are built either from a
//! layer stack ([`EarthModel::from_layers`]) or from a palette image and a
//! colour-to-rock mapping ([`EarthModel::from_image`]); both produce the
//! same contract, so downstream code never distinguishes them.
//!
//! Property values are materialized on demand: [`EarthModel::properties`]
//! returns the class means, [`EarthModel::realize`] draws a seeded
//! Gaussian realization around them.
//!
//! Resampling ([`EarthModel::to_time`], [`EarthModel::to_depth`]) always
//! returns a new model.

mod convert;
mod layered;
mod raster;
mod store;

pub use convert::{depth_to_time, time_to_depth, travel_times};
pub use layered::{Layer, layer_sample_counts};
pub use raster::{PaletteImage, Rgb};
pub use store::{LayerDescriptor, MemoryStore, ModelDescriptor, RockStore};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{self, SeisError};
use crate::rock::{RockProperties, stream_rng};
use crate::types::Domain;
use crate::validate::validate_positive;

/// Relative tolerance when comparing sample intervals.
const STEP_TOL: f64 = 1e-9;

/// Grid of rock classes with its sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthModel {
    classes: Array2<usize>,
    rocks: Vec<RockProperties>,
    step: f64,
    dx: f64,
    domain: Domain,
}

/// Per-cell elastic properties, indexed `[sample, trace]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyGrid {
    /// P velocity (m/s).
    pub vp: Array2<f64>,
    /// S velocity (m/s).
    pub vs: Array2<f64>,
    /// Density (kg/m³).
    pub rho: Array2<f64>,
    /// Vertical sample interval (m or s).
    pub step: f64,
    /// Vertical axis.
    pub domain: Domain,
}

impl PropertyGrid {
    /// Number of vertical samples.
    pub fn n_samples(&self) -> usize {
        self.vp.nrows()
    }

    /// Number of traces.
    pub fn n_traces(&self) -> usize {
        self.vp.ncols()
    }

    /// Rock at one cell.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] if the cell holds non-physical values.
    pub fn rock_at(&self, sample: usize, trace: usize) -> error::Result<RockProperties> {
        RockProperties::new(
            self.vp[[sample, trace]],
            self.vs[[sample, trace]],
            self.rho[[sample, trace]],
        )
    }

    /// Resample a depth grid to two-way time with step `dt`.
    ///
    /// # Errors
    /// Returns [`SeisError::SamplingMismatch`] for a time grid whose step is
    /// not `dt`, and the errors of [`depth_to_time`].
    pub fn to_time(&self, dt: f64) -> error::Result<Self> {
        if self.domain == Domain::Time {
            check_native_step(dt, self.step)?;
            return Ok(self.clone());
        }
        Ok(Self {
            vp: depth_to_time(&self.vp, &self.vp, self.step, dt)?,
            vs: depth_to_time(&self.vs, &self.vp, self.step, dt)?,
            rho: depth_to_time(&self.rho, &self.vp, self.step, dt)?,
            step: dt,
            domain: Domain::Time,
        })
    }
}

impl EarthModel {
    /// Build a model from a class grid and its rocks.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] for an empty grid, non-positive
    /// steps, or a class index without a rock.
    pub fn new(
        classes: Array2<usize>,
        rocks: Vec<RockProperties>,
        step: f64,
        dx: f64,
        domain: Domain,
    ) -> error::Result<Self> {
        validate_positive(step, "sample interval")?;
        validate_positive(dx, "trace spacing (m)")?;
        if classes.is_empty() {
            return Err(SeisError::InvalidInput {
                message: "earth model grid is empty".into(),
            });
        }
        if let Some(&bad) = classes.iter().find(|&&c| c >= rocks.len()) {
            return Err(SeisError::InvalidInput {
                message: format!("class index {bad} has no rock ({} rocks defined)", rocks.len()),
            });
        }
        Ok(Self {
            classes,
            rocks,
            step,
            dx,
            domain,
        })
    }

    /// Class grid indexed `[sample, trace]`.
    pub fn classes(&self) -> &Array2<usize> {
        &self.classes
    }

    /// Rock assigned to each class.
    pub fn rocks(&self) -> &[RockProperties] {
        &self.rocks
    }

    /// Vertical sample interval (metres or seconds).
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Trace spacing (metres).
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Vertical axis.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Number of vertical samples.
    pub fn n_samples(&self) -> usize {
        self.classes.nrows()
    }

    /// Number of traces.
    pub fn n_traces(&self) -> usize {
        self.classes.ncols()
    }

    /// Vertical extent, `n_samples · step`.
    pub fn extent(&self) -> f64 {
        self.n_samples() as f64 * self.step
    }

    /// Rock at one cell, or `None` outside the grid.
    pub fn rock_at(&self, sample: usize, trace: usize) -> Option<&RockProperties> {
        self.classes
            .get([sample, trace])
            .and_then(|&c| self.rocks.get(c))
    }

    /// Interfaces as `(sample, trace)` pairs, where `sample` is the last
    /// sample above a class change. Ordered trace-major within each sample row.
    pub fn boundaries(&self) -> Vec<(usize, usize)> {
        let (n, m) = self.classes.dim();
        let mut out = Vec::new();
        for s in 0..n.saturating_sub(1) {
            for t in 0..m {
                if self.classes[[s, t]] != self.classes[[s + 1, t]] {
                    out.push((s, t));
                }
            }
        }
        out
    }

    /// Class-mean property grid.
    pub fn properties(&self) -> PropertyGrid {
        let pick = |f: fn(&RockProperties) -> f64| self.classes.mapv(|c| f(&self.rocks[c]));
        PropertyGrid {
            vp: pick(RockProperties::vp),
            vs: pick(RockProperties::vs),
            rho: pick(RockProperties::rho),
            step: self.step,
            domain: self.domain,
        }
    }

    /// Gaussian realization of the property grid.
    ///
    /// Each cell of a class with non-zero standard deviations is drawn
    /// independently. Trace `j` uses its own random stream derived from
    /// `(seed, j)`, so a realization is reproducible for a given seed.
    ///
    /// # Errors
    /// Returns [`SeisError::NumericalError`] if a draw is non-physical.
    pub fn realize(&self, seed: u64) -> error::Result<PropertyGrid> {
        let mut grid = self.properties();
        if !self.rocks.iter().any(RockProperties::is_uncertain) {
            return Ok(grid);
        }
        let (n, m) = self.classes.dim();
        for t in 0..m {
            let mut rng = stream_rng(seed, t as u64);
            for s in 0..n {
                let rock = self.rocks[self.classes[[s, t]]].realize(&mut rng)?;
                grid.vp[[s, t]] = rock.vp();
                grid.vs[[s, t]] = rock.vs();
                grid.rho[[s, t]] = rock.rho();
            }
        }
        Ok(grid)
    }

    /// Resample a depth model to two-way time with step `dt`.
    ///
    /// A time model is returned unchanged when `dt` equals its native step.
    ///
    /// # Errors
    /// Returns [`SeisError::SamplingMismatch`] when the model is already in
    /// time at a different rate, and the errors of [`depth_to_time`].
    pub fn to_time(&self, dt: f64) -> error::Result<Self> {
        if self.domain == Domain::Time {
            check_native_step(dt, self.step)?;
            return Ok(self.clone());
        }
        let vp = self.properties().vp;
        let classes = depth_to_time(&self.classes, &vp, self.step, dt)?;

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_depth = self.n_samples(),
            n_time = classes.nrows(),
            dz = self.step,
            dt,
            "converted earth model to time"
        );

        EarthModel::new(classes, self.rocks.clone(), dt, self.dx, Domain::Time)
    }

    /// Resample a time model to depth with step `dz`.
    ///
    /// # Errors
    /// Returns [`SeisError::SamplingMismatch`] when the model is already in
    /// depth at a different step, and the errors of [`time_to_depth`].
    pub fn to_depth(&self, dz: f64) -> error::Result<Self> {
        if self.domain == Domain::Depth {
            check_native_step(dz, self.step)?;
            return Ok(self.clone());
        }
        let vp = self.properties().vp;
        let classes = time_to_depth(&self.classes, &vp, self.step, dz)?;

        #[cfg(feature = "logging")]
        tracing::debug!(n_time = self.n_samples(), n_depth = classes.nrows(), dz, "converted earth model to depth");

        EarthModel::new(classes, self.rocks.clone(), dz, self.dx, Domain::Depth)
    }
}

fn check_native_step(requested: f64, native: f64) -> error::Result<()> {
    validate_positive(requested, "sample interval")?;
    if (requested - native).abs() > STEP_TOL * native {
        return Err(SeisError::SamplingMismatch { requested, native });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn rocks() -> Vec<RockProperties> {
        vec![
            RockProperties::new(2000.0, 1000.0, 2000.0).unwrap(),
            RockProperties::new(3000.0, 1500.0, 2400.0).unwrap(),
        ]
    }

    #[test]
    fn rejects_unmapped_class() {
        let classes = array![[0, 2], [1, 1]];
        let r = EarthModel::new(classes, rocks(), 1.0, 1.0, Domain::Depth);
        assert!(matches!(r, Err(SeisError::InvalidInput { .. })));
    }

    #[test]
    fn boundaries_on_upper_sample() {
        let classes = array![[0, 0], [0, 1], [1, 1], [1, 1]];
        let model = EarthModel::new(classes, rocks(), 1.0, 10.0, Domain::Depth).unwrap();
        assert_eq!(model.boundaries(), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn properties_follow_classes() {
        let classes = array![[0], [1]];
        let model = EarthModel::new(classes, rocks(), 1.0, 1.0, Domain::Depth).unwrap();
        let p = model.properties();
        assert_eq!(p.vp[[0, 0]], 2000.0);
        assert_eq!(p.rho[[1, 0]], 2400.0);
        assert_eq!(model.rock_at(1, 0), Some(&rocks()[1]));
        assert_eq!(model.rock_at(2, 0), None);
    }

    #[test]
    fn realize_without_uncertainty_is_mean() {
        let model = EarthModel::new(array![[0], [1]], rocks(), 1.0, 1.0, Domain::Depth).unwrap();
        assert_eq!(model.realize(9).unwrap(), model.properties());
    }

    #[test]
    fn realize_perturbs_reproducibly() {
        let noisy = rocks()
            .into_iter()
            .map(|r| r.with_uncertainty(20.0, 10.0, 5.0).unwrap())
            .collect();
        let classes = Array2::<usize>::zeros((20, 3));
        let model = EarthModel::new(classes, noisy, 1.0, 1.0, Domain::Depth).unwrap();
        let a = model.realize(1).unwrap();
        let b = model.realize(1).unwrap();
        let c = model.realize(2).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        // cells differ within a flat layer
        assert_ne!(a.vp[[0, 0]], a.vp[[1, 0]]);
        let mean = a.vp.mean().unwrap_or(0.0);
        assert!((mean - 2000.0).abs() < 20.0);
    }

    #[test]
    fn to_time_rejects_other_rate_on_time_model() {
        let model = EarthModel::new(array![[0], [1]], rocks(), 0.002, 1.0, Domain::Time).unwrap();
        let r = model.to_time(0.001);
        assert!(matches!(
            r,
            Err(SeisError::SamplingMismatch { requested, native }) if requested == 0.001 && native == 0.002
        ));
        assert_eq!(model.to_time(0.002).unwrap(), model);
    }

    #[test]
    fn uniform_velocity_depth_to_time() {
        // 100 m at 2000 m/s is 0.1 s two-way
        let mut classes = Array2::<usize>::zeros((100, 1));
        for s in 50..100 {
            classes[[s, 0]] = 1;
        }
        let same = vec![rocks()[0], rocks()[0]];
        let model = EarthModel::new(classes, same, 1.0, 1.0, Domain::Depth).unwrap();
        let t = model.to_time(0.001).unwrap();
        assert_eq!(t.domain(), Domain::Time);
        assert_eq!(t.n_samples(), 100);
        assert_eq!(t.boundaries(), vec![(49, 0)]);
        assert_abs_diff_eq!(t.extent(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn time_round_trip_preserves_layering() {
        let mut classes = Array2::<usize>::zeros((60, 1));
        for s in 20..60 {
            classes[[s, 0]] = 1;
        }
        let model = EarthModel::new(classes, rocks(), 1.0, 1.0, Domain::Depth).unwrap();
        let t = model.to_time(0.0005).unwrap();
        let back = t.to_depth(1.0).unwrap();
        assert_eq!(back.boundaries(), vec![(19, 0)]);
        // the time grid ends on a partial sample, so the depth axis is truncated
        assert_eq!(back.n_samples(), 59);
    }
}
