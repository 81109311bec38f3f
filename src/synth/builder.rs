//! End-to-end forward modelling: earth model to seismic volume.
//!
//! ```
//! use synthseis::earth::{EarthModel, Layer};
//! use synthseis::rock::RockProperties;
//! use synthseis::synth::ForwardModel;
//! use synthseis::types::AngleAxis;
//!
//! let shale = RockProperties::new(2400.0, 1100.0, 2450.0)?;
//! let sand = RockProperties::new(2800.0, 1500.0, 2300.0)?;
//! let model = EarthModel::from_layers(
//!     &[Layer::new(shale, 300.0)?, Layer::new(sand, 300.0)?],
//!     1.0,
//! )?;
//!
//! let seismic = ForwardModel::new()
//!     .angles(AngleAxis::range(0.0, 30.0, 10.0))
//!     .run(&model)?;
//! assert_eq!(seismic.data().dim().2, 4);
//! assert!(seismic.max_amplitude() > 0.0);
//! # Ok::<(), synthseis::SeisError>(())
//! ```

use serde::{Deserialize, Serialize};

use super::{NoiseSpec, ReflectivityVolume, SeismicVolume, WaveletPairing, synthesize};
use crate::earth::{EarthModel, PropertyGrid};
use crate::error;
use crate::reflectivity::ReflectivityMethod;
use crate::types::{AngleAxis, Domain};
use crate::wavelet::{FrequencyAxis, Wavelet, WaveletBank, WaveletShape};

/// Default Ricker peak frequency (Hz).
pub const DEFAULT_FREQUENCY: f64 = 25.0;
/// Default wavelet length (s).
pub const DEFAULT_DURATION: f64 = 0.2;
/// Default time sample interval (s).
pub const DEFAULT_DT: f64 = 0.001;

/// Request-level synthesis parameters.
///
/// Every field has a default, so a partial JSON object is a valid request.
///
/// ```
/// use synthseis::synth::SeismicParams;
/// use synthseis::reflectivity::ReflectivityMethod;
///
/// let p: SeismicParams = serde_json::from_str(
///     r#"{"method": "shuey3", "angles": {"range": {"min": 0.0, "max": 40.0, "step": 5.0}}}"#,
/// ).unwrap();
/// assert_eq!(p.method, ReflectivityMethod::Shuey3);
/// assert_eq!(p.dt, 0.001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeismicParams {
    /// Wavelet family and frequencies.
    pub wavelet: WaveletShape,
    /// Wavelet length (s).
    pub duration: f64,
    /// Time sample interval (s).
    pub dt: f64,
    /// Constant phase rotation of the wavelet (degrees).
    pub phase: f64,
    /// Frequency gather axis; `None` uses the wavelet as given.
    pub frequencies: Option<FrequencyAxis>,
    /// Incidence angles.
    pub angles: AngleAxis,
    /// Reflectivity method.
    pub method: ReflectivityMethod,
    /// How wavelets pair with angles.
    pub pairing: WaveletPairing,
    /// Optional signal-to-noise ratio (dB).
    pub snr_db: Option<f64>,
    /// Seed of all random streams.
    pub seed: u64,
    /// Draw a Gaussian realization of the rock properties before synthesis.
    pub stochastic: bool,
    /// Convert depth models to two-way time before synthesis.
    pub time_domain: bool,
}

impl Default for SeismicParams {
    fn default() -> Self {
        Self {
            wavelet: WaveletShape::Ricker {
                frequency: DEFAULT_FREQUENCY,
            },
            duration: DEFAULT_DURATION,
            dt: DEFAULT_DT,
            phase: 0.0,
            frequencies: None,
            angles: AngleAxis::default(),
            method: ReflectivityMethod::default(),
            pairing: WaveletPairing::default(),
            snr_db: None,
            seed: 0,
            stochastic: false,
            time_domain: true,
        }
    }
}

/// Builder running the forward-modelling pipeline.
///
/// The pipeline is: optional Gaussian realization, depth to time
/// conversion, reflectivity at the interfaces, wavelet bank, convolution
/// and optional noise. Nothing is validated until [`run`](Self::run).
#[derive(Debug, Clone, Default)]
pub struct ForwardModel {
    params: SeismicParams,
}

impl ForwardModel {
    /// Builder with default parameters (Ricker 25 Hz, 0.2 s, 1 ms, Zoeppritz, normal incidence).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder from deserialized parameters.
    pub fn from_params(params: SeismicParams) -> Self {
        Self { params }
    }

    /// Current parameters.
    pub fn params(&self) -> &SeismicParams {
        &self.params
    }

    /// Set the wavelet shape.
    pub fn wavelet(mut self, shape: WaveletShape) -> Self {
        self.params.wavelet = shape;
        self
    }

    /// Set the wavelet length (s).
    pub fn duration(mut self, duration: f64) -> Self {
        self.params.duration = duration;
        self
    }

    /// Set the time sample interval (s).
    pub fn dt(mut self, dt: f64) -> Self {
        self.params.dt = dt;
        self
    }

    /// Set the wavelet phase rotation (degrees).
    pub fn phase(mut self, phase: f64) -> Self {
        self.params.phase = phase;
        self
    }

    /// Build a frequency gather along `axis`.
    pub fn frequencies(mut self, axis: FrequencyAxis) -> Self {
        self.params.frequencies = Some(axis);
        self
    }

    /// Set the incidence angles.
    pub fn angles(mut self, angles: AngleAxis) -> Self {
        self.params.angles = angles;
        self
    }

    /// Set the reflectivity method.
    pub fn method(mut self, method: ReflectivityMethod) -> Self {
        self.params.method = method;
        self
    }

    /// Set how wavelets pair with angles.
    pub fn pairing(mut self, pairing: WaveletPairing) -> Self {
        self.params.pairing = pairing;
        self
    }

    /// Add noise at `snr_db`.
    pub fn noise(mut self, snr_db: f64) -> Self {
        self.params.snr_db = Some(snr_db);
        self
    }

    /// Set the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.params.seed = seed;
        self
    }

    /// Synthesize a Gaussian realization instead of the class means.
    pub fn stochastic(mut self, on: bool) -> Self {
        self.params.stochastic = on;
        self
    }

    /// Keep depth models in depth, treating wavelet samples as grid samples.
    pub fn time_domain(mut self, on: bool) -> Self {
        self.params.time_domain = on;
        self
    }

    /// Wavelet bank of the current parameters.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`](crate::SeisError::InvalidInput)
    /// for invalid wavelet or frequency parameters.
    pub fn wavelet_bank(&self) -> error::Result<WaveletBank> {
        let p = &self.params;
        let wavelet = Wavelet::new(p.wavelet, p.duration, p.dt)?.with_phase(p.phase)?;
        match &p.frequencies {
            None => Ok(WaveletBank::single(&wavelet)),
            Some(axis) => wavelet.bank(axis),
        }
    }

    /// Reflectivity volume of `model` on the synthesis axis.
    ///
    /// # Errors
    /// Propagates conversion and reflectivity errors.
    pub fn reflectivity(&self, model: &EarthModel) -> error::Result<ReflectivityVolume> {
        let p = &self.params;
        let angles = p.angles.values()?;
        if p.stochastic {
            let grid = model.realize(p.seed)?;
            let grid = self.on_synthesis_axis(grid)?;
            return ReflectivityVolume::from_properties(&grid, model.dx(), &angles, p.method);
        }
        let model = if p.time_domain {
            model.to_time(p.dt)?
        } else {
            model.clone()
        };
        ReflectivityVolume::from_model(&model, &angles, p.method)
    }

    /// Run the full pipeline on an earth model.
    ///
    /// # Errors
    /// Returns the first error of any stage.
    pub fn run(&self, model: &EarthModel) -> error::Result<SeismicVolume> {
        #[cfg(feature = "logging")]
        tracing::debug!(
            n_samples = model.n_samples(),
            n_traces = model.n_traces(),
            method = ?self.params.method,
            stochastic = self.params.stochastic,
            "forward model started"
        );

        let reflectivity = self.reflectivity(model)?;
        self.convolve(&reflectivity)
    }

    /// Run the pipeline on explicit property logs, such as well logs or a
    /// fluid-substituted model.
    ///
    /// # Errors
    /// Returns the first error of any stage.
    pub fn run_properties(&self, grid: &PropertyGrid, dx: f64) -> error::Result<SeismicVolume> {
        let angles = self.params.angles.values()?;
        let grid = self.on_synthesis_axis(grid.clone())?;
        let reflectivity = ReflectivityVolume::from_properties(&grid, dx, &angles, self.params.method)?;
        self.convolve(&reflectivity)
    }

    fn on_synthesis_axis(&self, grid: PropertyGrid) -> error::Result<PropertyGrid> {
        if self.params.time_domain || grid.domain == Domain::Time {
            grid.to_time(self.params.dt)
        } else {
            Ok(grid)
        }
    }

    fn convolve(&self, reflectivity: &ReflectivityVolume) -> error::Result<SeismicVolume> {
        let bank = self.wavelet_bank()?;
        // noise streams are kept apart from realization streams
        let noise = self.params.snr_db.map(|snr_db| NoiseSpec {
            snr_db,
            seed: !self.params.seed,
        });
        let volume = synthesize(reflectivity, &bank, self.params.pairing, noise)?;

        #[cfg(feature = "logging")]
        tracing::debug!(
            shape = ?volume.data().dim(),
            max_amplitude = volume.max_amplitude(),
            "forward model complete"
        );

        Ok(volume)
    }
}
