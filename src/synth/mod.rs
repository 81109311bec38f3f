//! Convolutional synthesis of seismic volumes.
//!
//! A [`ReflectivityVolume`] holds spikes indexed `[sample, trace, angle]`,
//! one at the upper sample of each interface. [`synthesize`] convolves every
//! `(trace, angle)` series with the wavelets of a [`WaveletBank`] and returns
//! a [`SeismicVolume`] indexed `[sample, trace, angle, wavelet]`.
//!
//! Interfaces superpose linearly within a trace; there are no multiples and
//! no mode conversion beyond what the reflectivity method encodes.

mod builder;
mod convolve;

pub use builder::{ForwardModel, SeismicParams};
pub use convolve::convolve_same;

use std::collections::HashMap;

use ndarray::{Array3, Array4, ArrayView1, s};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::earth::{EarthModel, PropertyGrid};
use crate::error::{self, SeisError};
use crate::reflectivity::{ReflectivityMethod, reflectivity};
use crate::rock::stream_rng;
use crate::types::Domain;
use crate::validate::{validate_finite, validate_positive};
use crate::wavelet::WaveletBank;

/// Relative tolerance when matching wavelet and grid sample intervals.
const DT_TOL: f64 = 1e-9;

/// Reflection coefficients indexed `[sample, trace, angle]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectivityVolume {
    data: Array3<f64>,
    angles: Vec<f64>,
    step: f64,
    dx: f64,
    domain: Domain,
}

impl ReflectivityVolume {
    /// Wrap precomputed coefficients.
    ///
    /// # Errors
    /// Returns [`SeisError::ShapeMismatch`] if the angle count differs from
    /// the third axis, and [`SeisError::InvalidInput`] for non-positive steps.
    pub fn new(data: Array3<f64>, angles: Vec<f64>, step: f64, dx: f64, domain: Domain) -> error::Result<Self> {
        validate_positive(step, "sample interval")?;
        validate_positive(dx, "trace spacing (m)")?;
        if data.dim().2 != angles.len() {
            return Err(SeisError::ShapeMismatch {
                message: format!(
                    "reflectivity has {} angle slices but {} angles were given",
                    data.dim().2,
                    angles.len()
                ),
            });
        }
        Ok(Self {
            data,
            angles,
            step,
            dx,
            domain,
        })
    }

    /// Reflectivity at the class boundaries of `model`.
    ///
    /// Each distinct `(upper class, lower class)` pair is solved once.
    ///
    /// # Errors
    /// Propagates the errors of [`reflectivity`].
    pub fn from_model(model: &EarthModel, angles: &[f64], method: ReflectivityMethod) -> error::Result<Self> {
        let (n, m) = model.classes().dim();
        let mut data = Array3::<f64>::zeros((n, m, angles.len()));
        let mut cache: HashMap<(usize, usize), Vec<f64>> = HashMap::new();
        let rocks = model.rocks();
        for (s, t) in model.boundaries() {
            let key = (model.classes()[[s, t]], model.classes()[[s + 1, t]]);
            if !cache.contains_key(&key) {
                let r = reflectivity(&rocks[key.0], &rocks[key.1], angles, method)?;
                cache.insert(key, r);
            }
            if let Some(r) = cache.get(&key) {
                data.slice_mut(s![s, t, ..]).assign(&ArrayView1::from(r.as_slice()));
            }
        }

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_samples = n,
            n_traces = m,
            n_angles = angles.len(),
            n_pairs = cache.len(),
            method = ?method,
            "assembled reflectivity volume"
        );

        Self::new(data, angles.to_vec(), model.step(), model.dx(), model.domain())
    }

    /// Reflectivity wherever adjacent cells of a property grid differ.
    ///
    /// Used for stochastic realizations, where every cell may carry its own
    /// values.
    ///
    /// # Errors
    /// Propagates the errors of [`reflectivity`] and of invalid cells.
    pub fn from_properties(
        grid: &PropertyGrid,
        dx: f64,
        angles: &[f64],
        method: ReflectivityMethod,
    ) -> error::Result<Self> {
        let (n, m) = grid.vp.dim();
        let mut data = Array3::<f64>::zeros((n, m, angles.len()));
        for t in 0..m {
            for s in 0..n.saturating_sub(1) {
                let same = grid.vp[[s, t]] == grid.vp[[s + 1, t]]
                    && grid.vs[[s, t]] == grid.vs[[s + 1, t]]
                    && grid.rho[[s, t]] == grid.rho[[s + 1, t]];
                if same {
                    continue;
                }
                let upper = grid.rock_at(s, t)?;
                let lower = grid.rock_at(s + 1, t)?;
                let r = reflectivity(&upper, &lower, angles, method)?;
                data.slice_mut(s![s, t, ..]).assign(&ArrayView1::from(r.as_slice()));
            }
        }
        Self::new(data, angles.to_vec(), grid.step, dx, grid.domain)
    }

    /// Coefficients indexed `[sample, trace, angle]`.
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Incidence angles (degrees).
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Vertical sample interval.
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
        self.data.dim().0
    }

    /// Number of traces.
    pub fn n_traces(&self) -> usize {
        self.data.dim().1
    }

    /// One reflectivity series.
    pub fn series(&self, trace: usize, angle: usize) -> ArrayView1<'_, f64> {
        self.data.slice(s![.., trace, angle])
    }
}

/// How a wavelet bank is combined with the angle axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveletPairing {
    /// Every angle against every wavelet (angle × frequency gathers).
    #[default]
    Cross,
    /// Wavelet `i` for angle `i`; the bank must match the angle count.
    PerAngle,
}

/// Additive noise at a signal-to-noise ratio relative to each clean trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseSpec {
    /// Signal-to-noise ratio in dB (RMS amplitude).
    pub snr_db: f64,
    /// Seed of the per-trace random streams.
    #[serde(default)]
    pub seed: u64,
}

/// Axis metadata of a [`SeismicVolume`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicAxes {
    /// Vertical sample interval.
    pub step: f64,
    /// Vertical axis.
    pub domain: Domain,
    /// Trace spacing (metres).
    pub dx: f64,
    /// Incidence angles (degrees).
    pub angles: Vec<f64>,
    /// How the wavelets were paired with the angles.
    #[serde(default)]
    pub pairing: WaveletPairing,
    /// Wavelet centre frequencies (Hz) of the bank.
    ///
    /// With [`WaveletPairing::Cross`] this is indexed by the wavelet axis of
    /// the volume. With [`WaveletPairing::PerAngle`] the wavelet axis has a
    /// single slot and this is indexed by angle instead. Use
    /// [`SeismicVolume::wavelet_frequency`] to look up either case.
    pub frequencies: Vec<f64>,
    /// Smallest amplitude in the volume.
    pub min_amplitude: f64,
    /// Largest amplitude in the volume.
    pub max_amplitude: f64,
}

/// Synthetic seismic indexed `[sample, trace, angle, wavelet]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicVolume {
    data: Array4<f64>,
    axes: SeismicAxes,
}

impl SeismicVolume {
    /// Amplitudes indexed `[sample, trace, angle, wavelet]`.
    pub fn data(&self) -> &Array4<f64> {
        &self.data
    }

    /// Axis metadata.
    pub fn axes(&self) -> &SeismicAxes {
        &self.axes
    }

    /// One synthetic trace.
    pub fn trace(&self, trace: usize, angle: usize, wavelet: usize) -> ArrayView1<'_, f64> {
        self.data.slice(s![.., trace, angle, wavelet])
    }

    /// Centre frequency (Hz) of the wavelet behind `[.., .., angle, slot]`,
    /// or `None` outside the volume.
    pub fn wavelet_frequency(&self, angle: usize, slot: usize) -> Option<f64> {
        let (_, _, n_angles, n_slots) = self.data.dim();
        if angle >= n_angles || slot >= n_slots {
            return None;
        }
        match self.axes.pairing {
            WaveletPairing::Cross => self.axes.frequencies.get(slot).copied(),
            WaveletPairing::PerAngle => self.axes.frequencies.get(angle).copied(),
        }
    }

    /// Smallest amplitude.
    pub fn min_amplitude(&self) -> f64 {
        self.axes.min_amplitude
    }

    /// Largest amplitude.
    pub fn max_amplitude(&self) -> f64 {
        self.axes.max_amplitude
    }

    /// Consume the volume, returning the raw array.
    pub fn into_data(self) -> Array4<f64> {
        self.data
    }

    /// The first `n` samples of every trace, with the amplitude range
    /// recomputed. A longer `n` returns the volume unchanged.
    pub fn truncate(&self, n: usize) -> SeismicVolume {
        let n = n.min(self.data.dim().0);
        let data = self.data.slice(s![..n, .., .., ..]).to_owned();
        let (min_amplitude, max_amplitude) = amplitude_range(&data);
        SeismicVolume {
            data,
            axes: SeismicAxes {
                min_amplitude,
                max_amplitude,
                ..self.axes.clone()
            },
        }
    }
}

fn amplitude_range(data: &Array4<f64>) -> (f64, f64) {
    if data.is_empty() {
        return (0.0, 0.0);
    }
    data.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Convolve a reflectivity volume with a wavelet bank.
///
/// # Errors
/// - [`SeisError::InvalidInput`] when the wavelets are longer than the
///   vertical grid or the SNR is not finite.
/// - [`SeisError::SamplingMismatch`] when a time-domain volume and the bank
///   use different sample intervals.
/// - [`SeisError::ShapeMismatch`] for [`WaveletPairing::PerAngle`] with a
///   bank size different from the angle count.
pub fn synthesize(
    reflectivity: &ReflectivityVolume,
    bank: &WaveletBank,
    pairing: WaveletPairing,
    noise: Option<NoiseSpec>,
) -> error::Result<SeismicVolume> {
    let (n, n_traces, n_angles) = reflectivity.data.dim();
    if bank.kernel_len() > n {
        return Err(SeisError::InvalidInput {
            message: format!(
                "wavelet of {} samples is longer than the {n}-sample trace",
                bank.kernel_len()
            ),
        });
    }
    if reflectivity.domain == Domain::Time && (bank.dt() - reflectivity.step).abs() > DT_TOL * reflectivity.step {
        return Err(SeisError::SamplingMismatch {
            requested: bank.dt(),
            native: reflectivity.step,
        });
    }
    if let Some(spec) = noise {
        validate_finite(spec.snr_db, "noise snr_db (dB)")?;
    }

    let (n_slots, frequencies) = match pairing {
        WaveletPairing::Cross => (bank.len(), bank.frequencies().to_vec()),
        WaveletPairing::PerAngle => {
            if bank.len() != n_angles {
                return Err(SeisError::ShapeMismatch {
                    message: format!("{} wavelets paired with {n_angles} angles", bank.len()),
                });
            }
            (1, bank.frequencies().to_vec())
        }
    };

    #[cfg(feature = "logging")]
    tracing::debug!(
        n_samples = n,
        n_traces,
        n_angles,
        n_wavelets = bank.len(),
        pairing = ?pairing,
        "synthesis started"
    );

    // job index = ((trace * n_angles) + angle) * n_slots + slot
    let n_jobs = n_traces * n_angles * n_slots;
    let run = |job: usize| -> Vec<f64> {
        let slot = job % n_slots;
        let angle = (job / n_slots) % n_angles;
        let trace = job / (n_slots * n_angles);
        let wavelet = match pairing {
            WaveletPairing::Cross => slot,
            WaveletPairing::PerAngle => angle,
        };
        let series = reflectivity.data.slice(s![.., trace, angle]).to_vec();
        let kernel = bank.kernels().row(wavelet).to_vec();
        let mut out = convolve_same(&series, &kernel);
        if let Some(spec) = noise {
            convolve::add_noise(&mut out, spec.snr_db, &mut stream_rng(spec.seed, job as u64));
        }
        out
    };

    #[cfg(feature = "parallel")]
    let traces: Vec<Vec<f64>> = (0..n_jobs).into_par_iter().map(run).collect();
    #[cfg(not(feature = "parallel"))]
    let traces: Vec<Vec<f64>> = (0..n_jobs).map(run).collect();

    let mut data = Array4::<f64>::zeros((n, n_traces, n_angles, n_slots));
    for (job, tr) in traces.iter().enumerate() {
        let slot = job % n_slots;
        let angle = (job / n_slots) % n_angles;
        let trace = job / (n_slots * n_angles);
        data.slice_mut(s![.., trace, angle, slot])
            .assign(&ArrayView1::from(tr.as_slice()));
    }

    let (min_amplitude, max_amplitude) = amplitude_range(&data);

    #[cfg(feature = "logging")]
    tracing::debug!(min_amplitude, max_amplitude, "synthesis complete");

    Ok(SeismicVolume {
        data,
        axes: SeismicAxes {
            step: reflectivity.step,
            domain: reflectivity.domain,
            dx: reflectivity.dx,
            angles: reflectivity.angles.clone(),
            pairing,
            frequencies,
            min_amplitude,
            max_amplitude,
        },
    })
}
