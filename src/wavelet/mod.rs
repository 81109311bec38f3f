//! Parametric source wavelets and wavelet banks.
//!
//! A [`Wavelet`] is a pure description `(shape, duration, dt, phase)`;
//! [`Wavelet::generate`] samples it into a kernel of
//! `round(duration / dt)` samples whose time zero sits at index `n / 2`.
//!
//! # Shapes
//!
//! | Shape | Parameters | Definition |
//! |---|---|---|
//! | [`Ricker`](WaveletShape::Ricker) | peak frequency `f` | `(1 − 2π²f²t²)·exp(−π²f²t²)` |
//! | [`Ormsby`](WaveletShape::Ormsby) | corners `f1 < f2 ≤ f3 < f4` | trapezoidal pass band, peak-normalized |
//! | [`Sweep`](WaveletShape::Sweep) | `f_low < f_high` | Klauder wavelet: tapered autocorrelation of a linear chirp |
//!
//! A non-zero phase is applied after generation as a constant-phase rotation
//! (see [`rotate_phase`]).
//!
//! # Frequency axes
//!
//! Frequency gathers use a [`FrequencyAxis`] and [`Wavelet::bank`] to build
//! one wavelet per frequency. Each shape is rescaled so that its centre
//! frequency matches the axis value.

mod phase;

pub use phase::rotate_phase;

use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{self, SeisError};
use crate::types::inclusive_range;
use crate::validate::{validate_finite, validate_positive, validate_sample_count};

/// Lowest frequency of an octave axis (Hz).
pub const OCTAVE_FLOOR_HZ: f64 = 7.0;

/// Default step of a linear frequency axis (Hz).
pub const DEFAULT_FREQUENCY_STEP: f64 = 0.5;

/// Wavelet family and its frequency parameters (Hz).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WaveletShape {
    /// Mexican-hat wavelet with peak frequency `frequency`.
    Ricker {
        /// Peak frequency (Hz).
        frequency: f64,
    },
    /// Band-pass wavelet with a trapezoidal amplitude spectrum.
    Ormsby {
        /// Low cut.
        f1: f64,
        /// Low pass.
        f2: f64,
        /// High pass.
        f3: f64,
        /// High cut.
        f4: f64,
    },
    /// Klauder wavelet of a linear up-sweep from `f_low` to `f_high`.
    Sweep {
        /// Sweep start frequency.
        f_low: f64,
        /// Sweep end frequency.
        f_high: f64,
    },
}

impl WaveletShape {
    /// Registry key of the shape.
    pub fn name(&self) -> &'static str {
        match self {
            WaveletShape::Ricker { .. } => "ricker",
            WaveletShape::Ormsby { .. } => "ormsby",
            WaveletShape::Sweep { .. } => "sweep",
        }
    }

    /// Representative frequency of the shape: the Ricker peak, the centre of
    /// the Ormsby pass band, or the centre of the sweep.
    pub fn centre_frequency(&self) -> f64 {
        match *self {
            WaveletShape::Ricker { frequency } => frequency,
            WaveletShape::Ormsby { f2, f3, .. } => 0.5 * (f2 + f3),
            WaveletShape::Sweep { f_low, f_high } => 0.5 * (f_low + f_high),
        }
    }

    /// The same shape with all frequencies scaled so that
    /// [`centre_frequency`](Self::centre_frequency) equals `frequency`.
    pub fn at_frequency(&self, frequency: f64) -> error::Result<Self> {
        validate_positive(frequency, "frequency (Hz)")?;
        let k = frequency / self.centre_frequency();
        Ok(match *self {
            WaveletShape::Ricker { .. } => WaveletShape::Ricker { frequency },
            WaveletShape::Ormsby { f1, f2, f3, f4 } => WaveletShape::Ormsby {
                f1: f1 * k,
                f2: f2 * k,
                f3: f3 * k,
                f4: f4 * k,
            },
            WaveletShape::Sweep { f_low, f_high } => WaveletShape::Sweep {
                f_low: f_low * k,
                f_high: f_high * k,
            },
        })
    }

    fn validate(&self) -> error::Result<()> {
        match *self {
            WaveletShape::Ricker { frequency } => {
                validate_positive(frequency, "Ricker frequency (Hz)")?;
            }
            WaveletShape::Ormsby { f1, f2, f3, f4 } => {
                for (v, name) in [(f1, "f1"), (f2, "f2"), (f3, "f3"), (f4, "f4")] {
                    validate_finite(v, name)?;
                }
                if !(0.0 <= f1 && f1 < f2 && f2 <= f3 && f3 < f4) {
                    return Err(SeisError::InvalidInput {
                        message: format!(
                            "Ormsby corners must satisfy 0 <= f1 < f2 <= f3 < f4, got {f1}, {f2}, {f3}, {f4}"
                        ),
                    });
                }
            }
            WaveletShape::Sweep { f_low, f_high } => {
                validate_positive(f_low, "sweep f_low (Hz)")?;
                validate_positive(f_high, "sweep f_high (Hz)")?;
                if f_high <= f_low {
                    return Err(SeisError::InvalidInput {
                        message: format!("sweep must go up in frequency, got {f_low} -> {f_high}"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Sampled-wavelet description.
///
/// # Examples
///
/// ```
/// use synthseis::wavelet::{Wavelet, WaveletShape};
///
/// let w = Wavelet::new(WaveletShape::Ricker { frequency: 25.0 }, 0.2, 0.001)?;
/// let k = w.generate();
/// assert_eq!(k.len(), 200);
/// assert_eq!(k[100], 1.0); // t = 0 at index n/2
/// # Ok::<(), synthseis::SeisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WaveletRaw", into = "WaveletRaw")]
pub struct Wavelet {
    shape: WaveletShape,
    duration: f64,
    dt: f64,
    phase: f64,
}

#[derive(Serialize, Deserialize)]
struct WaveletRaw {
    shape: WaveletShape,
    duration: f64,
    dt: f64,
    #[serde(default)]
    phase: f64,
}

impl TryFrom<WaveletRaw> for Wavelet {
    type Error = SeisError;
    fn try_from(raw: WaveletRaw) -> Result<Self, Self::Error> {
        Self::new(raw.shape, raw.duration, raw.dt)?.with_phase(raw.phase)
    }
}

impl From<Wavelet> for WaveletRaw {
    fn from(w: Wavelet) -> Self {
        Self {
            shape: w.shape,
            duration: w.duration,
            dt: w.dt,
            phase: w.phase,
        }
    }
}

impl Wavelet {
    /// Describe a zero-phase wavelet of length `duration` sampled every `dt` seconds.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] for non-positive `duration`/`dt`,
    /// a duration shorter than two samples or longer than the sample limit,
    /// or invalid shape frequencies.
    pub fn new(shape: WaveletShape, duration: f64, dt: f64) -> error::Result<Self> {
        validate_positive(duration, "wavelet duration (s)")?;
        validate_positive(dt, "wavelet dt (s)")?;
        shape.validate()?;
        if (duration / dt).round() < 2.0 {
            return Err(SeisError::InvalidInput {
                message: format!("wavelet duration {duration} s holds fewer than two samples of {dt} s"),
            });
        }
        validate_sample_count((duration / dt).round(), "wavelet")?;
        Ok(Self {
            shape,
            duration,
            dt,
            phase: 0.0,
        })
    }

    /// Set the constant phase rotation in degrees.
    pub fn with_phase(mut self, phase: f64) -> error::Result<Self> {
        self.phase = validate_finite(phase, "phase (deg)")?;
        Ok(self)
    }

    /// Wavelet family.
    pub fn shape(&self) -> &WaveletShape {
        &self.shape
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Sample interval in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Phase rotation in degrees.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Number of samples, `round(duration / dt)`.
    pub fn len(&self) -> usize {
        (self.duration / self.dt).round() as usize
    }

    /// Always false; a wavelet holds at least two samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample times relative to the wavelet centre.
    pub fn times(&self) -> Vec<f64> {
        let n = self.len();
        let centre = (n / 2) as f64;
        (0..n).map(|i| (i as f64 - centre) * self.dt).collect()
    }

    /// The same wavelet rescaled to centre frequency `frequency`.
    pub fn at_frequency(&self, frequency: f64) -> error::Result<Self> {
        let shape = self.shape.at_frequency(frequency)?;
        shape.validate()?;
        Ok(Self { shape, ..*self })
    }

    /// Sample the wavelet.
    pub fn generate(&self) -> Vec<f64> {
        let t = self.times();
        let w = match self.shape {
            WaveletShape::Ricker { frequency } => ricker(&t, frequency),
            WaveletShape::Ormsby { f1, f2, f3, f4 } => ormsby(&t, [f1, f2, f3, f4]),
            WaveletShape::Sweep { f_low, f_high } => sweep(t.len(), self.dt, f_low, f_high),
        };
        rotate_phase(&w, self.phase)
    }

    /// One wavelet per frequency of `axis`, stacked into a bank.
    pub fn bank(&self, axis: &FrequencyAxis) -> error::Result<WaveletBank> {
        let freqs = axis.values()?;
        let mut kernels = Array2::<f64>::zeros((freqs.len(), self.len()));
        for (i, &f) in freqs.iter().enumerate() {
            let w = self.at_frequency(f)?.generate();
            kernels.row_mut(i).assign(&ArrayView1::from(w.as_slice()));
        }
        Ok(WaveletBank {
            kernels,
            frequencies: freqs,
            dt: self.dt,
        })
    }
}

fn ricker(t: &[f64], f: f64) -> Vec<f64> {
    let a = (PI * f).powi(2);
    t.iter()
        .map(|&ti| {
            let x = a * ti * ti;
            (1.0 - 2.0 * x) * (-x).exp()
        })
        .collect()
}

/// Normalized sinc, `sin(πx)/(πx)`.
fn sinc(x: f64) -> f64 {
    if x == 0.0 { 1.0 } else { (PI * x).sin() / (PI * x) }
}

fn ormsby(t: &[f64], [f1, f2, f3, f4]: [f64; 4]) -> Vec<f64> {
    let term = |f: f64, ti: f64| (PI * f).powi(2) * sinc(f * ti).powi(2);
    let w: Vec<f64> = t
        .iter()
        .map(|&ti| {
            (term(f4, ti) - term(f3, ti)) / (f4 - f3) - (term(f2, ti) - term(f1, ti)) / (f2 - f1)
        })
        .collect();
    normalize_peak(w)
}

fn sweep(n: usize, dt: f64, f_low: f64, f_high: f64) -> Vec<f64> {
    let length = n as f64 * dt;
    let rate = (f_high - f_low) / length;
    let chirp: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 * dt;
            (2.0 * PI * (f_low * t + 0.5 * rate * t * t)).cos()
        })
        .collect();
    let centre = n / 2;
    let w: Vec<f64> = (0..n)
        .map(|i| {
            let lag = i as isize - centre as isize;
            let ac: f64 = (0..n)
                .filter_map(|j| {
                    let k = j as isize + lag;
                    (0..n as isize).contains(&k).then(|| chirp[j] * chirp[k as usize])
                })
                .sum();
            // Hann taper centred on zero lag
            let taper = 0.5 * (1.0 + (PI * lag as f64 / centre.max(1) as f64).cos());
            ac * taper
        })
        .collect();
    normalize_peak(w)
}

fn normalize_peak(mut w: Vec<f64>) -> Vec<f64> {
    let peak = w.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if peak > 0.0 {
        w.iter_mut().for_each(|v| *v /= peak);
    }
    w
}

/// Frequency axis for frequency gathers.
///
/// # Examples
///
/// ```
/// use synthseis::wavelet::FrequencyAxis;
///
/// let lin = FrequencyAxis::linear(10.0, 12.0);
/// assert_eq!(lin.values()?, vec![10.0, 10.5, 11.0, 11.5, 12.0]);
///
/// let oct = FrequencyAxis::Octave { start: 2.0, end: 56.0, count: 4 };
/// let v = oct.values()?;
/// assert!((v[0] - 7.0).abs() < 1e-12); // floored at 7 Hz
/// assert!((v[3] - 56.0).abs() < 1e-9);
/// # Ok::<(), synthseis::SeisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FrequencyAxis {
    /// One frequency.
    Single {
        /// Frequency (Hz).
        frequency: f64,
    },
    /// Evenly spaced from `start` to `end` inclusive.
    Linear {
        /// First frequency (Hz).
        start: f64,
        /// Last frequency (Hz).
        end: f64,
        /// Increment (Hz).
        #[serde(default = "default_frequency_step")]
        step: f64,
    },
    /// `count` log2-spaced frequencies from `max(start, 7 Hz)` to `end`.
    Octave {
        /// Requested lowest frequency (Hz).
        start: f64,
        /// Highest frequency (Hz).
        end: f64,
        /// Number of frequencies.
        count: usize,
    },
}

fn default_frequency_step() -> f64 {
    DEFAULT_FREQUENCY_STEP
}

impl FrequencyAxis {
    /// Linear axis with the default 0.5 Hz step.
    pub fn linear(start: f64, end: f64) -> Self {
        FrequencyAxis::Linear {
            start,
            end,
            step: DEFAULT_FREQUENCY_STEP,
        }
    }

    /// Materialize the axis in Hz.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] for non-positive frequencies, a
    /// reversed range, or an empty octave axis.
    pub fn values(&self) -> error::Result<Vec<f64>> {
        match *self {
            FrequencyAxis::Single { frequency } => {
                validate_positive(frequency, "frequency (Hz)")?;
                Ok(vec![frequency])
            }
            FrequencyAxis::Linear { start, end, step } => {
                validate_positive(start, "start frequency (Hz)")?;
                inclusive_range(start, end, step, "frequency")
            }
            FrequencyAxis::Octave { start, end, count } => {
                validate_positive(start, "start frequency (Hz)")?;
                validate_positive(end, "end frequency (Hz)")?;
                let lo = start.max(OCTAVE_FLOOR_HZ).log2();
                let hi = end.log2();
                if count == 0 || hi < lo {
                    return Err(SeisError::InvalidInput {
                        message: format!(
                            "octave axis needs count > 0 and end >= {OCTAVE_FLOOR_HZ} Hz, got count={count}, end={end}"
                        ),
                    });
                }
                validate_sample_count(count as f64, "octave frequency axis")?;
                if count == 1 {
                    return Ok(vec![lo.exp2()]);
                }
                let step = (hi - lo) / (count - 1) as f64;
                Ok((0..count).map(|i| (lo + step * i as f64).exp2()).collect())
            }
        }
    }
}

/// Equal-length wavelets sharing one sample interval, indexed
/// `[wavelet, sample]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveletBank {
    kernels: Array2<f64>,
    frequencies: Vec<f64>,
    dt: f64,
}

impl WaveletBank {
    /// Bank holding a single wavelet.
    pub fn single(wavelet: &Wavelet) -> Self {
        Self {
            kernels: Array1::from(wavelet.generate()).insert_axis(Axis(0)),
            frequencies: vec![wavelet.shape().centre_frequency()],
            dt: wavelet.dt(),
        }
    }

    /// Bank from explicitly sampled kernels.
    ///
    /// # Errors
    /// Returns [`SeisError::ShapeMismatch`] if the kernels differ in length
    /// or `frequencies` does not match the kernel count, and
    /// [`SeisError::InvalidInput`] for an empty bank or invalid `dt`.
    pub fn from_kernels(kernels: Vec<Vec<f64>>, frequencies: Vec<f64>, dt: f64) -> error::Result<Self> {
        validate_positive(dt, "time sample interval dt (s)")?;
        let Some(first) = kernels.first() else {
            return Err(SeisError::InvalidInput {
                message: "wavelet bank is empty".into(),
            });
        };
        let n = first.len();
        if n == 0 {
            return Err(SeisError::InvalidInput {
                message: "wavelet kernels must not be empty".into(),
            });
        }
        if let Some(bad) = kernels.iter().find(|k| k.len() != n) {
            return Err(SeisError::ShapeMismatch {
                message: format!("wavelet lengths differ: {n} and {}", bad.len()),
            });
        }
        if frequencies.len() != kernels.len() {
            return Err(SeisError::ShapeMismatch {
                message: format!(
                    "{} frequencies given for {} wavelets",
                    frequencies.len(),
                    kernels.len()
                ),
            });
        }
        let rows = kernels.len();
        let flat: Vec<f64> = kernels.into_iter().flatten().collect();
        let kernels = Array2::from_shape_vec((rows, n), flat).map_err(|e| SeisError::ShapeMismatch {
            message: e.to_string(),
        })?;
        Ok(Self {
            kernels,
            frequencies,
            dt,
        })
    }

    /// Kernels indexed `[wavelet, sample]`.
    pub fn kernels(&self) -> &Array2<f64> {
        &self.kernels
    }

    /// Centre frequency of each wavelet (Hz).
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Sample interval in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of wavelets.
    pub fn len(&self) -> usize {
        self.kernels.nrows()
    }

    /// True when the bank holds no wavelet (never for a constructed bank).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples per wavelet.
    pub fn kernel_len(&self) -> usize {
        self.kernels.ncols()
    }
}
