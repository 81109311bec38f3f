//! "Same"-length convolution and additive noise.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Convolve `signal` with `kernel`, keeping `signal.len()` output samples.
///
/// The kernel sample at index `kernel.len() / 2` is its time zero and lands
/// on each input sample; the signal is zero-padded at both ends. Zero input
/// samples are skipped, so sparse reflectivity series are cheap.
///
/// # Examples
///
/// ```
/// use synthseis::synth::convolve_same;
///
/// let mut r = vec![0.0; 7];
/// r[3] = 2.0;
/// let out = convolve_same(&r, &[1.0, 3.0, 1.0]);
/// assert_eq!(out, vec![0.0, 0.0, 2.0, 6.0, 2.0, 0.0, 0.0]);
/// ```
pub fn convolve_same(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let centre = kernel.len() / 2;
    let mut out = vec![0.0; n];
    for (j, &s) in signal.iter().enumerate() {
        if s == 0.0 {
            continue;
        }
        for (k, &w) in kernel.iter().enumerate() {
            let Some(i) = (j + k).checked_sub(centre) else {
                continue;
            };
            if i >= n {
                break;
            }
            out[i] += s * w;
        }
    }
    out
}

/// Root-mean-square amplitude.
pub(crate) fn rms(trace: &[f64]) -> f64 {
    if trace.is_empty() {
        return 0.0;
    }
    (trace.iter().map(|v| v * v).sum::<f64>() / trace.len() as f64).sqrt()
}

/// Add white Gaussian noise at `snr_db` below the trace's RMS amplitude.
///
/// A silent trace stays silent.
pub(crate) fn add_noise<R: Rng + ?Sized>(trace: &mut [f64], snr_db: f64, rng: &mut R) {
    let signal = rms(trace);
    if signal == 0.0 {
        return;
    }
    let sigma = signal / 10f64.powf(snr_db / 20.0);
    let Ok(noise) = Normal::new(0.0, sigma) else {
        return;
    };
    for v in trace.iter_mut() {
        *v += noise.sample(rng);
    }
}
