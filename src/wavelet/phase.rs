//! Constant-phase rotation through the analytic signal.
//!
//! The rotated wavelet is `w·cos φ − H(w)·sin φ`, where `H` is the Hilbert
//! transform computed by zeroing the negative-frequency half of the spectrum.

use rustfft::{FftPlanner, num_complex::Complex64};

/// Analytic signal `w + i·H(w)` of a real sequence.
pub(crate) fn analytic_signal(samples: &[f64]) -> Vec<Complex64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut buf: Vec<Complex64> = samples.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    forward.process(&mut buf);

    // DC and (for even n) Nyquist keep unit weight; positive bins double.
    let half = n / 2;
    for (k, c) in buf.iter_mut().enumerate() {
        let weight = if k == 0 || (n % 2 == 0 && k == half) {
            1.0
        } else if k < n.div_ceil(2) {
            2.0
        } else {
            0.0
        };
        *c *= weight;
    }

    inverse.process(&mut buf);
    let scale = 1.0 / n as f64;
    buf.iter_mut().for_each(|c| *c *= scale);
    buf
}

/// Rotate `samples` by a constant `phase` in degrees.
pub fn rotate_phase(samples: &[f64], phase: f64) -> Vec<f64> {
    if phase == 0.0 {
        return samples.to_vec();
    }
    let (s, c) = phase.to_radians().sin_cos();
    analytic_signal(samples)
        .into_iter()
        .map(|z| z.re * c - z.im * s)
        .collect()
}
