//! Depth ↔ two-way-time resampling.
//!
//! Sample `k` of an input trace covers the interval `[c_k, c_{k+1})` of the
//! output axis, where `c` is the cumulative travel time (or depth) at the
//! sample tops. Output sample `m` at `m · step` takes the value of the input
//! sample whose interval contains it. Nearest-sample lookup keeps contacts
//! sharp; values are never blended.
//!
//! The output holds `floor(min_trace_extent / step)` samples, so every trace
//! is truncated at the shortest one and nothing is extrapolated.

use ndarray::{Array2, ArrayView1};

use crate::conventions::two_way_time;
use crate::error::{self, SeisError};
use crate::validate::{validate_positive, validate_sample_count};

/// Slack, relative to the output step, when locating sample boundaries.
const COORD_TOL: f64 = 1e-9;

/// Two-way time at the top of each depth sample, plus the base of the trace.
///
/// Returns `n + 1` values for `n` velocities, starting at zero.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use synthseis::earth::travel_times;
///
/// let t = travel_times(array![2000.0, 2000.0, 4000.0].view(), 10.0);
/// assert_eq!(t.len(), 4);
/// assert!((t[2] - 0.02).abs() < 1e-15);
/// assert!((t[3] - 0.025).abs() < 1e-15);
/// ```
pub fn travel_times(vp: ArrayView1<'_, f64>, dz: f64) -> Vec<f64> {
    cumulate(vp, |v| two_way_time(dz, v))
}

/// Depth at the top of each time sample, from interval velocities.
fn depths(vp: ArrayView1<'_, f64>, dt: f64) -> Vec<f64> {
    cumulate(vp, |v| 0.5 * v * dt)
}

fn cumulate(vp: ArrayView1<'_, f64>, increment: impl Fn(f64) -> f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(vp.len() + 1);
    let mut acc = 0.0;
    out.push(acc);
    for &v in vp.iter() {
        acc += increment(v);
        out.push(acc);
    }
    out
}

/// Resample a depth grid `[sample, trace]` onto a two-way-time axis of step `dt`.
///
/// `vp` supplies the interval velocity of every cell and must have the same
/// shape as `data`. Works for any copyable cell type, including class indices.
///
/// # Errors
/// Returns [`SeisError::ShapeMismatch`] if the shapes differ and
/// [`SeisError::InvalidInput`] for non-positive steps or velocities, or a
/// grid shorter than one output sample.
pub fn depth_to_time<T: Copy>(
    data: &Array2<T>,
    vp: &Array2<f64>,
    dz: f64,
    dt: f64,
) -> error::Result<Array2<T>> {
    validate_positive(dz, "depth sample interval dz (m)")?;
    validate_positive(dt, "time sample interval dt (s)")?;
    check_velocity(data.dim(), vp)?;
    resample(data, vp, dt, |col| travel_times(col, dz))
}

/// Resample a two-way-time grid onto a depth axis of step `dz`.
///
/// # Errors
/// As for [`depth_to_time`].
pub fn time_to_depth<T: Copy>(
    data: &Array2<T>,
    vp: &Array2<f64>,
    dt: f64,
    dz: f64,
) -> error::Result<Array2<T>> {
    validate_positive(dt, "time sample interval dt (s)")?;
    validate_positive(dz, "depth sample interval dz (m)")?;
    check_velocity(data.dim(), vp)?;
    resample(data, vp, dz, |col| depths(col, dt))
}

fn check_velocity(shape: (usize, usize), vp: &Array2<f64>) -> error::Result<()> {
    if vp.dim() != shape {
        return Err(SeisError::ShapeMismatch {
            message: format!("velocity grid {:?} does not match data grid {:?}", vp.dim(), shape),
        });
    }
    if let Some(&bad) = vp.iter().find(|v| !v.is_finite() || **v <= 0.0) {
        return Err(SeisError::InvalidInput {
            message: format!("interval velocity must be positive and finite, got {bad}"),
        });
    }
    Ok(())
}

fn resample<T: Copy>(
    data: &Array2<T>,
    vp: &Array2<f64>,
    step: f64,
    coords: impl Fn(ArrayView1<'_, f64>) -> Vec<f64>,
) -> error::Result<Array2<T>> {
    let (_, n_traces) = data.dim();
    let tops: Vec<Vec<f64>> = vp.columns().into_iter().map(coords).collect();
    let shortest = tops
        .iter()
        .filter_map(|c| c.last().copied())
        .fold(f64::INFINITY, f64::min);
    let n_out = validate_sample_count((shortest / step + COORD_TOL).floor(), "resampled grid")?;
    if n_out == 0 {
        return Err(SeisError::InvalidInput {
            message: format!("grid spans {shortest}, less than one output sample of {step}"),
        });
    }

    let tol = COORD_TOL * step;
    let out = Array2::from_shape_fn((n_out, n_traces), |(m, j)| {
        let x = m as f64 * step;
        let c = &tops[j];
        // index of the last sample top at or above x
        let k = c[..c.len() - 1].partition_point(|&top| top <= x + tol);
        data[[k.saturating_sub(1), j]]
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn constant_velocity_is_one_to_one() {
        // dz = 1 m at 2000 m/s is exactly 1 ms two-way
        let data = Array2::from_shape_fn((10, 2), |(i, j)| i * 10 + j);
        let vp = Array2::from_elem((10, 2), 2000.0);
        let t = depth_to_time(&data, &vp, 1.0, 0.001).unwrap();
        assert_eq!(t, data);
    }

    #[test]
    fn fast_layer_is_compressed() {
        let data = array![[0usize], [0], [1], [1]];
        let vp = array![[1000.0], [1000.0], [2000.0], [2000.0]];
        // tops at 0, 2, 4, 5, 6 ms
        let t = depth_to_time(&data, &vp, 1.0, 0.001).unwrap();
        assert_eq!(t.column(0).to_vec(), vec![0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn rejects_oversampled_axis() {
        let data = Array2::<u8>::zeros((10, 1));
        let vp = Array2::from_elem((10, 1), 2000.0);
        // 10 ms of two-way time at 1 ps would be 10^10 samples
        let r = depth_to_time(&data, &vp, 1.0, 1e-12);
        assert!(matches!(r, Err(SeisError::InvalidInput { .. })));
    }

    #[test]
    fn truncates_to_shortest_trace() {
        let data = Array2::<u8>::zeros((4, 2));
        let vp = array![[1000.0, 2000.0], [1000.0, 2000.0], [1000.0, 2000.0], [1000.0, 2000.0]];
        let t = depth_to_time(&data, &vp, 1.0, 0.001).unwrap();
        // the fast trace spans 4 ms, the slow one 8 ms
        assert_eq!(t.nrows(), 4);
    }

    #[test]
    fn rejects_mismatched_velocity() {
        let data = Array2::<u8>::zeros((4, 2));
        let vp = Array2::from_elem((4, 1), 2000.0);
        assert!(matches!(
            depth_to_time(&data, &vp, 1.0, 0.001),
            Err(SeisError::ShapeMismatch { .. })
        ));
        let vp = Array2::from_elem((4, 2), 0.0);
        assert!(matches!(
            depth_to_time(&data, &vp, 1.0, 0.001),
            Err(SeisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn time_to_depth_inverts_constant_velocity() {
        let data = Array2::from_shape_fn((8, 1), |(i, _)| i);
        let vp = Array2::from_elem((8, 1), 2000.0);
        let z = time_to_depth(&data, &vp, 0.001, 1.0).unwrap();
        assert_eq!(z, data);
    }
}
