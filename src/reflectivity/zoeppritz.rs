//! Exact P-P reflection coefficient from the Zoeppritz equations.
//!
//! The four boundary conditions (continuity of tangential and normal
//! displacement, shear and normal stress) form a 4×4 system `M · x = b` in
//! the unknowns `(Rp, Rs, Tp, Ts)`. Only `Rp` is returned.
//!
//! A fluid layer (`vs = 0`) carries no shear wave and cannot transmit
//! tangential displacement, so the tangential-displacement row and that
//! layer's S-wave column are removed before solving. Two fluids reduce to
//! the 2×2 acoustic problem.

use nalgebra::{DMatrix, DVector};

use super::Coefficient;
use crate::rock::RockProperties;

/// Boundary-condition matrix and incident-wave vector at one angle.
struct System {
    m: [[f64; 4]; 4],
    b: [f64; 4],
}

/// P-P reflection coefficient at incidence `theta` (degrees).
pub(crate) fn rpp(upper: &RockProperties, lower: &RockProperties, theta: f64) -> Coefficient {
    let Some(system) = build(upper, lower, theta) else {
        return Coefficient::PostCritical;
    };

    let mut rows: Vec<usize> = vec![0, 1, 2, 3];
    let mut cols: Vec<usize> = vec![0, 1, 2, 3];
    if upper.is_fluid() || lower.is_fluid() {
        rows.retain(|&r| r != 0);
    }
    if upper.is_fluid() {
        cols.retain(|&c| c != 1);
    }
    if lower.is_fluid() {
        cols.retain(|&c| c != 3);
    }
    if upper.is_fluid() && lower.is_fluid() {
        // no shear stress on either side
        rows.retain(|&r| r != 2);
    }

    let n = rows.len();
    let a = DMatrix::<f64>::from_fn(n, n, |i, j| system.m[rows[i]][cols[j]]);
    let rhs = DVector::<f64>::from_fn(n, |i, _| system.b[rows[i]]);
    match a.lu().solve(&rhs) {
        Some(x) if x[0].is_finite() => Coefficient::Real(x[0]),
        _ => Coefficient::Singular,
    }
}

/// Assemble the system, or `None` when a transmitted wave is evanescent.
fn build(upper: &RockProperties, lower: &RockProperties, theta: f64) -> Option<System> {
    let (vp1, vs1, rho1) = (upper.vp(), upper.vs(), upper.rho());
    let (vp2, vs2, rho2) = (lower.vp(), lower.vs(), lower.rho());

    let t1 = theta.to_radians();
    let p = t1.sin() / vp1;
    if (p * vp2).abs() >= 1.0 || (p * vs2).abs() >= 1.0 {
        return None;
    }
    let t2 = (p * vp2).asin();
    let f1 = (p * vs1).asin();
    let f2 = (p * vs2).asin();

    let (st1, ct1) = t1.sin_cos();
    let (st2, ct2) = t2.sin_cos();
    let (sf1, cf1) = f1.sin_cos();
    let (sf2, cf2) = f2.sin_cos();

    let m = [
        [-st1, -cf1, st2, cf2],
        [ct1, -sf1, ct2, -sf2],
        [
            2.0 * rho1 * vs1 * sf1 * ct1,
            rho1 * vs1 * (1.0 - 2.0 * sf1 * sf1),
            2.0 * rho2 * vs2 * sf2 * ct2,
            rho2 * vs2 * (1.0 - 2.0 * sf2 * sf2),
        ],
        [
            -rho1 * vp1 * (1.0 - 2.0 * sf1 * sf1),
            rho1 * vs1 * (2.0 * f1).sin(),
            rho2 * vp2 * (1.0 - 2.0 * sf2 * sf2),
            -rho2 * vs2 * (2.0 * f2).sin(),
        ],
    ];
    let b = [
        st1,
        ct1,
        2.0 * rho1 * vs1 * sf1 * ct1,
        rho1 * vp1 * (1.0 - 2.0 * sf1 * sf1),
    ];
    Some(System { m, b })
}
