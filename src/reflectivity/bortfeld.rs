//! Bortfeld (1961) approximation.
//!
//! `R = ½·ln(vp₂ρ₂cosθ₁ / (vp₁ρ₁cosθ₂)) + (sinθ₁/vp₁)²·(vs₁² − vs₂²)·(2 + ln(ρ₂/ρ₁)/ln(vs₂/vs₁))`
//!
//! When `vs₁ = vs₂` the second term is `0·∞`; its limit
//! `−2·(sinθ₁/vp₁)²·vs₁²·ln(ρ₂/ρ₁)` is used instead.

use super::{Coefficient, transmission_angle};
use crate::rock::RockProperties;

/// Relative shear-velocity difference below which the limit form applies.
const EQUAL_VS_TOL: f64 = 1e-12;

pub(crate) fn bortfeld(upper: &RockProperties, lower: &RockProperties, theta: f64) -> Coefficient {
    let t1 = theta.to_radians();
    let Some(t2) = transmission_angle(upper, lower, t1) else {
        return Coefficient::PostCritical;
    };
    let (vp1, vs1, rho1) = (upper.vp(), upper.vs(), upper.rho());
    let (vp2, vs2, rho2) = (lower.vp(), lower.vs(), lower.rho());

    let term1 = 0.5 * ((vp2 * rho2 * t1.cos()) / (vp1 * rho1 * t2.cos())).ln();
    let p2 = (t1.sin() / vp1).powi(2);
    let ln_rho = (rho2 / rho1).ln();
    let ln_vs = (vs2 / vs1).ln();
    let term2 = if ln_vs.abs() < EQUAL_VS_TOL {
        -2.0 * p2 * vs1 * vs1 * ln_rho
    } else {
        p2 * (vs1 * vs1 - vs2 * vs2) * (2.0 + ln_rho / ln_vs)
    };
    Coefficient::Real(term1 + term2)
}
