//! Shuey (1985) approximations parameterized by Poisson's ratio.
//!
//! `R(θ) = R₀ + G·sin²θ [+ ½·Δvp/vp·(tan²θ − sin²θ)]`, where `R₀` is the
//! linearized normal-incidence term and `G` the gradient
//! `G = R₀·E + Δν/(1 − ν)²` with
//! `E = F − 2(1 + F)(1 − 2ν)/(1 − ν)` and `F = (Δvp/vp) / (Δvp/vp + Δρ/ρ)`.

use super::Contrasts;
use crate::conventions::poisson_ratio;
use crate::rock::RockProperties;

/// Intercept and gradient of the two-term form.
fn intercept_gradient(upper: &RockProperties, lower: &RockProperties) -> (f64, f64, Contrasts) {
    let c = Contrasts::new(upper, lower);
    let pr1 = poisson_ratio(upper.vp(), upper.vs());
    let pr2 = poisson_ratio(lower.vp(), lower.vs());
    let pr = 0.5 * (pr1 + pr2);
    let dpr = pr2 - pr1;

    let a = c.dvp / c.vp;
    let r0 = 0.5 * (a + c.drho / c.rho);
    // R₀·E expanded so that F never divides by a vanishing R₀
    let r0_e = 0.5 * a - 2.0 * (r0 + 0.5 * a) * (1.0 - 2.0 * pr) / (1.0 - pr);
    let g = r0_e + dpr / (1.0 - pr).powi(2);
    (r0, g, c)
}

/// Two-term Shuey: intercept plus gradient.
pub(crate) fn shuey2(upper: &RockProperties, lower: &RockProperties, theta: f64) -> f64 {
    let (r0, g, _) = intercept_gradient(upper, lower);
    r0 + g * theta.to_radians().sin().powi(2)
}

/// Three-term Shuey: adds the far-angle curvature term.
pub(crate) fn shuey3(upper: &RockProperties, lower: &RockProperties, theta: f64) -> f64 {
    let (r0, g, c) = intercept_gradient(upper, lower);
    let t = theta.to_radians();
    let s2 = t.sin().powi(2);
    r0 + g * s2 + 0.5 * c.dvp / c.vp * (t.tan().powi(2) - s2)
}
