//! Linearized approximations in elastic contrasts: Aki–Richards and Fatti.

use super::{Coefficient, Contrasts, transmission_angle};
use crate::rock::RockProperties;

/// Aki–Richards three-term approximation evaluated at the mean of the
/// incidence and transmission angles.
///
/// `R = ½(Δvp/vp + Δρ/ρ) + (½Δvp/vp − 2(vs/vp)²(Δρ/ρ + 2Δvs/vs))·sin²θ + ½Δvp/vp·(tan²θ − sin²θ)`
pub(crate) fn aki_richards(upper: &RockProperties, lower: &RockProperties, theta: f64) -> Coefficient {
    let t1 = theta.to_radians();
    let Some(t2) = transmission_angle(upper, lower, t1) else {
        return Coefficient::PostCritical;
    };
    let c = Contrasts::new(upper, lower);
    let th = 0.5 * (t1 + t2);
    let s2 = th.sin().powi(2);
    let tn2 = th.tan().powi(2);

    let term1 = 0.5 * (c.dvp / c.vp + c.drho / c.rho);
    let term2 = (0.5 * c.dvp / c.vp - 2.0 * (c.vs / c.vp).powi(2) * (c.drho / c.rho + 2.0 * c.dvs / c.vs)) * s2;
    let term3 = 0.5 * c.dvp / c.vp * (tn2 - s2);
    Coefficient::Real(term1 + term2 + term3)
}

/// Fatti et al. form in P and S impedance contrasts.
///
/// Uses the incidence angle directly and is exact at normal incidence.
pub(crate) fn fatti(upper: &RockProperties, lower: &RockProperties, theta: f64) -> f64 {
    let t = theta.to_radians();
    let c = Contrasts::new(upper, lower);
    let s2 = t.sin().powi(2);
    let tn2 = t.tan().powi(2);

    let ip1 = upper.vp() * upper.rho();
    let ip2 = lower.vp() * lower.rho();
    let is1 = upper.vs() * upper.rho();
    let is2 = lower.vs() * lower.rho();
    let dip = (ip2 - ip1) / (ip2 + ip1);
    let dis = (is2 - is1) / (is2 + is1);
    let k = (c.vs / c.vp).powi(2);

    let term1 = (1.0 + tn2) * dip;
    let term2 = -8.0 * k * dis * s2;
    let term3 = -(0.5 * tn2 - 2.0 * k * s2) * c.drho / c.rho;
    term1 + term2 + term3
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pair() -> (RockProperties, RockProperties) {
        (
            RockProperties::new(1500.0, 1200.0, 2000.0).unwrap(),
            RockProperties::new(1800.0, 1400.0, 2200.0).unwrap(),
        )
    }

    #[test]
    fn aki_richards_reference_angles() {
        let (u, l) = pair();
        let expected = [
            (0.0, 0.13852813852813853),
            (15.0, 0.10597665814134684),
            (30.0, 0.026290696264022043),
        ];
        for (theta, r) in expected {
            let Coefficient::Real(v) = aki_richards(&u, &l, theta) else {
                panic!("pre-critical angle {theta} must give a real coefficient");
            };
            assert_abs_diff_eq!(v, r, epsilon = 1e-12);
        }
    }

    #[test]
    fn fatti_exact_at_normal_incidence() {
        let (u, l) = pair();
        assert_abs_diff_eq!(fatti(&u, &l, 0.0), 0.96 / 6.96, epsilon = 1e-14);
    }

    #[test]
    fn fatti_finite_beyond_critical() {
        let (u, l) = pair();
        assert!(fatti(&u, &l, 70.0).is_finite());
    }
}
