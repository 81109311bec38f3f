//! Stochastic AVO: reflectivity statistics over rock-property uncertainty.
//!
//! Each realization draws `(vp, vs, rho)` for both rocks from Gaussians
//! centred on the means with the rocks' standard deviations. Within one rock
//! the three standardized deviates share a common correlation coefficient
//! (0.8 unless set otherwise), applied through a Cholesky factor.
//!
//! Realization `i` uses its own random stream derived from `(seed, i)`, so
//! the statistics do not depend on whether draws run in parallel.

use nalgebra::{Matrix3, Vector3};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{ReflectivityMethod, reflectivity};
use crate::error::{self, SeisError};
use crate::rock::{RockProperties, stream_rng};
use crate::validate::validate_finite;

/// Monte-Carlo AVO experiment configuration.
///
/// # Examples
///
/// ```
/// use synthseis::reflectivity::{MonteCarloAvo, ReflectivityMethod};
/// use synthseis::rock::RockProperties;
///
/// let upper = RockProperties::new(2400.0, 1100.0, 2300.0)?.with_uncertainty(50.0, 30.0, 20.0)?;
/// let lower = RockProperties::new(2700.0, 1400.0, 2250.0)?.with_uncertainty(80.0, 40.0, 30.0)?;
///
/// let stats = MonteCarloAvo::new(200, 42)?
///     .method(ReflectivityMethod::Shuey2)
///     .run(&upper, &lower, &[0.0, 10.0, 20.0, 30.0])?;
/// assert_eq!(stats.mean.len(), 4);
/// assert!(stats.std.iter().all(|&s| s > 0.0));
/// # Ok::<(), synthseis::SeisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloAvo {
    realizations: usize,
    seed: u64,
    method: ReflectivityMethod,
    correlation: f64,
}

/// Summary of a Monte-Carlo AVO run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvoStatistics {
    /// Incidence angles (degrees).
    pub theta: Vec<f64>,
    /// Mean reflectivity per angle.
    pub mean: Vec<f64>,
    /// Population standard deviation per angle.
    pub std: Vec<f64>,
    /// `(intercept, gradient)` of `R ≈ A + B·sin²θ` per realization,
    /// empty when fewer than two distinct angles were requested.
    pub intercept_gradient: Vec<(f64, f64)>,
}

impl MonteCarloAvo {
    /// Default correlation between the vp, vs and rho deviates of one rock.
    pub const DEFAULT_CORRELATION: f64 = 0.8;

    /// Configure `realizations` draws seeded with `seed`.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] when `realizations` is zero.
    pub fn new(realizations: usize, seed: u64) -> error::Result<Self> {
        if realizations == 0 {
            return Err(SeisError::InvalidInput {
                message: "at least one realization is required".into(),
            });
        }
        Ok(Self {
            realizations,
            seed,
            method: ReflectivityMethod::default(),
            correlation: Self::DEFAULT_CORRELATION,
        })
    }

    /// Reflectivity method used for every draw.
    pub fn method(mut self, method: ReflectivityMethod) -> Self {
        self.method = method;
        self
    }

    /// Correlation between the property deviates of one rock.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] unless `-0.5 < correlation < 1`,
    /// the range in which the 3×3 equicorrelation matrix is positive definite.
    pub fn correlation(mut self, correlation: f64) -> error::Result<Self> {
        validate_finite(correlation, "correlation")?;
        if correlation <= -0.5 || correlation >= 1.0 {
            return Err(SeisError::InvalidInput {
                message: format!("correlation must lie in (-0.5, 1), got {correlation}"),
            });
        }
        self.correlation = correlation;
        Ok(self)
    }

    /// Number of realizations.
    pub fn realizations(&self) -> usize {
        self.realizations
    }

    /// Run the experiment at the angles `theta` (degrees).
    ///
    /// Post-critical angles contribute zero, following [`reflectivity`].
    ///
    /// # Errors
    /// Returns [`SeisError::NumericalError`] if a draw is non-physical
    /// (negative velocity or density, or `vs ≥ vp`), and the errors of
    /// [`reflectivity`].
    pub fn run(
        &self,
        upper: &RockProperties,
        lower: &RockProperties,
        theta: &[f64],
    ) -> error::Result<AvoStatistics> {
        let factor = Matrix3::new(
            1.0,
            self.correlation,
            self.correlation,
            self.correlation,
            1.0,
            self.correlation,
            self.correlation,
            self.correlation,
            1.0,
        )
        .cholesky()
        .ok_or_else(|| SeisError::NumericalError {
            message: "correlation matrix is not positive definite".into(),
        })?
        .l();

        #[cfg(feature = "logging")]
        tracing::debug!(
            realizations = self.realizations,
            method = %self.method,
            n_angles = theta.len(),
            "running Monte-Carlo AVO"
        );

        let draw = |i: usize| -> error::Result<Vec<f64>> {
            let mut rng = stream_rng(self.seed, i as u64);
            let u = correlated_draw(upper, &factor, &mut rng)?;
            let l = correlated_draw(lower, &factor, &mut rng)?;
            reflectivity(&u, &l, theta, self.method)
        };

        #[cfg(feature = "parallel")]
        let curves = (0..self.realizations)
            .into_par_iter()
            .map(draw)
            .collect::<error::Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let curves = (0..self.realizations)
            .map(draw)
            .collect::<error::Result<Vec<_>>>()?;

        let n = curves.len() as f64;
        let mut mean = vec![0.0; theta.len()];
        for curve in &curves {
            for (m, r) in mean.iter_mut().zip(curve) {
                *m += r / n;
            }
        }
        let mut std = vec![0.0; theta.len()];
        for curve in &curves {
            for ((s, r), m) in std.iter_mut().zip(curve).zip(&mean) {
                *s += (r - m).powi(2) / n;
            }
        }
        std.iter_mut().for_each(|s| *s = s.sqrt());

        let intercept_gradient = curves
            .iter()
            .filter_map(|curve| fit_intercept_gradient(theta, curve))
            .collect();

        Ok(AvoStatistics {
            theta: theta.to_vec(),
            mean,
            std,
            intercept_gradient,
        })
    }
}

/// One realization of `rock` with deviates correlated through `factor`.
fn correlated_draw<R: Rng + ?Sized>(
    rock: &RockProperties,
    factor: &Matrix3<f64>,
    rng: &mut R,
) -> error::Result<RockProperties> {
    let z = Vector3::<f64>::new(
        StandardNormal.sample(rng),
        StandardNormal.sample(rng),
        StandardNormal.sample(rng),
    );
    let x: Vector3<f64> = factor * z;
    let vp = rock.vp() + x[0] * rock.vp_std();
    let vs = rock.vs() + x[1] * rock.vs_std();
    let rho = rock.rho() + x[2] * rock.rho_std();
    RockProperties::new(vp, vs, rho).map_err(|_| SeisError::NumericalError {
        message: format!("perturbed rock is not physical: vp={vp}, vs={vs}, rho={rho}"),
    })
}

/// Least-squares fit of `r = a + b·sin²θ`.
fn fit_intercept_gradient(theta: &[f64], r: &[f64]) -> Option<(f64, f64)> {
    let n = theta.len() as f64;
    let x: Vec<f64> = theta.iter().map(|t| t.to_radians().sin().powi(2)).collect();
    let sx: f64 = x.iter().sum();
    let sy: f64 = r.iter().sum();
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    let sxy: f64 = x.iter().zip(r).map(|(a, b)| a * b).sum();
    let det = n * sxx - sx * sx;
    if theta.len() < 2 || det.abs() < 1e-15 {
        return None;
    }
    let b = (n * sxy - sx * sy) / det;
    let a = (sy - b * sx) / n;
    Some((a, b))
}
