//! One-dimensional layer stacks rasterized onto a uniform depth axis.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::EarthModel;
use crate::error::{self, SeisError};
use crate::rock::RockProperties;
use crate::types::Domain;
use crate::validate::{validate_positive, validate_sample_count};

/// Rounding slack, in samples, when dividing thicknesses by the step.
const SAMPLE_TOL: f64 = 1e-9;

/// A rock layer of given thickness (metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Rock filling the layer.
    pub rock: RockProperties,
    /// Layer thickness (metres, > 0).
    pub thickness: f64,
}

impl Layer {
    /// Create a layer.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] for a non-positive thickness.
    pub fn new(rock: RockProperties, thickness: f64) -> error::Result<Self> {
        validate_positive(thickness, "layer thickness (m)")?;
        Ok(Self { rock, thickness })
    }
}

/// Number of samples each layer occupies on a grid of step `dz`.
///
/// The grid holds `floor(Σ thickness / dz)` samples. Every layer but the
/// last takes `ceil(thickness / dz)` samples (clipped to what remains) and
/// the last layer absorbs the remainder, so the counts always sum to the
/// grid length.
///
/// # Examples
///
/// ```
/// use synthseis::earth::layer_sample_counts;
///
/// let counts = layer_sample_counts(&[10.0, 15.0, 20.0], 4.0)?;
/// assert_eq!(counts, vec![3, 4, 4]);
/// assert_eq!(counts.iter().sum::<usize>(), 11); // floor(45 / 4)
/// # Ok::<(), synthseis::SeisError>(())
/// ```
///
/// # Errors
/// Returns [`SeisError::InvalidInput`] for an empty stack, a non-positive
/// thickness or step, or a stack thinner than one sample.
pub fn layer_sample_counts(thicknesses: &[f64], dz: f64) -> error::Result<Vec<usize>> {
    validate_positive(dz, "depth sample interval dz (m)")?;
    if thicknesses.is_empty() {
        return Err(SeisError::InvalidInput {
            message: "layer stack is empty".into(),
        });
    }
    for &th in thicknesses {
        validate_positive(th, "layer thickness (m)")?;
    }
    let total_thickness: f64 = thicknesses.iter().sum();
    let total = validate_sample_count((total_thickness / dz + SAMPLE_TOL).floor(), "layer stack")?;
    if total == 0 {
        return Err(SeisError::InvalidInput {
            message: format!("layer stack of {total_thickness} m is thinner than one sample of {dz} m"),
        });
    }

    let mut remaining = total;
    let last = thicknesses.len() - 1;
    let counts = thicknesses
        .iter()
        .enumerate()
        .map(|(i, &th)| {
            let n = if i == last {
                remaining
            } else {
                ((th / dz - SAMPLE_TOL).ceil() as usize).min(remaining)
            };
            remaining -= n;
            n
        })
        .collect();
    Ok(counts)
}

impl EarthModel {
    /// Single-trace depth model from an ordered layer stack (top first).
    ///
    /// Each layer gets its own class index, in stack order.
    ///
    /// # Examples
    ///
    /// ```
    /// use synthseis::earth::{EarthModel, Layer};
    /// use synthseis::rock::RockProperties;
    ///
    /// let shale = RockProperties::new(2400.0, 1100.0, 2450.0)?;
    /// let sand = RockProperties::new(2800.0, 1500.0, 2300.0)?;
    /// let model = EarthModel::from_layers(&[Layer::new(shale, 50.0)?, Layer::new(sand, 50.0)?], 1.0)?;
    /// assert_eq!(model.n_samples(), 100);
    /// assert_eq!(model.boundaries(), vec![(49, 0)]);
    /// # Ok::<(), synthseis::SeisError>(())
    /// ```
    ///
    /// # Errors
    /// See [`layer_sample_counts`].
    pub fn from_layers(layers: &[Layer], dz: f64) -> error::Result<Self> {
        let thicknesses: Vec<f64> = layers.iter().map(|l| l.thickness).collect();
        let counts = layer_sample_counts(&thicknesses, dz)?;
        let total: usize = counts.iter().sum();

        let mut classes = Array2::<usize>::zeros((total, 1));
        let mut row = 0;
        for (class, &n) in counts.iter().enumerate() {
            for _ in 0..n {
                classes[[row, 0]] = class;
                row += 1;
            }
        }

        #[cfg(feature = "logging")]
        tracing::debug!(n_layers = layers.len(), n_samples = total, dz, "rasterized layer stack");

        let rocks = layers.iter().map(|l| l.rock).collect();
        EarthModel::new(classes, rocks, dz, 1.0, Domain::Depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_division() {
        let counts = layer_sample_counts(&[50.0, 50.0], 1.0).unwrap();
        assert_eq!(counts, vec![50, 50]);
    }

    #[test]
    fn uneven_division_last_layer_absorbs() {
        // total = floor(10 / 3) = 3; first layer ceil(5/3) = 2, last gets 1
        let counts = layer_sample_counts(&[5.0, 5.0], 3.0).unwrap();
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn early_layers_clipped_to_grid() {
        // ceil(0.6/0.5) = 2 twice would overflow floor(1.8/0.5) = 3
        let counts = layer_sample_counts(&[0.6, 0.6, 0.6], 0.5).unwrap();
        assert_eq!(counts.iter().sum::<usize>(), 3);
        assert_eq!(counts, vec![2, 1, 0]);
    }

    #[test]
    fn rejects_degenerate_stacks() {
        assert!(layer_sample_counts(&[], 1.0).is_err());
        assert!(layer_sample_counts(&[0.5], 1.0).is_err());
        assert!(layer_sample_counts(&[10.0, -1.0], 1.0).is_err());
        assert!(layer_sample_counts(&[10.0], 0.0).is_err());
    }

    #[test]
    fn rejects_oversampled_stack() {
        assert!(matches!(
            layer_sample_counts(&[100.0, 100.0], 1e-9),
            Err(SeisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn from_layers_assigns_classes_in_order() {
        let a = RockProperties::new(2000.0, 1000.0, 2000.0).unwrap();
        let b = RockProperties::new(2500.0, 1200.0, 2200.0).unwrap();
        let model = EarthModel::from_layers(
            &[Layer::new(a, 3.0).unwrap(), Layer::new(b, 2.0).unwrap(), Layer::new(a, 5.0).unwrap()],
            1.0,
        )
        .unwrap();
        let col: Vec<usize> = model.classes().column(0).to_vec();
        assert_eq!(col, vec![0, 0, 0, 1, 1, 2, 2, 2, 2, 2]);
        assert_eq!(model.rocks().len(), 3);
    }
}
