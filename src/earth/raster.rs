//! Palette images and colour-keyed earth models.
//!
//! Image decoding lives outside the crate. A decoder hands over a
//! [`PaletteImage`]: a palette of colours and a grid of palette indices.
//! Rocks are attached through `"rgb(r,g,b)"` colour keys, each quantized to
//! its nearest palette entry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::EarthModel;
use crate::error::{self, SeisError};
use crate::rock::RockProperties;
use crate::types::Domain;
use crate::validate::validate_positive;

/// 8-bit RGB colour, written `rgb(r,g,b)`.
///
/// # Examples
///
/// ```
/// use synthseis::earth::Rgb;
///
/// let c: Rgb = "rgb(100, 120,150)".parse()?;
/// assert_eq!(c, Rgb::new(100, 120, 150));
/// assert_eq!(c.to_string(), "rgb(100,120,150)");
/// # Ok::<(), synthseis::SeisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// Colour from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn distance2(self, other: Rgb) -> u32 {
        let d = |a: u8, b: u8| (i32::from(a) - i32::from(b)).unsigned_abs().pow(2);
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = SeisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SeisError::InvalidInput {
            message: format!("expected a colour of the form rgb(r,g,b), got {s:?}"),
        };
        let inner = s
            .trim()
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(bad)?;
        let parts: Vec<u8> = inner
            .split(',')
            .map(|p| p.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| bad())?;
        match parts[..] {
            [r, g, b] => Ok(Rgb::new(r, g, b)),
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = SeisError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

/// Palette-quantized image: `indices[[row, col]]` points into `palette`.
///
/// Rows run down the vertical axis, columns across traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteImage {
    palette: Vec<Rgb>,
    indices: Array2<usize>,
}

impl PaletteImage {
    /// Wrap decoder output.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] for an empty image or an index
    /// outside the palette.
    pub fn new(palette: Vec<Rgb>, indices: Array2<usize>) -> error::Result<Self> {
        if indices.is_empty() {
            return Err(SeisError::InvalidInput {
                message: "image has no pixels".into(),
            });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= palette.len()) {
            return Err(SeisError::InvalidInput {
                message: format!("pixel index {bad} outside palette of {} colours", palette.len()),
            });
        }
        Ok(Self { palette, indices })
    }

    /// Build a palette from a full-colour pixel grid, in first-seen order.
    pub fn from_pixels(pixels: &Array2<Rgb>) -> error::Result<Self> {
        let mut palette: Vec<Rgb> = Vec::new();
        let indices = pixels.mapv(|c| match palette.iter().position(|&p| p == c) {
            Some(i) => i,
            None => {
                palette.push(c);
                palette.len() - 1
            }
        });
        Self::new(palette, indices)
    }

    /// Colours of the palette.
    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    /// Pixel grid of palette indices.
    pub fn indices(&self) -> &Array2<usize> {
        &self.indices
    }

    /// Palette index nearest to `colour` (squared RGB distance, lowest
    /// index on ties).
    pub fn quantize(&self, colour: Rgb) -> usize {
        self.palette
            .iter()
            .enumerate()
            .min_by_key(|(i, p)| (p.distance2(colour), *i))
            .map_or(0, |(i, _)| i)
    }
}

impl EarthModel {
    /// Model from a palette image and a colour-to-rock mapping.
    ///
    /// Each mapped colour is quantized to its nearest palette entry. The
    /// image spans `zrange` vertically (metres or seconds, per `domain`) and
    /// `xrange` metres horizontally.
    ///
    /// # Errors
    /// Returns [`SeisError::InvalidInput`] when two colours quantize to the
    /// same palette entry, when a pixel's palette entry has no rock, or for
    /// non-positive ranges.
    pub fn from_image(
        image: &PaletteImage,
        mapping: &BTreeMap<Rgb, RockProperties>,
        zrange: f64,
        xrange: f64,
        domain: Domain,
    ) -> error::Result<Self> {
        validate_positive(zrange, "image depth range (m)")?;
        validate_positive(xrange, "image lateral range (m)")?;

        let mut class_of: Vec<Option<usize>> = vec![None; image.palette().len()];
        let mut rocks = Vec::with_capacity(mapping.len());
        for (&colour, rock) in mapping {
            let p = image.quantize(colour);
            if class_of[p].is_some() {
                return Err(SeisError::InvalidInput {
                    message: format!(
                        "{colour} quantizes to palette entry {} which is already mapped",
                        image.palette()[p]
                    ),
                });
            }
            class_of[p] = Some(rocks.len());
            rocks.push(*rock);
        }

        let (rows, cols) = image.indices().dim();
        let mut classes = Array2::<usize>::zeros((rows, cols));
        for ((r, c), &p) in image.indices().indexed_iter() {
            classes[[r, c]] = class_of[p].ok_or_else(|| SeisError::InvalidInput {
                message: format!("image colour {} has no rock mapping", image.palette()[p]),
            })?;
        }

        #[cfg(feature = "logging")]
        tracing::debug!(rows, cols, n_rocks = rocks.len(), "built earth model from image");

        EarthModel::new(
            classes,
            rocks,
            zrange / rows as f64,
            xrange / cols as f64,
            domain,
        )
    }
}
