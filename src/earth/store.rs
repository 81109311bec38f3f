//! Keyed rock/fluid lookup and serializable model descriptors.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{EarthModel, Layer, PaletteImage, Rgb};
use crate::error::{self, SeisError};
use crate::rock::{Fluid, RockProperties};
use crate::types::Domain;

/// Source of rock and fluid records by key, such as a database.
pub trait RockStore: Send + Sync {
    /// Rock stored under `key`.
    ///
    /// # Errors
    /// Returns [`SeisError::NotFound`] when no rock has that key.
    fn rock(&self, key: &str) -> error::Result<RockProperties>;

    /// Fluid stored under `key`.
    ///
    /// # Errors
    /// Returns [`SeisError::NotFound`] when no fluid has that key.
    fn fluid(&self, key: &str) -> error::Result<Fluid>;
}

/// In-memory [`RockStore`].
///
/// # Examples
///
/// ```
/// use synthseis::earth::{MemoryStore, RockStore};
/// use synthseis::rock::RockProperties;
///
/// let mut store = MemoryStore::default();
/// store.insert_rock("shale", RockProperties::new(2400.0, 1100.0, 2450.0)?);
/// assert_eq!(store.rock("shale")?.vp(), 2400.0);
/// assert!(store.rock("sand").is_err());
/// # Ok::<(), synthseis::SeisError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    rocks: HashMap<String, RockProperties>,
    #[serde(default)]
    fluids: HashMap<String, Fluid>,
}

impl MemoryStore {
    /// Add or replace a rock.
    pub fn insert_rock(&mut self, key: impl Into<String>, rock: RockProperties) {
        self.rocks.insert(key.into(), rock);
    }

    /// Add or replace a fluid.
    pub fn insert_fluid(&mut self, key: impl Into<String>, fluid: Fluid) {
        self.fluids.insert(key.into(), fluid);
    }
}

impl RockStore for MemoryStore {
    fn rock(&self, key: &str) -> error::Result<RockProperties> {
        self.rocks.get(key).copied().ok_or_else(|| SeisError::NotFound {
            kind: "rock",
            key: key.to_string(),
        })
    }

    fn fluid(&self, key: &str) -> error::Result<Fluid> {
        self.fluids.get(key).copied().ok_or_else(|| SeisError::NotFound {
            kind: "fluid",
            key: key.to_string(),
        })
    }
}

/// Layer of a [`ModelDescriptor`], referring to a stored rock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Store key of the rock.
    pub rock: String,
    /// Thickness (metres).
    pub thickness: f64,
}

/// Serializable description of an earth model whose rocks live in a store.
///
/// ```
/// use synthseis::earth::ModelDescriptor;
///
/// let json = r#"{
///     "type": "image",
///     "mapping": {"rgb(255,0,0)": "shale", "rgb(0,0,255)": "sand"},
///     "zrange": 500.0,
///     "xrange": 1000.0
/// }"#;
/// let d: ModelDescriptor = serde_json::from_str(json).unwrap();
/// assert!(matches!(d, ModelDescriptor::Image { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelDescriptor {
    /// Layer stack sampled every `dz` metres.
    Layers {
        /// Depth step (metres).
        dz: f64,
        /// Layers, top first.
        layers: Vec<LayerDescriptor>,
    },
    /// Palette image with colour keys mapped to store keys.
    Image {
        /// Colour → rock key.
        mapping: BTreeMap<Rgb, String>,
        /// Vertical extent of the image.
        zrange: f64,
        /// Horizontal extent of the image (metres).
        xrange: f64,
        /// Vertical axis of the image.
        #[serde(default)]
        domain: Domain,
    },
}

impl ModelDescriptor {
    /// Build the model, fetching rocks from `store`.
    ///
    /// `image` is the decoded raster for the [`Image`](ModelDescriptor::Image)
    /// variant and is ignored for layer stacks.
    ///
    /// # Errors
    /// Returns [`SeisError::NotFound`] for a missing rock key,
    /// [`SeisError::InvalidInput`] when an image descriptor has no image, and
    /// the errors of the model constructors.
    pub fn resolve(&self, store: &dyn RockStore, image: Option<&PaletteImage>) -> error::Result<EarthModel> {
        match self {
            ModelDescriptor::Layers { dz, layers } => {
                let layers = layers
                    .iter()
                    .map(|l| Layer::new(store.rock(&l.rock)?, l.thickness))
                    .collect::<error::Result<Vec<_>>>()?;
                EarthModel::from_layers(&layers, *dz)
            }
            ModelDescriptor::Image {
                mapping,
                zrange,
                xrange,
                domain,
            } => {
                let image = image.ok_or_else(|| SeisError::InvalidInput {
                    message: "image model descriptor needs a decoded image".into(),
                })?;
                let rocks = mapping
                    .iter()
                    .map(|(&c, key)| Ok((c, store.rock(key)?)))
                    .collect::<error::Result<BTreeMap<_, _>>>()?;
                EarthModel::from_image(image, &rocks, *zrange, *xrange, *domain)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn store() -> MemoryStore {
        let mut s = MemoryStore::default();
        s.insert_rock("shale", RockProperties::new(2400.0, 1100.0, 2450.0).unwrap());
        s.insert_rock("sand", RockProperties::new(2800.0, 1500.0, 2300.0).unwrap());
        s.insert_fluid("brine", Fluid::new(1090.0, 250.0, 2.8e9, 0.05e9, 1.0).unwrap());
        s
    }

    #[test]
    fn missing_keys_are_not_found() {
        let s = store();
        assert!(matches!(
            s.rock("coal"),
            Err(SeisError::NotFound { kind: "rock", .. })
        ));
        assert!(matches!(
            s.fluid("gas"),
            Err(SeisError::NotFound { kind: "fluid", .. })
        ));
        assert!(s.fluid("brine").is_ok());
    }

    #[test]
    fn resolves_layer_descriptor() {
        let json = r#"{"type":"layers","dz":1.0,"layers":[
            {"rock":"shale","thickness":30.0},
            {"rock":"sand","thickness":20.0}]}"#;
        let d: ModelDescriptor = serde_json::from_str(json).unwrap();
        let model = d.resolve(&store(), None).unwrap();
        assert_eq!(model.n_samples(), 50);
        assert_eq!(model.boundaries(), vec![(29, 0)]);
    }

    #[test]
    fn layer_descriptor_with_unknown_rock() {
        let d = ModelDescriptor::Layers {
            dz: 1.0,
            layers: vec![LayerDescriptor {
                rock: "coal".into(),
                thickness: 10.0,
            }],
        };
        assert!(matches!(d.resolve(&store(), None), Err(SeisError::NotFound { .. })));
    }

    #[test]
    fn resolves_image_descriptor() {
        let mut mapping = BTreeMap::new();
        mapping.insert(Rgb::new(255, 0, 0), "shale".to_string());
        mapping.insert(Rgb::new(0, 0, 255), "sand".to_string());
        let d = ModelDescriptor::Image {
            mapping,
            zrange: 20.0,
            xrange: 20.0,
            domain: Domain::Depth,
        };
        assert!(d.resolve(&store(), None).is_err());
        let img = PaletteImage::new(
            vec![Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)],
            array![[0, 0], [1, 1]],
        )
        .unwrap();
        let model = d.resolve(&store(), Some(&img)).unwrap();
        assert_eq!(model.rock_at(1, 1).map(|r| r.vp()), Some(2800.0));
    }
}
