//! # synthseis
//!
//! Angle-dependent reflectivity, earth models and convolutional seismic
//! synthesis.
//!
//! Provides the full pipeline: rock properties → earth model (layer stack or
//! palette image) → depth-to-time conversion → reflectivity at every
//! interface → wavelet bank → synthetic seismic volume with axis metadata.
//!
//! ## Architecture
//!
//! - **`rock`**: Rock and pore-fluid records with uncertainties
//! - **`reflectivity`**: Zoeppritz and linearized P-P reflection coefficients, Monte-Carlo AVO
//! - **`wavelet`**: Ricker, Ormsby and sweep wavelets, phase rotation, frequency banks
//! - **`earth`**: Layered and raster earth models, depth/time resampling, rock stores
//! - **`synth`**: Reflectivity volumes, convolution, noise and the forward-model builder
//! - **`fluidsub`**: Gassmann fluid substitution of layered models
//!
//! ## Design
//!
//! - **Closed method sets.** Reflectivity methods, wavelet shapes and
//!   frequency axes are enums; there is no string dispatch inside the crate.
//! - **No panics.** Every fallible operation returns [`Result`]. Library code
//!   never calls `unwrap()` or `expect()`.
//! - **Immutable results.** Models and volumes are never modified in place;
//!   resampling returns a new model.
//! - **Reproducible randomness.** Stochastic realizations, noise and
//!   Monte-Carlo draws take a seed, and every trace or draw owns its own
//!   random stream, so parallel and sequential builds agree bit for bit.
//! - **Serializable.** All value types implement Serde `Serialize` /
//!   `Deserialize`, with validation on deserialization where invariants
//!   exist (rocks, fluids, wavelets).
//!
//! ## Quick start
//!
//! ```
//! use synthseis::reflectivity::{ReflectivityMethod, reflectivity};
//! use synthseis::rock::RockProperties;
//!
//! let upper = RockProperties::new(1500.0, 1200.0, 2000.0)?;
//! let lower = RockProperties::new(1800.0, 1400.0, 2200.0)?;
//! let r = reflectivity(&upper, &lower, &[0.0, 15.0, 30.0], ReflectivityMethod::Zoeppritz)?;
//! assert!((r[0] - 0.96 / 6.96).abs() < 1e-12);
//! # Ok::<(), synthseis::SeisError>(())
//! ```

pub mod conventions;
pub mod earth;
pub mod error;
pub mod fluidsub;
pub mod reflectivity;
pub mod rock;
pub mod synth;
pub mod types;
mod validate;
pub mod wavelet;

#[doc(inline)]
pub use earth::EarthModel;
#[doc(inline)]
pub use error::{Result, SeisError};
#[doc(inline)]
pub use reflectivity::ReflectivityMethod;
#[doc(inline)]
pub use rock::{Fluid, RockProperties};
#[doc(inline)]
pub use synth::{ForwardModel, SeismicVolume};
#[doc(inline)]
pub use types::{AngleAxis, Domain};
#[doc(inline)]
pub use wavelet::{Wavelet, WaveletShape};
