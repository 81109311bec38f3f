//! Error types for the synthseis library.
//!
//! All fallible operations return `Result<T, SeisError>` rather than panicking.
//! Numerical degeneracies with a documented fallback (post-critical angles,
//! equal shear velocities in Bortfeld, non-finite fluid substitution) are
//! handled in place and never surface here.

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, SeisError>;

/// Errors that can occur while building models and synthesizing seismic data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeisError {
    /// Input data is invalid (e.g., non-positive velocity, malformed colour key).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Numerical computation failed without a documented fallback
    /// (e.g., a singular boundary-condition system).
    #[error("numerical error: {message}")]
    NumericalError { message: String },

    /// Requested sample interval disagrees with the model's native sampling.
    #[error("sampling mismatch: requested {requested}, model is sampled at {native}")]
    SamplingMismatch {
        /// Sample interval asked for by the caller.
        requested: f64,
        /// Sample interval the model was built with.
        native: f64,
    },

    /// Array shapes disagree (e.g., wavelet bank vs angle axis).
    #[error("shape mismatch: {message}")]
    ShapeMismatch { message: String },

    /// A keyed lookup in a property store found nothing.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Record type that was looked up ("rock", "fluid").
        kind: &'static str,
        /// Key that was requested.
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_mismatch_fields_accessible() {
        let err = SeisError::SamplingMismatch {
            requested: 0.002,
            native: 0.001,
        };
        match &err {
            SeisError::SamplingMismatch { requested, native } => {
                assert_eq!(*requested, 0.002);
                assert_eq!(*native, 0.001);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn not_found_names_kind_and_key() {
        let err = SeisError::NotFound {
            kind: "rock",
            key: "shale-07".into(),
        };
        let display = format!("{err}");
        assert!(display.contains("rock"));
        assert!(display.contains("shale-07"));
    }

    #[test]
    fn error_display_includes_message() {
        let err = SeisError::InvalidInput {
            message: "vp must be positive".into(),
        };
        assert!(format!("{err}").contains("vp must be positive"));

        let err2 = SeisError::NumericalError {
            message: "singular system".into(),
        };
        assert!(format!("{err2}").contains("singular system"));

        let err3 = SeisError::ShapeMismatch {
            message: "3 wavelets for 5 angles".into(),
        };
        assert!(format!("{err3}").contains("3 wavelets for 5 angles"));

        let err4 = SeisError::SamplingMismatch {
            requested: 0.004,
            native: 0.001,
        };
        assert!(format!("{err4}").contains("0.004"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SeisError>();
    }
}
