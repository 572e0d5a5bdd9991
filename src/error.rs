//! Error type shared by every stage of the focal-mechanism pipeline.

use thiserror::Error;

/// Failures surfaced by classification, spectrum extraction and correlation.
///
/// All of these are configuration or input errors; the numeric core has
/// nothing transient to retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FocalError {
    #[error("kernel classifier supports two classes, found {found}")]
    TooManyClasses { found: usize },
    #[error("trainer labels must be -1 or +1, got {value}")]
    InvalidLabel { value: f64 },
    #[error("training labels contain a single class")]
    SingleClass,
    #[error("{vectors} vectors but {labels} labels")]
    LengthMismatch { vectors: usize, labels: usize },
    #[error("observation set is empty")]
    EmptyObservations,
    #[error("parity must be -1, 0 or 1, got {0}")]
    InvalidParity(i32),
    #[error("kernel degree {degree} is outside the supported harmonic range 1..=2")]
    UnsupportedDegree { degree: u32 },
    #[error("spherical harmonic (l={l}, m={m}) is not tabulated")]
    UnsupportedHarmonic { l: u32, m: i32 },
    #[error("classifier produced no support vectors")]
    DegenerateSupport,
    #[error("quadrupole spectrum is zero or not finite")]
    DegenerateSpectrum,
    #[error("grid resolution ({n_longitude}, {n_colatitude}) needs at least 2 nodes per axis")]
    InvalidResolution {
        n_longitude: usize,
        n_colatitude: usize,
    },
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

pub type Result<T> = std::result::Result<T, FocalError>;
