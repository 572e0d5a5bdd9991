//! # focal-mech
//!
//! Earthquake **focal mechanisms from first-motion polarities**, written in Rust.
//!
//! Given the azimuth, takeoff angle and P-wave polarity recorded at a set of
//! stations, `focal-mech` separates compressional from dilatational rays on the
//! focal sphere with a polynomial-kernel classifier, turns the classifier into
//! a spherical-harmonic spectrum in closed form, and finds the double-couple
//! fault plane (strike, dip, rake) whose radiation pattern best matches it.
//!
//! ## Features
//!
//! - **Kernel classification** — a bundled SMO support-vector solver, or any
//!   [`KernelClassifier`] you plug in
//! - **Analytic spectrum** — Funk–Hecke expansion of the decision function up to
//!   degree 2, no numerical quadrature
//! - **Rotation search** — Wigner-D rotation of a canonical double-couple template,
//!   coarse grid scan plus bounded local refinement
//! - **Nodal lines** — raster the spectrum on a longitude/colatitude grid and trace
//!   zero contours with marching squares
//! - **Batch inversion** — many events in parallel with the `parallel` feature
//!
//! ## Example
//!
//! ```no_run
//! use focal_mech::{invert_event, FocalMechanismConfig, ObservationSet};
//!
//! // (azimuth, takeoff from vertical up, polarity) in radians
//! let observations = ObservationSet::from_triples(&[
//!     (0.3, 2.1, 1.0),
//!     (1.9, 2.4, -1.0),
//!     // ... more picks ...
//! ]);
//!
//! let config: FocalMechanismConfig = FocalMechanismConfig::default();
//! let estimate = invert_event(&observations, &config)?;
//! let plane = estimate.solution();
//! println!(
//!     "strike {:.1} dip {:.1} rake {:.1} (score {:.3})",
//!     plane.strike_deg, plane.dip_deg, plane.rake_deg, estimate.correlation.score
//! );
//! # Ok::<(), focal_mech::FocalError>(())
//! ```
//!
//! ## Algorithm overview
//!
//! 1. **Augmentation** — map each ray to a unit vector and, for a double couple,
//!    add its antipode with the same polarity
//! 2. **Classification** — fit a `(u·v + 1)²` kernel machine to the labelled vectors
//! 3. **Spectrum** — project the dual solution onto spherical harmonics with the
//!    Schölkopf kernel coefficients
//! 4. **Correlation** — minimise the negated correlation between the observed
//!    quadrupole and the rotated double-couple template over ZYZ Euler angles
//! 5. **Extraction** — read the fault normal and slip off the best rotation and
//!    report both nodal planes
//!
//! ## Conventions
//!
//! Vectors live in a (north, east, up) frame; takeoff angles are measured from
//! the upward vertical, so down-going rays have takeoff > π/2. Fault planes use
//! the Aki & Richards strike/dip/rake convention.

pub mod classifier;
pub mod correlate;
mod error;
pub mod fault;
pub mod harmonics;
pub mod observation;
pub mod pipeline;

pub use classifier::{
    classify, schoelkopf_norm, sign_labels, spectrum, ClassifierResult, KernelClassifier,
    KernelFit, MechanismClassifier, PolynomialKernel, SmoClassifier, SmoConfig,
};
pub use correlate::{
    contour, correlate_shear, Bounds, Contour, LocalOptimizer, Minimum, NelderMead,
    ProjectedGradient, ShearCorrelation, TemplateCorrelator,
};
pub use error::{FocalError, Result};
pub use fault::FaultPlaneSolution;
pub use harmonics::{
    harmonic, harmonics_at, wigner_d, wigner_d1, wigner_d2, EulerAngles, HarmonicGrid,
    RadiationPattern, Spectrum,
};
pub use observation::*;
pub use pipeline::{invert_event, invert_events, FocalMechanismConfig, MechanismEstimate};

// Everything on the focal sphere is small and fixed-size; f64 throughout.
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Complex = num_complex::Complex64;
