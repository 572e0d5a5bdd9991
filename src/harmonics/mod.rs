//! Spherical harmonics up to degree 2 and the spectra built from them.
//!
//! The harmonics carry an extra Condon–Shortley factor `(-1)^m` on top of the
//! usual physics normalisation, which cancels the phase of the associated
//! Legendre functions for positive orders:
//!
//! ```text
//! Y_lm(φ, θ)   = N_lm · P̄_l^m(cos θ) · e^{imφ}        m ≥ 0
//! Y_l,-m(φ, θ) = (-1)^m · conj(Y_lm(φ, θ))
//! ```
//!
//! where `P̄` is the associated Legendre function without the `(-1)^m` phase.
//! Because the degree is bounded by 2, a [`Spectrum`] is a fixed 9-entry array
//! addressed through [`Spectrum::index`].

pub mod grid;
pub mod wigner;

use std::f64::consts::PI;

use crate::error::{FocalError, Result};
use crate::Complex;

pub use grid::{HarmonicGrid, RadiationPattern};
pub use wigner::{wigner_d, wigner_d1, wigner_d2, EulerAngles, WignerD1, WignerD2};

/// Largest tabulated harmonic degree.
pub const MAX_DEGREE: u32 = 2;

/// Number of coefficients in a spectrum truncated at [`MAX_DEGREE`].
pub const NUM_COEFFS: usize = 9;

/// `(l, m)` for each spectrum slot, in storage order.
pub const DEGREE_ORDER: [(u32, i32); NUM_COEFFS] = [
    (0, 0),
    (1, -1),
    (1, 0),
    (1, 1),
    (2, -2),
    (2, -1),
    (2, 0),
    (2, 1),
    (2, 2),
];

/// All nine harmonics with `l ≤ 2` at one point, in [`DEGREE_ORDER`].
pub fn harmonics_at(azimuth: f64, colatitude: f64) -> [Complex; NUM_COEFFS] {
    let (sin_t, cos_t) = colatitude.sin_cos();

    // Real amplitudes of the m ≥ 0 members
    let y00 = 0.5 * (1.0 / PI).sqrt();
    let y10 = 0.5 * (3.0 / PI).sqrt() * cos_t;
    let y11 = 0.5 * (3.0 / (2.0 * PI)).sqrt() * sin_t;
    let y20 = 0.25 * (5.0 / PI).sqrt() * (3.0 * cos_t * cos_t - 1.0);
    let y21 = 0.5 * (15.0 / (2.0 * PI)).sqrt() * sin_t * cos_t;
    let y22 = 0.25 * (15.0 / (2.0 * PI)).sqrt() * sin_t * sin_t;

    let e1 = Complex::from_polar(1.0, azimuth);
    let e2 = Complex::from_polar(1.0, 2.0 * azimuth);
    let p11 = e1 * y11;
    let p21 = e1 * y21;
    let p22 = e2 * y22;

    [
        Complex::new(y00, 0.0),
        -p11.conj(),
        Complex::new(y10, 0.0),
        p11,
        p22.conj(),
        -p21.conj(),
        Complex::new(y20, 0.0),
        p21,
        p22,
    ]
}

/// Evaluate the phase-corrected spherical harmonic of degree `l` and order `m`.
///
/// `azimuth` is the longitude φ ∈ [0, 2π), `colatitude` is θ ∈ [0, π].
/// Only `l ≤ 2` is tabulated.
pub fn harmonic(m: i32, l: u32, azimuth: f64, colatitude: f64) -> Result<Complex> {
    if l > MAX_DEGREE || m.unsigned_abs() > l {
        return Err(FocalError::UnsupportedHarmonic { l, m });
    }
    Ok(harmonics_at(azimuth, colatitude)[Spectrum::index(l, m)])
}

/// Truncated spherical-harmonic spectrum `A_lm` for `l ≤ 2`.
///
/// `degree` records the truncation the spectrum was computed at; slots above
/// it are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    coeffs: [Complex; NUM_COEFFS],
    degree: u32,
}

impl Spectrum {
    /// Storage slot of `(l, m)`: `l² + l + m`.
    #[inline]
    pub const fn index(l: u32, m: i32) -> usize {
        ((l * l + l) as i32 + m) as usize
    }

    /// A spectrum with every coefficient zero.
    pub fn zeros(degree: u32) -> Result<Self> {
        Self::from_coeffs([Complex::new(0.0, 0.0); NUM_COEFFS], degree)
    }

    /// Wrap coefficients stored in [`DEGREE_ORDER`].
    ///
    /// Coefficients above `degree` are cleared and the monopole is forced real.
    pub fn from_coeffs(mut coeffs: [Complex; NUM_COEFFS], degree: u32) -> Result<Self> {
        if degree == 0 || degree > MAX_DEGREE {
            return Err(FocalError::UnsupportedDegree { degree });
        }
        for (slot, &(l, _)) in DEGREE_ORDER.iter().enumerate() {
            if l > degree {
                coeffs[slot] = Complex::new(0.0, 0.0);
            }
        }
        coeffs[0].im = 0.0;
        Ok(Self { coeffs, degree })
    }

    /// Build a degree-2 spectrum holding only the quadrupole coefficients
    /// (`m = -2..=2`).
    pub fn from_quadrupole(quadrupole: [Complex; 5]) -> Self {
        let mut coeffs = [Complex::new(0.0, 0.0); NUM_COEFFS];
        coeffs[4..].copy_from_slice(&quadrupole);
        Self { coeffs, degree: 2 }
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Coefficient `A_lm`, or `None` if `(l, m)` is not a valid slot.
    pub fn get(&self, l: u32, m: i32) -> Option<Complex> {
        if l > MAX_DEGREE || m.unsigned_abs() > l {
            return None;
        }
        Some(self.coeffs[Self::index(l, m)])
    }

    /// All coefficients in [`DEGREE_ORDER`].
    pub fn coeffs(&self) -> &[Complex; NUM_COEFFS] {
        &self.coeffs
    }

    /// The monopole `A_00`, real by construction.
    pub fn monopole(&self) -> f64 {
        self.coeffs[0].re
    }

    /// The five `l = 2` coefficients, `m = -2..=2`.
    pub fn quadrupole(&self) -> [Complex; 5] {
        let mut out = [Complex::new(0.0, 0.0); 5];
        out.copy_from_slice(&self.coeffs[4..]);
        out
    }

    /// Evaluate `Σ A_lm Y_lm` at a point and return its real part.
    pub fn evaluate(&self, azimuth: f64, colatitude: f64) -> f64 {
        harmonics_at(azimuth, colatitude)
            .iter()
            .zip(self.coeffs.iter())
            .map(|(y, c)| c * y)
            .sum::<Complex>()
            .re
    }
}
