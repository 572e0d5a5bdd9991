//! Analytic spherical-harmonic spectrum of a polynomial-kernel decision function.
//!
//! On the unit sphere the kernel `(u·v + 1)^d` depends only on the angle
//! between `u` and `v`, so by the Funk–Hecke theorem it expands as
//!
//! ```text
//! K(u, v) = Σ_l a_l Σ_m Y_lm(u) conj(Y_lm(v))
//! ```
//!
//! with the Schölkopf coefficients `a_l`. The decision function
//! `f(v) = Σ_i c_i K(sv_i, v) + b` therefore has degree-`l` coefficients
//! proportional to `Σ_i c_i conj(Y_lm(sv_i))`. Both the `4π/(2l+1)` factor
//! and the monopole scaling below reproduce established reference output and
//! are kept exactly as they are.

use std::f64::consts::PI;

use tracing::debug;

use super::ClassifierResult;
use crate::error::{FocalError, Result};
use crate::harmonics::{harmonic, Spectrum, MAX_DEGREE, NUM_COEFFS};
use crate::Complex;

/// `Γ(n)` for positive integer `n`.
fn gamma_int(n: u32) -> f64 {
    (1..n).map(f64::from).product()
}

/// Schölkopf normalisation
/// `a_l = 2^(d+1) Γ(d+1)² / (Γ(d+2+l) Γ(d+1-l))` for `0 ≤ l ≤ d`.
///
/// Returns 0 for `l > d`, where `Γ(d+1-l)` has a pole.
pub fn schoelkopf_norm(l: u32, kernel_degree: u32) -> f64 {
    if l > kernel_degree {
        return 0.0;
    }
    let d = kernel_degree;
    let g = gamma_int(d + 1);
    2f64.powi(d as i32 + 1) * g * g / (gamma_int(d + 2 + l) * gamma_int(d + 1 - l))
}

/// Spectrum `A_lm` (`l ≤ kernel_degree`) of a trained classifier.
///
/// ```text
/// A_00 = b / (a_0 · 4π · Y_00)
/// A_lm = 4π / (2l+1) · a_l · Σ_i c_i · conj(Y_lm(φ_i, θ_i))     l ≥ 1
/// ```
pub fn spectrum(result: &ClassifierResult, kernel_degree: u32) -> Result<Spectrum> {
    if kernel_degree == 0 || kernel_degree > MAX_DEGREE {
        return Err(FocalError::UnsupportedDegree {
            degree: kernel_degree,
        });
    }
    if result.dual_coefficients.is_empty() {
        return Err(FocalError::DegenerateSupport);
    }

    let mut coeffs = [Complex::new(0.0, 0.0); NUM_COEFFS];
    let y00 = 0.5 * (1.0 / PI).sqrt();
    coeffs[0] = Complex::new(
        result.intercept / (schoelkopf_norm(0, kernel_degree) * 4.0 * PI * y00),
        0.0,
    );

    for l in 1..=kernel_degree {
        let scale = 4.0 * PI / f64::from(2 * l + 1) * schoelkopf_norm(l, kernel_degree);
        for m in -(l as i32)..=(l as i32) {
            let mut acc = Complex::new(0.0, 0.0);
            for ((&c, &phi), &theta) in result
                .dual_coefficients
                .iter()
                .zip(&result.azimuths)
                .zip(&result.colatitudes)
            {
                acc += harmonic(m, l, phi, theta)?.conj() * c;
            }
            coeffs[Spectrum::index(l, m)] = acc * scale;
        }
    }

    let spectrum = Spectrum::from_coeffs(coeffs, kernel_degree)?;
    debug!(
        "spectrum from {} support vectors: A00 = {:.4e}",
        result.dual_coefficients.len(),
        spectrum.monopole()
    );
    Ok(spectrum)
}

impl ClassifierResult {
    /// Spectrum of this result at the kernel's own degree.
    pub fn spectrum(&self) -> Result<Spectrum> {
        spectrum(self, self.kernel.degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::PolynomialKernel;
    use approx::assert_abs_diff_eq;

    fn result_with(dual: Vec<f64>, azimuths: Vec<f64>, colatitudes: Vec<f64>) -> ClassifierResult {
        ClassifierResult {
            dual_coefficients: dual,
            azimuths,
            colatitudes,
            intercept: 0.7,
            in_sample: Vec::new(),
            support_counts: [1, 1],
            kernel: PolynomialKernel::default(),
            training_accuracy: 1.0,
        }
    }

    #[test]
    fn test_schoelkopf_values() {
        assert_abs_diff_eq!(schoelkopf_norm(0, 2), 8.0 / 3.0, epsilon = 1e-14);
        assert_abs_diff_eq!(schoelkopf_norm(1, 2), 4.0 / 3.0, epsilon = 1e-14);
        assert_abs_diff_eq!(schoelkopf_norm(2, 2), 4.0 / 15.0, epsilon = 1e-14);
        assert_abs_diff_eq!(schoelkopf_norm(0, 1), 2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(schoelkopf_norm(1, 1), 2.0 / 3.0, epsilon = 1e-14);
        assert_eq!(schoelkopf_norm(3, 2), 0.0);
    }

    #[test]
    fn test_monopole_is_real_and_scaled() {
        let r = result_with(vec![0.5, -0.5], vec![0.1, 2.0], vec![0.4, 1.9]);
        let s = spectrum(&r, 2).unwrap();
        let expected = 0.7 / (8.0 / 3.0 * 4.0 * PI * 0.5 / PI.sqrt());
        assert_abs_diff_eq!(s.monopole(), expected, epsilon = 1e-14);
        assert_eq!(s.coeffs()[0].im, 0.0);
    }

    #[test]
    fn test_single_support_vector_at_pole() {
        // Only m = 0 survives for a support vector on the pole
        let r = result_with(vec![1.0], vec![0.0], vec![0.0]);
        let s = spectrum(&r, 2).unwrap();
        let y20 = 0.25 * (5.0 / PI).sqrt() * 2.0;
        assert_abs_diff_eq!(s.get(2, 0).unwrap().re, 4.0 * PI / 5.0 * 4.0 / 15.0 * y20, epsilon = 1e-12);
        for m in [-2, -1, 1, 2] {
            assert_abs_diff_eq!(s.get(2, m).unwrap().norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degree_one_truncates() {
        let r = result_with(vec![1.0, -1.0], vec![0.3, 1.3], vec![0.8, 2.2]);
        let s = spectrum(&r, 1).unwrap();
        assert_eq!(s.degree(), 1);
        assert!(s.quadrupole().iter().all(|c| c.norm() == 0.0));
        assert!(s.get(1, 0).unwrap().norm() > 0.0);
    }

    #[test]
    fn test_degenerate_support() {
        let r = result_with(Vec::new(), Vec::new(), Vec::new());
        assert_eq!(spectrum(&r, 2), Err(FocalError::DegenerateSupport));
    }

    #[test]
    fn test_unsupported_degree() {
        let r = result_with(vec![1.0], vec![0.0], vec![0.0]);
        assert_eq!(
            spectrum(&r, 3),
            Err(FocalError::UnsupportedDegree { degree: 3 })
        );
    }
}
