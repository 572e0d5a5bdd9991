//! Double-couple template correlation.
//!
//! A pure double couple whose fault normal is `ẑ` and slip is `ŷ` radiates
//! `2 (ẑ·r)(ŷ·r) = 2 sinθ cosθ sinφ`, a pattern with only two nonzero
//! spectral coefficients, both at `l = 2, m = ±1`. Any other double couple is
//! a rotation of it. The correlator searches ZYZ Euler angles for the rotation
//! whose template best matches an observed quadrupole:
//!
//! ```text
//! score(α, β, γ) = -| Σ_k conj(D_k,-1) a_k + Σ_k conj(D_k,+1) a_k |
//! ```
//!
//! where `D = wigner_d2(α, β, γ)`. The score is minimised with a coarse grid
//! scan followed by a bounded local search. The fault plane is read off the
//! rotated template's nodal axes.

pub mod contour;
pub mod search;

use std::f64::consts::PI;

use tracing::debug;

use crate::error::{FocalError, Result};
use crate::fault::FaultPlaneSolution;
use crate::harmonics::grid::linspace;
use crate::harmonics::{wigner_d2, EulerAngles, Spectrum};
use crate::{Complex, Vector3};

pub use contour::{contour, marching_squares, Contour};
pub use search::{best_of, refine, Bounds, LocalOptimizer, Minimum, NelderMead, ProjectedGradient};

/// Quadrupole slots (m = -2..=2) carrying the template: m = -1 and m = +1.
const TEMPLATE_COLUMNS: [usize; 2] = [1, 3];

/// Quadrupole of the axis-aligned double couple (normal `ẑ`, slip `ŷ`).
pub fn double_couple_template() -> [Complex; 5] {
    // 2 sinθ cosθ sinφ = -i/K (Y_2,1 + Y_2,-1) with K = ½√(15/2π)
    let c = 2.0 * (2.0 * PI / 15.0).sqrt();
    let mut t = [Complex::new(0.0, 0.0); 5];
    for k in TEMPLATE_COLUMNS {
        t[k] = Complex::new(0.0, -c);
    }
    t
}

/// Projection of an observed quadrupole onto the template rotated by `euler`.
fn template_projection(euler: &EulerAngles, quadrupole: &[Complex; 5]) -> Complex {
    let d = wigner_d2(euler);
    let mut acc = Complex::new(0.0, 0.0);
    for col in TEMPLATE_COLUMNS {
        for (k, a) in quadrupole.iter().enumerate() {
            acc += d[(k, col)].conj() * a;
        }
    }
    acc
}

/// Negated correlation magnitude between the rotated template and `quadrupole`.
pub fn shear_score(euler: &EulerAngles, quadrupole: &[Complex; 5]) -> f64 {
    -template_projection(euler, quadrupole).norm()
}

/// Signed correlation: positive when the rotated template and the data agree
/// in polarity, negative when they are mirror images.
pub fn signed_correlation(euler: &EulerAngles, quadrupole: &[Complex; 5]) -> f64 {
    -template_projection(euler, quadrupole).im
}

/// Result of a shear (double-couple) correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShearCorrelation {
    /// Plane whose normal is the rotated template's `ẑ`.
    pub solution: FaultPlaneSolution,
    pub auxiliary: FaultPlaneSolution,
    /// Refined Euler angles, radians.
    pub euler: EulerAngles,
    /// Best coarse-scan candidate the refinement started from.
    pub start: EulerAngles,
    /// Achieved score; more negative is better.
    pub score: f64,
    /// Signed correlation of the oriented solution; non-negative once the
    /// slip sign has been chosen.
    pub signed_correlation: f64,
    /// Score evaluations spent in scan and refinement.
    pub evaluations: usize,
}

/// Rotation search of the double-couple template.
#[derive(Debug, Clone)]
pub struct TemplateCorrelator<O = NelderMead> {
    /// Samples per Euler axis in the coarse scan (both endpoints included).
    /// Default 10.
    pub scan_points: usize,
    /// Restarts from the opposite face when α or γ stops on a bound.
    /// Default 3.
    pub periodic_restarts: usize,
    pub optimizer: O,
}

impl Default for TemplateCorrelator<NelderMead> {
    fn default() -> Self {
        Self {
            scan_points: 10,
            periodic_restarts: 3,
            optimizer: NelderMead::default(),
        }
    }
}

/// Coarse-scan candidates, α outermost and γ innermost.
pub fn scan_grid(points: usize) -> Vec<[f64; 3]> {
    let n = points.max(2);
    let bounds = Bounds::euler();
    let axes: [Vec<f64>; 3] =
        std::array::from_fn(|i| linspace(bounds.lower[i], bounds.upper[i], n));
    let mut out = Vec::with_capacity(n * n * n);
    for &a in &axes[0] {
        for &b in &axes[1] {
            for &g in &axes[2] {
                out.push([a, b, g]);
            }
        }
    }
    out
}

impl<O: LocalOptimizer> TemplateCorrelator<O> {
    /// Same settings with a different local optimiser.
    pub fn with_optimizer<P: LocalOptimizer>(self, optimizer: P) -> TemplateCorrelator<P> {
        TemplateCorrelator {
            scan_points: self.scan_points,
            periodic_restarts: self.periodic_restarts,
            optimizer,
        }
    }

    /// Find the double couple best matching the quadrupole of `spectrum`.
    pub fn correlate_shear(&self, spectrum: &Spectrum) -> Result<ShearCorrelation> {
        let quadrupole = spectrum.quadrupole();
        let power: f64 = quadrupole.iter().map(|c| c.norm_sqr()).sum();
        if !power.is_finite() || power == 0.0 {
            return Err(FocalError::DegenerateSpectrum);
        }

        let score = |x: [f64; 3]| shear_score(&EulerAngles::from_array(x), &quadrupole);
        let candidates = scan_grid(self.scan_points);
        let coarse = best_of(&candidates, score).ok_or(FocalError::DegenerateSpectrum)?;
        debug!(
            "coarse scan of {} candidates: score {:.6} at {:?}",
            candidates.len(),
            coarse.value,
            EulerAngles::from_array(coarse.x).to_degrees()
        );

        let refined = refine(
            &self.optimizer,
            &score,
            coarse.x,
            &Bounds::euler(),
            self.periodic_restarts,
        );
        let euler = EulerAngles::from_array(refined.x);
        let signed = signed_correlation(&euler, &quadrupole);
        debug!(
            "refined score {:.6} at {:?} after {} evaluations",
            refined.value,
            euler.to_degrees(),
            refined.evaluations
        );

        let rotation = euler.rotation();
        let normal: Vector3 = rotation * Vector3::z();
        let mut slip: Vector3 = rotation * Vector3::y();
        if signed < 0.0 {
            slip = -slip;
        }
        let solution = FaultPlaneSolution::from_normal_and_slip(&normal, &slip);

        Ok(ShearCorrelation {
            solution,
            auxiliary: solution.auxiliary_plane(),
            euler,
            start: EulerAngles::from_array(coarse.x),
            score: refined.value,
            signed_correlation: signed.abs(),
            evaluations: coarse.evaluations + refined.evaluations,
        })
    }

    /// Tensile (opening) source correlation. Not supported.
    pub fn correlate_tensile(&self, _spectrum: &Spectrum) -> Result<ShearCorrelation> {
        Err(FocalError::NotImplemented("tensile source correlation"))
    }
}

/// [`TemplateCorrelator::correlate_shear`] with default settings.
pub fn correlate_shear(spectrum: &Spectrum) -> Result<ShearCorrelation> {
    TemplateCorrelator::<NelderMead>::default().correlate_shear(spectrum)
}
