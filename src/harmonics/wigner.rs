//! Closed-form Wigner rotation matrices for degrees 1 and 2.
//!
//! For ZYZ Euler angles `(α, β, γ)` the rotation `R = Rz(α)·Ry(β)·Rz(γ)` acts
//! on a pattern `f` as `f'(v) = f(Rᵀ v)`. The spectrum of the rotated pattern
//! is obtained from the original one by
//!
//! ```text
//! a'_m' = Σ_m D_m'm(α, β, γ) · a_m,    D_m'm = e^{-i m' α} · d_m'm(β) · e^{-i m γ}
//! ```
//!
//! with rows and columns ordered `m = -l..=l`. The small-d entries are
//! polynomials in `cos β` and `sin β`, so β = 0 and β = π need no special case.

use nalgebra::{DMatrix, Matrix3, Rotation3, SMatrix, Vector3};

use crate::error::{FocalError, Result};
use crate::Complex;

/// Degree-1 rotation matrix.
pub type WignerD1 = Matrix3<Complex>;
/// Degree-2 rotation matrix.
pub type WignerD2 = SMatrix<Complex, 5, 5>;

/// ZYZ Euler angles in radians.
///
/// For a fault the convention is `alpha = strike`, `beta = dip`,
/// `gamma = -rake`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl EulerAngles {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Euler triple of a fault given in degrees.
    pub fn from_fault_deg(strike_deg: f64, dip_deg: f64, rake_deg: f64) -> Self {
        Self {
            alpha: strike_deg.to_radians(),
            beta: dip_deg.to_radians(),
            gamma: -rake_deg.to_radians(),
        }
    }

    pub fn from_array(x: [f64; 3]) -> Self {
        Self::new(x[0], x[1], x[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.alpha, self.beta, self.gamma]
    }

    /// `[alpha, beta, gamma]` in degrees.
    pub fn to_degrees(self) -> [f64; 3] {
        [
            self.alpha.to_degrees(),
            self.beta.to_degrees(),
            self.gamma.to_degrees(),
        ]
    }

    /// The Cartesian rotation `Rz(α)·Ry(β)·Rz(γ)`.
    pub fn rotation(&self) -> Rotation3<f64> {
        let z = Vector3::z_axis();
        Rotation3::from_axis_angle(&z, self.alpha)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.beta)
            * Rotation3::from_axis_angle(&z, self.gamma)
    }

    /// ZYZ decomposition of a rotation, with α and γ in [0, 2π).
    ///
    /// At β = 0 or π only α ± γ is defined; γ is set to 0.
    pub fn from_rotation(rotation: &Rotation3<f64>) -> Self {
        let r = rotation.matrix();
        let beta = r[(2, 2)].clamp(-1.0, 1.0).acos();
        let (alpha, gamma) = if beta.sin().abs() < 1e-12 {
            // Second column is Rz(α)·ŷ at both poles
            ((-r[(0, 1)]).atan2(r[(1, 1)]), 0.0)
        } else {
            (r[(1, 2)].atan2(r[(0, 2)]), r[(2, 1)].atan2(-r[(2, 0)]))
        };
        let tau = 2.0 * std::f64::consts::PI;
        Self {
            alpha: alpha.rem_euclid(tau),
            beta,
            gamma: gamma.rem_euclid(tau),
        }
    }
}

/// Small-d matrix `d¹(β)`.
fn small_d1(beta: f64) -> [[f64; 3]; 3] {
    let (s, c) = beta.sin_cos();
    let r = std::f64::consts::FRAC_1_SQRT_2;
    [
        [0.5 * (1.0 + c), -s * r, 0.5 * (1.0 - c)],
        [s * r, c, -s * r],
        [0.5 * (1.0 - c), s * r, 0.5 * (1.0 + c)],
    ]
}

/// Small-d matrix `d²(β)`.
fn small_d2(beta: f64) -> [[f64; 5]; 5] {
    let (s, c) = beta.sin_cos();
    let r38 = (3.0_f64 / 8.0).sqrt();
    let r32 = (3.0_f64 / 2.0).sqrt();
    let p = 1.0 + c;
    let q = 1.0 - c;
    let c2 = c * c;
    [
        [0.25 * p * p, -0.5 * s * p, r38 * s * s, -0.5 * s * q, 0.25 * q * q],
        [
            0.5 * s * p,
            0.5 * (2.0 * c2 + c - 1.0),
            -r32 * s * c,
            -0.5 * (2.0 * c2 - c - 1.0),
            -0.5 * s * q,
        ],
        [r38 * s * s, r32 * s * c, 1.5 * c2 - 0.5, -r32 * s * c, r38 * s * s],
        [
            0.5 * s * q,
            -0.5 * (2.0 * c2 - c - 1.0),
            r32 * s * c,
            0.5 * (2.0 * c2 + c - 1.0),
            -0.5 * s * p,
        ],
        [0.25 * q * q, 0.5 * s * q, r38 * s * s, 0.5 * s * p, 0.25 * p * p],
    ]
}

/// `e^{-i m α}` for `m = -l..=l`.
fn phases<const N: usize>(angle: f64) -> [Complex; N] {
    let l = (N / 2) as i32;
    std::array::from_fn(|k| Complex::from_polar(1.0, -((k as i32 - l) as f64) * angle))
}

/// Degree-1 Wigner rotation matrix.
pub fn wigner_d1(euler: &EulerAngles) -> WignerD1 {
    let d = small_d1(euler.beta);
    let pa = phases::<3>(euler.alpha);
    let pg = phases::<3>(euler.gamma);
    WignerD1::from_fn(|row, col| pa[row] * d[row][col] * pg[col])
}

/// Degree-2 Wigner rotation matrix.
pub fn wigner_d2(euler: &EulerAngles) -> WignerD2 {
    let d = small_d2(euler.beta);
    let pa = phases::<5>(euler.alpha);
    let pg = phases::<5>(euler.gamma);
    WignerD2::from_fn(|row, col| pa[row] * d[row][col] * pg[col])
}

/// Wigner rotation matrix of degree `l` as a dynamically sized matrix.
///
/// Degree 0 is the trivial 1×1 identity.
pub fn wigner_d(l: u32, euler: &EulerAngles) -> Result<DMatrix<Complex>> {
    match l {
        0 => Ok(DMatrix::identity(1, 1)),
        1 => Ok(DMatrix::from_iterator(3, 3, wigner_d1(euler).iter().copied())),
        2 => Ok(DMatrix::from_iterator(5, 5, wigner_d2(euler).iter().copied())),
        _ => Err(FocalError::UnsupportedDegree { degree: l }),
    }
}
