//! Wigner rotation matrices: unitarity, group structure, and agreement with
//! rotating a radiation pattern in Cartesian space.

use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use focal_mech::{
    harmonic, wigner_d, wigner_d1, wigner_d2, Complex, EulerAngles, Spectrum,
};
use focal_mech::correlate::double_couple_template;
use focal_mech::harmonics::{WignerD1, WignerD2};
use nalgebra::{DMatrix, SVector};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

fn random_euler(rng: &mut StdRng) -> EulerAngles {
    EulerAngles::new(
        rng.random::<f64>() * 2.0 * PI,
        rng.random::<f64>() * PI,
        rng.random::<f64>() * 2.0 * PI,
    )
}

#[test]
fn test_unitary_for_random_angles() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..64 {
        let e = random_euler(&mut rng);
        let d1 = wigner_d1(&e);
        let d2 = wigner_d2(&e);
        assert_abs_diff_eq!((d1 * d1.adjoint() - WignerD1::identity()).norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!((d2 * d2.adjoint() - WignerD2::identity()).norm(), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_identity_at_zero_rotation() {
    let zero = EulerAngles::new(0.0, 0.0, 0.0);
    for l in 0..=2u32 {
        let d = wigner_d(l, &zero).unwrap();
        let n = (2 * l + 1) as usize;
        assert_abs_diff_eq!((d - DMatrix::<Complex>::identity(n, n)).norm(), 0.0, epsilon = 1e-14);
    }
}

/// `D(R1)·D(R2) = D(R1·R2)`: the matrices follow composition of rotations.
#[test]
fn test_composition_matches_rotation_product() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let a = random_euler(&mut rng);
        let b = random_euler(&mut rng);
        let ab = EulerAngles::from_rotation(&(a.rotation() * b.rotation()));
        assert_abs_diff_eq!(
            (wigner_d1(&a) * wigner_d1(&b) - wigner_d1(&ab)).norm(),
            0.0,
            epsilon = 1e-10
        );
        assert_abs_diff_eq!(
            (wigner_d2(&a) * wigner_d2(&b) - wigner_d2(&ab)).norm(),
            0.0,
            epsilon = 1e-10
        );
    }
}

/// A dipole pointing along `ẑ` rotated by `D¹` points along `R·ẑ`.
#[test]
fn test_degree_one_rotates_dipole() {
    let mut rng = StdRng::seed_from_u64(3);
    let y10 = 0.5 * (3.0 / PI).sqrt();
    let dipole = SVector::<Complex, 3>::new(
        Complex::new(0.0, 0.0),
        Complex::new(1.0 / y10, 0.0),
        Complex::new(0.0, 0.0),
    );
    for _ in 0..10 {
        let e = random_euler(&mut rng);
        let axis = e.rotation() * nalgebra::Vector3::z();
        let rotated = wigner_d1(&e) * dipole;
        for k in 0..12 {
            let (phi, theta) = (0.5 * k as f64, 0.25 * k as f64 + 0.1);
            let value: Complex = (0..3)
                .map(|i| rotated[i] * harmonic(i as i32 - 1, 1, phi, theta).unwrap())
                .sum();
            let r = nalgebra::Vector3::new(phi.cos() * theta.sin(), phi.sin() * theta.sin(), theta.cos());
            assert_abs_diff_eq!(value.re, axis.dot(&r), epsilon = 1e-12);
        }
    }
}

/// The spectrum obtained by numerically projecting the Cartesian-rotated
/// double couple equals `D²` applied to the template.
#[test]
fn test_degree_two_matches_quadrature() {
    let e = EulerAngles::new(1.1, 0.7, 4.0);
    let rotation = e.rotation();
    let n = rotation * nalgebra::Vector3::z();
    let u = rotation * nalgebra::Vector3::y();

    let n_theta = 60;
    let n_phi = 120;
    let d_theta = PI / n_theta as f64;
    let d_phi = 2.0 * PI / n_phi as f64;
    let mut projected = [Complex::new(0.0, 0.0); 5];
    for it in 0..n_theta {
        let theta = (it as f64 + 0.5) * d_theta;
        let w = theta.sin() * d_theta * d_phi;
        for ip in 0..n_phi {
            let phi = (ip as f64 + 0.5) * d_phi;
            let r = nalgebra::Vector3::new(phi.cos() * theta.sin(), phi.sin() * theta.sin(), theta.cos());
            let value = 2.0 * n.dot(&r) * u.dot(&r);
            for (k, slot) in projected.iter_mut().enumerate() {
                *slot += harmonic(k as i32 - 2, 2, phi, theta).unwrap().conj() * (w * value);
            }
        }
    }

    let expected = wigner_d2(&e) * SVector::from(double_couple_template());
    for k in 0..5 {
        assert_abs_diff_eq!(projected[k].re, expected[k].re, epsilon = 3e-3);
        assert_abs_diff_eq!(projected[k].im, expected[k].im, epsilon = 3e-3);
    }

    // Pointwise: the rotated spectrum reproduces the rotated pattern exactly
    let spectrum = Spectrum::from_quadrupole(std::array::from_fn(|k| expected[k]));
    for k in 0..10 {
        let (phi, theta) = (0.6 * k as f64, 0.3 * k as f64);
        let r = nalgebra::Vector3::new(phi.cos() * theta.sin(), phi.sin() * theta.sin(), theta.cos());
        assert_abs_diff_eq!(
            spectrum.evaluate(phi, theta),
            2.0 * n.dot(&r) * u.dot(&r),
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_fault_euler_convention() {
    let e = EulerAngles::from_fault_deg(30.0, 60.0, -90.0);
    assert_abs_diff_eq!(e.alpha, 30.0_f64.to_radians(), epsilon = 1e-15);
    assert_abs_diff_eq!(e.beta, 60.0_f64.to_radians(), epsilon = 1e-15);
    assert_abs_diff_eq!(e.gamma, 90.0_f64.to_radians(), epsilon = 1e-15);
    let deg = e.to_degrees();
    assert_abs_diff_eq!(deg[2], 90.0, epsilon = 1e-12);
}
