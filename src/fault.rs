//! Double-couple fault plane geometry.
//!
//! Angles follow the Aki & Richards convention: strike clockwise from north
//! with the fault dipping to the right of the strike direction, dip from the
//! horizontal, rake measured in the fault plane from the strike direction.
//! Vectors use the same (north, east, up) frame as
//! [`PolarityObservation::uvec`](crate::PolarityObservation::uvec).

use crate::observation::Polarity;
use crate::Vector3;

/// Strike, dip and rake of one nodal plane, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultPlaneSolution {
    /// [0, 360)
    pub strike_deg: f64,
    /// [0, 90]
    pub dip_deg: f64,
    /// (-180, 180]
    pub rake_deg: f64,
}

/// Wrap an angle in degrees into (-180, 180].
fn wrap_180(deg: f64) -> f64 {
    let w = deg.rem_euclid(360.0);
    if w > 180.0 {
        w - 360.0
    } else {
        w
    }
}

/// Smallest absolute difference between two angles in degrees.
fn angle_diff(a: f64, b: f64) -> f64 {
    wrap_180(a - b).abs()
}

#[inline]
fn up_to_down(v: Vector3) -> Vector3 {
    Vector3::new(v.x, v.y, -v.z)
}

impl FaultPlaneSolution {
    /// Build a solution and bring it to the canonical angle ranges.
    ///
    /// A dip outside [0, 90] is folded onto the equivalent plane.
    pub fn new(strike_deg: f64, dip_deg: f64, rake_deg: f64) -> Self {
        Self {
            strike_deg,
            dip_deg,
            rake_deg,
        }
        .normalized()
    }

    /// Fault normal `n` and slip vector `u` in the (north, east, up) frame.
    ///
    /// The normal points from the footwall into the hanging wall (downward
    /// component non-positive in north-east-down coordinates).
    pub fn normal_and_slip(&self) -> (Vector3, Vector3) {
        let (sf, cf) = self.strike_deg.to_radians().sin_cos();
        let (sd, cd) = self.dip_deg.to_radians().sin_cos();
        let (sl, cl) = self.rake_deg.to_radians().sin_cos();

        // North-east-down components
        let n = Vector3::new(-sd * sf, sd * cf, -cd);
        let u = Vector3::new(cl * cf + cd * sl * sf, cl * sf - cd * sl * cf, -sl * sd);
        (up_to_down(n), up_to_down(u))
    }

    /// Recover strike, dip and rake from a normal and slip vector given in the
    /// (north, east, up) frame. Neither vector needs to be normalised.
    pub fn from_normal_and_slip(normal: &Vector3, slip: &Vector3) -> Self {
        let mut n = up_to_down(normal.normalize());
        let mut u = up_to_down(slip.normalize());
        if n.z > 0.0 {
            n = -n;
            u = -u;
        }

        let dip = (-n.z).clamp(-1.0, 1.0).acos();
        let strike = if n.x.abs() + n.y.abs() < 1e-12 {
            // Horizontal plane: any strike works, measure rake from north
            0.0
        } else {
            (-n.x).atan2(n.y)
        };

        let (sf, cf) = strike.sin_cos();
        let (sd, cd) = dip.sin_cos();
        let strike_dir = Vector3::new(cf, sf, 0.0);
        let updip_perp = Vector3::new(cd * sf, -cd * cf, -sd);
        let rake = u.dot(&updip_perp).atan2(u.dot(&strike_dir));

        Self {
            strike_deg: strike.to_degrees().rem_euclid(360.0),
            dip_deg: dip.to_degrees(),
            rake_deg: wrap_180(rake.to_degrees()),
        }
    }

    /// Canonical-range copy of this solution.
    pub fn normalized(&self) -> Self {
        let (n, u) = self.normal_and_slip();
        Self::from_normal_and_slip(&n, &u)
    }

    /// The auxiliary nodal plane: normal and slip exchanged.
    pub fn auxiliary_plane(&self) -> Self {
        let (n, u) = self.normal_and_slip();
        Self::from_normal_and_slip(&u, &n)
    }

    /// P-wave radiation amplitude `2 (n·r)(u·r)` for a ray leaving at
    /// `azimuth_rad` with takeoff angle `takeoff_rad` from the upward vertical.
    pub fn radiation_amplitude(&self, azimuth_rad: f64, takeoff_rad: f64) -> f64 {
        let (n, u) = self.normal_and_slip();
        let (az_sin, az_cos) = azimuth_rad.sin_cos();
        let (to_sin, to_cos) = takeoff_rad.sin_cos();
        let r = Vector3::new(az_cos * to_sin, az_sin * to_sin, to_cos);
        2.0 * n.dot(&r) * u.dot(&r)
    }

    /// First-motion polarity predicted for a ray.
    pub fn polarity(&self, azimuth_rad: f64, takeoff_rad: f64) -> Polarity {
        Polarity::from_sign(self.radiation_amplitude(azimuth_rad, takeoff_rad))
    }

    /// Largest per-angle difference (degrees) to `other`, taking the better of
    /// `other` and its auxiliary plane.
    pub fn misfit_deg(&self, other: &FaultPlaneSolution) -> f64 {
        let direct = |b: &FaultPlaneSolution| {
            angle_diff(self.strike_deg, b.strike_deg)
                .max((self.dip_deg - b.dip_deg).abs())
                .max(angle_diff(self.rake_deg, b.rake_deg))
        };
        direct(other).min(direct(&other.auxiliary_plane()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_same(a: &FaultPlaneSolution, b: &FaultPlaneSolution) {
        assert!(
            angle_diff(a.strike_deg, b.strike_deg) < 1e-8
                && (a.dip_deg - b.dip_deg).abs() < 1e-8
                && angle_diff(a.rake_deg, b.rake_deg) < 1e-8,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_roundtrip_normal_and_slip() {
        for &(s, d, r) in &[(30.0, 60.0, -90.0), (120.0, 35.0, 45.0), (300.0, 80.0, 170.0)] {
            let f = FaultPlaneSolution::new(s, d, r);
            let (n, u) = f.normal_and_slip();
            assert_abs_diff_eq!(n.norm(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(n.dot(&u), 0.0, epsilon = 1e-12);
            assert_same(&FaultPlaneSolution::from_normal_and_slip(&n, &u), &f);
        }
    }

    #[test]
    fn test_known_auxiliary_plane() {
        // Pure normal fault: auxiliary plane strikes opposite with complementary dip
        let f = FaultPlaneSolution::new(30.0, 60.0, -90.0);
        assert_same(&f.auxiliary_plane(), &FaultPlaneSolution::new(210.0, 30.0, -90.0));
        // Vertical strike-slip
        let g = FaultPlaneSolution::new(0.0, 90.0, 0.0);
        let aux = g.auxiliary_plane();
        assert_abs_diff_eq!(aux.dip_deg, 90.0, epsilon = 1e-8);
        assert_abs_diff_eq!(aux.strike_deg.rem_euclid(180.0), 90.0, epsilon = 1e-8);
    }

    #[test]
    fn test_auxiliary_is_involution() {
        let f = FaultPlaneSolution::new(123.0, 47.0, 61.0);
        assert_same(&f.auxiliary_plane().auxiliary_plane(), &f);
    }

    #[test]
    fn test_overturned_dip_is_folded() {
        let f = FaultPlaneSolution::new(10.0, 120.0, 30.0);
        assert!(f.dip_deg <= 90.0);
        assert_abs_diff_eq!(f.dip_deg, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_radiation_shares_auxiliary_plane() {
        let f = FaultPlaneSolution::new(30.0, 60.0, -90.0);
        let aux = f.auxiliary_plane();
        for k in 0..20 {
            let az = 0.3 * k as f64;
            let toa = 0.15 * k as f64;
            assert_abs_diff_eq!(
                f.radiation_amplitude(az, toa),
                aux.radiation_amplitude(az, toa),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_normal_fault_dilatational_at_center() {
        // Straight-down rays of a normal fault leave through a dilatational quadrant
        let f = FaultPlaneSolution::new(30.0, 45.0, -90.0);
        assert!(f.radiation_amplitude(0.0, std::f64::consts::PI) < 0.0);
        assert_eq!(f.polarity(0.0, std::f64::consts::PI), Polarity::Dilatation);
    }

    #[test]
    fn test_misfit_accepts_auxiliary() {
        let f = FaultPlaneSolution::new(30.0, 60.0, -90.0);
        assert!(f.auxiliary_plane().misfit_deg(&f) < 1e-8);
        assert!(FaultPlaneSolution::new(35.0, 60.0, -90.0).misfit_deg(&f) > 4.9);
    }
}
