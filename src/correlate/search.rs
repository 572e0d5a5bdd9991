//! Bounded minimisation over Euler-angle triples.
//!
//! The search runs in two stages: an exhaustive scan of a candidate set
//! ([`best_of`]) followed by a local refinement ([`refine`]) with any
//! [`LocalOptimizer`]. Refinement is box-constrained; axes flagged periodic
//! are re-entered from the opposite face when the optimum lands on a bound.

use tracing::trace;

/// Box constraints for a 3-parameter search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
    /// Axes whose two faces describe the same angle.
    pub periodic: [bool; 3],
}

impl Bounds {
    /// `[0, 2π] × [0, π] × [0, 2π]` with α and γ periodic.
    pub fn euler() -> Self {
        use std::f64::consts::PI;
        Self {
            lower: [0.0; 3],
            upper: [2.0 * PI, PI, 2.0 * PI],
            periodic: [true, false, true],
        }
    }

    pub fn clamp(&self, x: [f64; 3]) -> [f64; 3] {
        std::array::from_fn(|i| x[i].clamp(self.lower[i], self.upper[i]))
    }

    pub fn contains(&self, x: &[f64; 3]) -> bool {
        (0..3).all(|i| x[i] >= self.lower[i] && x[i] <= self.upper[i])
    }
}

/// Best point found by a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    pub x: [f64; 3],
    pub value: f64,
    /// Objective evaluations spent.
    pub evaluations: usize,
}

/// NaN compares as +∞ so it never wins.
#[inline]
fn rank(value: f64) -> f64 {
    if value.is_nan() {
        f64::INFINITY
    } else {
        value
    }
}

/// Lower value wins; equal values go to the earlier candidate.
#[inline]
fn earlier_min(a: (usize, f64), b: (usize, f64)) -> (usize, f64) {
    if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) {
        b
    } else {
        a
    }
}

/// Evaluate `score` at every candidate and return the lowest.
///
/// Ties resolve to the first candidate in slice order, whether or not the
/// scan runs in parallel. Returns `None` for an empty slice.
pub fn best_of<F>(candidates: &[[f64; 3]], score: F) -> Option<Minimum>
where
    F: Fn([f64; 3]) -> f64 + Sync,
{
    #[cfg(feature = "parallel")]
    let best = {
        use rayon::prelude::*;

        candidates
            .par_iter()
            .enumerate()
            .map(|(i, &x)| (i, rank(score(x))))
            .reduce_with(earlier_min)
    };

    #[cfg(not(feature = "parallel"))]
    let best = candidates
        .iter()
        .enumerate()
        .map(|(i, &x)| (i, rank(score(x))))
        .reduce(earlier_min);

    best.map(|(i, value)| Minimum {
        x: candidates[i],
        value,
        evaluations: candidates.len(),
    })
}

/// A bounded local minimiser.
pub trait LocalOptimizer {
    fn minimize(&self, f: &dyn Fn([f64; 3]) -> f64, x0: [f64; 3], bounds: &Bounds) -> Minimum;
}

/// Downhill simplex with every trial point clamped into the box.
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Offset of the initial simplex vertices from the start point.
    pub initial_step: f64,
    /// Stop once the spread of simplex values falls below this.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            tolerance: 1e-10,
            max_iterations: 2000,
        }
    }
}

/// `a + t (b - a)`
#[inline]
fn lerp(a: &[f64; 3], b: &[f64; 3], t: f64) -> [f64; 3] {
    std::array::from_fn(|i| a[i] + t * (b[i] - a[i]))
}

impl LocalOptimizer for NelderMead {
    fn minimize(&self, f: &dyn Fn([f64; 3]) -> f64, x0: [f64; 3], bounds: &Bounds) -> Minimum {
        let mut evaluations = 0;
        let mut eval = |x: [f64; 3]| {
            evaluations += 1;
            f(x)
        };

        let mut pts = [bounds.clamp(x0); 4];
        for axis in 0..3 {
            let mut p = x0;
            if p[axis] + self.initial_step <= bounds.upper[axis] {
                p[axis] += self.initial_step;
            } else {
                p[axis] -= self.initial_step;
            }
            pts[axis + 1] = bounds.clamp(p);
        }
        let mut vals = pts.map(&mut eval);

        for _ in 0..self.max_iterations {
            let mut order = [0, 1, 2, 3];
            order.sort_by(|&a, &b| vals[a].total_cmp(&vals[b]));
            pts = order.map(|k| pts[k]);
            vals = order.map(|k| vals[k]);

            if (vals[3] - vals[0]).abs() < self.tolerance {
                break;
            }

            let centroid: [f64; 3] =
                std::array::from_fn(|i| (pts[0][i] + pts[1][i] + pts[2][i]) / 3.0);
            let worst = pts[3];

            let xr = bounds.clamp(lerp(&centroid, &worst, -1.0));
            let fr = eval(xr);

            if fr < vals[0] {
                let xe = bounds.clamp(lerp(&centroid, &worst, -2.0));
                let fe = eval(xe);
                if fe < fr {
                    (pts[3], vals[3]) = (xe, fe);
                } else {
                    (pts[3], vals[3]) = (xr, fr);
                }
            } else if fr < vals[2] {
                (pts[3], vals[3]) = (xr, fr);
            } else {
                // Outside or inside contraction
                let xc = if fr < vals[3] {
                    bounds.clamp(lerp(&centroid, &xr, 0.5))
                } else {
                    bounds.clamp(lerp(&centroid, &worst, 0.5))
                };
                let fc = eval(xc);
                if fc < fr.min(vals[3]) {
                    (pts[3], vals[3]) = (xc, fc);
                } else {
                    for k in 1..4 {
                        pts[k] = lerp(&pts[0], &pts[k], 0.5);
                        vals[k] = eval(pts[k]);
                    }
                }
            }
        }

        let best = (0..4)
            .min_by(|&a, &b| vals[a].total_cmp(&vals[b]))
            .unwrap_or(0);
        Minimum {
            x: pts[best],
            value: vals[best],
            evaluations,
        }
    }
}

/// Steepest descent with central-difference gradients, projected onto the
/// box, with Armijo backtracking.
#[derive(Debug, Clone)]
pub struct ProjectedGradient {
    /// Initial trial step length.
    pub step: f64,
    /// Finite-difference half-width.
    pub gradient_step: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for ProjectedGradient {
    fn default() -> Self {
        Self {
            step: 0.1,
            gradient_step: 1e-6,
            tolerance: 1e-10,
            max_iterations: 500,
        }
    }
}

impl LocalOptimizer for ProjectedGradient {
    fn minimize(&self, f: &dyn Fn([f64; 3]) -> f64, x0: [f64; 3], bounds: &Bounds) -> Minimum {
        let mut evaluations = 0;
        let mut eval = |x: [f64; 3]| {
            evaluations += 1;
            f(x)
        };

        let mut x = bounds.clamp(x0);
        let mut fx = eval(x);

        for _ in 0..self.max_iterations {
            let mut grad = [0.0; 3];
            for axis in 0..3 {
                let mut hi = x;
                let mut lo = x;
                hi[axis] = (x[axis] + self.gradient_step).min(bounds.upper[axis]);
                lo[axis] = (x[axis] - self.gradient_step).max(bounds.lower[axis]);
                let width = hi[axis] - lo[axis];
                if width > 0.0 {
                    grad[axis] = (eval(hi) - eval(lo)) / width;
                }
            }

            let mut t = self.step;
            let mut accepted = None;
            while t > 1e-12 {
                let y = bounds.clamp(std::array::from_fn(|i| x[i] - t * grad[i]));
                let decrease: f64 = (0..3).map(|i| grad[i] * (x[i] - y[i])).sum();
                if decrease <= 0.0 {
                    break;
                }
                let fy = eval(y);
                if fy <= fx - 1e-4 * decrease {
                    accepted = Some((y, fy));
                    break;
                }
                t *= 0.5;
            }

            let Some((y, fy)) = accepted else {
                break;
            };
            let improvement = fx - fy;
            x = y;
            fx = fy;
            if improvement < self.tolerance {
                break;
            }
        }

        Minimum {
            x,
            value: fx,
            evaluations,
        }
    }
}

/// Distance from a face below which a periodic coordinate counts as pinned.
const FACE_EPS: f64 = 1e-6;

/// Improvement a restart must achieve to be kept.
const RESTART_GAIN: f64 = 1e-12;

/// Run `optimizer` from `x0`, then restart up to `periodic_restarts` times
/// from the opposite face of every periodic coordinate stuck on a bound.
pub fn refine(
    optimizer: &dyn LocalOptimizer,
    f: &dyn Fn([f64; 3]) -> f64,
    x0: [f64; 3],
    bounds: &Bounds,
    periodic_restarts: usize,
) -> Minimum {
    let mut best = optimizer.minimize(f, x0, bounds);

    for round in 0..periodic_restarts {
        let mut moved = best.x;
        let mut wrapped = false;
        for axis in (0..3).filter(|&a| bounds.periodic[a]) {
            if best.x[axis] <= bounds.lower[axis] + FACE_EPS {
                moved[axis] = bounds.upper[axis];
                wrapped = true;
            } else if best.x[axis] >= bounds.upper[axis] - FACE_EPS {
                moved[axis] = bounds.lower[axis];
                wrapped = true;
            }
        }
        if !wrapped {
            break;
        }

        let retry = optimizer.minimize(f, moved, bounds);
        let evaluations = best.evaluations + retry.evaluations;
        trace!(
            "periodic restart {}: {:.6e} -> {:.6e}",
            round + 1,
            best.value,
            retry.value
        );
        if retry.value < best.value - RESTART_GAIN {
            best = Minimum {
                evaluations,
                ..retry
            };
        } else {
            best.evaluations = evaluations;
            break;
        }
    }
    best
}
