//! C-support-vector classification by sequential minimal optimisation.
//!
//! Solves the dual problem
//!
//! ```text
//! min ½ αᵀQα − eᵀα   s.t.  0 ≤ α_i ≤ C,  yᵀα = 0,   Q_ij = y_i y_j K(x_i, x_j)
//! ```
//!
//! two multipliers at a time. The working pair is chosen with second-order
//! information (Fan, Chen & Lin, "Working set selection using second order
//! information for training SVM", JMLR 2005), which is also what libsvm does.
//! The decision function is `f(x) = Σ α_i y_i K(x_i, x) + b`.

use std::collections::BTreeSet;

use nalgebra::DMatrix;
use tracing::{debug, warn};

use super::{KernelClassifier, KernelFit, PolynomialKernel};
use crate::error::{FocalError, Result};
use crate::Vector3;

/// Parameters of the SMO solver.
#[derive(Debug, Clone)]
pub struct SmoConfig {
    /// Box constraint C on each multiplier. Default 1.0.
    pub penalty: f64,
    /// Stopping tolerance on the maximal KKT violation. Default 1e-3.
    pub tolerance: f64,
    /// Hard cap on pair updates. Default 100_000.
    pub max_iterations: usize,
}

impl Default for SmoConfig {
    fn default() -> Self {
        Self {
            penalty: 1.0,
            tolerance: 1e-3,
            max_iterations: 100_000,
        }
    }
}

/// Kernel classifier backed by the SMO solver.
#[derive(Debug, Clone, Default)]
pub struct SmoClassifier {
    pub config: SmoConfig,
}

impl SmoClassifier {
    pub fn new(config: SmoConfig) -> Self {
        Self { config }
    }
}

/// Curvature floor for non-positive-definite pairs.
const TAU: f64 = 1e-12;

/// Validate trainer labels: exactly the two classes `-1.0` and `+1.0`.
fn check_labels(labels: &[f64]) -> Result<()> {
    let classes: BTreeSet<u64> = labels
        .iter()
        .map(|&v| match v {
            v if v.is_nan() => f64::NAN.to_bits(),
            v if v == 0.0 => 0.0_f64.to_bits(),
            v => v.to_bits(),
        })
        .collect();
    if classes.len() > 2 {
        return Err(FocalError::TooManyClasses {
            found: classes.len(),
        });
    }
    if let Some(&value) = labels.iter().find(|&&v| v != 1.0 && v != -1.0) {
        return Err(FocalError::InvalidLabel { value });
    }
    if classes.len() < 2 {
        return Err(FocalError::SingleClass);
    }
    Ok(())
}

/// Whether `t` may move "up" (increase y_t α_t).
#[inline]
fn in_up(y: f64, alpha: f64, c: f64) -> bool {
    (y > 0.0 && alpha < c) || (y < 0.0 && alpha > 0.0)
}

/// Whether `t` may move "down" (decrease y_t α_t).
#[inline]
fn in_low(y: f64, alpha: f64, c: f64) -> bool {
    (y > 0.0 && alpha > 0.0) || (y < 0.0 && alpha < c)
}

impl KernelClassifier for SmoClassifier {
    fn fit(
        &self,
        vectors: &[Vector3],
        labels: &[f64],
        kernel: &PolynomialKernel,
    ) -> Result<KernelFit> {
        if vectors.len() != labels.len() {
            return Err(FocalError::LengthMismatch {
                vectors: vectors.len(),
                labels: labels.len(),
            });
        }
        if vectors.is_empty() {
            return Err(FocalError::EmptyObservations);
        }
        check_labels(labels)?;
        let y = labels;
        let n = vectors.len();
        let c = self.config.penalty;

        let k = DMatrix::from_fn(n, n, |i, j| kernel.eval(&vectors[i], &vectors[j]));

        let mut alpha = vec![0.0; n];
        // Gradient of the dual objective, Qα − e
        let mut grad = vec![-1.0; n];
        let mut iterations = 0;

        loop {
            if iterations >= self.config.max_iterations {
                warn!(
                    "SMO stopped at the iteration cap ({}) before reaching tolerance",
                    self.config.max_iterations
                );
                break;
            }

            // First index: maximal violating "up" candidate
            let mut g_max = f64::NEG_INFINITY;
            let mut i_sel = None;
            for t in 0..n {
                if in_up(y[t], alpha[t], c) && -y[t] * grad[t] >= g_max {
                    g_max = -y[t] * grad[t];
                    i_sel = Some(t);
                }
            }

            // Second index: largest objective decrease among "down" candidates
            let mut g_max2 = f64::NEG_INFINITY;
            let mut obj_min = f64::INFINITY;
            let mut j_sel = None;
            if let Some(i) = i_sel {
                for t in 0..n {
                    if !in_low(y[t], alpha[t], c) {
                        continue;
                    }
                    g_max2 = g_max2.max(y[t] * grad[t]);
                    let b = g_max + y[t] * grad[t];
                    if b > 0.0 {
                        let mut a = k[(i, i)] + k[(t, t)] - 2.0 * k[(i, t)];
                        if a <= 0.0 {
                            a = TAU;
                        }
                        if -(b * b) / a <= obj_min {
                            obj_min = -(b * b) / a;
                            j_sel = Some(t);
                        }
                    }
                }
            }

            let (i, j) = match (i_sel, j_sel) {
                (Some(i), Some(j)) if g_max + g_max2 >= self.config.tolerance => (i, j),
                _ => break,
            };
            iterations += 1;

            let mut a = k[(i, i)] + k[(j, j)] - 2.0 * k[(i, j)];
            if a <= 0.0 {
                a = TAU;
            }
            let b = -y[i] * grad[i] + y[j] * grad[j];

            // Unconstrained step, then clip both multipliers to the box while
            // keeping y_i α_i + y_j α_j fixed
            let (old_i, old_j) = (alpha[i], alpha[j]);
            let sum = y[i] * old_i + y[j] * old_j;
            let new_i = (old_i + y[i] * b / a).clamp(0.0, c);
            let new_j = (y[j] * (sum - y[i] * new_i)).clamp(0.0, c);
            let new_i = y[i] * (sum - y[j] * new_j);

            let d_i = new_i - old_i;
            let d_j = new_j - old_j;
            alpha[i] = new_i;
            alpha[j] = new_j;
            for t in 0..n {
                grad[t] += y[t] * (y[i] * k[(t, i)] * d_i + y[j] * k[(t, j)] * d_j);
            }
        }

        // Intercept: mean of y∇ over free multipliers, else midpoint of the
        // feasible interval
        let mut upper = f64::INFINITY;
        let mut lower = f64::NEG_INFINITY;
        let mut n_free = 0usize;
        let mut sum_free = 0.0;
        for t in 0..n {
            let yg = y[t] * grad[t];
            if alpha[t] >= c {
                if y[t] < 0.0 {
                    upper = upper.min(yg);
                } else {
                    lower = lower.max(yg);
                }
            } else if alpha[t] <= 0.0 {
                if y[t] > 0.0 {
                    upper = upper.min(yg);
                } else {
                    lower = lower.max(yg);
                }
            } else {
                n_free += 1;
                sum_free += yg;
            }
        }
        let rho = if n_free > 0 {
            sum_free / n_free as f64
        } else {
            0.5 * (upper + lower)
        };

        let mut support_vectors = Vec::new();
        let mut dual_coefficients = Vec::new();
        let mut support_counts = [0usize; 2];
        for t in 0..n {
            if alpha[t] > 0.0 {
                support_vectors.push(vectors[t]);
                dual_coefficients.push(alpha[t] * y[t]);
                support_counts[usize::from(y[t] > 0.0)] += 1;
            }
        }

        debug!(
            "SMO: {} points, {} support vectors ({} / {}), {} iterations, intercept {:.4e}",
            n,
            support_vectors.len(),
            support_counts[0],
            support_counts[1],
            iterations,
            -rho
        );

        Ok(KernelFit {
            support_vectors,
            dual_coefficients,
            intercept: -rho,
            support_counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_kernel() -> PolynomialKernel {
        PolynomialKernel {
            degree: 1,
            coeff: 0.0,
        }
    }

    #[test]
    fn test_separates_hemispheres() {
        let vectors = vec![
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.3, 0.0, 0.95),
            Vector3::new(0.0, -0.3, 0.95),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(-0.3, 0.0, -0.95),
            Vector3::new(0.0, 0.3, -0.95),
        ];
        let labels = vec![1.0, 1.0, 1.0, -1.0, -1.0, -1.0];
        let kernel = linear_kernel();
        let fit = SmoClassifier::default().fit(&vectors, &labels, &kernel).unwrap();
        for (v, &l) in vectors.iter().zip(&labels) {
            assert_eq!(fit.predict(&kernel, v), l);
        }
        let total: f64 = fit.dual_coefficients.iter().sum();
        assert!(total.abs() < 1e-9, "Σ α_i y_i = {total}");
        assert_eq!(fit.support_counts.iter().sum::<usize>(), fit.support_vectors.len());
    }

    #[test]
    fn test_multipliers_respect_box() {
        let vectors: Vec<Vector3> = (0..12)
            .map(|k| {
                let a = k as f64 * 0.5;
                Vector3::new(a.cos(), a.sin(), 0.2 * (k as f64 - 6.0)).normalize()
            })
            .collect();
        // Labels not separable by a plane through the origin
        let labels: Vec<f64> = (0..12).map(|k| if k % 3 == 0 { 1.0 } else { -1.0 }).collect();
        let config = SmoConfig {
            penalty: 0.5,
            ..Default::default()
        };
        let fit = SmoClassifier::new(config)
            .fit(&vectors, &labels, &linear_kernel())
            .unwrap();
        assert!(fit
            .dual_coefficients
            .iter()
            .all(|c| c.abs() <= 0.5 + 1e-12));
    }

    #[test]
    fn test_rejects_three_classes() {
        let vectors = vec![Vector3::x(), Vector3::y(), Vector3::z()];
        let err = SmoClassifier::default()
            .fit(&vectors, &[1.0, -1.0, 2.0], &linear_kernel())
            .unwrap_err();
        assert_eq!(err, FocalError::TooManyClasses { found: 3 });
    }

    #[test]
    fn test_rejects_labels_other_than_unit_signs() {
        let vectors = vec![Vector3::x(), Vector3::y()];
        let err = SmoClassifier::default()
            .fit(&vectors, &[1.0, 2.0], &linear_kernel())
            .unwrap_err();
        assert_eq!(err, FocalError::InvalidLabel { value: 2.0 });
        let err = SmoClassifier::default()
            .fit(&vectors, &[-1.0, 0.0], &linear_kernel())
            .unwrap_err();
        assert_eq!(err, FocalError::InvalidLabel { value: 0.0 });
    }

    #[test]
    fn test_rejects_single_class() {
        let vectors = vec![Vector3::x(), Vector3::y()];
        let err = SmoClassifier::default()
            .fit(&vectors, &[1.0, 1.0], &linear_kernel())
            .unwrap_err();
        assert_eq!(err, FocalError::SingleClass);
    }

    #[test]
    fn test_length_mismatch() {
        let err = SmoClassifier::default()
            .fit(&[Vector3::x()], &[1.0, -1.0], &linear_kernel())
            .unwrap_err();
        assert_eq!(err, FocalError::LengthMismatch { vectors: 1, labels: 2 });
    }
}
