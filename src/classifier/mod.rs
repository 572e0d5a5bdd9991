//! Kernel classification of polarity observations.
//!
//! Compressional and dilatational rays are separated on the unit sphere by a
//! polynomial-kernel support vector classifier. The resulting dual
//! coefficients carry all the information needed to recover the decision
//! function's spherical-harmonic spectrum (see [`spectrum`]).
//!
//! The training step sits behind the [`KernelClassifier`] trait; the bundled
//! implementation is [`SmoClassifier`].

pub mod smo;
pub mod spectrum;

use tracing::debug;

use crate::error::{FocalError, Result};
use crate::observation::{ObservationSet, Parity};
use crate::Vector3;

pub use smo::{SmoClassifier, SmoConfig};
pub use spectrum::{schoelkopf_norm, spectrum};

/// Polynomial kernel `K(u, v) = (u·v + coeff)^degree`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialKernel {
    pub degree: u32,
    pub coeff: f64,
}

impl Default for PolynomialKernel {
    fn default() -> Self {
        Self {
            degree: 2,
            coeff: 1.0,
        }
    }
}

impl PolynomialKernel {
    #[inline]
    pub fn eval(&self, u: &Vector3, v: &Vector3) -> f64 {
        (u.dot(v) + self.coeff).powi(self.degree as i32)
    }
}

/// Dual solution of a trained two-class kernel machine.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelFit {
    pub support_vectors: Vec<Vector3>,
    /// `α_i · y_i` per support vector.
    pub dual_coefficients: Vec<f64>,
    pub intercept: f64,
    /// Support vectors per class, `[negative, positive]`.
    pub support_counts: [usize; 2],
}

impl KernelFit {
    /// Decision value `Σ dual_i K(sv_i, v) + intercept`.
    pub fn decision(&self, kernel: &PolynomialKernel, v: &Vector3) -> f64 {
        self.support_vectors
            .iter()
            .zip(&self.dual_coefficients)
            .map(|(sv, &c)| c * kernel.eval(sv, v))
            .sum::<f64>()
            + self.intercept
    }

    /// `+1.0` where the decision value is positive, `-1.0` otherwise.
    pub fn predict(&self, kernel: &PolynomialKernel, v: &Vector3) -> f64 {
        if self.decision(kernel, v) > 0.0 {
            1.0
        } else {
            -1.0
        }
    }
}

/// A two-class kernel machine trainer.
pub trait KernelClassifier {
    /// Train on unit vectors labelled `-1.0` or `+1.0`.
    fn fit(
        &self,
        vectors: &[Vector3],
        labels: &[f64],
        kernel: &PolynomialKernel,
    ) -> Result<KernelFit>;
}

/// Output of classifying one event.
#[derive(Debug, Clone)]
pub struct ClassifierResult {
    /// `α_i · y_i` per support vector.
    pub dual_coefficients: Vec<f64>,
    /// Longitude `atan2(y, x)` of each support vector, in (-π, π].
    pub azimuths: Vec<f64>,
    /// Colatitude `acos(z)` of each support vector, in [0, π].
    pub colatitudes: Vec<f64>,
    pub intercept: f64,
    /// Predicted label for every training vector, in training order.
    pub in_sample: Vec<f64>,
    /// Support vectors per class, `[negative, positive]`.
    pub support_counts: [usize; 2],
    pub kernel: PolynomialKernel,
    /// Fraction of the training labels reproduced by `in_sample`.
    pub training_accuracy: f64,
}

impl ClassifierResult {
    fn from_fit(
        fit: KernelFit,
        kernel: PolynomialKernel,
        vectors: &[Vector3],
        labels: &[f64],
    ) -> Self {
        let in_sample: Vec<f64> = vectors.iter().map(|v| fit.predict(&kernel, v)).collect();
        let azimuths = fit.support_vectors.iter().map(|v| v.y.atan2(v.x)).collect();
        let colatitudes = fit
            .support_vectors
            .iter()
            .map(|v| v.z.clamp(-1.0, 1.0).acos())
            .collect();
        let mut result = Self {
            dual_coefficients: fit.dual_coefficients,
            azimuths,
            colatitudes,
            intercept: fit.intercept,
            in_sample,
            support_counts: fit.support_counts,
            kernel,
            training_accuracy: 0.0,
        };
        result.training_accuracy = result.accuracy(labels);
        result
    }

    pub fn n_support(&self) -> usize {
        self.dual_coefficients.len()
    }

    /// Fraction of `labels` reproduced by the in-sample predictions.
    pub fn accuracy(&self, labels: &[f64]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let hits = self
            .in_sample
            .iter()
            .zip(labels)
            .filter(|(p, l)| (**p > 0.0) == (**l > 0.0))
            .count();
        hits as f64 / labels.len() as f64
    }
}

/// Classifier settings for a single event.
#[derive(Debug, Clone, Default)]
pub struct MechanismClassifier {
    pub kernel: PolynomialKernel,
    /// Antipodal augmentation applied before training.
    pub parity: Parity,
}

impl MechanismClassifier {
    /// Augment `observations` according to the parity and train `trainer`.
    pub fn classify(
        &self,
        observations: &ObservationSet,
        trainer: &impl KernelClassifier,
    ) -> Result<ClassifierResult> {
        if observations.is_empty() {
            return Err(FocalError::EmptyObservations);
        }
        let training = observations.training_set(self.parity);
        let result = fit_vectors(&training.vectors, &training.labels, self.kernel, trainer)?;
        debug!(
            "classified {} observations ({:?} parity): {} support vectors, accuracy {:.3}",
            observations.len(),
            self.parity,
            result.n_support(),
            result.training_accuracy
        );
        Ok(result)
    }
}

/// Class labels from polarity signs: positive values are `+1.0`, zero and
/// negative values `-1.0`. NaN stays NaN so the trainer can reject it.
pub fn sign_labels(labels: &[f64]) -> Vec<f64> {
    labels
        .iter()
        .map(|&v| match v {
            v if v.is_nan() => f64::NAN,
            v if v > 0.0 => 1.0,
            _ => -1.0,
        })
        .collect()
}

fn fit_vectors(
    vectors: &[Vector3],
    labels: &[f64],
    kernel: PolynomialKernel,
    trainer: &impl KernelClassifier,
) -> Result<ClassifierResult> {
    let labels = sign_labels(labels);
    let fit = trainer.fit(vectors, &labels, &kernel)?;
    Ok(ClassifierResult::from_fit(fit, kernel, vectors, &labels))
}

/// Fit the default SMO classifier with kernel `(u·v + kernel_coeff)^kernel_degree`.
///
/// `labels` are polarity signs or signed amplitudes; see [`sign_labels`].
pub fn classify(
    vectors: &[Vector3],
    labels: &[f64],
    kernel_degree: u32,
    kernel_coeff: f64,
) -> Result<ClassifierResult> {
    let kernel = PolynomialKernel {
        degree: kernel_degree,
        coeff: kernel_coeff,
    };
    fit_vectors(vectors, labels, kernel, &SmoClassifier::default())
}
