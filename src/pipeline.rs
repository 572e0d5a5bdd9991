//! Per-event inversion: polarities → classifier → spectrum → double couple.

use std::time::Instant;

use tracing::{debug, info};

use crate::classifier::{ClassifierResult, KernelClassifier, MechanismClassifier, SmoClassifier};
use crate::correlate::{LocalOptimizer, NelderMead, ShearCorrelation, TemplateCorrelator};
use crate::error::Result;
use crate::fault::FaultPlaneSolution;
use crate::harmonics::Spectrum;
use crate::observation::ObservationSet;

/// Everything needed to invert one event.
#[derive(Debug, Clone)]
pub struct FocalMechanismConfig<C = SmoClassifier, O = NelderMead> {
    /// Kernel and antipodal parity.
    pub classifier: MechanismClassifier,
    /// Kernel machine trainer.
    pub trainer: C,
    pub correlator: TemplateCorrelator<O>,
}

impl Default for FocalMechanismConfig {
    fn default() -> Self {
        Self {
            classifier: MechanismClassifier::default(),
            trainer: SmoClassifier::default(),
            correlator: TemplateCorrelator::default(),
        }
    }
}

/// Result of inverting one event.
#[derive(Debug, Clone)]
pub struct MechanismEstimate {
    pub classifier: ClassifierResult,
    pub spectrum: Spectrum,
    pub correlation: ShearCorrelation,
    /// In-sample accuracy of the classifier on the (augmented) training set.
    pub accuracy: f64,
    /// Wall-clock time of the inversion in milliseconds.
    pub solve_time_ms: f32,
}

impl MechanismEstimate {
    /// The preferred nodal plane.
    pub fn solution(&self) -> FaultPlaneSolution {
        self.correlation.solution
    }
}

impl<C: KernelClassifier, O: LocalOptimizer> FocalMechanismConfig<C, O> {
    /// Classify, extract the spectrum and correlate against the double couple.
    pub fn invert(&self, observations: &ObservationSet) -> Result<MechanismEstimate> {
        let t0 = Instant::now();

        let classifier = self.classifier.classify(observations, &self.trainer)?;
        let accuracy = classifier.training_accuracy;
        let spectrum = classifier.spectrum()?;
        let correlation = self.correlator.correlate_shear(&spectrum)?;

        let solve_time_ms = t0.elapsed().as_secs_f32() * 1000.0;
        debug!(
            "inverted {} observations in {:.1} ms: {:?}",
            observations.len(),
            solve_time_ms,
            correlation.solution
        );

        Ok(MechanismEstimate {
            classifier,
            spectrum,
            correlation,
            accuracy,
            solve_time_ms,
        })
    }
}

/// Invert one event.
pub fn invert_event<C: KernelClassifier, O: LocalOptimizer>(
    observations: &ObservationSet,
    config: &FocalMechanismConfig<C, O>,
) -> Result<MechanismEstimate> {
    config.invert(observations)
}

/// Invert many events independently. Output order matches `events`.
///
/// With the `parallel` feature the events are spread over the rayon pool.
pub fn invert_events<C, O>(
    events: &[ObservationSet],
    config: &FocalMechanismConfig<C, O>,
) -> Vec<Result<MechanismEstimate>>
where
    C: KernelClassifier + Sync,
    O: LocalOptimizer + Sync,
{
    let t0 = Instant::now();

    #[cfg(feature = "parallel")]
    let results: Vec<_> = {
        use rayon::prelude::*;

        events.par_iter().map(|e| config.invert(e)).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = events.iter().map(|e| config.invert(e)).collect();

    let solved = results.iter().filter(|r| r.is_ok()).count();
    info!(
        "Inverted {}/{} events in {:.1} ms",
        solved,
        events.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    results
}
