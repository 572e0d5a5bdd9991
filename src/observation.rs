//! First-motion polarity observations on the focal sphere.
//!
//! Each observation is a ray leaving the source, given by its azimuth
//! (clockwise from north) and its takeoff angle measured from the upward
//! vertical, together with the sign of the first P motion. Rays are mapped to
//! unit vectors in a (north, east, up) frame:
//!
//! ```text
//! x = cos(az)·sin(takeoff),  y = sin(az)·sin(takeoff),  z = cos(takeoff)
//! ```

use std::collections::HashMap;

use crate::error::{FocalError, Result};
use crate::Vector3;

/// Sign of the first P-wave motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Up / compressional first motion (+1).
    Compression,
    /// Down / dilatational first motion (-1).
    Dilatation,
}

impl Polarity {
    /// Positive values are compressional; zero and negative are dilatational.
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            Polarity::Compression
        } else {
            Polarity::Dilatation
        }
    }

    /// `+1.0` or `-1.0`.
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Compression => 1.0,
            Polarity::Dilatation => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Polarity::Compression => Polarity::Dilatation,
            Polarity::Dilatation => Polarity::Compression,
        }
    }
}

/// One polarity reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityObservation {
    /// Azimuth in radians, [0, 2π).
    pub azimuth_rad: f64,
    /// Takeoff angle (colatitude from vertical up) in radians, [0, π].
    pub takeoff_rad: f64,
    pub polarity: Polarity,
}

impl PolarityObservation {
    pub fn new(azimuth_rad: f64, takeoff_rad: f64, polarity: Polarity) -> Self {
        Self {
            azimuth_rad,
            takeoff_rad,
            polarity,
        }
    }

    /// Unit vector of the ray in the (north, east, up) frame.
    pub fn uvec(&self) -> Vector3 {
        let (az_sin, az_cos) = self.azimuth_rad.sin_cos();
        let (to_sin, to_cos) = self.takeoff_rad.sin_cos();
        Vector3::new(az_cos * to_sin, az_sin * to_sin, to_cos)
    }
}

/// Point-symmetry imposed when augmenting a training set with antipodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    /// Antipodes carry the opposite label (-1).
    Antisymmetric,
    /// No augmentation (0).
    None,
    /// Antipodes carry the same label (+1). A double couple is symmetric.
    #[default]
    Symmetric,
}

impl Parity {
    /// Label multiplier applied to antipodes, `None` when no augmentation.
    pub fn multiplier(self) -> Option<f64> {
        match self {
            Parity::Antisymmetric => Some(-1.0),
            Parity::None => None,
            Parity::Symmetric => Some(1.0),
        }
    }
}

impl TryFrom<i32> for Parity {
    type Error = FocalError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            -1 => Ok(Parity::Antisymmetric),
            0 => Ok(Parity::None),
            1 => Ok(Parity::Symmetric),
            other => Err(FocalError::InvalidParity(other)),
        }
    }
}

/// Labelled unit vectors ready for a kernel classifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub vectors: Vec<Vector3>,
    /// `+1.0` or `-1.0` per vector.
    pub labels: Vec<f64>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Ordered polarity observations for one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    observations: Vec<PolarityObservation>,
}

impl ObservationSet {
    pub fn new(observations: Vec<PolarityObservation>) -> Self {
        Self { observations }
    }

    /// Build from `(azimuth_rad, takeoff_rad, polarity_sign)` triples.
    pub fn from_triples(triples: &[(f64, f64, f64)]) -> Self {
        triples
            .iter()
            .map(|&(az, toa, sign)| PolarityObservation::new(az, toa, Polarity::from_sign(sign)))
            .collect()
    }

    pub fn observations(&self) -> &[PolarityObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Convert to unit vectors and ±1 labels, appending antipodes when the
    /// parity asks for it.
    ///
    /// With [`Parity::None`] the output has exactly one entry per
    /// observation; otherwise the antipode of observation `k` is at
    /// `k + len()`.
    pub fn training_set(&self, parity: Parity) -> TrainingSet {
        let mut vectors: Vec<Vector3> = self.observations.iter().map(|o| o.uvec()).collect();
        let mut labels: Vec<f64> = self.observations.iter().map(|o| o.polarity.sign()).collect();

        if let Some(multiplier) = parity.multiplier() {
            let n = vectors.len();
            for k in 0..n {
                vectors.push(-vectors[k]);
                labels.push(multiplier * labels[k]);
            }
        }

        TrainingSet { vectors, labels }
    }
}

impl FromIterator<PolarityObservation> for ObservationSet {
    fn from_iter<I: IntoIterator<Item = PolarityObservation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A polarity pick tagged with the station that recorded it.
#[derive(Debug, Clone, PartialEq)]
pub struct StationPick {
    pub station: String,
    pub observation: PolarityObservation,
}

/// Epoch window `[start, end)` (seconds) during which a station's polarity
/// was wired backwards. Missing ends are unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReversalWindow {
    pub start_epoch: Option<f64>,
    pub end_epoch: Option<f64>,
}

impl ReversalWindow {
    pub fn contains(&self, epoch: f64) -> bool {
        self.start_epoch.map_or(true, |s| epoch >= s) && self.end_epoch.map_or(true, |e| epoch < e)
    }
}

/// Station → reversal windows.
#[derive(Debug, Clone, Default)]
pub struct ReversalTable {
    windows: HashMap<String, Vec<ReversalWindow>>,
}

impl ReversalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, station: impl Into<String>, window: ReversalWindow) {
        self.windows.entry(station.into()).or_default().push(window);
    }

    /// Whether `station` was reversed at `epoch`.
    pub fn is_reversed(&self, station: &str, epoch: f64) -> bool {
        self.windows
            .get(station)
            .is_some_and(|ws| ws.iter().any(|w| w.contains(epoch)))
    }

    /// Apply the table to the picks of an event that occurred at `event_epoch`.
    pub fn corrected(&self, event_epoch: f64, picks: &[StationPick]) -> ObservationSet {
        picks
            .iter()
            .map(|pick| {
                let mut obs = pick.observation;
                if self.is_reversed(&pick.station, event_epoch) {
                    obs.polarity = obs.polarity.reversed();
                }
                obs
            })
            .collect()
    }
}
