//! Regular longitude × colatitude grid of tabulated harmonics.
//!
//! A [`HarmonicGrid`] evaluates all nine basis functions (`l ≤ 2`) at every
//! node once, so any [`Spectrum`] can be rasterised with a single
//! vector-matrix product.

use nalgebra::{DMatrix, DVector};

use super::{harmonics_at, Spectrum, NUM_COEFFS};
use crate::correlate::contour::{marching_squares, Contour};
use crate::error::{FocalError, Result};
use crate::Complex;

/// Harmonic template evaluated on a regular grid.
///
/// Longitudes span `[0, 2π]` and colatitudes `[0, π]`, both endpoints
/// included. Node `(i, j)` (longitude `i`, colatitude `j`) is column
/// `i * n_colatitude + j` of the template.
#[derive(Debug, Clone)]
pub struct HarmonicGrid {
    n_longitude: usize,
    n_colatitude: usize,
    longitude_axis: Vec<f64>,
    colatitude_axis: Vec<f64>,
    /// 9 × N, rows in [`super::DEGREE_ORDER`].
    template: DMatrix<Complex>,
}

/// Evenly spaced samples over `[start, stop]`, both included.
pub(crate) fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = (stop - start) / (n - 1) as f64;
    (0..n).map(|k| start + step * k as f64).collect()
}

impl HarmonicGrid {
    /// Build the grid for a `(n_longitude, n_colatitude)` resolution.
    pub fn new(n_longitude: usize, n_colatitude: usize) -> Result<Self> {
        if n_longitude < 2 || n_colatitude < 2 {
            return Err(FocalError::InvalidResolution {
                n_longitude,
                n_colatitude,
            });
        }
        let longitude_axis = linspace(0.0, 2.0 * std::f64::consts::PI, n_longitude);
        let colatitude_axis = linspace(0.0, std::f64::consts::PI, n_colatitude);

        let n = n_longitude * n_colatitude;
        let mut template = DMatrix::<Complex>::zeros(NUM_COEFFS, n);
        for (i, &phi) in longitude_axis.iter().enumerate() {
            for (j, &theta) in colatitude_axis.iter().enumerate() {
                let node = i * n_colatitude + j;
                for (row, y) in harmonics_at(phi, theta).into_iter().enumerate() {
                    template[(row, node)] = y;
                }
            }
        }

        Ok(Self {
            n_longitude,
            n_colatitude,
            longitude_axis,
            colatitude_axis,
            template,
        })
    }

    /// `(n_longitude, n_colatitude)`.
    pub fn resolution(&self) -> (usize, usize) {
        (self.n_longitude, self.n_colatitude)
    }

    pub fn longitude_axis(&self) -> &[f64] {
        &self.longitude_axis
    }

    pub fn colatitude_axis(&self) -> &[f64] {
        &self.colatitude_axis
    }

    /// Longitude of every node, in template column order.
    pub fn longitudes(&self) -> Vec<f64> {
        self.longitude_axis
            .iter()
            .flat_map(|&phi| std::iter::repeat(phi).take(self.n_colatitude))
            .collect()
    }

    /// Colatitude of every node, in template column order.
    pub fn colatitudes(&self) -> Vec<f64> {
        (0..self.n_longitude)
            .flat_map(|_| self.colatitude_axis.iter().copied())
            .collect()
    }

    /// The 9 × N harmonic template.
    pub fn template(&self) -> &DMatrix<Complex> {
        &self.template
    }

    /// Rasterise a spectrum: real part of `coeffs · template`, reshaped to
    /// (longitude, colatitude).
    pub fn rasterize(&self, spectrum: &Spectrum) -> RadiationPattern {
        let coeffs = DVector::from_row_slice(spectrum.coeffs());
        let flat = self.template.tr_mul(&coeffs);
        let values = DMatrix::from_fn(self.n_longitude, self.n_colatitude, |i, j| {
            flat[i * self.n_colatitude + j].re
        });
        RadiationPattern {
            longitude_axis: self.longitude_axis.clone(),
            colatitude_axis: self.colatitude_axis.clone(),
            values,
        }
    }
}

/// A spectrum sampled on a [`HarmonicGrid`].
#[derive(Debug, Clone)]
pub struct RadiationPattern {
    pub longitude_axis: Vec<f64>,
    pub colatitude_axis: Vec<f64>,
    /// `values[(i, j)]` at longitude `i`, colatitude `j`.
    pub values: DMatrix<f64>,
}

impl RadiationPattern {
    /// 1 where the pattern is compressional (positive), 0 elsewhere.
    pub fn polarity_mask(&self) -> DMatrix<u8> {
        self.values.map(|v| u8::from(v > 0.0))
    }

    /// Zero-level contours (nodal lines) of the pattern.
    pub fn zero_contours(&self) -> Vec<Contour> {
        marching_squares(
            &self.values,
            &self.longitude_axis,
            &self.colatitude_axis,
            0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_grid_layout() {
        let grid = HarmonicGrid::new(5, 3).unwrap();
        assert_eq!(grid.template().shape(), (9, 15));
        let lon = grid.longitudes();
        let colat = grid.colatitudes();
        assert_eq!(lon.len(), 15);
        assert_abs_diff_eq!(lon[0], 0.0);
        assert_abs_diff_eq!(lon[14], 2.0 * std::f64::consts::PI, epsilon = 1e-12);
        // Colatitude varies fastest
        assert_abs_diff_eq!(colat[1], std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(lon[1], 0.0);
    }

    #[test]
    fn test_rasterize_matches_pointwise_evaluation() {
        let grid = HarmonicGrid::new(12, 7).unwrap();
        let mut coeffs = [Complex::new(0.0, 0.0); NUM_COEFFS];
        coeffs[0] = Complex::new(0.2, 0.0);
        coeffs[5] = Complex::new(0.0, -0.6);
        coeffs[7] = Complex::new(0.0, -0.6);
        coeffs[2] = Complex::new(0.3, 0.0);
        let spectrum = Spectrum::from_coeffs(coeffs, 2).unwrap();
        let pattern = grid.rasterize(&spectrum);
        for i in 0..12 {
            for j in 0..7 {
                let expected =
                    spectrum.evaluate(grid.longitude_axis()[i], grid.colatitude_axis()[j]);
                assert_abs_diff_eq!(pattern.values[(i, j)], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_invalid_resolution() {
        assert!(HarmonicGrid::new(1, 10).is_err());
    }

    #[test]
    fn test_polarity_mask() {
        let grid = HarmonicGrid::new(4, 4).unwrap();
        let mut coeffs = [Complex::new(0.0, 0.0); NUM_COEFFS];
        coeffs[0] = Complex::new(1.0, 0.0);
        let pattern = grid.rasterize(&Spectrum::from_coeffs(coeffs, 2).unwrap());
        assert!(pattern.polarity_mask().iter().all(|&b| b == 1));
    }
}
