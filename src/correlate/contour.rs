//! Marching-squares level sets of a gridded radiation pattern.
//!
//! The grid is treated as a flat rectangle in (longitude, colatitude): a
//! nodal line that crosses the 0/2π seam or passes through a pole comes back
//! as separate open pieces.

use std::collections::HashMap;

use nalgebra::DMatrix;

use crate::harmonics::{HarmonicGrid, Spectrum};

/// One connected piece of a level set.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// `[longitude, colatitude]` in radians, in traversal order.
    pub vertices: Vec<[f64; 2]>,
    /// The last vertex connects back to the first.
    pub closed: bool,
}

/// Grid edge identified by its lower node: `Lon(i, j)` joins `(i, j)` and
/// `(i+1, j)`, `Colat(i, j)` joins `(i, j)` and `(i, j+1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Edge {
    Lon(usize, usize),
    Colat(usize, usize),
}

/// Cell corner offsets in counter-clockwise order.
const CORNERS: [(usize, usize); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

fn cell_edges(i: usize, j: usize) -> [Edge; 4] {
    // bottom, right, top, left
    [
        Edge::Lon(i, j),
        Edge::Colat(i + 1, j),
        Edge::Lon(i, j + 1),
        Edge::Colat(i, j),
    ]
}

/// Crossing point of `level` along `edge`.
fn crossing(edge: Edge, values: &DMatrix<f64>, xs: &[f64], ys: &[f64], level: f64) -> [f64; 2] {
    let (a, b, along_lon, i, j) = match edge {
        Edge::Lon(i, j) => (values[(i, j)], values[(i + 1, j)], true, i, j),
        Edge::Colat(i, j) => (values[(i, j)], values[(i, j + 1)], false, i, j),
    };
    let t = (level - a) / (b - a);
    if along_lon {
        [xs[i] + t * (xs[i + 1] - xs[i]), ys[j]]
    } else {
        [xs[i], ys[j] + t * (ys[j + 1] - ys[j])]
    }
}

/// Segments (as edge pairs) crossing one cell.
fn cell_segments(i: usize, j: usize, values: &DMatrix<f64>, level: f64, out: &mut Vec<[Edge; 2]>) {
    let corner = CORNERS.map(|(di, dj)| values[(i + di, j + dj)]);
    if corner.iter().any(|v| !v.is_finite()) {
        return;
    }
    let above = corner.map(|v| v > level);
    let edges = cell_edges(i, j);

    // Edge k joins corner k and corner k+1
    let crossed: Vec<usize> = (0..4).filter(|&k| above[k] != above[(k + 1) % 4]).collect();
    match crossed.len() {
        2 => out.push([edges[crossed[0]], edges[crossed[1]]]),
        4 => {
            // Saddle: corners on the other side of the centre are cut off
            let centre_above = corner.iter().sum::<f64>() / 4.0 > level;
            for k in 0..4 {
                if above[k] != centre_above {
                    out.push([edges[(k + 3) % 4], edges[k]]);
                }
            }
        }
        _ => {}
    }
}

/// Level-`level` contours of `values`, sampled at `xs` (rows) × `ys` (columns).
pub fn marching_squares(values: &DMatrix<f64>, xs: &[f64], ys: &[f64], level: f64) -> Vec<Contour> {
    let nx = values.nrows().min(xs.len());
    let ny = values.ncols().min(ys.len());
    if nx < 2 || ny < 2 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for i in 0..nx - 1 {
        for j in 0..ny - 1 {
            cell_segments(i, j, values, level, &mut segments);
        }
    }

    // Edge -> segments touching it (at most two)
    let mut touching: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (s, seg) in segments.iter().enumerate() {
        for &e in seg {
            touching.entry(e).or_default().push(s);
        }
    }

    let mut used = vec![false; segments.len()];
    let next_from = |edge: Edge, used: &mut Vec<bool>| -> Option<Edge> {
        let s = *touching.get(&edge)?.iter().find(|&&s| !used[s])?;
        used[s] = true;
        let [a, b] = segments[s];
        Some(if a == edge { b } else { a })
    };

    let mut contours = Vec::new();
    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let [head, tail] = segments[start];

        let mut chain = vec![head, tail];
        let mut current = tail;
        while let Some(e) = next_from(current, &mut used) {
            chain.push(e);
            current = e;
        }

        let closed = chain.len() > 3 && chain.first() == chain.last();
        if closed {
            chain.pop();
        } else {
            let mut back = Vec::new();
            let mut current = head;
            while let Some(e) = next_from(current, &mut used) {
                back.push(e);
                current = e;
            }
            back.reverse();
            back.extend(chain);
            chain = back;
        }

        contours.push(Contour {
            vertices: chain
                .into_iter()
                .map(|e| crossing(e, values, xs, ys, level))
                .collect(),
            closed,
        });
    }
    contours
}

/// Zero-level nodal lines of `spectrum` rasterised on `grid`.
pub fn contour(spectrum: &Spectrum, grid: &HarmonicGrid) -> Vec<Contour> {
    grid.rasterize(spectrum).zero_contours()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn axis(n: usize) -> Vec<f64> {
        (0..n).map(|k| k as f64).collect()
    }

    #[test]
    fn test_no_crossing() {
        let values = DMatrix::from_element(4, 4, 1.0);
        assert!(marching_squares(&values, &axis(4), &axis(4), 0.0).is_empty());
    }

    #[test]
    fn test_closed_loop_around_peak() {
        let mut values = DMatrix::from_element(5, 5, -1.0);
        values[(2, 2)] = 1.0;
        let contours = marching_squares(&values, &axis(5), &axis(5), 0.0);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert!(c.closed);
        assert_eq!(c.vertices.len(), 4);
        for v in &c.vertices {
            let d = (v[0] - 2.0).abs() + (v[1] - 2.0).abs();
            assert_abs_diff_eq!(d, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_open_line() {
        let values = DMatrix::from_fn(4, 3, |i, _| i as f64 - 1.5);
        let contours = marching_squares(&values, &axis(4), &axis(3), 0.0);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert!(!c.closed);
        assert_eq!(c.vertices.len(), 3);
        assert!(c.vertices.iter().all(|v| (v[0] - 1.5).abs() < 1e-12));
        // Ordered along the line
        let ys: Vec<f64> = c.vertices.iter().map(|v| v[1]).collect();
        assert!(ys == vec![0.0, 1.0, 2.0] || ys == vec![2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_saddle_splits_into_two() {
        for centre in [1.0, -1.0] {
            let mut values = DMatrix::from_row_slice(2, 2, &[1.0, -1.0, -1.0, 1.0]);
            // Nudge the centre mean across the level without changing corner signs
            values[(0, 0)] += 0.5 * centre;
            let contours = marching_squares(&values, &axis(2), &axis(2), 0.0);
            assert_eq!(contours.len(), 2);
            assert!(contours.iter().all(|c| c.vertices.len() == 2 && !c.closed));
        }
    }
}
