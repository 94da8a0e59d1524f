use crate::error::{SimError, SimResult};

/// Smallest resolution the central-difference stencil supports.
pub const MIN_RESOLUTION: usize = 3;

/// Row-major index: `i` walks x (columns), `j` walks y (rows).
#[inline(always)]
pub const fn idx(i: usize, j: usize, n: usize) -> usize {
    j * n + i
}

/// Sample spacing handed to the finite-difference operators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spacing {
    pub dx: f64,
    pub dy: f64,
}

impl Spacing {
    /// Unit spacing: derivatives per cell rather than per unit length.
    pub const LATTICE: Spacing = Spacing { dx: 1.0, dy: 1.0 };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Immutable `n x n` coordinate lattice over a rectangular domain.
///
/// `x()` and `y()` hold the meshgrid coordinates: `x()[idx(i, j, n)] == xs()[i]`
/// and `y()[idx(i, j, n)] == ys()[j]`.
#[derive(Clone, Debug)]
pub struct Grid {
    bounds: Bounds,
    n: usize,
    xs: Vec<f64>,
    ys: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Grid {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64, n: usize) -> SimResult<Self> {
        if n < MIN_RESOLUTION {
            return Err(SimError::invalid(
                "n",
                format!("central differences need at least {MIN_RESOLUTION} points per axis, got {n}"),
            ));
        }
        check_axis("x_range", x_min, x_max)?;
        check_axis("y_range", y_min, y_max)?;

        let xs = linspace(x_min, x_max, n);
        let ys = linspace(y_min, y_max, n);
        let mut x = Vec::with_capacity(n * n);
        let mut y = Vec::with_capacity(n * n);
        for &yj in &ys {
            for &xi in &xs {
                x.push(xi);
                y.push(yj);
            }
        }

        Ok(Self {
            bounds: Bounds { x_min, x_max, y_min, y_max },
            n,
            xs,
            ys,
            x,
            y,
        })
    }

    /// Square domain `[lo, hi]^2`.
    pub fn square(lo: f64, hi: f64, n: usize) -> SimResult<Self> {
        Self::new(lo, hi, lo, hi, n)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of cells (`n * n`).
    pub fn len(&self) -> usize {
        self.n * self.n
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Physical distance between neighbouring samples.
    pub fn spacing(&self) -> Spacing {
        let steps = (self.n - 1) as f64;
        Spacing {
            dx: (self.bounds.x_max - self.bounds.x_min) / steps,
            dy: (self.bounds.y_max - self.bounds.y_min) / steps,
        }
    }

    /// Distance from the origin per cell, offset by `epsilon` so it never hits zero.
    pub fn radius(&self, epsilon: f64) -> Vec<f64> {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(&x, &y)| (x * x + y * y).sqrt() + epsilon)
            .collect()
    }
}

fn check_axis(field: &'static str, lo: f64, hi: f64) -> SimResult<()> {
    if !lo.is_finite() || !hi.is_finite() {
        return Err(SimError::invalid(field, format!("bounds must be finite, got [{lo}, {hi}]")));
    }
    if hi <= lo {
        return Err(SimError::invalid(field, format!("bounds must be increasing, got [{lo}, {hi}]")));
    }
    Ok(())
}

/// `n` evenly spaced samples from `start` to `stop`, endpoint pinned exactly.
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = (stop - start) / (n - 1) as f64;
    let mut out: Vec<f64> = (0..n).map(|i| i as f64 * step + start).collect();
    out[n - 1] = stop;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_small_resolution() {
        assert!(Grid::square(-1.0, 1.0, 2).is_err());
        assert!(Grid::square(-1.0, 1.0, 0).is_err());
        assert!(Grid::square(-1.0, 1.0, 3).is_ok());
    }

    #[test]
    fn test_rejects_non_increasing_bounds() {
        assert!(Grid::new(1.0, 1.0, -1.0, 1.0, 10).is_err());
        assert!(Grid::new(-1.0, 1.0, 2.0, -2.0, 10).is_err());
        assert!(Grid::new(f64::NAN, 1.0, -1.0, 1.0, 10).is_err());
    }

    #[test]
    fn test_linspace_endpoints() {
        let grid = Grid::new(-4.0, 4.0, 0.0, 1.0, 100).unwrap();
        assert_eq!(grid.xs()[0], -4.0);
        assert_eq!(grid.xs()[99], 4.0);
        assert_eq!(grid.ys()[0], 0.0);
        assert_eq!(grid.ys()[99], 1.0);
        let sp = grid.spacing();
        assert!((sp.dx - 8.0 / 99.0).abs() < 1e-15);
        assert!((sp.dy - 1.0 / 99.0).abs() < 1e-15);
    }

    #[test]
    fn test_meshgrid_layout() {
        let grid = Grid::square(-2.0, 2.0, 5).unwrap();
        let n = grid.n();
        assert_eq!(grid.x().len(), n * n);
        for j in 0..n {
            for i in 0..n {
                assert_eq!(grid.x()[idx(i, j, n)], grid.xs()[i]);
                assert_eq!(grid.y()[idx(i, j, n)], grid.ys()[j]);
            }
        }
    }

    #[test]
    fn test_radius_offset() {
        let grid = Grid::square(-1.0, 1.0, 3).unwrap();
        let r = grid.radius(0.1);
        // Centre cell sits on the origin
        assert!((r[idx(1, 1, 3)] - 0.1).abs() < 1e-15);
        assert!((r[idx(2, 2, 3)] - (2.0_f64.sqrt() + 0.1)).abs() < 1e-12);
    }
}
