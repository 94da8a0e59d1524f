//! Finite-difference operators on `n x n` row-major fields.
//!
//! Second-order central differences in the interior, first-order one-sided
//! differences on the edge rows/columns. No ghost cells, no wrapping.
//! NaN inputs flow straight through.

use crate::grid::{idx, Spacing};

/// d/dx along each row (varying `i`).
pub fn diff_x(f: &[f64], n: usize, dx: f64) -> Vec<f64> {
    debug_assert_eq!(f.len(), n * n);
    let mut out = vec![0.0; n * n];
    let two_dx = 2.0 * dx;
    for j in 0..n {
        let row = idx(0, j, n);
        out[row] = (f[row + 1] - f[row]) / dx;
        for i in 1..(n - 1) {
            out[row + i] = (f[row + i + 1] - f[row + i - 1]) / two_dx;
        }
        out[row + n - 1] = (f[row + n - 1] - f[row + n - 2]) / dx;
    }
    out
}

/// d/dy along each column (varying `j`).
pub fn diff_y(f: &[f64], n: usize, dy: f64) -> Vec<f64> {
    debug_assert_eq!(f.len(), n * n);
    let mut out = vec![0.0; n * n];
    let two_dy = 2.0 * dy;
    for i in 0..n {
        out[idx(i, 0, n)] = (f[idx(i, 1, n)] - f[idx(i, 0, n)]) / dy;
        out[idx(i, n - 1, n)] = (f[idx(i, n - 1, n)] - f[idx(i, n - 2, n)]) / dy;
    }
    for j in 1..(n - 1) {
        for i in 0..n {
            out[idx(i, j, n)] = (f[idx(i, j + 1, n)] - f[idx(i, j - 1, n)]) / two_dy;
        }
    }
    out
}

/// Returns `(df/dx, df/dy)`.
pub fn gradient(f: &[f64], n: usize, spacing: Spacing) -> (Vec<f64>, Vec<f64>) {
    (diff_x(f, n, spacing.dx), diff_y(f, n, spacing.dy))
}

/// Laplacian as the divergence of the gradient: each second partial is the
/// difference operator applied twice, which widens the interior stencil to
/// `f[k-2], f[k], f[k+2]` rather than the compact 5-point form.
pub fn laplacian(f: &[f64], n: usize, spacing: Spacing) -> Vec<f64> {
    let (fx, fy) = gradient(f, n, spacing);
    laplacian_from_gradient(&fx, &fy, n, spacing)
}

/// Second pass of [`laplacian`] for callers that already hold the gradient.
pub fn laplacian_from_gradient(fx: &[f64], fy: &[f64], n: usize, spacing: Spacing) -> Vec<f64> {
    let fxx = diff_x(fx, n, spacing.dx);
    let fyy = diff_y(fy, n, spacing.dy);
    fxx.iter().zip(&fyy).map(|(a, b)| a + b).collect()
}

/// `du/dx + dv/dy`.
pub fn divergence(u: &[f64], v: &[f64], n: usize, spacing: Spacing) -> Vec<f64> {
    let du_dx = diff_x(u, n, spacing.dx);
    let dv_dy = diff_y(v, n, spacing.dy);
    du_dx.iter().zip(&dv_dy).map(|(a, b)| a + b).collect()
}

/// `dv/dx - du/dy`.
pub fn curl(u: &[f64], v: &[f64], n: usize, spacing: Spacing) -> Vec<f64> {
    let dv_dx = diff_x(v, n, spacing.dx);
    let du_dy = diff_y(u, n, spacing.dy);
    dv_dx.iter().zip(&du_dy).map(|(a, b)| a - b).collect()
}
