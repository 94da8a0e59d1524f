use crate::grid::Grid;
use crate::state::VelocityField;

use super::operators;

/// Total kinetic energy `sum(0.5 * (u^2 + v^2))`. A single NaN cell makes it NaN.
pub fn energy(field: &VelocityField) -> f64 {
    field.u.iter().zip(&field.v).map(|(u, v)| 0.5 * (u * u + v * v)).sum()
}

/// Vorticity `dv/dx - du/dy` at the grid's physical spacing.
pub fn curl(field: &VelocityField, grid: &Grid) -> Vec<f64> {
    operators::curl(&field.u, &field.v, grid.n(), grid.spacing())
}

/// `du/dx + dv/dy` at the grid's physical spacing.
pub fn divergence(field: &VelocityField, grid: &Grid) -> Vec<f64> {
    operators::divergence(&field.u, &field.v, grid.n(), grid.spacing())
}

/// Per-cell speed `sqrt(u^2 + v^2)`.
pub fn speed(field: &VelocityField) -> Vec<f64> {
    field.u.iter().zip(&field.v).map(|(u, v)| (u * u + v * v).sqrt()).collect()
}

/// `max |u|`, NaN if any cell of `u` is NaN.
pub fn max_abs_u(field: &VelocityField) -> f64 {
    field.u.iter().fold(0.0_f64, |acc, &u| if acc.is_nan() || u.is_nan() { f64::NAN } else { acc.max(u.abs()) })
}

/// Largest finite speed, or `None` when every cell is NaN.
pub fn max_finite_speed(field: &VelocityField) -> Option<f64> {
    speed(field).into_iter().filter(|s| s.is_finite()).reduce(f64::max)
}
