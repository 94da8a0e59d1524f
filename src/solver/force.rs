use crate::error::{require_positive, SimResult};
use crate::grid::Grid;
use crate::state::VelocityField;

/// Per-cell force (or target) field computed from the grid and current velocity.
pub trait ForceModel {
    fn force(&self, grid: &Grid, field: &VelocityField) -> (Vec<f64>, Vec<f64>);
}

/// Fixed spiral-plus-suction target. Ignores the current velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttractorForce {
    /// Radius offset keeping the unit vectors finite at the origin.
    pub epsilon: f64,
}

impl Default for AttractorForce {
    fn default() -> Self {
        Self { epsilon: 0.1 }
    }
}

impl ForceModel for AttractorForce {
    fn force(&self, grid: &Grid, _field: &VelocityField) -> (Vec<f64>, Vec<f64>) {
        let r = grid.radius(self.epsilon);
        let mut fu = Vec::with_capacity(grid.len());
        let mut fv = Vec::with_capacity(grid.len());
        for ((&x, &y), &r) in grid.x().iter().zip(grid.y()).zip(&r) {
            // Counter-clockwise tangent plus inward pull, summed not averaged
            let (tangent_u, tangent_v) = (-y / r, x / r);
            let (suction_u, suction_v) = (-x / r, -y / r);
            fu.push(tangent_u + suction_u);
            fv.push(tangent_v + suction_v);
        }
        (fu, fv)
    }
}

/// Suction scaled by local speed, minus a quartic drag that switches on near
/// `speed_limit`:
///
/// `f = 0.5 * |w| * s_hat - w * (|w| / speed_limit)^4`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegularizedForce {
    pub epsilon: f64,
    pub speed_limit: f64,
}

impl RegularizedForce {
    pub const SUCTION_GAIN: f64 = 0.5;
    pub const DRAG_EXPONENT: f64 = 4.0;

    pub fn new(speed_limit: f64) -> SimResult<Self> {
        require_positive("speed_limit", speed_limit)?;
        Ok(Self { epsilon: 0.05, speed_limit })
    }

    /// `(speed / speed_limit)^4`.
    pub fn drag_factor(&self, speed: f64) -> f64 {
        (speed / self.speed_limit).powf(Self::DRAG_EXPONENT)
    }
}

impl ForceModel for RegularizedForce {
    fn force(&self, grid: &Grid, field: &VelocityField) -> (Vec<f64>, Vec<f64>) {
        let r = grid.radius(self.epsilon);
        let mut fu = Vec::with_capacity(grid.len());
        let mut fv = Vec::with_capacity(grid.len());
        for k in 0..grid.len() {
            let (x, y, r) = (grid.x()[k], grid.y()[k], r[k]);
            let (u, v) = (field.u[k], field.v[k]);
            let speed = (u * u + v * v).sqrt();
            let drag = self.drag_factor(speed);
            let (suction_u, suction_v) = (-x / r, -y / r);
            fu.push(suction_u * Self::SUCTION_GAIN * speed - u * drag);
            fv.push(suction_v * Self::SUCTION_GAIN * speed - v * drag);
        }
        (fu, fv)
    }
}
