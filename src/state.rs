use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{SimError, SimResult};
use crate::grid::Grid;

/// Amplitude of the high-energy vortex used by the comparative experiment.
pub const VORTEX_AMPLITUDE: f64 = 8.0;
/// Radius offset of the vortex initial condition.
const VORTEX_EPSILON: f64 = 0.1;

/// Velocity components `(u, v)`, row-major, same shape as the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityField {
    n: usize,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

impl VelocityField {
    pub fn zeros(grid: &Grid) -> Self {
        Self { n: grid.n(), u: vec![0.0; grid.len()], v: vec![0.0; grid.len()] }
    }

    pub fn from_components(grid: &Grid, u: Vec<f64>, v: Vec<f64>) -> SimResult<Self> {
        if u.len() != grid.len() || v.len() != grid.len() {
            return Err(SimError::invalid(
                "field",
                format!(
                    "components must have {} cells to match a {n}x{n} grid, got u={} v={}",
                    grid.len(),
                    u.len(),
                    v.len(),
                    n = grid.n()
                ),
            ));
        }
        Ok(Self { n: grid.n(), u, v })
    }

    /// Uniform noise in `[-1, 1)`; `u` is drawn in full before `v`.
    pub fn random_uniform(grid: &Grid, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let u = (0..grid.len()).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let v = (0..grid.len()).map(|_| rng.gen_range(-1.0..1.0)).collect();
        Self { n: grid.n(), u, v }
    }

    /// Counter-clockwise vortex concentrated near the origin:
    /// `u = -y/r * exp(-r^2) * A`, `v = x/r * exp(-r^2) * A`.
    pub fn vortex(grid: &Grid, amplitude: f64) -> Self {
        let r = grid.radius(VORTEX_EPSILON);
        let mut u = Vec::with_capacity(grid.len());
        let mut v = Vec::with_capacity(grid.len());
        for ((&x, &y), &r) in grid.x().iter().zip(grid.y()).zip(&r) {
            let envelope = (-(r * r)).exp();
            u.push(-y / r * envelope * amplitude);
            v.push(x / r * envelope * amplitude);
        }
        Self { n: grid.n(), u, v }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    pub fn len(&self) -> usize {
        self.u.len()
    }

    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }

    /// Saturate every cell of both components to NaN.
    pub fn fill_nan(&mut self) {
        self.u.fill(f64::NAN);
        self.v.fill(f64::NAN);
    }
}

/// Append-only per-step energy record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnergyTrace(Vec<f64>);

impl EnergyTrace {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, energy: f64) {
        self.0.push(energy);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    /// Largest finite value recorded, if any.
    pub fn peak_finite(&self) -> Option<f64> {
        self.0.iter().copied().filter(|e| e.is_finite()).reduce(f64::max)
    }

    /// Last finite value recorded, if any.
    pub fn last_finite(&self) -> Option<f64> {
        self.0.iter().rev().copied().find(|e| e.is_finite())
    }
}

/// One integration instance: the field, how far it has run and whether it blew up.
#[derive(Clone, Debug)]
pub struct RunState {
    pub field: VelocityField,
    step: usize,
    diverged: bool,
    diverged_at: Option<usize>,
    energy: EnergyTrace,
}

impl RunState {
    pub fn new(field: VelocityField) -> Self {
        Self { field, step: 0, diverged: false, diverged_at: None, energy: EnergyTrace::new() }
    }

    /// Number of steps executed so far.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn diverged(&self) -> bool {
        self.diverged
    }

    /// Step index at which divergence was first flagged.
    pub fn diverged_at(&self) -> Option<usize> {
        self.diverged_at
    }

    pub fn energy(&self) -> &EnergyTrace {
        &self.energy
    }

    /// Saturate the field and latch the divergence flag. Idempotent.
    pub(crate) fn mark_diverged(&mut self) {
        if !self.diverged {
            self.field.fill_nan();
            self.diverged = true;
            self.diverged_at = Some(self.step);
        }
    }

    /// Close out a step: advance the counter and record the energy.
    pub(crate) fn finish_step(&mut self, energy: f64) {
        self.step += 1;
        self.energy.push(energy);
    }
}
