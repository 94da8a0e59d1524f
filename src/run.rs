//! Run drivers: a single relaxation instance, and the paired baseline/augmented
//! comparison sharing one grid.

use log::{debug, info};

use crate::error::SimResult;
use crate::grid::Grid;
use crate::report::ComparisonReport;
use crate::solver::{diagnostics, ComparativeParams, FieldIntegrator, RelaxationParams, UpdateRule};
use crate::state::{RunState, VelocityField};

pub struct RelaxationRun<'g> {
    integrator: FieldIntegrator<'g>,
    state: RunState,
}

impl<'g> RelaxationRun<'g> {
    pub fn new(grid: &'g Grid, params: RelaxationParams, initial: VelocityField) -> SimResult<Self> {
        let integrator = FieldIntegrator::new(grid, UpdateRule::relaxation(params)?);
        let state = RunState::new(initial);
        integrator.check_state(&state)?;
        Ok(Self { integrator, state })
    }

    pub fn step(&mut self) {
        self.integrator.apply(&mut self.state);
    }

    pub fn run(&mut self, frames: usize) {
        info!("relaxation: {} frames on a {}x{} grid", frames, self.integrator.grid().n(), self.integrator.grid().n());
        for _ in 0..frames {
            self.step();
        }
        info!(
            "relaxation: finished at step {}, energy {:.6}",
            self.state.step(),
            self.state.energy().last().unwrap_or_else(|| diagnostics::energy(&self.state.field))
        );
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn into_state(self) -> RunState {
        self.state
    }
}

/// Baseline and augmented instances started from the same field.
pub struct ComparativeRun<'g> {
    baseline: FieldIntegrator<'g>,
    augmented: FieldIntegrator<'g>,
    baseline_state: RunState,
    augmented_state: RunState,
    initial_energy: f64,
}

impl<'g> ComparativeRun<'g> {
    pub fn new(grid: &'g Grid, params: ComparativeParams, initial: VelocityField) -> SimResult<Self> {
        let baseline = FieldIntegrator::new(grid, UpdateRule::baseline(params.clone())?);
        let augmented = FieldIntegrator::new(grid, UpdateRule::augmented(params)?);
        let initial_energy = diagnostics::energy(&initial);
        let baseline_state = RunState::new(initial.clone());
        let augmented_state = RunState::new(initial);
        baseline.check_state(&baseline_state)?;
        Ok(Self { baseline, augmented, baseline_state, augmented_state, initial_energy })
    }

    /// Advance both instances by one step. They share only the read-only grid,
    /// so they are stepped concurrently.
    pub fn step(&mut self) {
        let Self { baseline, augmented, baseline_state, augmented_state, .. } = self;
        rayon::join(|| baseline.apply(baseline_state), || augmented.apply(augmented_state));
    }

    pub fn run(&mut self, iterations: usize) {
        let n = self.baseline.grid().n();
        info!("comparison: {} iterations on a {}x{} grid, initial energy {:.6}", iterations, n, n, self.initial_energy);
        for i in 0..iterations {
            self.step();
            if (i + 1) % 100 == 0 {
                debug!(
                    "step {}: baseline E={:.6e} augmented E={:.6e}",
                    i + 1,
                    self.baseline_state.energy().last().unwrap_or(f64::NAN),
                    self.augmented_state.energy().last().unwrap_or(f64::NAN)
                );
            }
        }
        for (integrator, state) in [(&self.baseline, &self.baseline_state), (&self.augmented, &self.augmented_state)] {
            match state.diverged_at() {
                Some(at) => info!("comparison: {} diverged at step {}", integrator.rule().label(), at),
                None => info!("comparison: {} stayed bounded", integrator.rule().label()),
            }
        }
    }

    pub fn baseline(&self) -> &RunState {
        &self.baseline_state
    }

    pub fn augmented(&self) -> &RunState {
        &self.augmented_state
    }

    pub fn initial_energy(&self) -> f64 {
        self.initial_energy
    }

    pub fn grid(&self) -> &'g Grid {
        self.baseline.grid()
    }

    pub fn report(&self) -> ComparisonReport {
        ComparisonReport::new(self.grid(), self.initial_energy, &self.baseline_state, &self.augmented_state)
    }
}
