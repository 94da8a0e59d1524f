use std::path::Path;

use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::grid::Grid;
use crate::solver::diagnostics;
use crate::state::RunState;

/// Qualitative outcome of a baseline/augmented comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    AugmentedBounded,
    BothBounded,
    BothDiverged,
    AugmentedDiverged,
}

impl Verdict {
    pub fn from_flags(baseline_diverged: bool, augmented_diverged: bool) -> Self {
        match (baseline_diverged, augmented_diverged) {
            (true, false) => Self::AugmentedBounded,
            (false, false) => Self::BothBounded,
            (true, true) => Self::BothDiverged,
            (false, true) => Self::AugmentedDiverged,
        }
    }
}

/// End-of-run summary for one instance. Energies are `None` once NaN.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InstanceSummary {
    pub diverged: bool,
    pub diverged_at: Option<usize>,
    pub final_energy: Option<f64>,
    pub last_finite_energy: Option<f64>,
    pub peak_energy: Option<f64>,
    /// `final_energy / initial_energy`.
    pub energy_ratio: Option<f64>,
    pub max_speed: Option<f64>,
}

impl InstanceSummary {
    pub fn from_state(state: &RunState, initial_energy: f64) -> Self {
        let trace = state.energy();
        let final_energy = trace.last().filter(|e| e.is_finite());
        let energy_ratio = final_energy.filter(|_| initial_energy > 0.0).map(|e| e / initial_energy);
        Self {
            diverged: state.diverged(),
            diverged_at: state.diverged_at(),
            final_energy,
            last_finite_energy: trace.last_finite(),
            peak_energy: trace.peak_finite(),
            energy_ratio,
            max_speed: diagnostics::max_finite_speed(&state.field),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub resolution: usize,
    pub steps: usize,
    pub initial_energy: f64,
    pub baseline: InstanceSummary,
    pub augmented: InstanceSummary,
    pub verdict: Verdict,
}

impl ComparisonReport {
    pub fn new(grid: &Grid, initial_energy: f64, baseline: &RunState, augmented: &RunState) -> Self {
        Self {
            resolution: grid.n(),
            steps: baseline.step().max(augmented.step()),
            initial_energy,
            baseline: InstanceSummary::from_state(baseline, initial_energy),
            augmented: InstanceSummary::from_state(augmented, initial_energy),
            verdict: Verdict::from_flags(baseline.diverged(), augmented.diverged()),
        }
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> SimResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| SimError::Io { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{advection_step, ComparativeParams};
    use crate::state::VelocityField;

    #[test]
    fn test_verdict_from_flags() {
        assert_eq!(Verdict::from_flags(true, false), Verdict::AugmentedBounded);
        assert_eq!(Verdict::from_flags(false, false), Verdict::BothBounded);
        assert_eq!(Verdict::from_flags(true, true), Verdict::BothDiverged);
        assert_eq!(Verdict::from_flags(false, true), Verdict::AugmentedDiverged);
    }

    #[test]
    fn test_summary_of_diverged_instance() {
        let grid = Grid::square(-1.0, 1.0, 6).unwrap();
        let mut field = VelocityField::zeros(&grid);
        field.u[0] = 1e9;
        let params = ComparativeParams::default();
        let state = advection_step(RunState::new(field), &grid, &params, None).unwrap();
        let summary = InstanceSummary::from_state(&state, 5.0);
        assert!(summary.diverged);
        assert_eq!(summary.diverged_at, Some(0));
        assert_eq!(summary.final_energy, None);
        assert_eq!(summary.energy_ratio, None);
        assert_eq!(summary.max_speed, None);
    }

    #[test]
    fn test_json_shape() {
        let grid = Grid::square(-1.0, 1.0, 6).unwrap();
        let n = grid.len();
        let field = VelocityField::from_components(&grid, vec![1.0; n], vec![0.0; n]).unwrap();
        let state = advection_step(RunState::new(field), &grid, &ComparativeParams::default(), None).unwrap();
        let report = ComparisonReport::new(&grid, 18.0, &state, &state);
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["verdict"], "both_bounded");
        assert_eq!(value["resolution"], 6);
        assert_eq!(value["steps"], 1);
        assert_eq!(value["baseline"]["final_energy"], 18.0);
        assert_eq!(value["baseline"]["energy_ratio"], 1.0);
        assert!(value["baseline"]["diverged_at"].is_null());
    }
}
