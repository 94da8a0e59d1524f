pub mod diagnostics;
mod force;
pub mod operators;
mod params;

// Re-export public API
pub use force::{AttractorForce, ForceModel, RegularizedForce};
pub use params::{ComparativeParams, RelaxationParams, BLOWUP_THRESHOLD};

use log::warn;

use crate::error::{SimError, SimResult};
use crate::grid::{Grid, Spacing};
use crate::state::RunState;
use operators::{gradient, laplacian_from_gradient};

/// Update rule applied by [`FieldIntegrator::step`].
#[derive(Clone, Debug)]
pub enum UpdateRule {
    /// Viscous decay, then exponential approach to the attractor target.
    Relaxation { params: RelaxationParams, attractor: AttractorForce },
    /// Advection-diffusion with no extra forcing.
    Baseline { params: ComparativeParams },
    /// Advection-diffusion plus the speed-regularized forcing.
    Augmented { params: ComparativeParams, forcing: RegularizedForce },
}

impl UpdateRule {
    pub fn relaxation(params: RelaxationParams) -> SimResult<Self> {
        params.validate()?;
        Ok(Self::Relaxation { params, attractor: AttractorForce::default() })
    }

    pub fn baseline(params: ComparativeParams) -> SimResult<Self> {
        params.validate()?;
        Ok(Self::Baseline { params })
    }

    pub fn augmented(params: ComparativeParams) -> SimResult<Self> {
        params.validate()?;
        let forcing = RegularizedForce::new(params.speed_limit)?;
        Ok(Self::Augmented { params, forcing })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Relaxation { .. } => "relaxation",
            Self::Baseline { .. } => "baseline",
            Self::Augmented { .. } => "augmented",
        }
    }
}

/// Advances a [`RunState`] one step at a time over a shared, read-only grid.
#[derive(Clone, Debug)]
pub struct FieldIntegrator<'g> {
    grid: &'g Grid,
    rule: UpdateRule,
}

impl<'g> FieldIntegrator<'g> {
    pub fn new(grid: &'g Grid, rule: UpdateRule) -> Self {
        Self { grid, rule }
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    pub fn rule(&self) -> &UpdateRule {
        &self.rule
    }

    /// Shape-check `state` against the grid.
    pub fn check_state(&self, state: &RunState) -> SimResult<()> {
        check_field(state, self.grid)
    }

    /// Advance `state` by one step. Fails with `InvalidConfig` if the field
    /// does not match the integrator's grid.
    pub fn step(&self, mut state: RunState) -> SimResult<RunState> {
        self.advance(&mut state)?;
        Ok(state)
    }

    /// In-place form of [`FieldIntegrator::step`].
    pub fn advance(&self, state: &mut RunState) -> SimResult<()> {
        self.check_state(state)?;
        self.apply(state);
        Ok(())
    }

    /// Step without the shape check, for drivers that validated the state up
    /// front and never hand out mutable access to it.
    pub(crate) fn apply(&self, state: &mut RunState) {
        match &self.rule {
            UpdateRule::Relaxation { params, attractor } => relax(state, self.grid, params, attractor),
            UpdateRule::Baseline { params } => advect(state, self.grid, params, None),
            UpdateRule::Augmented { params, forcing } => advect(state, self.grid, params, Some(forcing)),
        }
    }
}

fn check_field(state: &RunState, grid: &Grid) -> SimResult<()> {
    let field = &state.field;
    if field.shape() != grid.shape() || field.u.len() != grid.len() || field.v.len() != grid.len() {
        return Err(SimError::invalid(
            "field",
            format!(
                "{:?} field with u={} v={} cells does not match {:?} grid",
                field.shape(),
                field.u.len(),
                field.v.len(),
                grid.shape()
            ),
        ));
    }
    Ok(())
}

/// One relaxation step: `w *= 1 - visc*dt`, then `w += (target - w) * k`.
/// No blow-up detection; the update is a contraction toward a fixed target.
pub fn relaxation_step(
    mut state: RunState,
    grid: &Grid,
    params: &RelaxationParams,
    attractor: &AttractorForce,
) -> SimResult<RunState> {
    check_field(&state, grid)?;
    relax(&mut state, grid, params, attractor);
    Ok(state)
}

fn relax(state: &mut RunState, grid: &Grid, params: &RelaxationParams, attractor: &AttractorForce) {
    let decay = params.decay();
    let k = params.implosion_factor;

    let field = &mut state.field;
    field.u.iter_mut().for_each(|u| *u *= decay);
    field.v.iter_mut().for_each(|v| *v *= decay);

    let (target_u, target_v) = attractor.force(grid, field);
    for (u, t) in field.u.iter_mut().zip(&target_u) {
        *u += (t - *u) * k;
    }
    for (v, t) in field.v.iter_mut().zip(&target_v) {
        *v += (t - *v) * k;
    }

    let e = diagnostics::energy(&state.field);
    state.finish_step(e);
}

/// One explicit advection-diffusion step, optionally with regularized forcing.
///
/// The update carries two known asymmetries that must be kept:
/// - derivatives are taken in lattice units, and the advecting velocity is
///   paired with the transposed axis (`u` with d/dy, `v` with d/dx);
/// - `u` is updated in place first, and the `v` update then reads the new `u`
///   while still using derivatives of the pre-step field.
///
/// With a symmetric explicit scheme the vortex baseline no longer blows up
/// within 1000 steps.
///
/// A diverged state is left untouched apart from recording its (NaN) energy.
pub fn advection_step(
    mut state: RunState,
    grid: &Grid,
    params: &ComparativeParams,
    forcing: Option<&RegularizedForce>,
) -> SimResult<RunState> {
    check_field(&state, grid)?;
    advect(&mut state, grid, params, forcing);
    Ok(state)
}

fn advect(state: &mut RunState, grid: &Grid, params: &ComparativeParams, forcing: Option<&RegularizedForce>) {
    if !state.diverged() {
        if blown_up(&state.field.u) {
            warn!(
                "field blew up at step {} (max |u| > {:e}); saturating to NaN",
                state.step(),
                BLOWUP_THRESHOLD
            );
            state.mark_diverged();
        } else {
            integrate(state, grid, params, forcing);
        }
    }

    let e = diagnostics::energy(&state.field);
    state.finish_step(e);
}

fn blown_up(u: &[f64]) -> bool {
    u.iter().any(|x| x.is_nan() || x.abs() > BLOWUP_THRESHOLD)
}

fn integrate(state: &mut RunState, grid: &Grid, params: &ComparativeParams, forcing: Option<&RegularizedForce>) {
    let n = grid.n();
    let lattice = Spacing::LATTICE;
    let (dt, visc) = (params.dt, params.viscosity);

    let (du_dcol, du_drow) = gradient(&state.field.u, n, lattice);
    let (dv_dcol, dv_drow) = gradient(&state.field.v, n, lattice);
    let lap_u = laplacian_from_gradient(&du_dcol, &du_drow, n, lattice);
    let lap_v = laplacian_from_gradient(&dv_dcol, &dv_drow, n, lattice);
    let corrective = forcing.map(|f| f.force(grid, &state.field));

    let field = &mut state.field;
    for k in 0..field.u.len() {
        let (u, v) = (field.u[k], field.v[k]);
        let mut rhs = -u * du_drow[k] - v * du_dcol[k] + visc * lap_u[k];
        if let Some((cu, _)) = &corrective {
            rhs += cu[k];
        }
        field.u[k] += rhs * dt;
    }
    // `u` now holds the updated values
    for k in 0..field.v.len() {
        let (u, v) = (field.u[k], field.v[k]);
        let mut rhs = -u * dv_drow[k] - v * dv_dcol[k] + visc * lap_v[k];
        if let Some((_, cv)) = &corrective {
            rhs += cv[k];
        }
        field.v[k] += rhs * dt;
    }
}
