use crate::error::{require_positive, SimError, SimResult};

/// Cells with `|u|` above this are treated as blown up.
pub const BLOWUP_THRESHOLD: f64 = 1e5;

/// Parameters for the decay-and-relax update toward the attractor target.
#[derive(Clone, Debug, PartialEq)]
pub struct RelaxationParams {
    pub viscosity: f64,
    pub dt: f64,
    /// Fraction of the remaining gap to the target closed per step, in (0, 1).
    pub implosion_factor: f64,
}

impl Default for RelaxationParams {
    fn default() -> Self {
        Self { viscosity: 0.1, dt: 0.1, implosion_factor: 0.05 }
    }
}

impl RelaxationParams {
    pub fn validate(&self) -> SimResult<()> {
        require_positive("dt", self.dt)?;
        require_non_negative("viscosity", self.viscosity)?;
        let k = self.implosion_factor;
        if !(k > 0.0 && k < 1.0) {
            return Err(SimError::invalid("implosion_factor", format!("must lie in (0, 1), got {k}")));
        }
        Ok(())
    }

    /// Per-step multiplicative decay `1 - viscosity * dt`.
    pub fn decay(&self) -> f64 {
        1.0 - self.viscosity * self.dt
    }

    /// Ratio `u* / target` of the fixed point the relaxation settles on.
    /// Exactly 1 when viscosity is zero.
    pub fn fixed_point_ratio(&self) -> f64 {
        let k = self.implosion_factor;
        k / (1.0 - self.decay() * (1.0 - k))
    }
}

/// Parameters shared by the baseline and augmented advection-diffusion instances.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparativeParams {
    pub viscosity: f64,
    pub dt: f64,
    /// Speed at which the regularizing drag matches the suction term.
    pub speed_limit: f64,
}

impl Default for ComparativeParams {
    fn default() -> Self {
        Self { viscosity: 0.001, dt: 0.002, speed_limit: 20.0 }
    }
}

impl ComparativeParams {
    pub fn validate(&self) -> SimResult<()> {
        require_positive("dt", self.dt)?;
        require_non_negative("viscosity", self.viscosity)?;
        require_positive("speed_limit", self.speed_limit)?;
        Ok(())
    }
}

fn require_non_negative(field: &'static str, value: f64) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(field, format!("must be finite and >= 0, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_relaxation_params() {
        let p = RelaxationParams::default();
        assert_eq!(p.viscosity, 0.1);
        assert_eq!(p.dt, 0.1);
        assert_eq!(p.implosion_factor, 0.05);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_default_comparative_params() {
        let p = ComparativeParams::default();
        assert_eq!(p.viscosity, 0.001);
        assert_eq!(p.dt, 0.002);
        assert_eq!(p.speed_limit, 20.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_relaxation_rejects_out_of_range() {
        let bad_k = RelaxationParams { implosion_factor: 1.0, ..Default::default() };
        assert!(bad_k.validate().is_err());
        let zero_k = RelaxationParams { implosion_factor: 0.0, ..Default::default() };
        assert!(zero_k.validate().is_err());
        let bad_dt = RelaxationParams { dt: 0.0, ..Default::default() };
        assert!(bad_dt.validate().is_err());
        let bad_visc = RelaxationParams { viscosity: -0.1, ..Default::default() };
        assert!(bad_visc.validate().is_err());
    }

    #[test]
    fn test_comparative_rejects_out_of_range() {
        let bad_dt = ComparativeParams { dt: -0.002, ..Default::default() };
        assert!(bad_dt.validate().is_err());
        let bad_limit = ComparativeParams { speed_limit: 0.0, ..Default::default() };
        assert!(bad_limit.validate().is_err());
        let inviscid = ComparativeParams { viscosity: 0.0, ..Default::default() };
        assert!(inviscid.validate().is_ok());
    }

    #[test]
    fn test_fixed_point_ratio() {
        let inviscid = RelaxationParams { viscosity: 0.0, ..Default::default() };
        assert!((inviscid.fixed_point_ratio() - 1.0).abs() < 1e-15);
        // 0.05 / (1 - 0.99 * 0.95) = 0.05 / 0.0595
        let p = RelaxationParams::default();
        assert!((p.fixed_point_ratio() - 0.05 / 0.0595).abs() < 1e-12);
    }
}
