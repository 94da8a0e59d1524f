use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::grid::Grid;
use crate::solver::{ComparativeParams, RelaxationParams};

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub relaxation: RelaxationConfig,
    pub comparative: ComparativeConfig,
}

/// Grid overrides for one section. Unset fields take that section's default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub n: Option<usize>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelaxationConfig {
    pub grid: GridConfig,
    pub viscosity: f64,
    pub dt: f64,
    pub implosion_factor: f64,
    pub frames: usize,
    pub seed: u64,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComparativeConfig {
    pub grid: GridConfig,
    pub viscosity: f64,
    pub dt: f64,
    pub speed_limit: f64,
    pub iterations: usize,
    pub amplitude: f64,
}

impl GridConfig {
    /// Build the grid, filling unset fields from the square `[lo, hi]^2` with `n` points.
    pub fn build_or(&self, lo: f64, hi: f64, n: usize) -> SimResult<Grid> {
        Grid::new(
            self.x_min.unwrap_or(lo),
            self.x_max.unwrap_or(hi),
            self.y_min.unwrap_or(lo),
            self.y_max.unwrap_or(hi),
            self.n.unwrap_or(n),
        )
    }
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        let params = RelaxationParams::default();
        Self {
            grid: GridConfig::default(),
            viscosity: params.viscosity,
            dt: params.dt,
            implosion_factor: params.implosion_factor,
            frames: 100,
            seed: 0,
        }
    }
}

impl Default for ComparativeConfig {
    fn default() -> Self {
        let params = ComparativeParams::default();
        Self {
            grid: GridConfig::default(),
            viscosity: params.viscosity,
            dt: params.dt,
            speed_limit: params.speed_limit,
            iterations: 1000,
            amplitude: crate::state::VORTEX_AMPLITUDE,
        }
    }
}

impl RelaxationConfig {
    const GRID_BOUNDS: (f64, f64) = (-2.0, 2.0);
    const GRID_N: usize = 50;

    pub fn grid(&self) -> SimResult<Grid> {
        let (lo, hi) = Self::GRID_BOUNDS;
        self.grid.build_or(lo, hi, Self::GRID_N)
    }

    pub fn params(&self) -> SimResult<RelaxationParams> {
        let params = RelaxationParams {
            viscosity: self.viscosity,
            dt: self.dt,
            implosion_factor: self.implosion_factor,
        };
        params.validate()?;
        Ok(params)
    }
}

impl ComparativeConfig {
    const GRID_BOUNDS: (f64, f64) = (-4.0, 4.0);
    const GRID_N: usize = 100;

    pub fn grid(&self) -> SimResult<Grid> {
        let (lo, hi) = Self::GRID_BOUNDS;
        self.grid.build_or(lo, hi, Self::GRID_N)
    }

    pub fn params(&self) -> SimResult<ComparativeParams> {
        let params = ComparativeParams { viscosity: self.viscosity, dt: self.dt, speed_limit: self.speed_limit };
        params.validate()?;
        Ok(params)
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> SimResult<Self> {
        if !path.exists() {
            warn!("{} not found; using defaults", path.display());
            return Ok(Self::default());
        }
        let contents =
            std::fs::read_to_string(path).map_err(|source| SimError::Io { path: path.to_path_buf(), source })?;
        let cfg = Self::from_yaml(&contents)?;
        info!("loaded configuration from {}", path.display());
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Bounds;

    fn square(lo: f64, hi: f64) -> Bounds {
        Bounds { x_min: lo, x_max: hi, y_min: lo, y_max: hi }
    }

    #[test]
    fn test_default_values() {
        let cfg = Config::default();
        let grid = cfg.relaxation.grid().unwrap();
        assert_eq!(grid.bounds(), square(-2.0, 2.0));
        assert_eq!(grid.n(), 50);
        assert_eq!(cfg.relaxation.viscosity, 0.1);
        assert_eq!(cfg.relaxation.dt, 0.1);
        assert_eq!(cfg.relaxation.implosion_factor, 0.05);
        assert_eq!(cfg.relaxation.frames, 100);
        let grid = cfg.comparative.grid().unwrap();
        assert_eq!(grid.bounds(), square(-4.0, 4.0));
        assert_eq!(grid.n(), 100);
        assert_eq!(cfg.comparative.viscosity, 0.001);
        assert_eq!(cfg.comparative.dt, 0.002);
        assert_eq!(cfg.comparative.speed_limit, 20.0);
        assert_eq!(cfg.comparative.iterations, 1000);
        assert_eq!(cfg.comparative.amplitude, 8.0);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "comparative:\n  speed_limit: 15.0\n  grid:\n    n: 64\n";
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.comparative.speed_limit, 15.0);
        assert_eq!(cfg.comparative.dt, 0.002);
        // Unspecified grid fields keep the comparative domain
        let grid = cfg.comparative.grid().unwrap();
        assert_eq!(grid.n(), 64);
        assert_eq!(grid.bounds(), square(-4.0, 4.0));
        assert_eq!(cfg.relaxation, RelaxationConfig::default());
    }

    #[test]
    fn test_partial_grid_keeps_section_defaults() {
        let yaml = "relaxation:\n  grid:\n    x_max: 3.0\ncomparative:\n  grid:\n    y_min: -1.0\n";
        let cfg = Config::from_yaml(yaml).unwrap();
        let relax = cfg.relaxation.grid().unwrap();
        assert_eq!(relax.bounds(), Bounds { x_min: -2.0, x_max: 3.0, y_min: -2.0, y_max: 2.0 });
        assert_eq!(relax.n(), 50);
        let compare = cfg.comparative.grid().unwrap();
        assert_eq!(compare.bounds(), Bounds { x_min: -4.0, x_max: 4.0, y_min: -1.0, y_max: 4.0 });
        assert_eq!(compare.n(), 100);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
relaxation:
  grid: { x_min: -1.0, x_max: 1.0, y_min: -3.0, y_max: 3.0, n: 20 }
  viscosity: 0.0
  dt: 0.05
  implosion_factor: 0.5
  frames: 10
  seed: 99
comparative:
  grid: { x_min: -4.0, x_max: 4.0, y_min: -4.0, y_max: 4.0, n: 30 }
  viscosity: 0.01
  dt: 0.001
  speed_limit: 10.0
  iterations: 50
  amplitude: 2.0
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.relaxation.seed, 99);
        assert_eq!(cfg.relaxation.frames, 10);
        assert_eq!(cfg.relaxation.grid().unwrap().shape(), (20, 20));
        assert_eq!(cfg.relaxation.params().unwrap().implosion_factor, 0.5);
        assert_eq!(cfg.comparative.iterations, 50);
        assert_eq!(cfg.comparative.amplitude, 2.0);
        assert_eq!(cfg.comparative.params().unwrap().speed_limit, 10.0);
    }

    #[test]
    fn test_invalid_values_surface_as_invalid_config() {
        let cfg = Config::from_yaml("relaxation:\n  implosion_factor: 2.0\ncomparative:\n  dt: 0.0\n").unwrap();
        assert!(matches!(cfg.relaxation.params(), Err(SimError::InvalidConfig { field: "implosion_factor", .. })));
        assert!(matches!(cfg.comparative.params(), Err(SimError::InvalidConfig { field: "dt", .. })));
        let tiny = GridConfig { n: Some(2), ..GridConfig::default() };
        assert!(matches!(tiny.build_or(-1.0, 1.0, 10), Err(SimError::InvalidConfig { field: "n", .. })));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(matches!(Config::from_yaml("comparative: [1, 2"), Err(SimError::Yaml(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let cfg = Config::load(Path::new("does-not-exist/vortexbench.yaml")).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
