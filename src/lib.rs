//! Finite-difference integration of a 2D velocity field under competing
//! forcing terms.
//!
//! Two experiments are supported:
//! - relaxation of a (random) field toward a fixed spiral-plus-suction target;
//! - a baseline advection-diffusion update run side by side with one that adds
//!   speed-regularized forcing, tracking which of the two blows up.
//!
//! The crate produces plain arrays and scalar diagnostics; drawing them is left
//! to the caller.

pub mod config;
pub mod error;
pub mod grid;
pub mod report;
pub mod run;
pub mod solver;
pub mod state;

pub use error::{SimError, SimResult};
pub use grid::{Grid, Spacing};
pub use run::{ComparativeRun, RelaxationRun};
pub use state::{EnergyTrace, RunState, VelocityField};
