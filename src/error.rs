//! Error types shared by the grid, the integrator and the config layer.
//!
//! Numerical blow-up is not represented here: a diverged run is a valid,
//! observable state (see [`crate::state::RunState::diverged`]).

use std::path::PathBuf;
use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig { field, reason: reason.into() }
    }
}

/// Reject non-finite or non-positive values.
pub(crate) fn require_positive(field: &'static str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(field, format!("must be finite and > 0, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive("dt", 0.1).is_ok());
        assert!(require_positive("dt", 0.0).is_err());
        assert!(require_positive("dt", -1.0).is_err());
        assert!(require_positive("dt", f64::NAN).is_err());
        assert!(require_positive("dt", f64::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_config_message_names_field() {
        let err = SimError::invalid("n", "must be at least 3");
        assert_eq!(err.to_string(), "invalid configuration for `n`: must be at least 3");
    }
}
