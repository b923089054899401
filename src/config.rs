//! Pipeline configuration
//!
//! All tunables live in one immutable [`PipelineConfig`]; behavioral
//! variants of the estimator are configuration, not code forks. A config is
//! validated once at pipeline construction and never re-checked per sample.

use crate::error::MotionError;
use crate::motion::MOTION_HISTORY_LEN;
use serde::{Deserialize, Serialize};

/// Tunables for one pipeline instance. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Exponential smoothing constant, in (0, 1). Higher values track the
    /// raw signal faster; lower values suppress more noise.
    pub alpha: f32,
    /// Magnitudes at or below this are treated as pure noise and fully
    /// suppressed (m/s²).
    pub hard_threshold: f32,
    /// Magnitudes at or above this pass unattenuated (m/s²). Must exceed
    /// `hard_threshold`; the linear ramp between the two avoids a
    /// discontinuous cursor jump.
    pub soft_threshold: f32,
    /// Coarse pre-gate magnitude a single sample must exceed to enter
    /// `Moving` from `Still` (m/s²).
    pub motion_threshold: f32,
    /// `Moving` drops back to `Still` once more than this many of the last
    /// ten samples showed no gated motion.
    pub history_majority: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            hard_threshold: 0.15,
            soft_threshold: 0.4,
            motion_threshold: 0.45,
            history_majority: 5,
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration. Called once at pipeline construction;
    /// a misconfigured pipeline fails here, not at runtime per-sample.
    pub fn validate(&self) -> Result<(), MotionError> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(MotionError::Configuration(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }

        if !self.hard_threshold.is_finite() || self.hard_threshold < 0.0 {
            return Err(MotionError::Configuration(format!(
                "hard_threshold must be finite and non-negative, got {}",
                self.hard_threshold
            )));
        }

        if !self.soft_threshold.is_finite() || self.soft_threshold <= self.hard_threshold {
            return Err(MotionError::Configuration(format!(
                "soft_threshold ({}) must exceed hard_threshold ({})",
                self.soft_threshold, self.hard_threshold
            )));
        }

        if !self.motion_threshold.is_finite() || self.motion_threshold < 0.0 {
            return Err(MotionError::Configuration(format!(
                "motion_threshold must be finite and non-negative, got {}",
                self.motion_threshold
            )));
        }

        if self.history_majority >= MOTION_HISTORY_LEN {
            return Err(MotionError::Configuration(format!(
                "history_majority ({}) must be below the history capacity ({})",
                self.history_majority, MOTION_HISTORY_LEN
            )));
        }

        Ok(())
    }

    /// Load a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, MotionError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, MotionError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_alpha_bounds() {
        for alpha in [0.0, 1.0, -0.1, 1.5, f32::NAN] {
            let config = PipelineConfig {
                alpha,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "alpha {} accepted", alpha);
        }

        let config = PipelineConfig {
            alpha: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        // Equal thresholds are also a misconfiguration: the ramp would
        // divide by zero.
        let equal = PipelineConfig {
            hard_threshold: 0.3,
            soft_threshold: 0.3,
            ..Default::default()
        };
        assert!(equal.validate().is_err());

        let inverted = PipelineConfig {
            hard_threshold: 0.4,
            soft_threshold: 0.15,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_history_majority_bounds() {
        let config = PipelineConfig {
            history_majority: MOTION_HISTORY_LEN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            history_majority: MOTION_HISTORY_LEN - 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = PipelineConfig {
            alpha: 0.2,
            hard_threshold: 0.1,
            soft_threshold: 0.3,
            motion_threshold: 0.35,
            history_majority: 6,
        };

        let json = config.to_json().unwrap();
        let loaded = PipelineConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let json = r#"{"alpha":0.1,"hard_threshold":0.4,"soft_threshold":0.15,"motion_threshold":0.45,"history_majority":5}"#;
        assert!(PipelineConfig::from_json(json).is_err());
    }
}
