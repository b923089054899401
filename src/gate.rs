//! Magnitude gate
//!
//! Second pipeline stage: soft-thresholds the filtered vector by its
//! magnitude. Below the hard threshold the signal is assumed pure noise and
//! fully suppressed; above the soft threshold it passes unattenuated; the
//! linear ramp between the two avoids a discontinuous cursor jump.
//!
//! The gate is stateless and memoryless; hysteresis belongs solely to the
//! motion classifier.

use crate::types::Vec3;

/// Result of gating one filtered vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateOutput {
    /// Component-wise attenuated vector: `filtered * ratio`.
    pub vector: Vec3,
    /// Attenuation in [0, 1]; 0 below the hard threshold, 1 at or above
    /// the soft threshold.
    pub ratio: f32,
    /// Euclidean magnitude of the (pre-gate) filtered vector.
    pub magnitude: f32,
}

/// Soft-thresholding gate over filtered acceleration magnitude.
#[derive(Debug, Clone)]
pub struct MagnitudeGate {
    hard_threshold: f32,
    soft_threshold: f32,
}

impl MagnitudeGate {
    /// Thresholds must already be validated: `hard < soft`.
    pub fn new(hard_threshold: f32, soft_threshold: f32) -> Self {
        Self {
            hard_threshold,
            soft_threshold,
        }
    }

    /// Gate one filtered vector.
    pub fn gate(&self, filtered: Vec3) -> GateOutput {
        let magnitude = filtered.norm();
        let ratio = ((magnitude - self.hard_threshold)
            / (self.soft_threshold - self.hard_threshold))
            .clamp(0.0, 1.0);

        GateOutput {
            vector: filtered * ratio,
            ratio,
            magnitude,
        }
    }
}
