//! Core types for the gesture estimation pipeline
//!
//! This module defines the data that flows through each stage of the
//! pipeline: raw samples, filtered/gated vectors, motion states, and the
//! per-sample cursor update handed to the rendering layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul};
use uuid::Uuid;

/// A 3-axis vector in device coordinates (m/s² for acceleration, m/s for
/// velocity, metres for position). Serialized as a plain 3-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vec3(pub [f32; 3]);

impl Vec3 {
    pub const ZERO: Vec3 = Vec3([0.0, 0.0, 0.0]);

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3([x, y, z])
    }

    pub fn x(&self) -> f32 {
        self.0[0]
    }

    pub fn y(&self) -> f32 {
        self.0[1]
    }

    pub fn z(&self) -> f32 {
        self.0[2]
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        (self.0[0] * self.0[0] + self.0[1] * self.0[1] + self.0[2] * self.0[2]).sqrt()
    }

    /// True if every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    /// Returns a copy with NaN/Inf components clamped to zero, along with
    /// the number of components that were clamped. A poisoned component must
    /// never reach the exponential filter state.
    pub fn sanitized(&self) -> (Vec3, usize) {
        let mut out = *self;
        let mut clamped = 0;
        for c in out.0.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
                clamped += 1;
            }
        }
        (out, clamped)
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Vec3::ZERO
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
        ])
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3([self.0[0] * rhs, self.0[1] * rhs, self.0[2] * rhs])
    }
}

/// A single 3-axis acceleration reading delivered by the host sensor
/// subsystem. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Monotonic timestamp in seconds. Consecutive samples are not
    /// guaranteed periodic; elapsed time must be derived from this field.
    pub timestamp_s: f64,
    /// Linear acceleration reading (gravity already removed by the host).
    pub accel: Vec3,
}

impl Sample {
    pub fn new(timestamp_s: f64, accel: Vec3) -> Self {
        Self { timestamp_s, accel }
    }
}

/// Named delivery-rate tiers a source can be subscribed at.
///
/// Exact latency is host-controlled; only the relative ordering (Fastest
/// delivers at least as often as Game, and so on) is contractual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleRate {
    Fastest,
    Game,
    Ui,
    Normal,
}

impl SampleRate {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleRate::Fastest => "fastest",
            SampleRate::Game => "game",
            SampleRate::Ui => "ui",
            SampleRate::Normal => "normal",
        }
    }

    /// Nominal delivery period hint in milliseconds (0 = as fast as the
    /// host can deliver). Sources may ignore this.
    pub fn nominal_period_ms(&self) -> u32 {
        match self {
            SampleRate::Fastest => 0,
            SampleRate::Game => 20,
            SampleRate::Ui => 60,
            SampleRate::Normal => 200,
        }
    }
}

/// Motion classification produced by the hysteresis state machine.
///
/// Consumable by a UI layer as a pen-up/pen-down flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Still,
    Moving,
}

impl MotionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionState::Still => "still",
            MotionState::Moving => "moving",
        }
    }
}

/// Per-sample pipeline output consumed by the rendering/cursor layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorUpdate {
    /// Incremental cursor move since the previous sample.
    pub position_delta: Vec3,
    /// Absolute position snapshot (accumulated since construction/reset).
    pub position: Vec3,
    /// Current velocity estimate. Exactly zero whenever `motion_state` is
    /// `Still`.
    pub velocity: Vec3,
    /// Motion classification after this sample.
    pub motion_state: MotionState,
    /// Gate attenuation applied to this sample, in [0, 1].
    pub gate_ratio: f32,
    /// Magnitude of the filtered (pre-gate) acceleration vector.
    pub filtered_magnitude: f32,
    /// Elapsed time integrated for this sample, seconds. Zero for the
    /// first sample and for clock anomalies.
    pub dt_s: f32,
}

/// Running pipeline counters for diagnostics.
///
/// Malformed samples are sanitized rather than surfaced as errors, so the
/// counters are the only way a caller can observe them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Unique id of this pipeline instance.
    pub instance_id: Uuid,
    /// When this pipeline instance was constructed (UTC).
    pub started_at_utc: DateTime<Utc>,
    /// Total samples processed end-to-end.
    pub samples_processed: u64,
    /// Samples that carried at least one NaN/Inf component.
    pub sanitized_samples: u64,
    /// Samples dropped from integration because `dt` was zero or negative.
    pub non_positive_dt_samples: u64,
    /// Still↔Moving transitions observed.
    pub state_transitions: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            started_at_utc: Utc::now(),
            samples_processed: 0,
            sanitized_samples: 0,
            non_positive_dt_samples: 0,
            state_transitions: 0,
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_norm() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert!((v.norm() - 5.0).abs() < 1e-6);
        assert_eq!(Vec3::ZERO.norm(), 0.0);
    }

    #[test]
    fn test_vec3_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, Vec3::new(1.5, 2.5, 3.5));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));

        let mut c = a;
        c += b;
        assert_eq!(c, a + b);
    }

    #[test]
    fn test_vec3_sanitized() {
        let (clean, clamped) = Vec3::new(1.0, f32::NAN, f32::INFINITY).sanitized();
        assert_eq!(clean, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(clamped, 2);

        let (clean, clamped) = Vec3::new(1.0, 2.0, 3.0).sanitized();
        assert_eq!(clean, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(clamped, 0);
    }

    #[test]
    fn test_vec3_serde_as_array() {
        let v = Vec3::new(0.5, 0.0, -0.25);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[0.5,0.0,-0.25]");
        let back: Vec3 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_sample_rate_ordering_hints() {
        assert!(SampleRate::Fastest.nominal_period_ms() <= SampleRate::Game.nominal_period_ms());
        assert!(SampleRate::Game.nominal_period_ms() <= SampleRate::Ui.nominal_period_ms());
        assert!(SampleRate::Ui.nominal_period_ms() <= SampleRate::Normal.nominal_period_ms());
    }

    #[test]
    fn test_motion_state_serde() {
        assert_eq!(
            serde_json::to_string(&MotionState::Still).unwrap(),
            "\"still\""
        );
        assert_eq!(MotionState::Moving.as_str(), "moving");
    }
}
