//! Pipeline orchestration
//!
//! This module provides the public API of the estimator. One
//! [`GesturePipeline`] value owns every piece of mutable stage state
//! (filter, motion history, motion state, kinematics) and processes exactly
//! one sample end-to-end per call: filter → gate → classifier → integrator.
//!
//! The pipeline is single-threaded logic with no internal parallelism and
//! no blocking operations; callers that receive samples on a delivery
//! callback should hand them to a [`crate::source::PipelineWorker`] instead
//! of processing inline.

use crate::config::PipelineConfig;
use crate::error::MotionError;
use crate::filter::LowPassFilter;
use crate::gate::MagnitudeGate;
use crate::integrator::Integrator;
use crate::motion::MotionClassifier;
use crate::types::{CursorUpdate, Diagnostics, MotionState, Sample, Vec3};
use log::{debug, warn};

/// Stateful estimator converting an acceleration stream into a stabilized,
/// drift-suppressed cursor trajectory.
pub struct GesturePipeline {
    config: PipelineConfig,
    filter: LowPassFilter,
    gate: MagnitudeGate,
    classifier: MotionClassifier,
    integrator: Integrator,
    last_timestamp_s: Option<f64>,
    diagnostics: Diagnostics,
}

impl GesturePipeline {
    /// Create a pipeline from a validated configuration.
    ///
    /// Threshold or alpha violations are fatal here; nothing is re-checked
    /// per sample.
    pub fn new(config: PipelineConfig) -> Result<Self, MotionError> {
        config.validate()?;

        Ok(Self {
            filter: LowPassFilter::new(config.alpha),
            gate: MagnitudeGate::new(config.hard_threshold, config.soft_threshold),
            classifier: MotionClassifier::new(config.motion_threshold, config.history_majority),
            integrator: Integrator::new(),
            config,
            last_timestamp_s: None,
            diagnostics: Diagnostics::new(),
        })
    }

    /// Create a pipeline with the default configuration.
    pub fn with_defaults() -> Self {
        // The default configuration always validates.
        Self::new(PipelineConfig::default()).expect("default config is valid")
    }

    /// Process one sample end-to-end and return the resulting cursor
    /// update.
    ///
    /// Elapsed time is derived from consecutive sample timestamps; the
    /// first sample after construction or reset integrates with `dt = 0`.
    pub fn process(&mut self, sample: &Sample) -> CursorUpdate {
        self.diagnostics.samples_processed += 1;

        if !sample.accel.is_finite() {
            self.diagnostics.sanitized_samples += 1;
            warn!(
                "sanitizing non-finite acceleration sample at t={}",
                sample.timestamp_s
            );
        }

        let dt = match self.last_timestamp_s {
            Some(last) => {
                let dt = (sample.timestamp_s - last) as f32;
                if dt <= 0.0 || !dt.is_finite() {
                    self.diagnostics.non_positive_dt_samples += 1;
                    0.0
                } else {
                    dt
                }
            }
            None => 0.0,
        };
        self.last_timestamp_s = Some(sample.timestamp_s);

        let filtered = self.filter.apply(sample.accel);
        let gated = self.gate.gate(filtered);
        let motion_state = self.classifier.update(gated.magnitude, gated.ratio);
        let position_delta = self.integrator.integrate(gated.vector, dt, motion_state);

        CursorUpdate {
            position_delta,
            position: self.integrator.position(),
            velocity: self.integrator.velocity(),
            motion_state,
            gate_ratio: gated.ratio,
            filtered_magnitude: gated.magnitude,
            dt_s: dt,
        }
    }

    /// Zero the kinematic state and re-enter first-sample mode, as if the
    /// pipeline had just been constructed. Idempotent; the configuration
    /// and diagnostic counters are untouched.
    pub fn reset(&mut self) {
        debug!("pipeline reset");
        self.filter.reset();
        self.classifier.reset();
        self.integrator.reset();
        self.last_timestamp_s = None;
    }

    /// Absolute position accumulated since construction/reset.
    pub fn position(&self) -> Vec3 {
        self.integrator.position()
    }

    /// Current velocity estimate.
    pub fn velocity(&self) -> Vec3 {
        self.integrator.velocity()
    }

    /// Current motion classification.
    pub fn motion_state(&self) -> MotionState {
        self.classifier.state()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Snapshot of the diagnostic counters.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut snapshot = self.diagnostics.clone();
        snapshot.state_transitions = self.classifier.transitions();
        snapshot
    }
}
