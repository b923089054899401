//! Drift-suppressing double integrator
//!
//! Final pipeline stage: integrates gated acceleration into velocity and
//! position. Unconstrained double integration of biased accelerometer noise
//! diverges unboundedly within seconds, so any interval classified as
//! stillness hard-resets velocity to zero rather than merely decaying it.

use crate::types::{MotionState, Vec3};

/// Velocity and position owned by the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicState {
    pub velocity: Vec3,
    pub position: Vec3,
}

/// Double integrator with zero-velocity updates during stillness.
#[derive(Debug, Clone, Default)]
pub struct Integrator {
    state: KinematicState,
}

impl Integrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate one gated sample and return the position delta for this
    /// step (an incremental cursor move, not the absolute position).
    ///
    /// A `dt` of zero or negative (clock anomaly) contributes zero motion:
    /// velocity and position are left unchanged.
    pub fn integrate(&mut self, gated: Vec3, dt: f32, motion: MotionState) -> Vec3 {
        if motion == MotionState::Still {
            // Zero-velocity update, the core drift-control mechanism.
            self.state.velocity = Vec3::ZERO;
            return Vec3::ZERO;
        }

        if dt <= 0.0 || !dt.is_finite() {
            return Vec3::ZERO;
        }

        self.state.velocity += gated * dt;
        let delta = self.state.velocity * dt;
        self.state.position += delta;
        delta
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn kinematic_state(&self) -> KinematicState {
        self.state
    }

    /// Zero velocity and position (explicit reset gesture from the host).
    pub fn reset(&mut self) {
        self.state = KinematicState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_velocity_zeroed_when_still() {
        let mut integrator = Integrator::new();
        integrator.integrate(Vec3::new(0.5, 0.0, 0.0), 0.01, MotionState::Moving);
        assert!(integrator.velocity().norm() > 0.0);

        let delta = integrator.integrate(Vec3::ZERO, 0.01, MotionState::Still);
        assert_eq!(delta, Vec3::ZERO);
        assert_eq!(integrator.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_position_preserved_across_stillness() {
        let mut integrator = Integrator::new();
        integrator.integrate(Vec3::new(0.5, 0.0, 0.0), 0.1, MotionState::Moving);
        let position = integrator.position();
        assert!(position.x() > 0.0);

        integrator.integrate(Vec3::ZERO, 0.1, MotionState::Still);
        assert_eq!(integrator.position(), position);
    }

    #[test]
    fn test_double_integration_while_moving() {
        let mut integrator = Integrator::new();
        // 0.5 m/s² for 5 steps of 10 ms: velocity 0.5 * 0.01 * 5 = 0.025.
        let mut last_x = 0.0_f32;
        for _ in 0..5 {
            integrator.integrate(Vec3::new(0.5, 0.0, 0.0), 0.01, MotionState::Moving);
            let x = integrator.position().x();
            assert!(x > last_x, "position not strictly increasing");
            last_x = x;
        }

        assert!((integrator.velocity().x() - 0.025).abs() < 1e-6);
        assert_eq!(integrator.velocity().y(), 0.0);
        assert_eq!(integrator.velocity().z(), 0.0);
        assert_eq!(integrator.position().y(), 0.0);
        assert_eq!(integrator.position().z(), 0.0);
    }

    #[test]
    fn test_non_positive_dt_is_a_no_op() {
        let mut integrator = Integrator::new();
        integrator.integrate(Vec3::new(0.5, 0.0, 0.0), 0.01, MotionState::Moving);
        let before = integrator.kinematic_state();

        for dt in [0.0, -0.01, f32::NAN] {
            let delta = integrator.integrate(Vec3::new(0.5, 0.0, 0.0), dt, MotionState::Moving);
            assert_eq!(delta, Vec3::ZERO);
            assert_eq!(integrator.kinematic_state(), before);
        }
    }

    #[test]
    fn test_reset_zeroes_kinematic_state() {
        let mut integrator = Integrator::new();
        integrator.integrate(Vec3::new(1.0, 1.0, 1.0), 0.1, MotionState::Moving);
        integrator.reset();
        assert_eq!(integrator.kinematic_state(), KinematicState::default());

        // Reset is idempotent.
        integrator.reset();
        assert_eq!(integrator.kinematic_state(), KinematicState::default());
    }
}
