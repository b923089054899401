//! Exponential smoothing filter
//!
//! First pipeline stage: removes high-frequency sensor noise with a
//! standard exponential moving average. The filter is stateful and strictly
//! sequential; one instance belongs to exactly one pipeline.

use crate::types::Vec3;

/// Exponential low-pass filter over 3-axis acceleration.
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    alpha: f32,
    previous: Vec3,
    initialized: bool,
    sanitized_components: u64,
}

impl LowPassFilter {
    /// `alpha` must already be validated to lie in (0, 1).
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            previous: Vec3::ZERO,
            initialized: false,
            sanitized_components: 0,
        }
    }

    /// Apply the filter to one reading and update internal state.
    ///
    /// The first reading initializes the state directly with no smoothing.
    /// Subsequent readings blend: `alpha * value + (1 - alpha) * previous`.
    /// NaN/Inf components are clamped to zero before filtering so they can
    /// never poison the exponential state.
    pub fn apply(&mut self, value: Vec3) -> Vec3 {
        let (clean, clamped) = value.sanitized();
        self.sanitized_components += clamped as u64;

        let filtered = if self.initialized {
            clean * self.alpha + self.previous * (1.0 - self.alpha)
        } else {
            self.initialized = true;
            clean
        };

        self.previous = filtered;
        filtered
    }

    /// True if at least one sample has been seen since construction/reset.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Total NaN/Inf components clamped to zero so far.
    pub fn sanitized_components(&self) -> u64 {
        self.sanitized_components
    }

    /// Re-enter first-sample mode. Counters are preserved; they describe
    /// the input stream, not the filter state.
    pub fn reset(&mut self) {
        self.previous = Vec3::ZERO;
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_initializes_directly() {
        let mut filter = LowPassFilter::new(0.1);
        let out = filter.apply(Vec3::new(0.5, -0.2, 1.0));
        assert_eq!(out, Vec3::new(0.5, -0.2, 1.0));
        assert!(filter.is_initialized());
    }

    #[test]
    fn test_smoothing_formula() {
        let mut filter = LowPassFilter::new(0.1);
        filter.apply(Vec3::new(1.0, 0.0, 0.0));
        let out = filter.apply(Vec3::new(0.0, 0.0, 0.0));
        // 0.1 * 0 + 0.9 * 1 = 0.9 (the decayed term is added, not
        // subtracted)
        assert!((out.x() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_convergence_to_constant_input() {
        let alpha = 0.1_f32;
        let mut filter = LowPassFilter::new(alpha);
        let target = Vec3::new(0.5, 0.0, 0.0);

        filter.apply(Vec3::ZERO);

        // Error decays by (1 - alpha) per step; a few multiples of 1/alpha
        // steps is enough to land within 1%.
        let steps = (5.0 / alpha) as usize;
        let mut out = Vec3::ZERO;
        for _ in 0..steps {
            out = filter.apply(target);
        }
        assert!((out.x() - 0.5).abs() < 0.005);
        assert_eq!(out.y(), 0.0);
        assert_eq!(out.z(), 0.0);
    }

    #[test]
    fn test_nan_inputs_clamped_and_counted() {
        let mut filter = LowPassFilter::new(0.5);
        filter.apply(Vec3::new(1.0, 1.0, 1.0));
        let out = filter.apply(Vec3::new(f32::NAN, 1.0, f32::NEG_INFINITY));

        assert!(out.is_finite());
        // NaN component blended as zero: 0.5 * 0 + 0.5 * 1 = 0.5
        assert!((out.x() - 0.5).abs() < 1e-6);
        assert!((out.y() - 1.0).abs() < 1e-6);
        assert_eq!(filter.sanitized_components(), 2);
    }

    #[test]
    fn test_reset_reenters_first_sample_mode() {
        let mut filter = LowPassFilter::new(0.1);
        filter.apply(Vec3::new(1.0, 1.0, 1.0));
        filter.reset();
        assert!(!filter.is_initialized());

        // After reset the next sample initializes directly again.
        let out = filter.apply(Vec3::new(0.3, 0.0, 0.0));
        assert_eq!(out, Vec3::new(0.3, 0.0, 0.0));
    }
}
