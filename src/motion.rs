//! Hysteresis-based motion classifier
//!
//! Third pipeline stage: distinguishes sustained motion from noise and
//! stillness. Naive instantaneous thresholding produces a jittery on/off
//! cursor; instead, entry to `Moving` requires one decisive magnitude spike
//! while exit requires a majority of the recent history to show no gated
//! motion.

use crate::types::MotionState;
use log::debug;

/// Capacity of the rolling was-moving history.
pub const MOTION_HISTORY_LEN: usize = 10;

/// Fixed-capacity ring buffer of "was moving" flags. Oldest entry is
/// overwritten on wrap; insertion order is significant only through the
/// false-count, so no read cursor is needed.
#[derive(Debug, Clone)]
pub struct MotionHistory {
    slots: [bool; MOTION_HISTORY_LEN],
    len: usize,
    head: usize,
}

impl MotionHistory {
    pub fn new() -> Self {
        Self {
            slots: [false; MOTION_HISTORY_LEN],
            len: 0,
            head: 0,
        }
    }

    /// Push one flag, overwriting the oldest entry once full.
    pub fn push(&mut self, was_moving: bool) {
        self.slots[self.head] = was_moving;
        self.head = (self.head + 1) % MOTION_HISTORY_LEN;
        if self.len < MOTION_HISTORY_LEN {
            self.len += 1;
        }
    }

    /// Number of recorded entries that showed no gated motion.
    pub fn false_count(&self) -> usize {
        if self.len < MOTION_HISTORY_LEN {
            // Only the filled prefix is meaningful before the first wrap.
            self.slots[..self.len].iter().filter(|m| !**m).count()
        } else {
            self.slots.iter().filter(|m| !**m).count()
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.slots = [false; MOTION_HISTORY_LEN];
        self.len = 0;
        self.head = 0;
    }
}

impl Default for MotionHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Still/Moving state machine with asymmetric hysteresis.
#[derive(Debug, Clone)]
pub struct MotionClassifier {
    state: MotionState,
    history: MotionHistory,
    motion_threshold: f32,
    history_majority: usize,
    transitions: u64,
}

impl MotionClassifier {
    /// Thresholds must already be validated by the pipeline config.
    pub fn new(motion_threshold: f32, history_majority: usize) -> Self {
        Self {
            state: MotionState::Still,
            history: MotionHistory::new(),
            motion_threshold,
            history_majority,
            transitions: 0,
        }
    }

    /// Advance the state machine by one sample.
    ///
    /// `pre_gate_magnitude` is the magnitude of the filtered vector before
    /// gate attenuation; `gate_ratio` is the attenuation the gate applied.
    pub fn update(&mut self, pre_gate_magnitude: f32, gate_ratio: f32) -> MotionState {
        self.history.push(gate_ratio > 0.0);

        match self.state {
            MotionState::Still => {
                if pre_gate_magnitude > self.motion_threshold {
                    self.transition_to(MotionState::Moving);
                }
            }
            MotionState::Moving => {
                if self.history.false_count() > self.history_majority {
                    self.transition_to(MotionState::Still);
                }
            }
        }

        self.state
    }

    fn transition_to(&mut self, next: MotionState) {
        debug!("motion state {} -> {}", self.state.as_str(), next.as_str());
        self.state = next;
        self.transitions += 1;
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Total Still↔Moving transitions since construction/reset.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn reset(&mut self) {
        self.state = MotionState::Still;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> MotionClassifier {
        MotionClassifier::new(0.45, 5)
    }

    #[test]
    fn test_history_wraps_at_capacity() {
        let mut history = MotionHistory::new();
        for _ in 0..MOTION_HISTORY_LEN {
            history.push(false);
        }
        assert_eq!(history.len(), MOTION_HISTORY_LEN);
        assert_eq!(history.false_count(), MOTION_HISTORY_LEN);

        // Overwrites the oldest false entries; capacity never grows.
        for _ in 0..3 {
            history.push(true);
        }
        assert_eq!(history.len(), MOTION_HISTORY_LEN);
        assert_eq!(history.false_count(), MOTION_HISTORY_LEN - 3);
    }

    #[test]
    fn test_partial_history_counts_filled_prefix_only() {
        let mut history = MotionHistory::new();
        history.push(false);
        history.push(true);
        assert_eq!(history.len(), 2);
        assert_eq!(history.false_count(), 1);
    }

    #[test]
    fn test_starts_still() {
        assert_eq!(classifier().state(), MotionState::Still);
    }

    #[test]
    fn test_single_spike_enters_moving() {
        let mut c = classifier();
        assert_eq!(c.update(1.0, 1.0), MotionState::Moving);
        assert_eq!(c.transitions(), 1);
    }

    #[test]
    fn test_single_low_sample_does_not_exit_moving() {
        let mut c = classifier();
        c.update(1.0, 1.0);

        // One quiet sample: only one false in the history, majority of 10
        // not yet violated.
        assert_eq!(c.update(0.01, 0.0), MotionState::Moving);
    }

    #[test]
    fn test_majority_of_quiet_samples_exits_moving() {
        let mut c = classifier();
        c.update(1.0, 1.0);

        // Five quiet samples: false_count == 5, not yet above the majority.
        for _ in 0..5 {
            assert_eq!(c.update(0.01, 0.0), MotionState::Moving);
        }
        // Sixth quiet sample tips the count over the majority.
        assert_eq!(c.update(0.01, 0.0), MotionState::Still);
        assert_eq!(c.transitions(), 2);
    }

    #[test]
    fn test_sub_motion_threshold_samples_stay_still() {
        let mut c = classifier();
        for _ in 0..20 {
            // Gated motion present, but no decisive spike above the coarse
            // threshold: stays Still.
            assert_eq!(c.update(0.3, 0.6), MotionState::Still);
        }
        assert_eq!(c.transitions(), 0);
    }

    #[test]
    fn test_reset_returns_to_still_with_empty_history() {
        let mut c = classifier();
        c.update(1.0, 1.0);
        c.reset();
        assert_eq!(c.state(), MotionState::Still);

        // A fresh spike is again required to enter Moving.
        assert_eq!(c.update(0.01, 0.0), MotionState::Still);
        assert_eq!(c.update(1.0, 1.0), MotionState::Moving);
    }
}
