// src/stability.rs - Consecutive-frame confirmation for discrete hand shapes
use crate::heuristics::ShapeLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityState {
    Idle,
    Tracking { label: ShapeLabel, count: usize },
}

/// Confirms a discrete shape once it has been seen on `required_frames`
/// consecutive frames. Confirmation consumes the streak whether or not the
/// caller goes on to act on it.
pub struct StabilityTracker {
    state: StabilityState,
    required_frames: usize,
}

impl StabilityTracker {
    pub fn new(required_frames: usize) -> Self {
        Self {
            state: StabilityState::Idle,
            required_frames: required_frames.max(1),
        }
    }

    /// Feeds one raw label. Returns the label on the frame it is confirmed.
    pub fn observe(&mut self, label: ShapeLabel) -> Option<ShapeLabel> {
        if !label.is_discrete() {
            self.reset();
            return None;
        }

        match self.state {
            StabilityState::Tracking { label: current, count } if current == label => {
                let count = count + 1;
                if count >= self.required_frames {
                    self.reset();
                    return Some(label);
                }
                self.state = StabilityState::Tracking { label, count };
            }
            _ => {
                self.state = StabilityState::Tracking { label, count: 1 };
            }
        }
        None
    }

    pub fn reset(&mut self) {
        self.state = StabilityState::Idle;
    }

    pub fn state(&self) -> StabilityState {
        self.state
    }

    pub fn current_label(&self) -> Option<ShapeLabel> {
        match self.state {
            StabilityState::Idle => None,
            StabilityState::Tracking { label, .. } => Some(label),
        }
    }

    pub fn count(&self) -> usize {
        match self.state {
            StabilityState::Idle => 0,
            StabilityState::Tracking { count, .. } => count,
        }
    }
}
