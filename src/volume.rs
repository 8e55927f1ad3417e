// src/volume.rs - Continuous volume steps while a pinch is held
use crate::command::Command;

/// Tracks index-tip height during a pinch. Each step is measured from the
/// last emitted step, so holding the pinch and moving keeps adjusting.
pub struct VolumeController {
    baseline: Option<f64>,
    move_threshold: f64,
}

impl VolumeController {
    pub fn new(move_threshold: f64) -> Self {
        Self {
            baseline: None,
            move_threshold,
        }
    }

    pub fn update(&mut self, index_tip_y: f64) -> Option<Command> {
        let Some(baseline) = self.baseline else {
            self.baseline = Some(index_tip_y);
            return None;
        };

        // image Y grows downward: a positive delta means the hand went up
        let delta = baseline - index_tip_y;
        let step = if delta > self.move_threshold {
            Command::VolumeUp
        } else if delta < -self.move_threshold {
            Command::VolumeDown
        } else {
            return None;
        };

        self.baseline = Some(index_tip_y);
        Some(step)
    }

    pub fn reset(&mut self) {
        self.baseline = None;
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }
}
