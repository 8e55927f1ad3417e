// src/engine.rs - Per-session gesture decision pipeline
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::GestureConfig;
use crate::context::ContextGate;
use crate::features::{self, FeatureBuffer};
use crate::heuristics::{HeuristicClassifier, ShapeLabel};
use crate::landmarks::{hand, LandmarkFrame, Landmarks};
use crate::model::{GestureModel, ModelGate, NullModel, Prediction};
use crate::smoothing::FrameSmoother;
use crate::stability::StabilityTracker;
use crate::volume::VolumeController;

/// Snapshot of the engine's mutable decision state.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub current_stable_label: Option<ShapeLabel>,
    pub stable_count: usize,
    pub last_action_time: Option<Instant>,
    pub last_index_finger_y: Option<f64>,
    pub frame_counter: u64,
}

/// Turns a stream of landmark frames into at most one command per frame.
///
/// One engine belongs to one sensing session and is fed frames in arrival
/// order. Nothing in here blocks or touches the network; the only fallible
/// collaborator is the model, whose errors are swallowed as "no prediction".
pub struct GestureEngine {
    config: GestureConfig,
    cooldown: Duration,
    smoother: FrameSmoother,
    buffer: FeatureBuffer,
    classifier: HeuristicClassifier,
    tracker: StabilityTracker,
    context: ContextGate,
    volume: VolumeController,
    model: Arc<dyn GestureModel>,
    model_gate: ModelGate,
    last_action_time: Option<Instant>,
    frame_counter: u64,
    model_failure_logged: bool,
}

impl GestureEngine {
    pub fn new(config: GestureConfig, model: Arc<dyn GestureModel>) -> Self {
        if let Some(expected) = model.window_len() {
            if expected != config.buffer_size {
                warn!(
                    "Model '{}' expects {} frames but the feature buffer holds {}; predictions may be unreliable",
                    model.name(),
                    expected,
                    config.buffer_size
                );
            }
        }
        debug!("Gesture engine using model backend '{}'", model.name());

        Self {
            cooldown: config.cooldown(),
            smoother: FrameSmoother::new(config.smoothing_window),
            buffer: FeatureBuffer::new(config.buffer_size),
            classifier: HeuristicClassifier::new(
                config.pinch_threshold,
                config.fist_distance_threshold,
            ),
            tracker: StabilityTracker::new(config.stability_frames),
            context: ContextGate::new(config.face_proximity_threshold),
            volume: VolumeController::new(config.volume_move_threshold),
            model_gate: ModelGate::new(&config.model),
            model,
            config,
            last_action_time: None,
            frame_counter: 0,
            model_failure_logged: false,
        }
    }

    /// Heuristics only; the model path never fires.
    pub fn without_model(config: GestureConfig) -> Self {
        Self::new(config, Arc::new(NullModel))
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> Option<Command> {
        self.process_frame_at(frame, Instant::now())
    }

    /// Same as [`process_frame`](Self::process_frame) with an explicit clock
    /// reading, so replays and tests are deterministic.
    pub fn process_frame_at(&mut self, frame: &LandmarkFrame, now: Instant) -> Option<Command> {
        let Some(raw_hand) = frame.detected_hand() else {
            self.tracker.reset();
            self.volume.reset();
            return None;
        };

        // buffering keeps running through cooldown so the model window stays warm
        let smoothed = self.smoother.smooth(raw_hand);
        self.buffer
            .push(features::normalize(Some(&smoothed), frame.detected_pose()));
        self.frame_counter += 1;

        if self.is_cooling_down(now) {
            return None;
        }

        let shape = self.classifier.classify(&smoothed);
        debug!("frame {} raw shape {}", self.frame_counter, shape.as_str());

        let command = self
            .volume_step(shape, raw_hand)
            .or_else(|| self.confirmed_shape(shape, raw_hand, frame))
            .or_else(|| self.model_prediction())?;

        self.last_action_time = Some(now);
        info!("Gesture confirmed: {}", command);
        Some(command)
    }

    pub fn is_cooling_down(&self, now: Instant) -> bool {
        self.last_action_time
            .is_some_and(|last| now.saturating_duration_since(last) < self.cooldown)
    }

    /// Back to a fresh session: empties every window and forgets the cooldown.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.buffer.clear();
        self.tracker.reset();
        self.volume.reset();
        self.last_action_time = None;
        self.frame_counter = 0;
    }

    pub fn state(&self) -> GestureState {
        GestureState {
            current_stable_label: self.tracker.current_label(),
            stable_count: self.tracker.count(),
            last_action_time: self.last_action_time,
            last_index_finger_y: self.volume.baseline(),
            frame_counter: self.frame_counter,
        }
    }

    fn volume_step(&mut self, shape: ShapeLabel, raw_hand: &Landmarks) -> Option<Command> {
        if shape != ShapeLabel::PinchActive {
            self.volume.reset();
            return None;
        }
        self.tracker.reset();
        let index_y = raw_hand.get(hand::INDEX_TIP)?.y;
        self.volume.update(index_y)
    }

    fn confirmed_shape(
        &mut self,
        shape: ShapeLabel,
        raw_hand: &Landmarks,
        frame: &LandmarkFrame,
    ) -> Option<Command> {
        if shape == ShapeLabel::PinchActive {
            return None;
        }
        let confirmed = self.tracker.observe(shape)?;

        let wrist = raw_hand.get(hand::WRIST);
        if !self
            .context
            .is_valid(confirmed, frame.detected_pose(), wrist)
        {
            debug!(
                "Stable {} discarded: hand too close to the face",
                confirmed.as_str()
            );
            return None;
        }

        match confirmed {
            ShapeLabel::PlayPauseShape => Some(Command::PlayPause),
            ShapeLabel::NextTrackShape => Some(Command::NextTrack),
            ShapeLabel::PinchActive | ShapeLabel::None => None,
        }
    }

    fn model_prediction(&mut self) -> Option<Command> {
        if self.frame_counter % self.config.inference_interval.max(1) != 0 {
            return None;
        }
        let window = self.buffer.window()?;

        let prediction = match self.model.predict(window) {
            Ok(prediction) => prediction,
            Err(e) => {
                if !self.model_failure_logged {
                    warn!("Gesture model '{}' failed, ignoring its output: {}", self.model.name(), e);
                    self.model_failure_logged = true;
                }
                Prediction::none()
            }
        };

        let label = self.model_gate.accept(&prediction)?;
        debug!(
            "Model accepted {:?} at {:.2}",
            prediction.label, prediction.confidence
        );
        Some(Command::from_label(&label))
    }
}
