// src/heuristics.rs - Rule-based hand shape classification on a single smoothed frame
use crate::landmarks::{hand, Landmarks, Point, HAND_POINTS};

/// Raw per-frame hand shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeLabel {
    /// Thumb and index tips touching; drives volume control.
    PinchActive,
    /// Index and middle extended, ring and pinky curled.
    NextTrackShape,
    /// Closed fist with the thumb tucked.
    PlayPauseShape,
    None,
}

impl ShapeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PinchActive => "pinch_active",
            Self::NextTrackShape => "next_track_shape",
            Self::PlayPauseShape => "play_pause_shape",
            Self::None => "none",
        }
    }

    /// Shapes that must be held steady before they turn into a command.
    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::NextTrackShape | Self::PlayPauseShape)
    }
}

/// Stateless geometric rules. Y grows downward in image space, so a tip
/// "above" its PIP joint has the smaller Y.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicClassifier {
    pub pinch_threshold: f64,
    pub fist_distance_threshold: f64,
}

struct KeyPoints {
    thumb_tip: Point,
    index_pip: Point,
    index_tip: Point,
    middle_pip: Point,
    middle_tip: Point,
    ring_pip: Point,
    ring_tip: Point,
    pinky_pip: Point,
}

impl KeyPoints {
    fn extract(lm: &Landmarks) -> Option<Self> {
        Some(Self {
            thumb_tip: lm.get(hand::THUMB_TIP)?,
            index_pip: lm.get(hand::INDEX_PIP)?,
            index_tip: lm.get(hand::INDEX_TIP)?,
            middle_pip: lm.get(hand::MIDDLE_PIP)?,
            middle_tip: lm.get(hand::MIDDLE_TIP)?,
            ring_pip: lm.get(hand::RING_PIP)?,
            ring_tip: lm.get(hand::RING_TIP)?,
            pinky_pip: lm.get(hand::PINKY_PIP)?,
        })
    }
}

impl HeuristicClassifier {
    pub fn new(pinch_threshold: f64, fist_distance_threshold: f64) -> Self {
        Self {
            pinch_threshold,
            fist_distance_threshold,
        }
    }

    /// First matching rule wins: pinch, two fingers, fist, otherwise none.
    pub fn classify(&self, smoothed: &Landmarks) -> ShapeLabel {
        if smoothed.len() < HAND_POINTS {
            return ShapeLabel::None;
        }
        let Some(k) = KeyPoints::extract(smoothed) else {
            return ShapeLabel::None;
        };

        let thumb_index = (k.thumb_tip - k.index_tip).norm();
        if thumb_index < self.pinch_threshold {
            return ShapeLabel::PinchActive;
        }

        let index_extended = k.index_tip.y < k.index_pip.y;
        let middle_extended = k.middle_tip.y < k.middle_pip.y;
        let ring_closed = k.ring_tip.y > k.ring_pip.y;
        // pinky curls with the ring finger, so the ring tip stands in for it
        let pinky_closed = k.ring_tip.y > k.pinky_pip.y;
        if index_extended && middle_extended && ring_closed && pinky_closed {
            return ShapeLabel::NextTrackShape;
        }

        let index_closed = k.index_tip.y > k.index_pip.y;
        let middle_closed = k.middle_tip.y > k.middle_pip.y;
        let not_pinch = thumb_index > self.fist_distance_threshold;
        let thumb_tucked = k.index_pip.z < k.thumb_tip.z;
        if index_closed && middle_closed && ring_closed && not_pinch && thumb_tucked {
            return ShapeLabel::PlayPauseShape;
        }

        ShapeLabel::None
    }
}
