// src/context.rs - Body-pose veto for confirmed gestures
use crate::heuristics::ShapeLabel;
use crate::landmarks::{pose, Landmarks, Point};

/// Rejects a closed fist held near the face (smoking, scratching, eating).
#[derive(Debug, Clone, Copy)]
pub struct ContextGate {
    pub face_proximity: f64,
}

impl ContextGate {
    pub fn new(face_proximity: f64) -> Self {
        Self { face_proximity }
    }

    /// Only `PlayPauseShape` is ever vetoed, and only when both the pose and
    /// the wrist are known.
    pub fn is_valid(&self, label: ShapeLabel, body: Option<&Landmarks>, wrist: Option<Point>) -> bool {
        if label != ShapeLabel::PlayPauseShape {
            return true;
        }
        let (Some(nose), Some(wrist)) = (body.and_then(|b| b.get(pose::NOSE)), wrist) else {
            return true;
        };

        let dx = (wrist.x - nose.x).abs();
        let dy = (wrist.y - nose.y).abs();
        !(dx < self.face_proximity && dy < self.face_proximity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::test_hands;
    use nalgebra::Vector3;

    #[test]
    fn vetoes_fist_near_nose() {
        let gate = ContextGate::new(0.25);
        let body = test_hands::pose_with_nose(0.5, 0.3);
        let wrist = Some(Vector3::new(0.6, 0.4, 0.0));
        assert!(!gate.is_valid(ShapeLabel::PlayPauseShape, Some(&body), wrist));
    }

    #[test]
    fn allows_fist_away_from_face() {
        let gate = ContextGate::new(0.25);
        let body = test_hands::pose_with_nose(0.5, 0.3);
        // close horizontally, far vertically
        let wrist = Some(Vector3::new(0.5, 0.8, 0.0));
        assert!(gate.is_valid(ShapeLabel::PlayPauseShape, Some(&body), wrist));
    }

    #[test]
    fn other_labels_and_missing_context_pass() {
        let gate = ContextGate::new(0.25);
        let body = test_hands::pose_with_nose(0.5, 0.3);
        let wrist = Some(Vector3::new(0.5, 0.3, 0.0));
        assert!(gate.is_valid(ShapeLabel::NextTrackShape, Some(&body), wrist));
        assert!(gate.is_valid(ShapeLabel::PlayPauseShape, None, wrist));
        assert!(gate.is_valid(ShapeLabel::PlayPauseShape, Some(&Landmarks::default()), wrist));
        assert!(gate.is_valid(ShapeLabel::PlayPauseShape, Some(&body), None));
    }
}
