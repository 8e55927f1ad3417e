#![allow(dead_code)]

use nalgebra::Vector3;

use gesture_server::landmarks::{hand, pose, HAND_POINTS, POSE_POINTS};
use gesture_server::{LandmarkFrame, Landmarks};

pub const FRAME_MS: u64 = 33;

fn hand_from(overrides: &[(usize, [f64; 3])]) -> Landmarks {
    let mut points = vec![Vector3::new(0.5, 0.5, 0.0); HAND_POINTS];
    points[hand::WRIST] = Vector3::new(0.5, 0.8, 0.0);
    for (idx, [x, y, z]) in overrides {
        points[*idx] = Vector3::new(*x, *y, *z);
    }
    Landmarks::from_points(points)
}

/// Index, middle and ring curled below their PIPs, thumb tucked behind.
pub fn fist() -> Landmarks {
    hand_from(&[
        (hand::THUMB_TIP, [0.35, 0.6, 0.05]),
        (hand::INDEX_PIP, [0.5, 0.5, -0.02]),
        (hand::INDEX_TIP, [0.5, 0.55, 0.0]),
        (hand::MIDDLE_PIP, [0.55, 0.5, 0.0]),
        (hand::MIDDLE_TIP, [0.55, 0.56, 0.0]),
        (hand::RING_PIP, [0.6, 0.5, 0.0]),
        (hand::RING_TIP, [0.6, 0.57, 0.0]),
        (hand::PINKY_PIP, [0.65, 0.5, 0.0]),
    ])
}

pub fn two_fingers() -> Landmarks {
    hand_from(&[
        (hand::THUMB_TIP, [0.35, 0.6, 0.0]),
        (hand::INDEX_PIP, [0.5, 0.5, 0.0]),
        (hand::INDEX_TIP, [0.5, 0.35, 0.0]),
        (hand::MIDDLE_PIP, [0.55, 0.5, 0.0]),
        (hand::MIDDLE_TIP, [0.55, 0.35, 0.0]),
        (hand::RING_PIP, [0.6, 0.5, 0.0]),
        (hand::RING_TIP, [0.6, 0.56, 0.0]),
        (hand::PINKY_PIP, [0.65, 0.52, 0.0]),
    ])
}

pub fn open_palm() -> Landmarks {
    hand_from(&[
        (hand::THUMB_TIP, [0.35, 0.6, 0.0]),
        (hand::INDEX_PIP, [0.5, 0.5, 0.0]),
        (hand::INDEX_TIP, [0.5, 0.35, 0.0]),
        (hand::MIDDLE_PIP, [0.55, 0.5, 0.0]),
        (hand::MIDDLE_TIP, [0.55, 0.33, 0.0]),
        (hand::RING_PIP, [0.6, 0.5, 0.0]),
        (hand::RING_TIP, [0.6, 0.36, 0.0]),
        (hand::PINKY_PIP, [0.65, 0.52, 0.0]),
    ])
}

pub fn pinch_at(index_y: f64) -> Landmarks {
    hand_from(&[
        (hand::THUMB_TIP, [0.5, index_y, 0.0]),
        (hand::INDEX_PIP, [0.5, 0.5, 0.0]),
        (hand::INDEX_TIP, [0.52, index_y, 0.0]),
    ])
}

pub fn pose_with_nose(x: f64, y: f64) -> Landmarks {
    let mut points = vec![Vector3::new(0.5, 0.6, 0.0); POSE_POINTS];
    points[pose::NOSE] = Vector3::new(x, y, 0.0);
    points[pose::LEFT_SHOULDER] = Vector3::new(0.6, 0.6, 0.0);
    points[pose::RIGHT_SHOULDER] = Vector3::new(0.4, 0.6, 0.0);
    Landmarks::from_points(points)
}

pub fn hand_only(hand: Landmarks) -> LandmarkFrame {
    LandmarkFrame::new(Some(hand), None)
}
