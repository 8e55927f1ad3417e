// src/landmarks.rs - Hand and pose landmark containers with checked access
use nalgebra::Vector3;
use serde::Deserialize;

pub type Point = Vector3<f64>;

/// Points produced by the hand landmark model.
pub const HAND_POINTS: usize = 21;
/// Points produced by the body pose model.
pub const POSE_POINTS: usize = 33;

/// MediaPipe hand landmark indices.
pub mod hand {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
}

/// MediaPipe pose landmark indices.
pub mod pose {
    pub const NOSE: usize = 0;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
}

/// An ordered set of 3D keypoints. Arity is not enforced here; consumers
/// check it with [`Landmarks::has_arity`] and every lookup is bounds-checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Landmarks {
    points: Vec<Point>,
}

impl Landmarks {
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Builds landmarks from a flat `[x0, y0, z0, x1, ...]` list. A trailing
    /// partial point is dropped.
    pub fn from_flat(values: &[f64]) -> Self {
        let points = values
            .chunks_exact(3)
            .map(|c| Vector3::new(c[0], c[1], c[2]))
            .collect();
        Self { points }
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_arity(&self, expected: usize) -> bool {
        self.points.len() == expected
    }

    pub fn to_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }
}

/// One sensing tick worth of landmarks. `None` means "not detected".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "WireFrame")]
pub struct LandmarkFrame {
    pub hand: Option<Landmarks>,
    pub pose: Option<Landmarks>,
}

impl LandmarkFrame {
    pub fn new(hand: Option<Landmarks>, pose: Option<Landmarks>) -> Self {
        Self { hand, pose }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses the client wire format:
    /// `{"hands": [63 floats], "pose": [99 floats], "frame": "..."}`.
    /// Both arrays are optional and any other field is ignored.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Hand landmarks, treating an empty list the same as an absent one.
    pub fn detected_hand(&self) -> Option<&Landmarks> {
        self.hand.as_ref().filter(|h| !h.is_empty())
    }

    pub fn detected_pose(&self) -> Option<&Landmarks> {
        self.pose.as_ref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct WireFrame {
    #[serde(default)]
    hands: Option<Vec<f64>>,
    #[serde(default)]
    pose: Option<Vec<f64>>,
}

impl From<WireFrame> for LandmarkFrame {
    fn from(wire: WireFrame) -> Self {
        Self {
            hand: wire.hands.as_deref().map(Landmarks::from_flat),
            pose: wire.pose.as_deref().map(Landmarks::from_flat),
        }
    }
}
