// src/features.rs - Scale and translation invariant feature vectors for the model window
use std::collections::VecDeque;

use crate::landmarks::{pose, Landmarks, Point, HAND_POINTS, POSE_POINTS};

pub const HAND_FEATURES: usize = HAND_POINTS * 3;
pub const POSE_FEATURES: usize = POSE_POINTS * 3;
pub const FEATURE_LEN: usize = HAND_FEATURES + POSE_FEATURES;

/// A normalized frame: 63 wrist-relative hand values followed by 99
/// shoulder-relative pose values. Always exactly [`FEATURE_LEN`] long.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn zeros() -> Self {
        Self(vec![0.0; FEATURE_LEN])
    }

    /// Wraps precomputed values; `None` unless exactly [`FEATURE_LEN`] long.
    pub fn from_values(values: Vec<f64>) -> Option<Self> {
        (values.len() == FEATURE_LEN).then_some(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn hand(&self) -> &[f64] {
        &self.0[..HAND_FEATURES]
    }

    pub fn pose(&self) -> &[f64] {
        &self.0[HAND_FEATURES..]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Concatenates the normalized hand and pose halves. Missing or
/// wrong-sized input yields zeros for that half.
pub fn normalize(hand: Option<&Landmarks>, body: Option<&Landmarks>) -> FeatureVector {
    let mut values = Vec::with_capacity(FEATURE_LEN);

    match hand.and_then(normalize_hand) {
        Some(h) => values.extend(h),
        None => values.extend(std::iter::repeat(0.0).take(HAND_FEATURES)),
    }
    match body.and_then(normalize_pose) {
        Some(p) => values.extend(p),
        None => values.extend(std::iter::repeat(0.0).take(POSE_FEATURES)),
    }

    FeatureVector(values)
}

fn normalize_hand(hand: &Landmarks) -> Option<Vec<f64>> {
    if !hand.has_arity(HAND_POINTS) {
        return None;
    }
    let wrist = hand.get(0)?;
    let relative: Vec<Point> = hand.points().iter().map(|p| p - wrist).collect();
    let max_dist = relative.iter().map(|p| p.norm()).fold(0.0_f64, f64::max);
    Some(flatten_scaled(&relative, max_dist))
}

fn normalize_pose(body: &Landmarks) -> Option<Vec<f64>> {
    if !body.has_arity(POSE_POINTS) {
        return None;
    }
    let left = body.get(pose::LEFT_SHOULDER)?;
    let right = body.get(pose::RIGHT_SHOULDER)?;
    let midpoint = (left + right) / 2.0;
    let width = (left - right).norm();
    let relative: Vec<Point> = body.points().iter().map(|p| p - midpoint).collect();
    Some(flatten_scaled(&relative, width))
}

fn flatten_scaled(points: &[Point], scale: f64) -> Vec<f64> {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    points
        .iter()
        .flat_map(|p| {
            let s = p / scale;
            [s.x, s.y, s.z]
        })
        .collect()
}

/// Rolling window of the most recent feature vectors fed to the model.
pub struct FeatureBuffer {
    frames: VecDeque<FeatureVector>,
    capacity: usize,
}

impl FeatureBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, features: FeatureVector) {
        self.frames.push_back(features);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    /// Oldest-first view of the buffer, only once it is full.
    pub fn window(&mut self) -> Option<&[FeatureVector]> {
        if !self.is_full() {
            return None;
        }
        Some(&*self.frames.make_contiguous())
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
