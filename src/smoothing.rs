// src/smoothing.rs - Moving-average smoothing over the last few hand frames
use std::collections::VecDeque;

use crate::landmarks::{Landmarks, Point};

/// Bounded window of recent raw hand frames, averaged element-wise.
pub struct FrameSmoother {
    window: VecDeque<Vec<Point>>,
    capacity: usize,
}

impl FrameSmoother {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes `raw` into the window and returns the mean of every frame in it.
    ///
    /// An empty frame is not pushed and yields an empty result, so a missed
    /// detection never bleeds into later averages. A frame whose point count
    /// differs from the frames already buffered restarts the window.
    pub fn smooth(&mut self, raw: &Landmarks) -> Landmarks {
        if raw.is_empty() {
            return Landmarks::default();
        }

        if self
            .window
            .front()
            .is_some_and(|first| first.len() != raw.len())
        {
            self.window.clear();
        }

        self.window.push_back(raw.points().to_vec());
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }

        let count = self.window.len() as f64;
        let mut mean = vec![Point::zeros(); raw.len()];
        for frame in &self.window {
            for (acc, p) in mean.iter_mut().zip(frame) {
                *acc += p;
            }
        }
        for acc in mean.iter_mut() {
            *acc /= count;
        }

        Landmarks::from_points(mean)
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
