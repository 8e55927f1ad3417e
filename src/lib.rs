//! Gesture decision core: turns per-frame hand and pose landmarks into
//! debounced media-control commands.
//!
//! Per frame the [`GestureEngine`] smooths the hand, keeps a rolling window
//! of normalized features for the optional window classifier, and tries, in
//! order, pinch volume control, stable heuristic shapes, and the model.

pub mod command;
pub mod config;
pub mod context;
pub mod data;
pub mod engine;
pub mod features;
pub mod heuristics;
pub mod landmarks;
pub mod model;
pub mod session;
pub mod smoothing;
pub mod stability;
pub mod volume;

pub use command::Command;
pub use config::{ConfigError, GestureConfig, ModelConfig};
pub use engine::{GestureEngine, GestureState};
pub use features::{FeatureBuffer, FeatureVector};
pub use heuristics::{HeuristicClassifier, ShapeLabel};
pub use landmarks::{LandmarkFrame, Landmarks};
pub use model::{load_model, GestureModel, LinearModel, ModelError, ModelGate, NullModel, Prediction};
