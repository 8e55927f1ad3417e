// src/model.rs - Window classifier capability, backends, and confidence gating
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::features::{FeatureVector, FEATURE_LEN};

/// Raw model output. `label == None` means "nothing recognized".
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Option<String>,
    pub confidence: f64,
}

impl Prediction {
    pub fn none() -> Self {
        Self {
            label: None,
            confidence: 0.0,
        }
    }

    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: Some(label.into()),
            confidence,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read model {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse model {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Malformed model: {0}")]
    Shape(String),
    #[error("Model expects a window of {expected} frames, got {actual}")]
    WindowLength { expected: usize, actual: usize },
    #[error("Model expects {expected} features per frame, got {actual}")]
    FeatureLength { expected: usize, actual: usize },
}

/// Classifies a full feature window. Backends are immutable once loaded, so
/// one instance can serve every session.
pub trait GestureModel: Send + Sync {
    fn name(&self) -> &str;

    /// Window length the backend was trained on, if it knows.
    fn window_len(&self) -> Option<usize> {
        None
    }

    fn predict(&self, window: &[FeatureVector]) -> Result<Prediction, ModelError>;
}

/// Stand-in used when no model is configured or loading failed.
pub struct NullModel;

impl GestureModel for NullModel {
    fn name(&self) -> &str {
        "none"
    }

    fn predict(&self, _window: &[FeatureVector]) -> Result<Prediction, ModelError> {
        Ok(Prediction::none())
    }
}

#[derive(Debug, Deserialize)]
struct LinearModelFile {
    window: usize,
    features: usize,
    labels: Vec<String>,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

/// Softmax over a linear projection of the window's mean feature vector.
#[derive(Debug, Clone)]
pub struct LinearModel {
    window: usize,
    labels: Vec<String>,
    weights: DMatrix<f64>,
    bias: DVector<f64>,
}

impl LinearModel {
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: LinearModelFile =
            serde_json::from_str(&text).map_err(|source| ModelError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_parts(file)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let file: LinearModelFile = serde_json::from_str(json).map_err(|source| ModelError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::from_parts(file)
    }

    fn from_parts(file: LinearModelFile) -> Result<Self, ModelError> {
        if file.features != FEATURE_LEN {
            return Err(ModelError::FeatureLength {
                expected: FEATURE_LEN,
                actual: file.features,
            });
        }
        if file.window == 0 {
            return Err(ModelError::Shape("window must be at least 1".into()));
        }
        let classes = file.labels.len();
        if classes == 0 {
            return Err(ModelError::Shape("label map is empty".into()));
        }
        if file.weights.len() != classes || file.bias.len() != classes {
            return Err(ModelError::Shape(format!(
                "{} labels but {} weight rows and {} biases",
                classes,
                file.weights.len(),
                file.bias.len()
            )));
        }
        if let Some(row) = file.weights.iter().position(|r| r.len() != file.features) {
            return Err(ModelError::Shape(format!(
                "weight row {row} has {} values, expected {}",
                file.weights[row].len(),
                file.features
            )));
        }

        let weights = DMatrix::from_row_iterator(
            classes,
            file.features,
            file.weights.into_iter().flatten(),
        );
        Ok(Self {
            window: file.window,
            labels: file.labels,
            weights,
            bias: DVector::from_vec(file.bias),
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl GestureModel for LinearModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn window_len(&self) -> Option<usize> {
        Some(self.window)
    }

    fn predict(&self, window: &[FeatureVector]) -> Result<Prediction, ModelError> {
        if window.len() != self.window {
            return Err(ModelError::WindowLength {
                expected: self.window,
                actual: window.len(),
            });
        }

        let mut mean = DVector::<f64>::zeros(FEATURE_LEN);
        for frame in window {
            if frame.len() != FEATURE_LEN {
                return Err(ModelError::FeatureLength {
                    expected: FEATURE_LEN,
                    actual: frame.len(),
                });
            }
            mean += DVector::from_column_slice(frame.as_slice());
        }
        mean /= window.len() as f64;

        let logits = &self.weights * mean + &self.bias;
        let max = logits.max();
        let exp = logits.map(|v| (v - max).exp());
        let total = exp.sum();
        let best = exp.argmax().0;

        Ok(Prediction::new(self.labels[best].clone(), exp[best] / total))
    }
}

/// Picks the backend once, at construction. Any failure is logged here and
/// degrades to [`NullModel`].
pub fn load_model(config: &ModelConfig) -> Arc<dyn GestureModel> {
    let Some(path) = config.model_path.as_deref() else {
        info!("No gesture model configured, model path disabled");
        return Arc::new(NullModel);
    };
    match LinearModel::from_path(path) {
        Ok(model) => {
            info!(
                "Loaded gesture model from {} ({} labels)",
                path.display(),
                model.labels().len()
            );
            Arc::new(model)
        }
        Err(e) => {
            warn!("Gesture model unavailable, continuing without it: {}", e);
            Arc::new(NullModel)
        }
    }
}

/// Decides which raw predictions become commands.
#[derive(Debug, Clone)]
pub struct ModelGate {
    default_confidence: f64,
    thresholds: BTreeMap<String, f64>,
    negative_markers: Vec<String>,
    label_suffixes: Vec<String>,
}

impl ModelGate {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            default_confidence: config.default_confidence,
            thresholds: config.gesture_thresholds.clone(),
            negative_markers: config.negative_markers.clone(),
            label_suffixes: config.label_suffixes.clone(),
        }
    }

    /// Strips the first matching training-time suffix.
    pub fn clean_label<'a>(&self, raw: &'a str) -> &'a str {
        self.label_suffixes
            .iter()
            .find_map(|suffix| raw.strip_suffix(suffix.as_str()))
            .unwrap_or(raw)
    }

    /// Raw label first, then the cleaned label, then the global default.
    pub fn threshold_for(&self, raw: &str) -> f64 {
        self.thresholds
            .get(raw)
            .or_else(|| self.thresholds.get(self.clean_label(raw)))
            .copied()
            .unwrap_or(self.default_confidence)
    }

    pub fn is_negative(&self, raw: &str) -> bool {
        self.negative_markers
            .iter()
            .any(|marker| raw.contains(marker.as_str()))
    }

    /// Returns the cleaned label when the prediction should be acted on.
    pub fn accept(&self, prediction: &Prediction) -> Option<String> {
        let raw = prediction.label.as_deref().filter(|l| !l.is_empty())?;
        if self.is_negative(raw) {
            return None;
        }
        if prediction.confidence <= self.threshold_for(raw) {
            return None;
        }
        Some(self.clean_label(raw).to_string())
    }
}
