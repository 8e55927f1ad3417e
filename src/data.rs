// src/data.rs - Recorded gesture sequences, offline replay, and command export
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use csv::Writer;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::engine::GestureEngine;
use crate::landmarks::LandmarkFrame;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Failed to read sequence {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse sequence {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Replay frame rate {0} is out of range")]
    FrameRate(f64),
}

/// Recorded sessions come either wrapped (`{"sequence": [...]}`) or as a
/// bare list of frames.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordedSequence {
    Wrapped { sequence: Vec<LandmarkFrame> },
    Bare(Vec<LandmarkFrame>),
}

pub fn parse_sequence(json: &str) -> serde_json::Result<Vec<LandmarkFrame>> {
    let recorded: RecordedSequence = serde_json::from_str(json)?;
    Ok(match recorded {
        RecordedSequence::Wrapped { sequence } => sequence,
        RecordedSequence::Bare(frames) => frames,
    })
}

pub fn load_sequence(path: &Path) -> Result<Vec<LandmarkFrame>, DataError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_sequence(&text).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayEvent {
    pub frame: usize,
    pub timestamp: f64,
    pub command: Command,
}

/// Feeds `frames` through `engine` on a synthetic clock running at `fps`, so
/// cooldowns behave the same on every run.
pub fn replay(
    engine: &mut GestureEngine,
    frames: &[LandmarkFrame],
    fps: f64,
) -> Result<Vec<ReplayEvent>, DataError> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(DataError::FrameRate(fps));
    }
    let start = Instant::now();
    let mut events = Vec::new();

    for (i, frame) in frames.iter().enumerate() {
        let timestamp = i as f64 / fps;
        let now = Duration::try_from_secs_f64(timestamp)
            .ok()
            .and_then(|offset| start.checked_add(offset))
            .ok_or(DataError::FrameRate(fps))?;
        if let Some(command) = engine.process_frame_at(frame, now) {
            events.push(ReplayEvent {
                frame: i,
                timestamp,
                command,
            });
        }
    }
    Ok(events)
}

#[derive(Debug, Serialize)]
struct CommandRecord<'a> {
    frame: usize,
    timestamp: f64,
    gesture: &'a str,
}

/// Collects emitted commands for one session and writes them as CSV.
pub struct CommandLog {
    output_dir: PathBuf,
    session_name: String,
    events: Vec<ReplayEvent>,
}

impl CommandLog {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            events: Vec::new(),
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn record(&mut self, event: ReplayEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = ReplayEvent>) {
        self.events.extend(events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Writes `<output_dir>/<session>/commands.csv` and returns its path.
    pub fn export_csv(&self) -> Result<PathBuf, DataError> {
        let session_dir = self.output_dir.join(&self.session_name);
        std::fs::create_dir_all(&session_dir).map_err(|source| DataError::CreateDir {
            path: session_dir.clone(),
            source,
        })?;

        let csv_path = session_dir.join("commands.csv");
        let file = File::create(&csv_path)?;
        let mut writer = Writer::from_writer(file);
        for event in &self.events {
            writer.serialize(CommandRecord {
                frame: event.frame,
                timestamp: event.timestamp,
                gesture: event.command.as_str(),
            })?;
        }
        writer.flush()?;
        Ok(csv_path)
    }
}
