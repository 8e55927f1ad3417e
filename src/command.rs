// src/command.rs - Gesture commands handed to the action executor
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    PlayPause,
    NextTrack,
    VolumeUp,
    VolumeDown,
    /// Any other label coming out of the model vocabulary.
    Model(String),
}

#[derive(Serialize)]
struct CommandMessage<'a> {
    gesture: &'a str,
}

impl Command {
    pub fn from_label(label: &str) -> Self {
        match label {
            "play_pause" => Self::PlayPause,
            "next_track" => Self::NextTrack,
            "volume_up" => Self::VolumeUp,
            "volume_down" => Self::VolumeDown,
            other => Self::Model(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PlayPause => "play_pause",
            Self::NextTrack => "next_track",
            Self::VolumeUp => "volume_up",
            Self::VolumeDown => "volume_down",
            Self::Model(label) => label,
        }
    }

    /// Wire form sent back to the client: `{"gesture":"play_pause"}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&CommandMessage {
            gesture: self.as_str(),
        })
        .unwrap_or_default()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
