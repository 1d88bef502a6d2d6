use std::path::PathBuf;

use thiserror::Error;

use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DetectorError {
    /// The trained model could not be located or loaded. Frames cannot be
    /// processed until a working detector is supplied.
    #[error("model unavailable at {path}: {reason}")]
    ModelUnavailable { path: PathBuf, reason: String },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
    #[error("detection recording {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid recorded detections: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Domain interface for fish-part detection.
///
/// Implementations may keep state between frames, hence `&mut self`.
pub trait PartDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, DetectorError>;
}
