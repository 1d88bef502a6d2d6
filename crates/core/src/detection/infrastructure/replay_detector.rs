use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::domain::detection::Detection;
use crate::detection::domain::part_detector::{DetectorError, PartDetector};
use crate::shared::frame::Frame;

/// Per-frame detections recorded from an earlier run, keyed by frame index.
///
/// On disk: `{"frames": {"0": [{"class_id": 2, "bbox": {...}, "score": 0.9}], ...}}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecording {
    pub frames: HashMap<usize, Vec<Detection>>,
}

impl DetectionRecording {
    pub fn load(path: &Path) -> Result<Self, DetectorError> {
        let text = std::fs::read_to_string(path).map_err(|e| DetectorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn record(&mut self, frame_index: usize, detections: &[Detection]) {
        self.frames.insert(frame_index, detections.to_vec());
    }

    pub fn to_json(&self) -> Result<String, DetectorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the recording as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), DetectorError> {
        let json = self.to_json()?;
        let io_err = |e| DetectorError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, json).map_err(io_err)
    }
}

/// Replays recorded detections by frame index, so the reporting pipeline
/// can run without a model. Frames missing from the recording yield nothing.
pub struct ReplayDetector {
    recording: DetectionRecording,
}

impl ReplayDetector {
    pub fn new(recording: DetectionRecording) -> Self {
        Self { recording }
    }

    pub fn from_file(path: &Path) -> Result<Self, DetectorError> {
        let recording = DetectionRecording::load(path)?;
        log::info!(
            "Replaying detections for {} frames from {}",
            recording.frames.len(),
            path.display()
        );
        Ok(Self::new(recording))
    }
}

impl PartDetector for ReplayDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, DetectorError> {
        Ok(self
            .recording
            .frames
            .get(&frame.index())
            .cloned()
            .unwrap_or_default())
    }
}
