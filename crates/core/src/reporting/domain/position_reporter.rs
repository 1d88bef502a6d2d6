use std::fmt::Write;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::fish_part::FishPart;
use crate::reporting::domain::frame_result::{FrameResult, Position};
use crate::shared::constants::DEFAULT_HUNGRY_MOUTH_AREA;

/// Tunable limits for the single-frame welfare heuristics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateThresholds {
    /// Mouth box area that must be exceeded for the hungry flag.
    pub hungry_mouth_area: f64,
}

impl Default for StateThresholds {
    fn default() -> Self {
        Self {
            hungry_mouth_area: DEFAULT_HUNGRY_MOUTH_AREA,
        }
    }
}

/// Turns one frame's detections into part positions, a text report and
/// the tired/hungry flags.
///
/// Stateless: the result depends only on the detections passed in.
/// Detections with an unknown class id or a malformed box are skipped;
/// when a part is detected more than once the last detection wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct PositionReporter {
    thresholds: StateThresholds,
}

impl PositionReporter {
    pub fn new(thresholds: StateThresholds) -> Self {
        Self { thresholds }
    }

    pub fn compute(&self, detections: &[Detection]) -> FrameResult {
        let mut result = FrameResult::default();

        for detection in detections {
            let Some(part) = detection.part() else {
                log::trace!("Ignoring unknown class id {}", detection.class_id);
                continue;
            };
            if !detection.bbox.is_well_formed() {
                log::debug!("Skipping malformed {part} box {:?}", detection.bbox);
                continue;
            }

            let (x, y) = detection.bbox.midpoint();
            result.positions.insert(part, Position::new(x, y));
            if part == FishPart::Mouth {
                result.mouth_area = detection.bbox.area();
            }
        }

        let finger = result.has(FishPart::Finger);
        result.is_tired = finger && !result.has(FishPart::Head);
        result.is_hungry = finger && result.mouth_area > self.thresholds.hungry_mouth_area;
        result.report_text = report_text(&result);
        result
    }
}

/// Computes a frame result with the default thresholds.
pub fn compute_frame_result(detections: &[Detection]) -> FrameResult {
    PositionReporter::default().compute(detections)
}

fn report_text(result: &FrameResult) -> String {
    let mut text = String::new();
    for part in FishPart::REPORT_ORDER {
        if let Some(pos) = result.position(part) {
            // Writing into a String cannot fail.
            let _ = writeln!(text, "{} Pos: {pos}", part.label());
        }
    }
    text
}
