use std::collections::BTreeMap;
use std::fmt;

use crate::detection::domain::fish_part::FishPart;

/// Rounded midpoint of a detection's box, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Everything derived from one frame's detections.
///
/// Built fresh for every frame and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameResult {
    /// At most one entry per part; present only if the frame had a usable
    /// detection of that part.
    pub positions: BTreeMap<FishPart, Position>,
    /// Box area of the mouth detection, 0 when there was none.
    pub mouth_area: f64,
    pub is_tired: bool,
    pub is_hungry: bool,
    pub report_text: String,
}

impl FrameResult {
    pub fn position(&self, part: FishPart) -> Option<Position> {
        self.positions.get(&part).copied()
    }

    pub fn has(&self, part: FishPart) -> bool {
        self.positions.contains_key(&part)
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
