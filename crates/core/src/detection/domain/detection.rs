use serde::{Deserialize, Serialize};

use crate::detection::domain::fish_part::FishPart;
use crate::shared::bbox::BBox;

/// One object instance found in a frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    pub bbox: BBox,
    #[serde(default = "default_score")]
    pub score: f32,
}

fn default_score() -> f32 {
    1.0
}

impl Detection {
    pub fn new(class_id: u32, bbox: BBox, score: f32) -> Self {
        Self {
            class_id,
            bbox,
            score,
        }
    }

    /// Detection for a known part with full confidence.
    pub fn of(part: FishPart, bbox: BBox) -> Self {
        Self::new(part.class_id(), bbox, 1.0)
    }

    pub fn part(&self) -> Option<FishPart> {
        FishPart::from_class_id(self.class_id)
    }
}
