use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::fish_part::FishPart;
use crate::shared::frame::Frame;
use crate::visualization::domain::frame_annotator::FrameAnnotator;

const DEFAULT_THICKNESS: u32 = 2;

/// Outline colour for classes outside the known parts.
const UNKNOWN_COLOR: Rgb<u8> = Rgb([160, 160, 160]);

/// Draws a coloured outline around every detection.
pub struct BoxAnnotator {
    thickness: u32,
}

impl BoxAnnotator {
    pub fn new(thickness: u32) -> Self {
        Self {
            thickness: thickness.max(1),
        }
    }
}

impl Default for BoxAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_THICKNESS)
    }
}

pub fn part_color(part: Option<FishPart>) -> Rgb<u8> {
    match part {
        Some(FishPart::Head) => Rgb([230, 60, 60]),
        Some(FishPart::Body) => Rgb([60, 180, 75]),
        Some(FishPart::Fish) => Rgb([0, 130, 200]),
        Some(FishPart::Mouth) => Rgb([245, 130, 48]),
        Some(FishPart::Finger) => Rgb([240, 50, 230]),
        None => UNKNOWN_COLOR,
    }
}

impl FrameAnnotator for BoxAnnotator {
    fn annotate(
        &self,
        frame: &Frame,
        detections: &[Detection],
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let mut img = frame.to_rgb_image();
        for detection in detections {
            if !detection.bbox.is_well_formed() {
                continue;
            }
            let Some((x, y, w, h)) = detection.bbox.clamp_to(frame.width(), frame.height())
            else {
                continue;
            };
            draw_outline(&mut img, (x, y, w, h), part_color(detection.part()), self.thickness);
        }
        Ok(Frame::from_rgb_image(img, frame.index()))
    }
}

/// Thick outlines are nested one-pixel rectangles growing inward.
fn draw_outline(
    img: &mut RgbImage,
    (x, y, w, h): (u32, u32, u32, u32),
    color: Rgb<u8>,
    thickness: u32,
) {
    for t in 0..thickness {
        let inset_w = w.saturating_sub(2 * t);
        let inset_h = h.saturating_sub(2 * t);
        if inset_w == 0 || inset_h == 0 {
            break;
        }
        let rect = Rect::at((x + t) as i32, (y + t) as i32).of_size(inset_w, inset_h);
        draw_hollow_rect_mut(img, rect, color);
    }
}
