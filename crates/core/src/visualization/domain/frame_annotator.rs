use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for drawing detections onto a frame.
///
/// Draws from the raw detections, not from the derived report, and returns
/// a new frame so the source frame stays untouched.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &Frame,
        detections: &[Detection],
    ) -> Result<Frame, Box<dyn std::error::Error>>;
}
