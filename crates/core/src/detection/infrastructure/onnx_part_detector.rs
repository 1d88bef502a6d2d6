//! Fish-part detector backed by an exported Mask R-CNN model on ONNX Runtime.
//!
//! The exported graph contains the network's own pixel normalization but not
//! the test-time resize, so frames are resized here the same way the
//! training framework's predictor does (shortest edge to 800, longest edge
//! capped at 1333) and boxes are scaled back to frame coordinates.
use std::path::Path;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::part_detector::{DetectorError, PartDetector};
use crate::detection::infrastructure::execution_provider::preferred_execution_providers;
use crate::shared::bbox::BBox;
use crate::shared::constants::NUM_CLASSES;
use crate::shared::frame::Frame;

const MIN_SIZE_TEST: f64 = 800.0;
const MAX_SIZE_TEST: f64 = 1333.0;

/// Positions of the tensors the exported graph emits.
///
/// Tracing an instance-segmentation model flattens its output fields as
/// boxes, classes, masks, scores; masks are not needed for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputLayout {
    pub boxes: usize,
    pub classes: usize,
    pub scores: usize,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            boxes: 0,
            classes: 1,
            scores: 3,
        }
    }
}

impl OutputLayout {
    /// Rejects layouts that read two fields from the same tensor.
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.boxes == self.classes || self.boxes == self.scores || self.classes == self.scores
        {
            return Err(DetectorError::UnexpectedOutput(format!(
                "output positions must differ: boxes={}, classes={}, scores={}",
                self.boxes, self.classes, self.scores
            )));
        }
        Ok(())
    }

    /// Smallest number of outputs the graph must emit for this layout.
    pub fn required_outputs(&self) -> usize {
        self.boxes.max(self.classes).max(self.scores) + 1
    }
}

pub struct OnnxPartDetector {
    session: ort::session::Session,
    score_threshold: f32,
    layout: OutputLayout,
}

impl OnnxPartDetector {
    /// Load the exported model. Any failure here means there is no usable
    /// model, reported as [`DetectorError::ModelUnavailable`].
    pub fn new(model_path: &Path, score_threshold: f32) -> Result<Self, DetectorError> {
        let session = ort::session::Session::builder()
            .map_err(unavailable(model_path))?
            .with_execution_providers(preferred_execution_providers())
            .map_err(unavailable(model_path))?
            .commit_from_file(model_path)
            .map_err(unavailable(model_path))?;
        log::info!(
            "Loaded fish-part model from {} ({NUM_CLASSES} classes, score > {score_threshold})",
            model_path.display()
        );
        Ok(Self {
            session,
            score_threshold,
            layout: OutputLayout::default(),
        })
    }

    pub fn with_layout(mut self, layout: OutputLayout) -> Result<Self, DetectorError> {
        layout.validate()?;
        log::debug!("Using output layout {layout:?}");
        self.layout = layout;
        Ok(self)
    }
}

impl PartDetector for OnnxPartDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, DetectorError> {
        let scale = inference_scale(frame.width(), frame.height());
        let input = to_bgr_chw(frame, scale);

        let input_value = ort::value::Tensor::from_array(input).map_err(inference_error)?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(inference_error)?;

        let needed = self.layout.required_outputs();
        if outputs.len() < needed {
            return Err(DetectorError::UnexpectedOutput(format!(
                "expected at least {needed} outputs, got {}",
                outputs.len()
            )));
        }

        let boxes = outputs[self.layout.boxes]
            .try_extract_array::<f32>()
            .map_err(inference_error)?;
        let classes = outputs[self.layout.classes]
            .try_extract_array::<i64>()
            .map_err(inference_error)?;
        let scores = outputs[self.layout.scores]
            .try_extract_array::<f32>()
            .map_err(inference_error)?;

        let boxes: Vec<f32> = boxes.iter().copied().collect();
        let classes: Vec<i64> = classes.iter().copied().collect();
        let scores: Vec<f32> = scores.iter().copied().collect();

        parse_detections(&boxes, &classes, &scores, scale, self.score_threshold)
    }
}

fn unavailable<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> DetectorError + '_ {
    move |e| DetectorError::ModelUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn inference_error<E: std::fmt::Display>(e: E) -> DetectorError {
    DetectorError::Inference(e.to_string())
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize factor applied before inference.
fn inference_scale(width: u32, height: u32) -> f64 {
    let short = width.min(height) as f64;
    let long = width.max(height) as f64;
    if short <= 0.0 {
        return 1.0;
    }
    let mut scale = MIN_SIZE_TEST / short;
    if long * scale > MAX_SIZE_TEST {
        scale = MAX_SIZE_TEST / long;
    }
    scale
}

/// Nearest-neighbour resize into a `[3, H, W]` float tensor in BGR order,
/// values left in `0..=255`.
fn to_bgr_chw(frame: &Frame, scale: f64) -> ndarray::Array3<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let new_h = ((src_h as f64 * scale).round() as usize).max(1);
    let new_w = ((src_w as f64 * scale).round() as usize).max(1);

    let mut tensor = ndarray::Array3::<f32>::zeros((3, new_h, new_w));
    if src_h == 0 || src_w == 0 {
        return tensor;
    }
    for y in 0..new_h {
        let sy = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w {
            let sx = ((x as f64 / scale) as usize).min(src_w - 1);
            for c in 0..3 {
                // RGB source channel c lands in BGR slot 2 - c
                tensor[[2 - c, y, x]] = src[[sy, sx, c]] as f32;
            }
        }
    }
    tensor
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

fn parse_detections(
    boxes: &[f32],
    classes: &[i64],
    scores: &[f32],
    scale: f64,
    score_threshold: f32,
) -> Result<Vec<Detection>, DetectorError> {
    let n = scores.len();
    if classes.len() != n || boxes.len() != n * 4 {
        return Err(DetectorError::UnexpectedOutput(format!(
            "mismatched output lengths: {} boxes values, {} classes, {} scores",
            boxes.len(),
            classes.len(),
            n
        )));
    }

    let detections = (0..n)
        .filter(|&i| scores[i] > score_threshold)
        .filter_map(|i| {
            let class_id = u32::try_from(classes[i]).ok()?;
            let b = &boxes[i * 4..i * 4 + 4];
            let bbox = BBox::new(
                b[0] as f64 / scale,
                b[1] as f64 / scale,
                b[2] as f64 / scale,
                b[3] as f64 / scale,
            );
            Some(Detection::new(class_id, bbox, scores[i]))
        })
        .collect();
    Ok(detections)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scale_short_edge_to_800() {
        // 400x300 → short edge 300 → 800/300
        assert_relative_eq!(inference_scale(400, 300), 800.0 / 300.0);
    }

    #[test]
    fn test_scale_caps_long_edge() {
        // 4000x1000: 800/1000 = 0.8 would make the long side 3200 > 1333
        assert_relative_eq!(inference_scale(4000, 1000), 1333.0 / 4000.0);
    }

    #[test]
    fn test_scale_empty_frame() {
        assert_relative_eq!(inference_scale(0, 0), 1.0);
    }

    #[test]
    fn test_to_bgr_chw_swaps_channels() {
        // 2x1 frame: pixel (0,0) = (10,20,30), pixel (1,0) = (40,50,60)
        let frame = Frame::new(vec![10, 20, 30, 40, 50, 60], 2, 1, 0);
        let t = to_bgr_chw(&frame, 1.0);
        assert_eq!(t.shape(), &[3, 1, 2]);
        assert_eq!(t[[0, 0, 0]], 30.0); // B
        assert_eq!(t[[1, 0, 0]], 20.0); // G
        assert_eq!(t[[2, 0, 0]], 10.0); // R
        assert_eq!(t[[0, 0, 1]], 60.0);
    }

    #[test]
    fn test_to_bgr_chw_upscales() {
        let frame = Frame::new(vec![255; 2 * 2 * 3], 2, 2, 0);
        let t = to_bgr_chw(&frame, 2.0);
        assert_eq!(t.shape(), &[3, 4, 4]);
        assert!(t.iter().all(|&v| v == 255.0));
    }

    #[test]
    fn test_parse_filters_by_score() {
        let boxes = [
            0.0, 0.0, 10.0, 10.0, 20.0, 20.0, 40.0, 40.0, 5.0, 5.0, 15.0, 15.0,
        ];
        let classes = [0, 4, 2];
        let scores = [0.95, 0.5, 0.8];
        let dets = parse_detections(&boxes, &classes, &scores, 1.0, 0.8).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].class_id, 0);
        assert_relative_eq!(dets[0].score, 0.95);
    }

    #[test]
    fn test_parse_drops_score_equal_to_threshold() {
        let boxes = [0.0, 0.0, 10.0, 10.0];
        let dets = parse_detections(&boxes, &[1], &[0.8], 1.0, 0.8).unwrap();
        assert!(dets.is_empty());
    }

    #[test]
    fn test_parse_rescales_boxes_to_frame() {
        let boxes = [20.0, 40.0, 60.0, 80.0];
        let dets = parse_detections(&boxes, &[3], &[0.9], 2.0, 0.8).unwrap();
        assert_eq!(dets[0].bbox, BBox::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn test_parse_drops_negative_class_ids() {
        let boxes = [0.0, 0.0, 1.0, 1.0];
        let dets = parse_detections(&boxes, &[-1], &[0.9], 1.0, 0.8).unwrap();
        assert!(dets.is_empty());
    }

    #[test]
    fn test_parse_mismatched_lengths_errors() {
        let err = parse_detections(&[0.0; 4], &[0, 1], &[0.9], 1.0, 0.8).unwrap_err();
        assert!(matches!(err, DetectorError::UnexpectedOutput(_)));
    }

    #[test]
    fn test_parse_no_detections() {
        let dets = parse_detections(&[], &[], &[], 1.0, 0.8).unwrap();
        assert!(dets.is_empty());
    }

    #[test]
    fn test_missing_model_is_unavailable() {
        let result = OnnxPartDetector::new(Path::new("/nonexistent/model_final.onnx"), 0.8);
        assert!(matches!(
            result,
            Err(DetectorError::ModelUnavailable { .. })
        ));
    }

    #[test]
    fn test_default_layout() {
        let layout = OutputLayout::default();
        assert_eq!((layout.boxes, layout.classes, layout.scores), (0, 1, 3));
        assert_eq!(layout.required_outputs(), 4);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_custom_layout_requires_enough_outputs() {
        let layout = OutputLayout {
            boxes: 2,
            classes: 0,
            scores: 1,
        };
        assert!(layout.validate().is_ok());
        assert_eq!(layout.required_outputs(), 3);
    }

    #[test]
    fn test_layout_with_shared_position_is_rejected() {
        let layout = OutputLayout {
            boxes: 0,
            classes: 1,
            scores: 1,
        };
        assert!(matches!(
            layout.validate(),
            Err(DetectorError::UnexpectedOutput(_))
        ));
    }
}
