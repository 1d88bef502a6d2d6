/// Number of object classes the detector was trained on (background excluded).
pub const NUM_CLASSES: usize = 5;

/// Mouth box area (square pixels) above which a fish next to a finger
/// counts as hungry.
pub const DEFAULT_HUNGRY_MOUTH_AREA: f64 = 10_000.0;

/// Minimum detection score kept at inference time.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.8;

/// Exported inference model file produced next to the trainer's checkpoint.
pub const MODEL_FILE_NAME: &str = "model_final.onnx";

/// Checkpoint file written by the external trainer.
pub const CHECKPOINT_FILE_NAME: &str = "model_final.pth";

pub const DEFAULT_OUTPUT_DIR: &str = "./output";

pub const DATASET_NAME: &str = "fishdata";

pub const BASE_MODEL_CONFIG: &str = "COCO-InstanceSegmentation/mask_rcnn_R_50_FPN_3x.yaml";

/// Size annotated frames are scaled to for display.
pub const DISPLAY_WIDTH: u32 = 960;
pub const DISPLAY_HEIGHT: u32 = 540;

/// Number of dataset images drawn when previewing annotations.
pub const DEFAULT_PREVIEW_SAMPLES: usize = 3;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
