use std::path::PathBuf;

/// Stream properties reported by a [`VideoReader`] when it opens a source.
///
/// [`VideoReader`]: crate::video::domain::video_reader::VideoReader
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Frame count from the container; 0 when the container does not say.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Metadata for a still image treated as a one-frame video.
    pub fn still_image(width: u32, height: u32, source_path: Option<PathBuf>) -> Self {
        Self {
            width,
            height,
            fps: 0.0,
            total_frames: 1,
            codec: String::new(),
            source_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_image_metadata() {
        let meta = VideoMetadata::still_image(800, 600, Some(PathBuf::from("/tmp/fish.png")));
        assert_eq!(meta.total_frames, 1);
        assert_eq!(meta.fps, 0.0);
        assert_eq!(meta.codec, "");
        assert_eq!(meta.source_path, Some(PathBuf::from("/tmp/fish.png")));
    }

    #[test]
    fn test_clone_is_equal() {
        let meta = VideoMetadata {
            width: 1920,
            height: 1080,
            fps: 30.0,
            total_frames: 900,
            codec: "h264".to_string(),
            source_path: None,
        };
        assert_eq!(meta.clone(), meta);
    }
}
