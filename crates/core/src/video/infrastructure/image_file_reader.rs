use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Presents a single image file as a one-frame video, so stills and videos
/// go through the same monitoring loop.
#[derive(Default)]
pub struct ImageFileReader {
    frame: Option<Frame>,
}

impl ImageFileReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VideoReader for ImageFileReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        self.frame = Some(Frame::from_rgb_image(img, 0));
        Ok(VideoMetadata::still_image(
            width,
            height,
            Some(path.to_path_buf()),
        ))
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.frame.take() {
            Some(frame) => Box::new(std::iter::once(Ok(frame))),
            None => Box::new(std::iter::once(Err("ImageFileReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.frame = None;
    }
}
