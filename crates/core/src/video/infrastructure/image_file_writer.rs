use std::path::Path;

use image::imageops::{self, FilterType};

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Saves frames with the `image` crate; the format follows the extension.
#[derive(Default)]
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        size: Option<(u32, u32)>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = frame.to_rgb_image();
        let img = match size {
            Some((w, h)) if (w, h) != img.dimensions() => {
                imageops::resize(&img, w, h, FilterType::Triangle)
            }
            _ => img,
        };
        img.save(path)?;
        Ok(())
    }
}
