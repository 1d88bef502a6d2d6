use std::path::Path;

use crate::shared::frame::Frame;

/// Persists a single frame (annotated output, dataset previews).
pub trait ImageWriter: Send {
    /// Writes `frame` to `path`, scaled to `size` when given.
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        size: Option<(u32, u32)>,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
