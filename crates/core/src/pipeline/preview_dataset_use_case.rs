use std::path::{Path, PathBuf};

use rand::RngCore;

use crate::dataset::coco_dataset::{CocoDataset, CocoImage};
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::visualization::domain::frame_annotator::FrameAnnotator;

/// Draws the ground-truth boxes of a few random dataset images so the
/// labelling can be eyeballed before training.
pub struct PreviewDatasetUseCase {
    reader: Box<dyn VideoReader>,
    annotator: Box<dyn FrameAnnotator>,
    image_writer: Box<dyn ImageWriter>,
    rng: Box<dyn RngCore + Send>,
}

impl PreviewDatasetUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        annotator: Box<dyn FrameAnnotator>,
        image_writer: Box<dyn ImageWriter>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            reader,
            annotator,
            image_writer,
            rng,
        }
    }

    /// Returns the written preview paths, one per sampled image.
    pub fn execute(
        &mut self,
        dataset: &CocoDataset,
        output_dir: &Path,
        samples: usize,
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        log::info!("Loaded {}", dataset.summary());

        let picked = dataset.sample(samples, &mut *self.rng);
        let mut written = Vec::with_capacity(picked.len());
        for image in picked {
            let source = dataset.image_path(image);
            self.reader.open(&source)?;
            let frame = self
                .reader
                .frames()
                .next()
                .ok_or_else(|| format!("No image data in {}", source.display()))??;
            self.reader.close();

            let truth = dataset.ground_truth(image.id);
            log::debug!("{}: {} annotations", image.file_name, truth.len());
            let annotated = self.annotator.annotate(&frame, &truth)?;

            let path = output_dir.join(preview_name(image));
            self.image_writer.write(&path, &annotated, None)?;
            written.push(path);
        }

        log::info!(
            "Wrote {} dataset previews to {}",
            written.len(),
            output_dir.display()
        );
        Ok(written)
    }
}

fn preview_name(image: &CocoImage) -> String {
    let stem = Path::new(&image.file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    format!("{}_{stem}.jpg", image.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection::Detection;
    use crate::shared::frame::Frame;
    use crate::shared::video_metadata::VideoMetadata;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    /// Serves a blank frame for any path and records what was opened.
    struct StubImageReader {
        opened: Arc<Mutex<Vec<PathBuf>>>,
        pending: bool,
        missing: bool,
    }

    impl VideoReader for StubImageReader {
        fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            if self.missing {
                return Err(format!("cannot open {}", path.display()).into());
            }
            self.opened.lock().unwrap().push(path.to_path_buf());
            self.pending = true;
            Ok(VideoMetadata::still_image(8, 8, Some(path.to_path_buf())))
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            let frame = std::mem::take(&mut self.pending)
                .then(|| Frame::new(vec![0; 8 * 8 * 3], 8, 8, 0));
            Box::new(frame.into_iter().map(Ok))
        }

        fn close(&mut self) {
            self.pending = false;
        }
    }

    struct RecordingAnnotator {
        seen: Arc<Mutex<Vec<Vec<Detection>>>>,
    }

    impl FrameAnnotator for RecordingAnnotator {
        fn annotate(
            &self,
            frame: &Frame,
            detections: &[Detection],
        ) -> Result<Frame, Box<dyn std::error::Error>> {
            self.seen.lock().unwrap().push(detections.to_vec());
            Ok(frame.clone())
        }
    }

    struct StubImageWriter {
        written: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ImageWriter for StubImageWriter {
        fn write(
            &self,
            path: &Path,
            _frame: &Frame,
            _size: Option<(u32, u32)>,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.written.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    // --- Helpers ---

    const COCO: &str = r#"{
        "images": [
            {"id": 1, "file_name": "tank_001.jpg", "width": 8, "height": 8},
            {"id": 2, "file_name": "tank_002.jpg", "width": 8, "height": 8},
            {"id": 3, "file_name": "tank_003.jpg", "width": 8, "height": 8},
            {"id": 4, "file_name": "tank_004.jpg", "width": 8, "height": 8}
        ],
        "annotations": [
            {"id": 1, "image_id": 1, "category_id": 1, "bbox": [1, 1, 2, 2]},
            {"id": 2, "image_id": 2, "category_id": 2, "bbox": [1, 1, 2, 2]},
            {"id": 3, "image_id": 3, "category_id": 3, "bbox": [1, 1, 2, 2]},
            {"id": 4, "image_id": 4, "category_id": 4, "bbox": [1, 1, 2, 2]},
            {"id": 5, "image_id": 4, "category_id": 5, "bbox": [1, 1, 2, 2]}
        ],
        "categories": [
            {"id": 1, "name": "head"}, {"id": 2, "name": "body"},
            {"id": 3, "name": "fish"}, {"id": 4, "name": "mouth"},
            {"id": 5, "name": "finger"}
        ]
    }"#;

    fn dataset(dir: &Path) -> CocoDataset {
        let json = dir.join("trainval.json");
        std::fs::write(&json, COCO).unwrap();
        CocoDataset::load("fishdata", &json, &dir.join("images")).unwrap()
    }

    struct Harness {
        opened: Arc<Mutex<Vec<PathBuf>>>,
        annotated: Arc<Mutex<Vec<Vec<Detection>>>>,
        written: Arc<Mutex<Vec<PathBuf>>>,
    }

    fn build(seed: u64, missing: bool) -> (PreviewDatasetUseCase, Harness) {
        let h = Harness {
            opened: Arc::new(Mutex::new(Vec::new())),
            annotated: Arc::new(Mutex::new(Vec::new())),
            written: Arc::new(Mutex::new(Vec::new())),
        };
        let uc = PreviewDatasetUseCase::new(
            Box::new(StubImageReader {
                opened: h.opened.clone(),
                pending: false,
                missing,
            }),
            Box::new(RecordingAnnotator {
                seen: h.annotated.clone(),
            }),
            Box::new(StubImageWriter {
                written: h.written.clone(),
            }),
            Box::new(StdRng::seed_from_u64(seed)),
        );
        (uc, h)
    }

    // --- Tests ---

    #[test]
    fn test_writes_one_preview_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(dir.path());
        let (mut uc, h) = build(1, false);

        let out = dir.path().join("previews");
        let paths = uc.execute(&ds, &out, 3).unwrap();

        assert_eq!(paths.len(), 3);
        assert_eq!(*h.written.lock().unwrap(), paths);
        assert!(paths.iter().all(|p| p.starts_with(&out)));
        let opened = h.opened.lock().unwrap();
        assert_eq!(opened.len(), 3);
        assert!(opened.iter().all(|p| p.starts_with(dir.path().join("images"))));
    }

    #[test]
    fn test_annotates_with_ground_truth() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(dir.path());
        let (mut uc, h) = build(2, false);

        let paths = uc.execute(&ds, dir.path(), 4).unwrap();
        let annotated = h.annotated.lock().unwrap();
        for (path, truth) in paths.iter().zip(annotated.iter()) {
            let name = path.file_name().unwrap().to_str().unwrap();
            let expected = if name.starts_with("4_") { 2 } else { 1 };
            assert_eq!(truth.len(), expected, "{name}");
        }
    }

    #[test]
    fn test_same_seed_same_sample() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(dir.path());
        let (mut a, _) = build(42, false);
        let (mut b, _) = build(42, false);
        assert_eq!(
            a.execute(&ds, dir.path(), 2).unwrap(),
            b.execute(&ds, dir.path(), 2).unwrap()
        );
    }

    #[test]
    fn test_unreadable_image_errors() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(dir.path());
        let (mut uc, h) = build(1, true);
        assert!(uc.execute(&ds, dir.path(), 1).is_err());
        assert!(h.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_preview_name_uses_id_and_stem() {
        let image = CocoImage {
            id: 7,
            file_name: "sub/tank_007.png".into(),
            width: 0,
            height: 0,
        };
        assert_eq!(preview_name(&image), "7_tank_007.jpg");
    }
}
