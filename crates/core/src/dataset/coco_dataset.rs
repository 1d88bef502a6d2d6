use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::detection::Detection;
use crate::shared::bbox::BBox;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid COCO annotations in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CocoImage {
    pub id: u64,
    pub file_name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CocoAnnotation {
    pub image_id: u64,
    pub category_id: u64,
    /// `[x, y, width, height]`
    pub bbox: [f64; 4],
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CocoCategory {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
struct CocoFile {
    images: Vec<CocoImage>,
    #[serde(default)]
    annotations: Vec<CocoAnnotation>,
    categories: Vec<CocoCategory>,
}

/// A COCO instances file plus the directory its images live in.
///
/// Category ids are remapped to contiguous class ids in ascending id order,
/// matching how the trainer numbers classes, so ground truth and model
/// output share one class space.
pub struct CocoDataset {
    name: String,
    image_root: PathBuf,
    images: Vec<CocoImage>,
    categories: Vec<CocoCategory>,
    class_ids: HashMap<u64, u32>,
    by_image: HashMap<u64, Vec<CocoAnnotation>>,
    annotation_count: usize,
}

impl CocoDataset {
    pub fn load(name: &str, json_path: &Path, image_root: &Path) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(json_path).map_err(|e| DatasetError::Io {
            path: json_path.to_path_buf(),
            source: e,
        })?;
        let file: CocoFile = serde_json::from_str(&text).map_err(|e| DatasetError::Parse {
            path: json_path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_parts(name, image_root, file))
    }

    fn from_parts(name: &str, image_root: &Path, file: CocoFile) -> Self {
        let mut categories = file.categories;
        categories.sort_by_key(|c| c.id);
        let class_ids = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i as u32))
            .collect();

        let annotation_count = file.annotations.len();
        let mut by_image: HashMap<u64, Vec<CocoAnnotation>> = HashMap::new();
        for ann in file.annotations {
            by_image.entry(ann.image_id).or_default().push(ann);
        }

        Self {
            name: name.to_string(),
            image_root: image_root.to_path_buf(),
            images: file.images,
            categories,
            class_ids,
            by_image,
            annotation_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn images(&self) -> &[CocoImage] {
        &self.images
    }

    pub fn categories(&self) -> &[CocoCategory] {
        &self.categories
    }

    pub fn annotation_count(&self) -> usize {
        self.annotation_count
    }

    pub fn image_path(&self, image: &CocoImage) -> PathBuf {
        self.image_root.join(&image.file_name)
    }

    /// Ground-truth boxes of one image as detections in model class space.
    /// Annotations naming an undeclared category are dropped.
    pub fn ground_truth(&self, image_id: u64) -> Vec<Detection> {
        self.by_image
            .get(&image_id)
            .map(|anns| {
                anns.iter()
                    .filter_map(|a| {
                        let Some(&class_id) = self.class_ids.get(&a.category_id) else {
                            log::warn!(
                                "Image {image_id}: annotation with unknown category {}",
                                a.category_id
                            );
                            return None;
                        };
                        let [x, y, w, h] = a.bbox;
                        Some(Detection::new(class_id, BBox::from_xywh(x, y, w, h), 1.0))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Up to `count` distinct images chosen at random.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&CocoImage> {
        self.images.choose_multiple(rng, count).collect()
    }

    pub fn summary(&self) -> String {
        let names: Vec<&str> = self.categories.iter().map(|c| c.name.as_str()).collect();
        format!(
            "dataset '{}': {} images, {} annotations, classes [{}]",
            self.name,
            self.images.len(),
            self.annotation_count,
            names.join(", ")
        )
    }
}
