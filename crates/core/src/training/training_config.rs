use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    BASE_MODEL_CONFIG, CHECKPOINT_FILE_NAME, DATASET_NAME, DEFAULT_OUTPUT_DIR,
    DEFAULT_SCORE_THRESHOLD, NUM_CLASSES,
};

#[derive(Error, Debug)]
pub enum TrainingConfigError {
    #[error("num_classes must be at least 1")]
    NoClasses,
    #[error("base_lr must be positive, got {0}")]
    LearningRate(f64),
    #[error("ims_per_batch must be at least 1")]
    EmptyBatch,
    #[error("max_iter must be at least 1")]
    NoIterations,
    #[error("score_thresh_test must be between 0.0 and 1.0, got {0}")]
    ScoreThreshold(f32),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetsConfig {
    pub train: Vec<String>,
    pub test: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub ims_per_batch: u32,
    pub base_lr: f64,
    pub max_iter: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub score_thresh_test: f32,
    pub weights: PathBuf,
}

/// Settings handed to the external trainer, and the inference settings the
/// trained model is later run with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub base_config: String,
    pub datasets: DatasetsConfig,
    pub num_workers: u32,
    pub num_classes: usize,
    pub solver: SolverConfig,
    pub output_dir: PathBuf,
    pub inference: InferenceConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::with_output_dir(Path::new(DEFAULT_OUTPUT_DIR))
    }
}

impl TrainingConfig {
    pub fn with_output_dir(output_dir: &Path) -> Self {
        Self {
            base_config: BASE_MODEL_CONFIG.to_string(),
            datasets: DatasetsConfig {
                train: vec![DATASET_NAME.to_string()],
                test: Vec::new(),
            },
            num_workers: 0,
            num_classes: NUM_CLASSES,
            solver: SolverConfig {
                ims_per_batch: 2,
                base_lr: 0.0001,
                max_iter: 100,
            },
            output_dir: output_dir.to_path_buf(),
            inference: InferenceConfig {
                score_thresh_test: DEFAULT_SCORE_THRESHOLD,
                weights: output_dir.join(CHECKPOINT_FILE_NAME),
            },
        }
    }

    pub fn validate(&self) -> Result<(), TrainingConfigError> {
        if self.num_classes == 0 {
            return Err(TrainingConfigError::NoClasses);
        }
        if self.solver.base_lr.is_nan() || self.solver.base_lr <= 0.0 {
            return Err(TrainingConfigError::LearningRate(self.solver.base_lr));
        }
        if self.solver.ims_per_batch == 0 {
            return Err(TrainingConfigError::EmptyBatch);
        }
        if self.solver.max_iter == 0 {
            return Err(TrainingConfigError::NoIterations);
        }
        if !(0.0..=1.0).contains(&self.inference.score_thresh_test) {
            return Err(TrainingConfigError::ScoreThreshold(
                self.inference.score_thresh_test,
            ));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, TrainingConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates, then writes pretty JSON to `path`.
    pub fn write(&self, path: &Path) -> Result<(), TrainingConfigError> {
        self.validate()?;
        let json = self.to_json()?;
        let io_err = |e| TrainingConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, json).map_err(io_err)?;
        log::info!("Training configuration written to {}", path.display());
        Ok(())
    }
}
