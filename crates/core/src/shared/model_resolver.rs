use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::MODEL_FILE_NAME;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model file not found: {0}")]
    Missing(PathBuf),
    #[error("no trained model found (searched: {}); train and export the model first", display_paths(.searched))]
    NotTrained { searched: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Locate the exported inference model.
///
/// Resolution order:
/// 1. Explicit path (must exist; no fallback if it does not)
/// 2. `<output_dir>/model_final.onnx`, where the trainer leaves its output
/// 3. User cache directory (platform-specific)
pub fn resolve_weights(
    explicit: Option<&Path>,
    output_dir: &Path,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(ModelResolveError::Missing(path.to_path_buf()))
        };
    }

    let mut searched = vec![output_dir.join(MODEL_FILE_NAME)];
    if let Some(dir) = model_cache_dir() {
        searched.push(dir.join(MODEL_FILE_NAME));
    }

    match searched.iter().find(|p| p.is_file()) {
        Some(found) => {
            log::debug!("Resolved model weights at {}", found.display());
            Ok(found.clone())
        }
        None => Err(ModelResolveError::NotTrained { searched }),
    }
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/fishwatch/models/`
/// - Linux: `$XDG_CACHE_HOME/fishwatch/models/` or `~/.cache/fishwatch/models/`
/// - Windows: `%LOCALAPPDATA%/fishwatch/models/`
pub fn model_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir().map(|d| d.join("fishwatch").join("models"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir().map(|d| d.join("fishwatch").join("models"))
    }
}
