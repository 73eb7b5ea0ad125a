use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Input and output locations for one pipeline run.
///
/// The default layout mirrors the historical working-directory convention:
/// `<base>/data/raw/measurements.csv` in, `<base>/data/processed` out.
///
/// Can also be stored as a JSON object on disk:
/// ```json
/// {
///   "input_path": "/srv/grid/raw/measurements.csv",
///   "output_dir": "/srv/grid/processed"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
}

impl PipelineConfig {
    /// Builds the standard `data/raw` / `data/processed` layout under `base`.
    pub fn from_base_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            input_path: base.join("data").join("raw").join("measurements.csv"),
            output_dir: base.join("data").join("processed"),
        }
    }

    /// Builds the standard layout under the process working directory.
    pub fn from_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|source| PipelineError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        Ok(Self::from_base_dir(cwd))
    }

    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| PipelineError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn with_input_path(mut self, input_path: impl Into<PathBuf>) -> Self {
        self.input_path = input_path.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_base_dir_layout() {
        let config = PipelineConfig::from_base_dir("/srv/grid");
        assert_eq!(
            config.input_path,
            PathBuf::from("/srv/grid/data/raw/measurements.csv")
        );
        assert_eq!(config.output_dir, PathBuf::from("/srv/grid/data/processed"));
    }

    #[test]
    fn test_overrides_replace_single_field() {
        let config = PipelineConfig::from_base_dir("/srv/grid").with_output_dir("/tmp/out");
        assert_eq!(
            config.input_path,
            PathBuf::from("/srv/grid/data/raw/measurements.csv")
        );
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(
            &path,
            r#"{"input_path": "in/m.csv", "output_dir": "out"}"#,
        )
        .unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.input_path, PathBuf::from("in/m.csv"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_load_rejects_missing_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{"input_path": "in/m.csv"}"#).unwrap();

        let err = PipelineConfig::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
    }
}
