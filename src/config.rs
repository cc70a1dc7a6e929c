//! JSON run configuration.
//!
//! ```json
//! {
//!   "input": "img/wdg2.bmp",
//!   "operator": "frei-chen",
//!   "border": "reflect",
//!   "thresholds": [20, 40, 80],
//!   "output_dir": "out"
//! }
//! ```
use crate::convolve::BorderMode;
use crate::error::{EdgeError, Result};
use crate::operator::Operator;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub input: PathBuf,
    pub operator: Operator,
    #[serde(default)]
    pub border: BorderMode,
    /// Cutoffs to render in order, like successive slider positions. Empty
    /// means one render without a cutoff.
    #[serde(default)]
    pub thresholds: Vec<u8>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("edges_output")
}

impl DetectorConfig {
    pub fn new(input: impl Into<PathBuf>, operator: Operator) -> Self {
        Self {
            input: input.into(),
            operator,
            border: BorderMode::default(),
            thresholds: Vec::new(),
            output_dir: default_output_dir(),
        }
    }
}

/// Reads and parses a [`DetectorConfig`].
///
/// # Errors
///
/// [`EdgeError::Config`] if the file cannot be read or is not valid.
pub fn load_config(path: &Path) -> Result<DetectorConfig> {
    let data = fs::read_to_string(path).map_err(|e| EdgeError::Config {
        path: path.to_path_buf(),
        message: format!("failed to read: {e}"),
    })?;
    serde_json::from_str(&data).map_err(|e| EdgeError::Config {
        path: path.to_path_buf(),
        message: format!("failed to parse: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(&path, r#"{ "input": "a.png", "operator": "sobel" }"#).unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg, DetectorConfig::new("a.png", Operator::Sobel));
    }

    #[test]
    fn full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(
            &path,
            r#"{
                "input": "img/wdg2.bmp",
                "operator": "marr-hildreth",
                "border": "reflect",
                "thresholds": [10, 30],
                "output_dir": "out"
            }"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.operator, Operator::MarrHildreth);
        assert_eq!(cfg.border, BorderMode::Reflect);
        assert_eq!(cfg.thresholds, vec![10, 30]);
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn bad_configs_report_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_config(&missing), Err(EdgeError::Config { .. })));

        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "input": "a.png", "operator": "scharr" }"#).unwrap();
        match load_config(&path) {
            Err(EdgeError::Config { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected {other:?}"),
        }
    }
}
