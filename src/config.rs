//! Project-wide settings, loadable from a JSON file.
//!
//! Every section has defaults, so a file only needs the keys it changes:
//!
//! ```json
//! {
//!   "prepare": { "input_dir": "recordings", "sample_rate": 24000 },
//!   "batch": { "model": { "path": "my_finetuned_model/best_model.pth" }, "language": "fa" },
//!   "engine": { "config_path": "my_finetuned_model/config.json", "use_cuda": true }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::corpus::PrepareConfig;
use crate::engines::coqui::{CoquiEngine, CoquiModelParams};
use crate::preflight::PreflightConfig;
use crate::synthesis::BatchConfig;
use crate::{Error, Result};

/// How to reach the Coqui `tts` tool and load its model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tts_binary: PathBuf,
    /// `config.json` for a fine-tuned checkpoint.
    pub config_path: Option<PathBuf>,
    pub use_cuda: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tts_binary: PathBuf::from("tts"),
            config_path: None,
            use_cuda: false,
        }
    }
}

impl EngineConfig {
    pub fn engine(&self) -> CoquiEngine {
        CoquiEngine::with_binary(&self.tts_binary)
    }

    pub fn model_params(&self) -> CoquiModelParams {
        CoquiModelParams {
            config_path: self.config_path.clone(),
            use_cuda: self.use_cuda,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub prepare: PrepareConfig,
    pub batch: BatchConfig,
    pub engine: EngineConfig,
    pub preflight: PreflightConfig,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.prepare.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::IndexMode;
    use crate::ModelRef;

    #[test]
    fn partial_file_keeps_defaults_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voiceclone.json");
        fs::write(
            &path,
            r#"{
                "prepare": { "input_dir": "recordings", "sample_rate": 24000, "index_mode": "dense" },
                "batch": { "model": { "named": "tts_models/multilingual/multi-dataset/vits" } },
                "engine": { "use_cuda": true }
            }"#,
        )
        .unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.prepare.input_dir, PathBuf::from("recordings"));
        assert_eq!(config.prepare.output_dir, PathBuf::from("dataset"));
        assert_eq!(config.prepare.sample_rate, 24000);
        assert_eq!(config.prepare.index_mode, IndexMode::Dense);
        assert_eq!(
            config.batch.model,
            ModelRef::Named("tts_models/multilingual/multi-dataset/vits".into())
        );
        assert_eq!(config.batch.language, "fa");
        assert!(config.engine.model_params().use_cuda);
        assert_eq!(config.preflight, PreflightConfig::default());
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voiceclone.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ProjectConfig::load(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn zero_sample_rate_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voiceclone.json");
        fs::write(&path, r#"{ "prepare": { "sample_rate": 0 } }"#).unwrap();
        assert!(matches!(ProjectConfig::load(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProjectConfig::load_or_default(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
        assert_eq!(ProjectConfig::load_or_default(None).unwrap(), ProjectConfig::default());
    }
}
