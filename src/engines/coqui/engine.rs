use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{ModelRef, SynthesisEngine, SynthesisResult};

use super::cli::{probe, run_tts, synthesis_args, LoadedModel};

#[derive(thiserror::Error, Debug)]
pub enum CoquiError {
    #[error("{0} not found. Install Coqui TTS: `pip install TTS`")]
    TtsNotFound(String),
    #[error("Model not found: {}", .0.display())]
    ModelNotFound(PathBuf),
    #[error("Model config not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("Model not loaded. Call load_model() first.")]
    ModelNotLoaded,
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode synthesized audio: {0}")]
    Wav(#[from] hound::Error),
}

/// Parameters for configuring Coqui model loading.
#[derive(Debug, Clone, Default)]
pub struct CoquiModelParams {
    /// `config.json` next to a fine-tuned checkpoint. Ignored for named models.
    pub config_path: Option<PathBuf>,
    /// Run inference on the GPU.
    pub use_cuda: bool,
}

/// Coqui TTS engine driven through its `tts` command line tool.
///
/// Loading validates the model reference and the tool once; every synthesis
/// call then runs one `tts` process against the loaded model.
///
/// ```rust,no_run
/// use voiceclone_rs::{ModelRef, SynthesisEngine, engines::coqui::{CoquiEngine, CoquiModelParams}};
/// use std::path::PathBuf;
///
/// let mut engine = CoquiEngine::new();
/// engine.load_model_with_params(
///     &ModelRef::Path(PathBuf::from("my_finetuned_model/best_model.pth")),
///     CoquiModelParams {
///         config_path: Some(PathBuf::from("my_finetuned_model/config.json")),
///         use_cuda: true,
///     },
/// )?;
/// engine.synthesize_to_file("سلام دنیا", "fa", &PathBuf::from("output.wav"))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct CoquiEngine {
    bin_path: PathBuf,
    model: Option<LoadedModel>,
}

impl Default for CoquiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CoquiEngine {
    /// Create a new engine that uses `tts` from PATH.
    pub fn new() -> Self {
        Self::with_binary("tts")
    }

    /// Create a new engine with an explicit `tts` binary, e.g. inside a virtualenv.
    pub fn with_binary(bin_path: impl Into<PathBuf>) -> Self {
        Self {
            bin_path: bin_path.into(),
            model: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    fn loaded(&self) -> Result<&LoadedModel, CoquiError> {
        self.model.as_ref().ok_or(CoquiError::ModelNotLoaded)
    }

    /// Synthesize into `scratch`, decode it, and remove it whether or not
    /// synthesis succeeded.
    fn synthesize_via(
        &mut self,
        text: &str,
        language: &str,
        scratch: &Path,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
        let result = self
            .synthesize_to_file(text, language, scratch)
            .and_then(|()| {
                let bytes = std::fs::read(scratch).map_err(CoquiError::Io)?;
                Ok(SynthesisResult::from_wav_bytes(&bytes).map_err(CoquiError::Wav)?)
            });
        remove_scratch(scratch);
        result
    }
}

impl Drop for CoquiEngine {
    fn drop(&mut self) {
        self.unload_model();
    }
}

fn remove_scratch(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Could not remove scratch file {}: {e}", path.display());
        }
    }
}

fn scratch_wav_path() -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("voiceclone-{}-{n}.wav", std::process::id()))
}

impl SynthesisEngine for CoquiEngine {
    type ModelParams = CoquiModelParams;

    fn load_model_with_params(
        &mut self,
        model: &ModelRef,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let ModelRef::Path(path) = model {
            if !path.exists() {
                return Err(CoquiError::ModelNotFound(path.clone()).into());
            }
            if let Some(config) = &params.config_path {
                if !config.exists() {
                    return Err(CoquiError::ConfigNotFound(config.clone()).into());
                }
            }
        }
        probe(&self.bin_path)?;

        log::info!("Loading model from: {model}");
        self.model = Some(LoadedModel {
            model: model.clone(),
            config_path: params.config_path,
            use_cuda: params.use_cuda,
        });
        Ok(())
    }

    fn unload_model(&mut self) {
        self.model = None;
    }

    fn synthesize(
        &mut self,
        text: &str,
        language: &str,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
        self.synthesize_via(text, language, &scratch_wav_path())
    }

    fn synthesize_to_file(
        &mut self,
        text: &str,
        language: &str,
        wav_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let model = self.loaded()?;
        let args = synthesis_args(model, text, language, wav_path);
        run_tts(&self.bin_path, &args)?;

        if !wav_path.exists() {
            return Err(CoquiError::SynthesisFailed(format!(
                "tts reported success but wrote no file at {}",
                wav_path.display()
            ))
            .into());
        }
        Ok(())
    }
}
