//! Coqui TTS engine implementation.
//!
//! Drives the `tts` command line tool shipped with Coqui TTS. A fine-tuned
//! checkpoint (plus its `config.json`) or a named pretrained model can be
//! used; the target language is passed per call as `--language_idx`.
//!
//! # System Requirements
//!
//! **Coqui TTS** must be installed and its `tts` entry point reachable:
//! - `pip install TTS`
//! - A CUDA-capable GPU is optional; set `use_cuda` to run on it.
//!
//! # Model Directory Layout
//!
//! ```text
//! my_finetuned_model/
//! ├── best_model.pth   # checkpoint passed as ModelRef::Path
//! └── config.json      # CoquiModelParams::config_path
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use voiceclone_rs::{ModelRef, SynthesisEngine, engines::coqui::CoquiEngine};
//! use std::path::PathBuf;
//!
//! let mut engine = CoquiEngine::new();
//! engine.load_model(&ModelRef::Named(
//!     "tts_models/multilingual/multi-dataset/vits".to_string(),
//! ))?;
//!
//! let result = engine.synthesize("سلام دنیا", "fa")?;
//! println!("Generated {} samples at {}Hz", result.samples.len(), result.sample_rate);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cli;
pub mod engine;

pub use engine::{CoquiEngine, CoquiError, CoquiModelParams};
