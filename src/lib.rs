//! # voiceclone-rs
//!
//! Tooling for building a small voice-cloning corpus and driving batch speech
//! synthesis for a single target language.
//!
//! ## Pipelines
//!
//! - **Corpus preparation** ([`corpus`]): discovers raw recordings under a
//!   directory, converts each one to a canonical mono 16-bit WAV via an
//!   external [`transcode::Transcoder`], and writes a `metadata.csv` template
//!   pairing every converted file with a placeholder transcript.
//! - **Batch synthesis** ([`synthesis`]): reads a text file, loads a
//!   [`SynthesisEngine`] once and synthesizes one `output_NNN.wav` per
//!   non-blank line. A failing line is recorded and skipped.
//! - **Environment report** ([`preflight`]): collect-all checks for the
//!   external tools both pipelines depend on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use voiceclone_rs::corpus::{prepare_corpus, PrepareConfigBuilder};
//! use voiceclone_rs::transcode::FfmpegTranscoder;
//!
//! let config = PrepareConfigBuilder::default()
//!     .input_dir("raw_audio")
//!     .output_dir("dataset")
//!     .build()?;
//! let report = prepare_corpus(&config, &mut FfmpegTranscoder::new())?;
//! println!("{} of {} files converted", report.converted, report.attempted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ```rust,no_run
//! use voiceclone_rs::engines::coqui::CoquiEngine;
//! use voiceclone_rs::synthesis::{BatchConfigBuilder, BatchSynthesisRunner};
//! use voiceclone_rs::ModelRef;
//!
//! let config = BatchConfigBuilder::default()
//!     .text_file("sentences.txt")
//!     .model(ModelRef::Path("my_finetuned_model/best_model.pth".into()))
//!     .output_dir("batch_output")
//!     .build()?;
//! let summary = BatchSynthesisRunner::new(CoquiEngine::new(), config).run()?;
//! println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod corpus;
pub mod engines;
pub mod error;
pub mod preflight;
pub mod synthesis;
pub mod transcode;

pub use error::{Error, Result};

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Reference to the model a [`SynthesisEngine`] should load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRef {
    /// A checkpoint on disk (e.g. `my_finetuned_model/best_model.pth`).
    Path(PathBuf),
    /// A named pretrained model known to the engine.
    Named(String),
}

impl Default for ModelRef {
    fn default() -> Self {
        ModelRef::Path(PathBuf::from("my_finetuned_model/best_model.pth"))
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelRef::Path(path) => write!(f, "{}", path.display()),
            ModelRef::Named(name) => f.write_str(name),
        }
    }
}

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains raw f32 audio samples and the sample rate of the output audio.
#[derive(Debug)]
pub struct SynthesisResult {
    /// Raw audio samples as f32 values in `[-1.0, 1.0]`
    pub samples: Vec<f32>,
    /// Sample rate of the audio
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Decode a mono or multi-channel WAV held in memory.
    ///
    /// Multi-channel input keeps only the first channel.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, hound::Error> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        Ok(Self {
            samples: interleaved.into_iter().step_by(channels).collect(),
            sample_rate: spec.sample_rate,
        })
    }

    /// Write the audio as a mono 16-bit PCM WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Common interface for text-to-speech synthesis engines.
///
/// A loaded engine is an explicitly owned handle: callers load it once, run any
/// number of synthesis calls against it and unload (or drop) it afterwards.
pub trait SynthesisEngine {
    /// Parameters for configuring model loading (config file, device, etc.)
    type ModelParams: Default + Clone;

    /// Load a model using default parameters.
    fn load_model(&mut self, model: &ModelRef) -> Result<(), Box<dyn std::error::Error>> {
        self.load_model_with_params(model, Self::ModelParams::default())
    }

    /// Load a model with custom parameters.
    fn load_model_with_params(
        &mut self,
        model: &ModelRef,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Unload the currently loaded model and free associated resources.
    fn unload_model(&mut self);

    /// Synthesize speech for `text` in the given language.
    fn synthesize(
        &mut self,
        text: &str,
        language: &str,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>>;

    /// Synthesize speech and write it to a WAV file.
    ///
    /// Default implementation calls `synthesize()` then `SynthesisResult::write_wav()`.
    fn synthesize_to_file(
        &mut self,
        text: &str,
        language: &str,
        wav_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.synthesize(text, language)?.write_wav(wav_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_wav_produces_mono_16_bit_pcm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let result = SynthesisResult {
            samples: vec![0.0, 0.5, -0.5, 1.5],
            sample_rate: 22050,
        };
        result.write_wav(&path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn decodes_wav_bytes_back_into_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        SynthesisResult {
            samples: vec![0.25; 100],
            sample_rate: 16000,
        }
        .write_wav(&path)
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let decoded = SynthesisResult::from_wav_bytes(&bytes).unwrap();
        assert_eq!(decoded.sample_rate, 16000);
        assert_eq!(decoded.samples.len(), 100);
        assert!((decoded.samples[0] - 0.25).abs() < 1e-3);
        assert!((decoded.duration_secs() - 100.0 / 16000.0).abs() < 1e-9);
    }

    #[test]
    fn model_ref_displays_path_or_name() {
        assert_eq!(ModelRef::Named("vits".into()).to_string(), "vits");
        assert_eq!(
            ModelRef::Path(PathBuf::from("m/best.pth")).to_string(),
            "m/best.pth"
        );
    }
}
