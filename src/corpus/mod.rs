//! Corpus preparation.
//!
//! Turns a directory of raw recordings into a training-ready layout:
//!
//! ```text
//! dataset/
//! ├── wavs/
//! │   ├── sample_001.wav   # mono, 16-bit PCM, 22050 Hz by default
//! │   ├── sample_003.wav   # sample_002 failed to convert
//! │   └── ...
//! └── metadata.csv         # sample_001.wav|<placeholder transcript>
//! ```
//!
//! The stages run strictly in order: [`discovery`] enumerates the sources,
//! [`canonicalize`] converts them one at a time through a
//! [`Transcoder`](crate::transcode::Transcoder), and [`metadata`] writes the
//! alignment template. A source that fails to convert is skipped but keeps its
//! index (see [`IndexMode`]).
//!
//! # Examples
//!
//! ```rust,no_run
//! use voiceclone_rs::corpus::{prepare_corpus, IndexMode, PrepareConfigBuilder};
//! use voiceclone_rs::transcode::FfmpegTranscoder;
//!
//! let config = PrepareConfigBuilder::default()
//!     .input_dir("raw_audio")
//!     .output_dir("dataset")
//!     .sample_rate(24000u32)
//!     .index_mode(IndexMode::Positional)
//!     .build()?;
//!
//! let report = prepare_corpus(&config, FfmpegTranscoder::new())?;
//! for step in report.next_steps() {
//!     println!("{step}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod canonicalize;
pub mod dataset;
pub mod discovery;
pub mod metadata;

pub use canonicalize::{
    canonical_filename, CanonicalAsset, Canonicalizer, CanonicalizeReport, ConversionFailure,
    IndexMode, DEFAULT_SAMPLE_RATE,
};
pub use dataset::{Dataset, DatasetInspection};
pub use discovery::{discover, SourceAsset, AUDIO_EXTENSIONS};
pub use metadata::{read_metadata, MetadataRecord, MetadataTemplater, PLACEHOLDER_TRANSCRIPT};

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::transcode::Transcoder;
use crate::{Error, Result};

/// Directory, relative to the output root, holding canonical WAVs.
pub const WAVS_DIR_NAME: &str = "wavs";

/// Alignment file, relative to the output root.
pub const METADATA_FILE_NAME: &str = "metadata.csv";

/// Settings for one corpus preparation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct PrepareConfig {
    /// Directory searched recursively for source recordings.
    pub input_dir: PathBuf,
    /// Root of the prepared corpus; `wavs/` and `metadata.csv` go here.
    pub output_dir: PathBuf,
    /// Sample rate of the canonical WAVs in Hz.
    pub sample_rate: u32,
    pub index_mode: IndexMode,
    /// Transcript written for every new metadata row.
    pub placeholder_transcript: String,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("raw_audio"),
            output_dir: PathBuf::from("dataset"),
            sample_rate: DEFAULT_SAMPLE_RATE,
            index_mode: IndexMode::default(),
            placeholder_transcript: PLACEHOLDER_TRANSCRIPT.to_string(),
        }
    }
}

impl PrepareConfig {
    pub fn wavs_dir(&self) -> PathBuf {
        self.output_dir.join(WAVS_DIR_NAME)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.output_dir.join(METADATA_FILE_NAME)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidConfig("sample_rate must be positive".into()));
        }
        if self.placeholder_transcript.contains(metadata::FIELD_DELIMITER) {
            return Err(Error::InvalidConfig(format!(
                "placeholder transcript may not contain '{}'",
                metadata::FIELD_DELIMITER
            )));
        }
        if self.placeholder_transcript.contains(['\n', '\r']) {
            return Err(Error::InvalidConfig(
                "placeholder transcript must fit on one line".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a successful preparation run.
#[derive(Debug, Clone, Serialize)]
pub struct PrepareReport {
    pub attempted: usize,
    pub converted: usize,
    pub assets: Vec<CanonicalAsset>,
    pub failures: Vec<ConversionFailure>,
    pub wavs_dir: PathBuf,
    pub metadata_path: PathBuf,
}

impl PrepareReport {
    /// Operator instructions for finishing the corpus by hand.
    pub fn next_steps(&self) -> Vec<String> {
        vec![
            format!(
                "Edit {} and replace the placeholder text for each file",
                self.metadata_path.display()
            ),
            format!("Format: filename.wav{}transcript", metadata::FIELD_DELIMITER),
            "Train on the prepared directory once every row is transcribed".to_string(),
        ]
    }
}

/// Run discovery, canonicalization and metadata templating.
///
/// Fatal when the input directory is missing, when it holds no audio files,
/// when the output cannot be written, or when not a single file converted.
/// Individual conversion failures are listed in the report.
pub fn prepare_corpus<T: Transcoder>(config: &PrepareConfig, transcoder: T) -> Result<PrepareReport> {
    config.validate()?;

    let sources = discover(&config.input_dir)?;
    if sources.is_empty() {
        return Err(Error::NoAudioFiles(config.input_dir.clone()));
    }

    log::info!("Found {} audio files", sources.len());
    log::info!("Converting to {}Hz WAV format...", config.sample_rate);

    let wavs_dir = config.wavs_dir();
    let canonical = Canonicalizer::new(transcoder, &wavs_dir)
        .with_sample_rate(config.sample_rate)
        .with_index_mode(config.index_mode)
        .run(&sources)?;

    if canonical.succeeded() == 0 {
        return Err(Error::NothingConverted {
            attempted: canonical.attempted,
        });
    }

    let metadata_path = config.metadata_path();
    log::info!("Creating metadata template at {}", metadata_path.display());
    MetadataTemplater::with_placeholder(config.placeholder_transcript.as_str())
        .write(&metadata_path, &canonical.assets)?;

    Ok(PrepareReport {
        attempted: canonical.attempted,
        converted: canonical.succeeded(),
        assets: canonical.assets,
        failures: canonical.failures,
        wavs_dir,
        metadata_path,
    })
}

#[cfg(test)]
mod tests {
    use super::canonicalize::tests::FakeTranscoder;
    use super::*;
    use std::fs;
    use std::path::Path;

    fn raw_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"audio").unwrap();
        }
        dir
    }

    fn config(input: &Path, output: &Path) -> PrepareConfig {
        PrepareConfigBuilder::default()
            .input_dir(input)
            .output_dir(output)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_fills_defaults() {
        let config = PrepareConfigBuilder::default().build().unwrap();
        assert_eq!(config, PrepareConfig::default());
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.index_mode, IndexMode::Positional);
    }

    #[test]
    fn gap_example_produces_matching_metadata() {
        let raw = raw_dir(&["A.wav", "B.mp3", "C.flac", "readme.txt"]);
        let out = tempfile::tempdir().unwrap();

        let report = prepare_corpus(
            &config(raw.path(), out.path()),
            FakeTranscoder::failing_on(&["B.mp3"]),
        )
        .unwrap();

        assert_eq!(report.attempted, 3);
        assert_eq!(report.converted, 2);
        assert_eq!(report.failures.len(), 1);

        let wavs = out.path().join("wavs");
        assert!(wavs.join("sample_001.wav").exists());
        assert!(!wavs.join("sample_002.wav").exists());
        assert!(wavs.join("sample_003.wav").exists());

        let records = read_metadata(&out.path().join("metadata.csv")).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["sample_001.wav", "sample_003.wav"]);
        assert!(records
            .iter()
            .all(|r| r.transcript == PLACEHOLDER_TRANSCRIPT));
    }

    #[test]
    fn metadata_rows_track_successes_not_attempts() {
        let raw = raw_dir(&["1.wav", "2.wav", "3.wav", "4.wav", "5.wav"]);
        let out = tempfile::tempdir().unwrap();

        let report = prepare_corpus(
            &config(raw.path(), out.path()),
            FakeTranscoder::failing_on(&["2.wav", "5.wav"]),
        )
        .unwrap();

        let rows = fs::read_to_string(&report.metadata_path).unwrap().lines().count();
        assert_eq!(rows, report.converted);
        assert_eq!(rows, 3);
    }

    #[test]
    fn zero_audio_files_is_an_overall_failure() {
        let raw = raw_dir(&["notes.txt"]);
        let out = tempfile::tempdir().unwrap();
        let err = prepare_corpus(&config(raw.path(), out.path()), FakeTranscoder::failing_on(&[]))
            .unwrap_err();
        assert!(matches!(err, Error::NoAudioFiles(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn zero_conversions_is_an_overall_failure() {
        let raw = raw_dir(&["a.wav", "b.wav"]);
        let out = tempfile::tempdir().unwrap();
        let err = prepare_corpus(
            &config(raw.path(), out.path()),
            FakeTranscoder::failing_on(&["a.wav", "b.wav"]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NothingConverted { attempted: 2 }));
        assert!(!out.path().join("metadata.csv").exists());
    }

    #[test]
    fn missing_input_directory_is_input_not_found() {
        let out = tempfile::tempdir().unwrap();
        let err = prepare_corpus(
            &config(&out.path().join("raw_audio"), out.path()),
            FakeTranscoder::failing_on(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let mut config = PrepareConfig::default();
        config.sample_rate = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_placeholders_that_break_rows() {
        for placeholder in ["pending\nfill in", "pending\r", "a|b"] {
            let config = PrepareConfig {
                placeholder_transcript: placeholder.into(),
                ..PrepareConfig::default()
            };
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn multiline_placeholder_fails_before_any_conversion() {
        let raw = raw_dir(&["a.wav", "b.ogg"]);
        let out = tempfile::tempdir().unwrap();
        let mut config = config(raw.path(), out.path());
        config.placeholder_transcript = "pending\nfill in".into();

        let err = prepare_corpus(&config, FakeTranscoder::failing_on(&[])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(!config.metadata_path().exists());
    }

    #[test]
    fn prepared_corpus_opens_as_a_dataset() {
        let raw = raw_dir(&["a.wav", "b.ogg"]);
        let out = tempfile::tempdir().unwrap();
        prepare_corpus(&config(raw.path(), out.path()), FakeTranscoder::failing_on(&[])).unwrap();

        let inspection = Dataset::open(out.path()).unwrap().inspect();
        assert_eq!(inspection.records, 2);
        assert!(inspection.missing_audio.is_empty());
        assert_eq!(inspection.pending_transcription.len(), 2);
    }

    #[test]
    fn next_steps_point_at_the_metadata_file() {
        let report = PrepareReport {
            attempted: 1,
            converted: 1,
            assets: Vec::new(),
            failures: Vec::new(),
            wavs_dir: PathBuf::from("dataset/wavs"),
            metadata_path: PathBuf::from("dataset/metadata.csv"),
        };
        assert!(report.next_steps()[0].contains("dataset/metadata.csv"));
    }
}
