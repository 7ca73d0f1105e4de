use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::discovery::SourceAsset;
use crate::transcode::{TranscodeError, Transcoder};
use crate::{Error, Result};

/// Default sample rate of canonical WAVs.
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Canonical assets are always mono.
pub const CANONICAL_CHANNELS: u16 = 1;

/// Canonical assets are always 16-bit PCM.
pub const CANONICAL_BIT_DEPTH: u16 = 16;

/// How sequence indices are assigned to converted files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    /// Index = 1-based position in the sorted discovery list. A failed
    /// conversion leaves a gap (`sample_001`, `sample_003`, ...).
    #[default]
    Positional,
    /// Index = 1-based count of successes so far. No gaps, but names are no
    /// longer stable when an earlier file starts or stops failing.
    Dense,
}

/// File name of the canonical asset with the given sequence index.
pub fn canonical_filename(sequence_index: usize) -> String {
    format!("sample_{sequence_index:03}.wav")
}

/// A normalized recording produced from exactly one [`SourceAsset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalAsset {
    pub sequence_index: usize,
    pub filename: String,
    pub path: PathBuf,
    pub source: PathBuf,
    pub sample_rate_hz: u32,
    pub channel_count: u16,
    pub bit_depth: u16,
}

/// A source file that could not be converted. The run continues past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionFailure {
    /// Position of the source in the sorted discovery list.
    pub position: usize,
    pub source: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CanonicalizeReport {
    /// Converted assets in canonicalization order.
    pub assets: Vec<CanonicalAsset>,
    pub failures: Vec<ConversionFailure>,
    pub attempted: usize,
}

impl CanonicalizeReport {
    pub fn succeeded(&self) -> usize {
        self.assets.len()
    }
}

/// Drives a [`Transcoder`] over a sorted list of sources.
pub struct Canonicalizer<T: Transcoder> {
    transcoder: T,
    wavs_dir: PathBuf,
    sample_rate_hz: u32,
    index_mode: IndexMode,
}

impl<T: Transcoder> Canonicalizer<T> {
    /// Write canonical assets into `wavs_dir` at the default sample rate.
    pub fn new(transcoder: T, wavs_dir: impl Into<PathBuf>) -> Self {
        Self {
            transcoder,
            wavs_dir: wavs_dir.into(),
            sample_rate_hz: DEFAULT_SAMPLE_RATE,
            index_mode: IndexMode::default(),
        }
    }

    pub fn with_sample_rate(mut self, sample_rate_hz: u32) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self
    }

    pub fn with_index_mode(mut self, index_mode: IndexMode) -> Self {
        self.index_mode = index_mode;
        self
    }

    /// Convert every source in order.
    ///
    /// Only failing to create the output directory is fatal. A failed item is
    /// recorded in the report and never leaves a file at its canonical path.
    pub fn run(&mut self, sources: &[SourceAsset]) -> Result<CanonicalizeReport> {
        fs::create_dir_all(&self.wavs_dir).map_err(|e| Error::storage(&self.wavs_dir, e))?;

        let total = sources.len();
        let mut report = CanonicalizeReport {
            attempted: total,
            ..Default::default()
        };

        for (position, source) in sources.iter().enumerate().map(|(i, s)| (i + 1, s)) {
            let sequence_index = match self.index_mode {
                IndexMode::Positional => position,
                IndexMode::Dense => report.assets.len() + 1,
            };
            let filename = canonical_filename(sequence_index);
            let path = self.wavs_dir.join(&filename);

            log::info!("[{position}/{total}] Converting {}", source.file_name());

            match self.convert(&source.path, &path) {
                Ok(spec) => {
                    report.assets.push(CanonicalAsset {
                        sequence_index,
                        filename,
                        path,
                        source: source.path.clone(),
                        sample_rate_hz: spec.sample_rate,
                        channel_count: spec.channels,
                        bit_depth: spec.bits_per_sample,
                    });
                }
                Err(e) => {
                    log::warn!("Error converting {}: {e}", source.path.display());
                    discard_partial_output(&path);
                    report.failures.push(ConversionFailure {
                        position,
                        source: source.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    fn convert(&mut self, input: &Path, output: &Path) -> Result<hound::WavSpec, TranscodeError> {
        self.transcoder
            .transcode(input, output, self.sample_rate_hz)?;
        read_canonical_spec(output, self.sample_rate_hz)
    }
}

/// Read the header of a freshly transcoded file and check it is mono 16-bit
/// PCM at the expected rate.
fn read_canonical_spec(path: &Path, sample_rate_hz: u32) -> Result<hound::WavSpec, TranscodeError> {
    let non_canonical = |reason: String| TranscodeError::NonCanonicalOutput {
        path: path.to_path_buf(),
        reason,
    };

    let spec = hound::WavReader::open(path)
        .map_err(|e| non_canonical(e.to_string()))?
        .spec();

    if spec.channels != CANONICAL_CHANNELS {
        return Err(non_canonical(format!("{} channels", spec.channels)));
    }
    if spec.bits_per_sample != CANONICAL_BIT_DEPTH || spec.sample_format != hound::SampleFormat::Int
    {
        return Err(non_canonical(format!(
            "{}-bit {:?} samples",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    if spec.sample_rate != sample_rate_hz {
        return Err(non_canonical(format!(
            "sample rate {} Hz, expected {sample_rate_hz} Hz",
            spec.sample_rate
        )));
    }

    Ok(spec)
}

fn discard_partial_output(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Could not remove {}: {e}", path.display());
        }
    }
}
