use std::path::{Path, PathBuf};

use serde::Serialize;

use super::metadata::{read_metadata, MetadataRecord, PLACEHOLDER_TRANSCRIPT};
use super::{METADATA_FILE_NAME, WAVS_DIR_NAME};
use crate::{Error, Result};

/// A prepared corpus directory: `metadata.csv` plus `wavs/`.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
    records: Vec<MetadataRecord>,
}

/// What is still missing before a corpus can be used for training.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetInspection {
    pub records: usize,
    /// Records whose WAV does not exist under `wavs/`.
    pub missing_audio: Vec<String>,
    /// Records still carrying the placeholder (or an empty) transcript.
    pub pending_transcription: Vec<String>,
}

impl DatasetInspection {
    pub fn is_ready(&self) -> bool {
        self.records > 0 && self.missing_audio.is_empty() && self.pending_transcription.is_empty()
    }
}

impl Dataset {
    /// Open a corpus directory produced by [`super::prepare_corpus`].
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let metadata_path = root.join(METADATA_FILE_NAME);
        let wavs_dir = root.join(WAVS_DIR_NAME);

        if !metadata_path.is_file() {
            return Err(Error::InputNotFound(metadata_path));
        }
        if !wavs_dir.is_dir() {
            return Err(Error::InputNotFound(wavs_dir));
        }

        let records = read_metadata(&metadata_path)?;
        log::info!("Found {} training samples", records.len());
        Ok(Self { root, records })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn wavs_dir(&self) -> PathBuf {
        self.root.join(WAVS_DIR_NAME)
    }

    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    /// Check the default placeholder transcript.
    pub fn inspect(&self) -> DatasetInspection {
        self.inspect_with_placeholder(PLACEHOLDER_TRANSCRIPT)
    }

    pub fn inspect_with_placeholder(&self, placeholder: &str) -> DatasetInspection {
        let wavs_dir = self.wavs_dir();
        let mut inspection = DatasetInspection {
            records: self.records.len(),
            ..Default::default()
        };

        for record in &self.records {
            if !wavs_dir.join(&record.filename).is_file() {
                inspection.missing_audio.push(record.filename.clone());
            }
            if record.needs_transcription(placeholder) {
                inspection.pending_transcription.push(record.filename.clone());
            }
        }

        inspection
    }
}
