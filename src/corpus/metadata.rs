use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::canonicalize::CanonicalAsset;
use crate::{Error, Result};

/// Field separator of `metadata.csv`.
///
/// A literal `|` inside a transcript has no escape; readers split on the
/// first separator only.
pub const FIELD_DELIMITER: char = '|';

/// Transcript written for every new record; "write the Farsi text here".
pub const PLACEHOLDER_TRANSCRIPT: &str = "[متن فارسی را اینجا بنویسید]";

/// One row of `metadata.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub filename: String,
    pub transcript: String,
}

impl MetadataRecord {
    pub fn to_line(&self) -> String {
        format!("{}{FIELD_DELIMITER}{}", self.filename, self.transcript)
    }

    /// Parse a `filename|transcript` line. Returns `None` for blank lines and
    /// lines without a separator.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        let (filename, transcript) = line.split_once(FIELD_DELIMITER)?;
        Some(Self {
            filename: filename.trim().to_string(),
            transcript: transcript.trim().to_string(),
        })
    }

    pub fn needs_transcription(&self, placeholder: &str) -> bool {
        self.transcript.is_empty() || self.transcript == placeholder
    }
}

/// Writes the placeholder alignment file for a set of canonical assets.
pub struct MetadataTemplater {
    placeholder: String,
}

impl Default for MetadataTemplater {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataTemplater {
    pub fn new() -> Self {
        Self::with_placeholder(PLACEHOLDER_TRANSCRIPT)
    }

    pub fn with_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    pub fn records(&self, assets: &[CanonicalAsset]) -> Vec<MetadataRecord> {
        assets
            .iter()
            .map(|asset| MetadataRecord {
                filename: asset.filename.clone(),
                transcript: self.placeholder.clone(),
            })
            .collect()
    }

    /// Replace `path` with one record per asset, in asset order.
    ///
    /// Zero assets produce an empty file.
    pub fn write(&self, path: &Path, assets: &[CanonicalAsset]) -> Result<Vec<MetadataRecord>> {
        let records = self.records(assets);
        write_records(path, &records)?;
        Ok(records)
    }
}

fn write_records(path: &Path, records: &[MetadataRecord]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::storage(path, e))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writeln!(writer, "{}", record.to_line()).map_err(|e| Error::storage(path, e))?;
    }
    writer.flush().map_err(|e| Error::storage(path, e))
}

/// Load a hand-edited `metadata.csv`.
///
/// Blank lines and lines without a `|` are skipped.
pub fn read_metadata(path: &Path) -> Result<Vec<MetadataRecord>> {
    let content = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;

    Ok(content.lines().filter_map(MetadataRecord::parse_line).collect())
}
