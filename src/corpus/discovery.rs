use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Extensions accepted as source recordings, matched case-insensitively.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "flac", "ogg", "aac"];

/// A discovered source recording.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SourceAsset {
    pub path: PathBuf,
    /// Lowercased extension, one of [`AUDIO_EXTENSIONS`].
    pub extension: String,
}

impl SourceAsset {
    /// Build an asset from `path` if its extension is an accepted audio format.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        if !AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            return None;
        }
        Some(Self { path, extension })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Recursively enumerate audio files under `root`.
///
/// The result is sorted by path and free of duplicates, so repeated calls over
/// an unchanged tree return the same order. An empty result is not an error.
pub fn discover(root: &Path) -> Result<Vec<SourceAsset>> {
    if !root.is_dir() {
        return Err(Error::InputNotFound(root.to_path_buf()));
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) => {
                // Symlinked files count; symlinked directories are not descended.
                let is_file = entry.file_type().is_file()
                    || (entry.path_is_symlink() && entry.path().is_file());
                if !is_file {
                    continue;
                }
                if let Some(asset) = SourceAsset::from_path(entry.into_path()) {
                    assets.push(asset);
                }
            }
            Err(e) => {
                log::warn!("Error accessing entry: {e}");
            }
        }
    }

    assets.sort();
    assets.dedup_by(|a, b| a.path == b.path);

    log::debug!("Discovered {} audio files under {}", assets.len(), root.display());
    Ok(assets)
}
