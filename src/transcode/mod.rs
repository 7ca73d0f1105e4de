//! External audio transcoding.
//!
//! Corpus preparation never decodes audio itself; every source recording is
//! handed to a [`Transcoder`] that writes a mono 16-bit PCM WAV at the
//! requested sample rate.
//!
//! # System Requirements
//!
//! [`FfmpegTranscoder`] needs **ffmpeg** on PATH (or an explicit binary path):
//! - **Linux**: `sudo apt-get install ffmpeg`
//! - **macOS**: `brew install ffmpeg`
//! - **Windows**: Download a build from <https://ffmpeg.org/download.html>

pub mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;

use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum TranscodeError {
    #[error("{0} not found. Install ffmpeg or point the transcoder at its binary.")]
    ToolNotFound(String),
    #[error("Transcoder exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Output {} is not canonical: {reason}", path.display())]
    NonCanonicalOutput { path: PathBuf, reason: String },
}

/// Converts one audio file into a canonical WAV.
///
/// Implementations block until the output is fully written. `output` is
/// overwritten if it already exists.
pub trait Transcoder {
    fn transcode(
        &mut self,
        input: &Path,
        output: &Path,
        sample_rate_hz: u32,
    ) -> Result<(), TranscodeError>;
}

impl<T: Transcoder + ?Sized> Transcoder for &mut T {
    fn transcode(
        &mut self,
        input: &Path,
        output: &Path,
        sample_rate_hz: u32,
    ) -> Result<(), TranscodeError> {
        (**self).transcode(input, output, sample_rate_hz)
    }
}
