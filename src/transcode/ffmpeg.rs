use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{TranscodeError, Transcoder};

/// Transcoder backed by the `ffmpeg` command line tool.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    bin_path: PathBuf,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegTranscoder {
    /// Use `ffmpeg` from PATH.
    pub fn new() -> Self {
        Self {
            bin_path: PathBuf::from("ffmpeg"),
        }
    }

    /// Use an explicit ffmpeg binary, e.g. one bundled with the application.
    pub fn with_binary(bin_path: impl Into<PathBuf>) -> Self {
        Self {
            bin_path: bin_path.into(),
        }
    }

    pub fn bin_path(&self) -> &Path {
        &self.bin_path
    }
}

/// Arguments converting `input` to mono 16-bit PCM at `sample_rate_hz`.
fn ffmpeg_args(input: &Path, output: &Path, sample_rate_hz: u32) -> Vec<OsString> {
    vec![
        "-i".into(),
        input.as_os_str().to_owned(),
        "-acodec".into(),
        "pcm_s16le".into(),
        "-ar".into(),
        sample_rate_hz.to_string().into(),
        "-ac".into(),
        "1".into(),
        "-y".into(),
        output.as_os_str().to_owned(),
    ]
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(
        &mut self,
        input: &Path,
        output: &Path,
        sample_rate_hz: u32,
    ) -> Result<(), TranscodeError> {
        let args = ffmpeg_args(input, output, sample_rate_hz);
        log::debug!("{} {:?}", self.bin_path.display(), args);

        let result = Command::new(&self.bin_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::ToolNotFound(self.bin_path.display().to_string())
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            // ffmpeg prints its banner first; the cause is on the last line.
            let last_line = stderr.trim_end().lines().last().unwrap_or_default();
            return Err(TranscodeError::Failed {
                code: result.status.code(),
                stderr: last_line.to_string(),
            });
        }

        Ok(())
    }
}
