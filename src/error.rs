use std::path::PathBuf;

/// Run-level failures. Every variant aborts the pipeline that raised it.
///
/// Per-item problems (a single transcode or synthesis call failing) never show
/// up here; they are recorded in the pipeline's report instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("Cannot read {}: {source}", path.display())]
    UnreadableInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot write to {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Synthesis engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("No audio files found in {}", .0.display())]
    NoAudioFiles(PathBuf),
    #[error("No text lines to synthesize in {}", .0.display())]
    NoTextLines(PathBuf),
    #[error("No files were successfully converted ({attempted} attempted)")]
    NothingConverted { attempted: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::StorageUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Map a failed read of a required input file.
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::InputNotFound(path)
        } else {
            Error::UnreadableInput { path, source }
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
