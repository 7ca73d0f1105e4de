use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::ModelRef;

use super::engine::CoquiError;

/// Model selection resolved at load time, reused for every call.
#[derive(Debug, Clone)]
pub(crate) struct LoadedModel {
    pub model: ModelRef,
    pub config_path: Option<PathBuf>,
    pub use_cuda: bool,
}

impl LoadedModel {
    fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        match &self.model {
            ModelRef::Path(path) => {
                args.push("--model_path".into());
                args.push(path.as_os_str().to_owned());
                if let Some(config) = &self.config_path {
                    args.push("--config_path".into());
                    args.push(config.as_os_str().to_owned());
                }
            }
            ModelRef::Named(name) => {
                args.push("--model_name".into());
                args.push(name.into());
            }
        }
        if self.use_cuda {
            args.push("--use_cuda".into());
            args.push("true".into());
        }
        args
    }
}

/// Full argument list for one synthesis call.
pub(crate) fn synthesis_args(
    model: &LoadedModel,
    text: &str,
    language: &str,
    out_path: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--text".into(),
        text.into(),
        "--out_path".into(),
        out_path.as_os_str().to_owned(),
    ];
    args.extend(model.args());
    if !language.is_empty() {
        args.push("--language_idx".into());
        args.push(language.into());
    }
    args
}

/// Check the `tts` binary can be started at all.
pub(crate) fn probe(bin_path: &Path) -> Result<(), CoquiError> {
    Command::new(bin_path)
        .arg("--help")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|_| ())
        .map_err(|e| spawn_error(bin_path, e))
}

/// Run `tts` with the given arguments and wait for it to finish.
pub(crate) fn run_tts(bin_path: &Path, args: &[OsString]) -> Result<(), CoquiError> {
    log::debug!("{} {:?}", bin_path.display(), args);

    let output = Command::new(bin_path)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(bin_path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr.trim_end().lines().last().unwrap_or_default();
        return Err(CoquiError::SynthesisFailed(format!(
            "tts exited with code {:?}: {reason}",
            output.status.code()
        )));
    }

    Ok(())
}

fn spawn_error(bin_path: &Path, e: std::io::Error) -> CoquiError {
    if e.kind() == std::io::ErrorKind::NotFound {
        CoquiError::TtsNotFound(bin_path.display().to_string())
    } else {
        CoquiError::Io(e)
    }
}
