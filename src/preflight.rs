//! Environment report.
//!
//! Independent checks for everything the two pipelines shell out to. Every
//! check runs and is reported even when an earlier one failed; the aggregate
//! passes only if all required checks pass.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    /// An optional check failed.
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "FAIL",
        };
        write!(f, "[{marker:>4}] {}: {}", self.name, self.detail)
    }
}

/// One environment probe.
pub trait Check {
    fn name(&self) -> &str;

    /// Whether a failure of this check fails the whole report.
    fn required(&self) -> bool {
        true
    }

    /// `Ok(detail)` when satisfied, `Err(detail)` otherwise.
    fn run(&self) -> Result<String, String>;
}

/// Passes when a command runs successfully, optionally with a minimum
/// `major.minor` version found in its output.
#[derive(Debug, Clone)]
pub struct CommandCheck {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    required: bool,
    min_version: Option<(u32, u32)>,
    missing_hint: String,
}

impl CommandCheck {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>, args: &[&str]) -> Self {
        let program = program.into();
        Self {
            name: name.into(),
            missing_hint: format!("{} not available", program.display()),
            program,
            args: args.iter().map(|a| a.to_string()).collect(),
            required: true,
            min_version: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn min_version(mut self, major: u32, minor: u32) -> Self {
        self.min_version = Some((major, minor));
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.missing_hint = hint.into();
        self
    }
}

impl Check for CommandCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn required(&self) -> bool {
        self.required
    }

    fn run(&self) -> Result<String, String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| format!("{} ({e})", self.missing_hint))?;

        if !output.status.success() {
            return Err(self.missing_hint.clone());
        }

        let text = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let first_line = text.lines().next().unwrap_or_default().trim().to_string();

        let Some((major, minor)) = self.min_version else {
            return Ok(if first_line.is_empty() {
                "available".to_string()
            } else {
                first_line
            });
        };

        match parse_version(&text) {
            Some(found) if found >= (major, minor) => Ok(first_line),
            Some((found_major, found_minor)) => Err(format!(
                "{major}.{minor}+ required, found {found_major}.{found_minor}"
            )),
            None => Err(format!("could not read version from {first_line:?}")),
        }
    }
}

/// First `major.minor` pair in `text`.
pub fn parse_version(text: &str) -> Option<(u32, u32)> {
    text.split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter_map(|token| {
            let mut parts = token.split('.');
            let major = parts.next()?.parse().ok()?;
            let minor = parts.next()?.parse().ok()?;
            Some((major, minor))
        })
        .next()
}

/// Tools checked by [`default_checks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    /// Interpreter hosting the synthesis engine.
    pub python: PathBuf,
    pub min_python: (u32, u32),
    pub ffmpeg: PathBuf,
    /// Fail the report when no GPU is found instead of warning.
    pub require_accelerator: bool,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            python: PathBuf::from("python3"),
            min_python: (3, 9),
            ffmpeg: PathBuf::from("ffmpeg"),
            require_accelerator: false,
        }
    }
}

/// Runtime, accelerator, engine library, audio libraries and transcoder.
pub fn default_checks(config: &PreflightConfig) -> Vec<Box<dyn Check>> {
    let (major, minor) = config.min_python;
    let accelerator = CommandCheck::new("Accelerator", "nvidia-smi", &["-L"])
        .hint("No CUDA GPU found (CPU mode will be slow)");

    let accelerator = if config.require_accelerator {
        accelerator
    } else {
        accelerator.optional()
    };

    [
        CommandCheck::new("Runtime version", &config.python, &["--version"])
            .min_version(major, minor)
            .hint(format!("Python {major}.{minor}+ not found")),
        accelerator,
        CommandCheck::new("Synthesis engine", &config.python, &["-c", "import TTS"])
            .hint("Coqui TTS not installed"),
        CommandCheck::new(
            "Audio libraries",
            &config.python,
            &["-c", "import librosa, soundfile, scipy"],
        )
        .hint("Audio libraries (librosa, soundfile, scipy) not fully installed"),
        CommandCheck::new("Transcoder", &config.ffmpeg, &["-version"])
            .hint("FFmpeg not found (needed for audio conversion)"),
    ]
    .into_iter()
    .map(|check| Box::new(check) as Box<dyn Check>)
    .collect()
}

/// Results of every check, in run order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvironmentReport {
    pub results: Vec<CheckResult>,
}

impl EnvironmentReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.status != CheckStatus::Fail)
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}

/// Run all checks; never stops early.
pub fn run_checks(checks: &[Box<dyn Check>]) -> EnvironmentReport {
    let mut report = EnvironmentReport::default();
    for check in checks {
        log::info!("Checking {}...", check.name());
        let (status, detail) = match check.run() {
            Ok(detail) => (CheckStatus::Pass, detail),
            Err(detail) if check.required() => (CheckStatus::Fail, detail),
            Err(detail) => (CheckStatus::Warn, detail),
        };
        let result = CheckResult {
            name: check.name().to_string(),
            status,
            detail,
        };
        match status {
            CheckStatus::Pass => log::info!("{result}"),
            CheckStatus::Warn | CheckStatus::Fail => log::warn!("{result}"),
        }
        report.results.push(result);
    }
    report
}
