use std::fs;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::jobs::{plan_jobs, read_text_lines, SynthesisJob};
use super::summary::{BatchSummary, JobReport, SynthesisOutcome};
use crate::{Error, ModelRef, Result, SynthesisEngine};

/// Language code passed to the engine when none is configured (Farsi).
pub const DEFAULT_LANGUAGE: &str = "fa";

/// Settings for one batch synthesis invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct BatchConfig {
    /// UTF-8 text file, one utterance per line.
    pub text_file: PathBuf,
    pub model: ModelRef,
    pub language: String,
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            text_file: PathBuf::from("texts.txt"),
            model: ModelRef::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            output_dir: PathBuf::from("batch_output"),
        }
    }
}

/// Lifecycle of a [`BatchSynthesisRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunnerState {
    Idle,
    EngineLoading,
    Running { index: usize },
    Completed,
    /// A fatal condition stopped the batch before or during engine loading.
    Aborted,
}

/// Runs every line of a text file through one loaded engine.
///
/// The runner owns the engine for the duration of the batch: it loads the
/// model once before the first job and unloads it when the batch ends.
pub struct BatchSynthesisRunner<E: SynthesisEngine> {
    engine: E,
    model_params: Option<E::ModelParams>,
    config: BatchConfig,
    state: RunnerState,
}

impl<E: SynthesisEngine> BatchSynthesisRunner<E> {
    pub fn new(engine: E, config: BatchConfig) -> Self {
        Self {
            engine,
            model_params: None,
            config,
            state: RunnerState::Idle,
        }
    }

    /// Engine-specific load parameters, reused by every run.
    pub fn with_model_params(mut self, params: E::ModelParams) -> Self {
        self.model_params = Some(params);
        self
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Run the whole batch.
    ///
    /// Fails only when the text file is missing or empty, the output directory
    /// cannot be created, or the engine does not load. A failing job is
    /// recorded in the summary and the next job runs.
    pub fn run(&mut self) -> Result<BatchSummary> {
        let result = self.run_inner();
        if result.is_err() {
            self.transition(RunnerState::Aborted);
        }
        result
    }

    fn run_inner(&mut self) -> Result<BatchSummary> {
        let lines = read_text_lines(&self.config.text_file)?;
        if lines.is_empty() {
            return Err(Error::NoTextLines(self.config.text_file.clone()));
        }

        let output_dir = self.config.output_dir.clone();
        fs::create_dir_all(&output_dir).map_err(|e| Error::storage(&output_dir, e))?;

        self.transition(RunnerState::EngineLoading);
        let params = self.model_params.clone().unwrap_or_default();
        self.engine
            .load_model_with_params(&self.config.model, params)
            .map_err(|e| Error::EngineUnavailable(e.to_string()))?;

        let jobs = plan_jobs(&lines, &output_dir);
        log::info!("Found {} texts to synthesize", jobs.len());

        let mut summary = BatchSummary::new(output_dir);
        for job in &jobs {
            self.transition(RunnerState::Running { index: job.index });
            let outcome = self.run_job(job, jobs.len());
            summary.record(JobReport::new(job, outcome));
        }

        self.engine.unload_model();
        self.transition(RunnerState::Completed);

        log::info!(
            "Batch synthesis complete: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed
        );
        Ok(summary)
    }

    fn run_job(&mut self, job: &SynthesisJob, total: usize) -> SynthesisOutcome {
        log::info!("[{}/{total}] Synthesizing: {}...", job.index, job.snippet());

        match self
            .engine
            .synthesize_to_file(&job.text, &self.config.language, &job.output_path)
        {
            Ok(()) => {
                log::info!("Saved to: {}", job.output_path.display());
                SynthesisOutcome::Success {
                    path: job.output_path.clone(),
                }
            }
            Err(e) => {
                log::warn!("Job {} failed: {e}", job.index);
                discard_partial_output(&job.output_path);
                SynthesisOutcome::Failure {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn transition(&mut self, next: RunnerState) {
        log::debug!("Runner state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn discard_partial_output(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Could not remove {}: {e}", path.display());
        }
    }
}

/// Synthesize a single utterance; any failure is fatal.
pub fn synthesize_one<E: SynthesisEngine>(
    engine: &mut E,
    model: &ModelRef,
    params: E::ModelParams,
    text: &str,
    language: &str,
    output_path: &Path,
) -> Result<PathBuf> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::storage(parent, e))?;
    }

    engine
        .load_model_with_params(model, params)
        .map_err(|e| Error::EngineUnavailable(e.to_string()))?;

    log::info!("Synthesizing text: {text}");
    let result = engine
        .synthesize_to_file(text, language, output_path)
        .map_err(|e| Error::SynthesisFailed(e.to_string()));
    engine.unload_model();
    result?;

    log::info!("Output saved to: {}", output_path.display());
    Ok(output_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SynthesisResult;
    use std::collections::HashSet;

    /// Engine writing a short tone per call; texts in `fail_on` fail.
    #[derive(Default)]
    struct FakeEngine {
        fail_load: bool,
        fail_on: HashSet<String>,
        /// Samples per utterance; 220 when unset.
        sample_count: Option<usize>,
        loaded_with: Vec<u32>,
        loads: usize,
        unloads: usize,
        calls: Vec<(String, String)>,
    }

    impl FakeEngine {
        fn failing_on(texts: &[&str]) -> Self {
            Self {
                fail_on: texts.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl SynthesisEngine for FakeEngine {
        /// Speaker id.
        type ModelParams = u32;

        fn load_model_with_params(
            &mut self,
            _model: &ModelRef,
            speaker: u32,
        ) -> std::result::Result<(), Box<dyn std::error::Error>> {
            self.loads += 1;
            self.loaded_with.push(speaker);
            if self.fail_load {
                return Err("checkpoint is corrupt".into());
            }
            Ok(())
        }

        fn unload_model(&mut self) {
            self.unloads += 1;
        }

        fn synthesize(
            &mut self,
            text: &str,
            language: &str,
        ) -> std::result::Result<SynthesisResult, Box<dyn std::error::Error>> {
            self.calls.push((text.to_string(), language.to_string()));
            if self.fail_on.contains(text) {
                return Err(format!("cannot pronounce {text:?}").into());
            }
            Ok(SynthesisResult {
                samples: vec![0.1; self.sample_count.unwrap_or(220)],
                sample_rate: 22050,
            })
        }
    }

    fn setup(text: &str) -> (tempfile::TempDir, BatchConfig) {
        let dir = tempfile::tempdir().unwrap();
        let text_file = dir.path().join("texts.txt");
        fs::write(&text_file, text).unwrap();
        let config = BatchConfigBuilder::default()
            .text_file(text_file)
            .model(ModelRef::Named("fake".into()))
            .output_dir(dir.path().join("batch_output"))
            .build()
            .unwrap();
        (dir, config)
    }

    #[test]
    fn one_job_per_non_blank_line() {
        let (_dir, config) = setup("hello\n\n  \nworld\n");
        let mut runner = BatchSynthesisRunner::new(FakeEngine::default(), config.clone());

        let summary = runner.run().unwrap();
        assert_eq!((summary.total, summary.succeeded, summary.failed), (2, 2, 0));
        assert_eq!(runner.state(), RunnerState::Completed);
        assert!(config.output_dir.join("output_001.wav").exists());
        assert!(config.output_dir.join("output_002.wav").exists());
        assert!(!config.output_dir.join("output_003.wav").exists());

        let engine = runner.into_engine();
        assert_eq!(
            engine.calls,
            vec![
                ("hello".to_string(), "fa".to_string()),
                ("world".to_string(), "fa".to_string())
            ]
        );
    }

    #[test]
    fn engine_is_loaded_exactly_once() {
        let (_dir, config) = setup("a\nb\nc\nd\n");
        let mut runner = BatchSynthesisRunner::new(FakeEngine::default(), config);
        runner.run().unwrap();
        let engine = runner.into_engine();
        assert_eq!(engine.loads, 1);
        assert_eq!(engine.unloads, 1);
        assert_eq!(engine.calls.len(), 4);
    }

    #[test]
    fn a_failing_job_does_not_stop_the_batch() {
        let (_dir, config) = setup("one\ntwo\nthree\nfour\n");
        let mut runner = BatchSynthesisRunner::new(FakeEngine::failing_on(&["two"]), config.clone());

        let summary = runner.run().unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 1);
        assert!(summary.is_success());

        let failures: Vec<_> = summary.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.index, 2);
        assert_eq!(failures[0].0.snippet, "two");
        assert!(failures[0].1.contains("cannot pronounce"));

        assert!(!config.output_dir.join("output_002.wav").exists());
        assert!(config.output_dir.join("output_003.wav").exists());
        assert!(config.output_dir.join("output_004.wav").exists());
        assert_eq!(runner.into_engine().calls.len(), 4);
    }

    #[test]
    fn all_jobs_failing_is_reported_not_raised() {
        let (_dir, config) = setup("x\ny\n");
        let summary = BatchSynthesisRunner::new(FakeEngine::failing_on(&["x", "y"]), config)
            .run()
            .unwrap();
        assert_eq!(summary.failed, 2);
        assert!(!summary.is_success());
    }

    #[test]
    fn engine_load_failure_aborts_before_any_job() {
        let (_dir, config) = setup("a\nb\n");
        let engine = FakeEngine {
            fail_load: true,
            ..Default::default()
        };
        let mut runner = BatchSynthesisRunner::new(engine, config);

        let err = runner.run().unwrap_err();
        assert!(matches!(err, Error::EngineUnavailable(ref reason) if reason.contains("corrupt")));
        assert_eq!(runner.state(), RunnerState::Aborted);
        assert!(runner.into_engine().calls.is_empty());
    }

    #[test]
    fn missing_text_file_is_input_not_found() {
        let (dir, mut config) = setup("");
        config.text_file = dir.path().join("nope.txt");
        let mut runner = BatchSynthesisRunner::new(FakeEngine::default(), config);
        assert!(matches!(runner.run(), Err(Error::InputNotFound(_))));
        assert_eq!(runner.into_engine().loads, 0);
    }

    #[test]
    fn blank_only_text_file_is_fatal() {
        let (_dir, config) = setup("\n   \n\t\n");
        let err = BatchSynthesisRunner::new(FakeEngine::default(), config)
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::NoTextLines(_)));
    }

    #[test]
    fn uncreatable_output_dir_is_storage_unavailable() {
        let (dir, mut config) = setup("a\n");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        config.output_dir = blocker.join("out");
        let err = BatchSynthesisRunner::new(FakeEngine::default(), config)
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn rerun_overwrites_the_same_paths() {
        let (_dir, config) = setup("first\nsecond\n");
        let output = config.output_dir.join("output_001.wav");
        let wav_len = |path: &Path| hound::WavReader::open(path).unwrap().len();

        let first = BatchSynthesisRunner::new(FakeEngine::default(), config.clone())
            .run()
            .unwrap();
        assert_eq!(wav_len(&output), 220);

        let longer = FakeEngine {
            sample_count: Some(441),
            ..Default::default()
        };
        let second = BatchSynthesisRunner::new(longer, config).run().unwrap();
        assert_eq!(first, second);
        assert_eq!(wav_len(&output), 441);
    }

    #[test]
    fn model_params_apply_to_every_run() {
        let (_dir, config) = setup("a\n");
        let mut runner =
            BatchSynthesisRunner::new(FakeEngine::default(), config).with_model_params(7);
        runner.run().unwrap();
        runner.run().unwrap();
        assert_eq!(runner.into_engine().loaded_with, vec![7, 7]);
    }

    #[test]
    fn failed_rerun_removes_stale_output() {
        let (_dir, config) = setup("first\nsecond\n");
        BatchSynthesisRunner::new(FakeEngine::default(), config.clone())
            .run()
            .unwrap();
        BatchSynthesisRunner::new(FakeEngine::failing_on(&["second"]), config.clone())
            .run()
            .unwrap();
        assert!(config.output_dir.join("output_001.wav").exists());
        assert!(!config.output_dir.join("output_002.wav").exists());
    }

    #[test]
    fn synthesize_one_writes_a_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("output.wav");
        let mut engine = FakeEngine::default();

        let path = synthesize_one(&mut engine, &ModelRef::Named("fake".into()), 0, "سلام", "fa", &out)
            .unwrap();
        assert_eq!(path, out);
        assert!(out.exists());
        assert_eq!((engine.loads, engine.unloads), (1, 1));
    }

    #[test]
    fn synthesize_one_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = FakeEngine::failing_on(&["bad"]);
        let err = synthesize_one(
            &mut engine,
            &ModelRef::Named("fake".into()),
            0,
            "bad",
            "fa",
            &dir.path().join("o.wav"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::SynthesisFailed(_)));
        assert_eq!(engine.unloads, 1);
    }
}
