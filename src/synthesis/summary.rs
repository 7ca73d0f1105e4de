use std::path::PathBuf;

use serde::Serialize;

use super::jobs::{snippet, SynthesisJob};

/// Result of one synthesis job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SynthesisOutcome {
    Success { path: PathBuf },
    Failure { reason: String },
}

impl SynthesisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SynthesisOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub index: usize,
    /// First characters of the utterance, for triage.
    pub snippet: String,
    pub outcome: SynthesisOutcome,
}

impl JobReport {
    pub(crate) fn new(job: &SynthesisJob, outcome: SynthesisOutcome) -> Self {
        Self {
            index: job.index,
            snippet: snippet(&job.text).to_string(),
            outcome,
        }
    }
}

/// Tally of a completed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub output_dir: PathBuf,
    pub jobs: Vec<JobReport>,
}

impl BatchSummary {
    pub(crate) fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, report: JobReport) {
        self.total += 1;
        if report.outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.jobs.push(report);
    }

    /// Failed jobs with their reasons, in batch order.
    pub fn failures(&self) -> impl Iterator<Item = (&JobReport, &str)> {
        self.jobs.iter().filter_map(|job| match &job.outcome {
            SynthesisOutcome::Failure { reason } => Some((job, reason.as_str())),
            SynthesisOutcome::Success { .. } => None,
        })
    }

    /// A batch counts as successful when at least one job produced audio.
    pub fn is_success(&self) -> bool {
        self.succeeded > 0
    }
}
