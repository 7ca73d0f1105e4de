//! Batch speech synthesis.
//!
//! A text file is split into trimmed, non-blank lines. Line `i` (1-based,
//! blanks not counted) becomes `output_{i:03}.wav` in the output directory.
//! The engine is loaded once, jobs run one at a time in file order, and a job
//! that fails is recorded and skipped:
//!
//! ```text
//! Idle -> EngineLoading -> Running{1} -> ... -> Running{N} -> Completed
//!              \-> Aborted (missing input, unwritable output, engine load failure)
//! ```
//!
//! Re-running the same text file writes the same file names again,
//! overwriting earlier outputs.

pub mod jobs;
pub mod runner;
pub mod summary;

pub use jobs::{output_filename, parse_text_lines, plan_jobs, read_text_lines, SynthesisJob, TextLine};
pub use runner::{
    synthesize_one, BatchConfig, BatchConfigBuilder, BatchSynthesisRunner, RunnerState,
    DEFAULT_LANGUAGE,
};
pub use summary::{BatchSummary, JobReport, SynthesisOutcome};
