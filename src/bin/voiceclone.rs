use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use voiceclone_rs::config::ProjectConfig;
use voiceclone_rs::corpus::{prepare_corpus, Dataset, IndexMode};
use voiceclone_rs::preflight::{default_checks, run_checks};
use voiceclone_rs::synthesis::{synthesize_one, BatchSynthesisRunner};
use voiceclone_rs::transcode::FfmpegTranscoder;
use voiceclone_rs::{Error, ModelRef};

#[derive(Parser)]
#[command(name = "voiceclone", version, about = "Voice-cloning corpus and batch synthesis tools")]
struct Cli {
    /// JSON settings file; flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the run report as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert raw recordings into wavs/ plus a metadata.csv template.
    Prepare {
        #[arg(long)]
        input_dir: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        sample_rate: Option<u32>,
        /// Number converted files by success count instead of source position.
        #[arg(long)]
        dense: bool,
        #[arg(long)]
        ffmpeg: Option<PathBuf>,
    },
    /// Synthesize one WAV per non-blank line of a text file.
    Batch {
        #[arg(long)]
        text_file: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Synthesize a single utterance.
    Say {
        #[arg(long)]
        text: String,
        #[arg(long, default_value = "output.wav")]
        output_path: PathBuf,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Check that the external tools are installed.
    Verify,
    /// Report missing audio and untranscribed rows of a prepared corpus.
    Inspect {
        #[arg(long, default_value = "dataset")]
        data_path: PathBuf,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Fine-tuned checkpoint.
    #[arg(long, conflicts_with = "model_name")]
    model_path: Option<PathBuf>,
    /// Named pretrained model.
    #[arg(long)]
    model_name: Option<String>,
    #[arg(long)]
    config_path: Option<PathBuf>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    use_cuda: bool,
    #[arg(long)]
    tts_binary: Option<PathBuf>,
}

impl EngineArgs {
    fn apply(self, config: &mut ProjectConfig) {
        if let Some(path) = self.model_path {
            config.batch.model = ModelRef::Path(path);
        }
        if let Some(name) = self.model_name {
            config.batch.model = ModelRef::Named(name);
        }
        if let Some(language) = self.language {
            config.batch.language = language;
        }
        if self.config_path.is_some() {
            config.engine.config_path = self.config_path;
        }
        if let Some(binary) = self.tts_binary {
            config.engine.tts_binary = binary;
        }
        config.engine.use_cuda |= self.use_cuda;
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize report: {e}"),
    }
}

fn run(cli: Cli) -> Result<i32, Error> {
    let mut config = ProjectConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Prepare {
            input_dir,
            output_dir,
            sample_rate,
            dense,
            ffmpeg,
        } => {
            let prepare = &mut config.prepare;
            if let Some(dir) = input_dir {
                prepare.input_dir = dir;
            }
            if let Some(dir) = output_dir {
                prepare.output_dir = dir;
            }
            if let Some(rate) = sample_rate {
                prepare.sample_rate = rate;
            }
            if dense {
                prepare.index_mode = IndexMode::Dense;
            }
            let transcoder = ffmpeg
                .map(|path| FfmpegTranscoder::with_binary(path))
                .unwrap_or_default();

            let report = prepare_corpus(prepare, transcoder)?;
            if cli.json {
                print_json(&report);
            } else {
                println!("Dataset prepared successfully!");
                println!(
                    "  Converted files: {}/ ({} of {})",
                    report.wavs_dir.display(),
                    report.converted,
                    report.attempted
                );
                println!("  Metadata template: {}", report.metadata_path.display());
                for failure in &report.failures {
                    println!(
                        "  Skipped #{} {}: {}",
                        failure.position,
                        failure.source.display(),
                        failure.reason
                    );
                }
                println!("Next steps:");
                for (i, step) in report.next_steps().iter().enumerate() {
                    println!("  {}. {step}", i + 1);
                }
            }
            Ok(0)
        }
        Command::Batch {
            text_file,
            output_dir,
            engine,
        } => {
            engine.apply(&mut config);
            if let Some(path) = text_file {
                config.batch.text_file = path;
            }
            if let Some(dir) = output_dir {
                config.batch.output_dir = dir;
            }

            let mut runner =
                BatchSynthesisRunner::new(config.engine.engine(), config.batch.clone())
                    .with_model_params(config.engine.model_params());
            let summary = runner.run()?;

            if cli.json {
                print_json(&summary);
            } else {
                println!(
                    "Batch synthesis complete: {} of {} succeeded, {} failed",
                    summary.succeeded, summary.total, summary.failed
                );
                for (job, reason) in summary.failures() {
                    println!("  #{} \"{}\": {reason}", job.index, job.snippet);
                }
                println!("Output files saved to: {}/", summary.output_dir.display());
            }
            Ok(if summary.is_success() { 0 } else { 1 })
        }
        Command::Say {
            text,
            output_path,
            engine,
        } => {
            engine.apply(&mut config);
            let mut coqui = config.engine.engine();
            let path = synthesize_one(
                &mut coqui,
                &config.batch.model,
                config.engine.model_params(),
                &text,
                &config.batch.language,
                &output_path,
            )?;
            println!("Output saved to: {}", path.display());
            Ok(0)
        }
        Command::Verify => {
            let report = run_checks(&default_checks(&config.preflight));
            if cli.json {
                print_json(&report);
            } else {
                for result in &report.results {
                    println!("{result}");
                }
                if report.passed() {
                    println!("All checks passed! Ready to use.");
                } else {
                    println!("Some checks failed. Please review the errors above.");
                }
            }
            Ok(report.exit_code())
        }
        Command::Inspect { data_path } => {
            let dataset = Dataset::open(data_path)?;
            let inspection =
                dataset.inspect_with_placeholder(&config.prepare.placeholder_transcript);
            if cli.json {
                print_json(&inspection);
            } else {
                println!("{} records in {}", inspection.records, dataset.root().display());
                for name in &inspection.missing_audio {
                    println!("  missing audio: {name}");
                }
                for name in &inspection.pending_transcription {
                    println!("  needs transcription: {name}");
                }
            }
            Ok(if inspection.is_ready() { 0 } else { 1 })
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let code = match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            e.exit_code()
        }
    };
    ExitCode::from(code as u8)
}
