use std::path::PathBuf;
use std::time::Instant;

use voiceclone_rs::{
    corpus::{prepare_corpus, PrepareConfigBuilder},
    engines::coqui::{CoquiEngine, CoquiModelParams},
    synthesis::{BatchConfigBuilder, BatchSynthesisRunner},
    transcode::FfmpegTranscoder,
    ModelRef,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let prepare = PrepareConfigBuilder::default()
        .input_dir("raw_audio")
        .output_dir("dataset")
        .build()?;

    let prep_start = Instant::now();
    let report = prepare_corpus(&prepare, FfmpegTranscoder::new())?;
    println!(
        "Converted {}/{} recordings in {:.2?}",
        report.converted,
        report.attempted,
        prep_start.elapsed()
    );
    for step in report.next_steps() {
        println!("  - {step}");
    }

    let batch = BatchConfigBuilder::default()
        .text_file("sentences.txt")
        .model(ModelRef::Path(PathBuf::from("my_finetuned_model/best_model.pth")))
        .language("fa")
        .output_dir("batch_output")
        .build()?;

    let params = CoquiModelParams {
        config_path: Some(PathBuf::from("my_finetuned_model/config.json")),
        use_cuda: true,
    };

    let synth_start = Instant::now();
    let summary = BatchSynthesisRunner::new(CoquiEngine::new(), batch)
        .with_model_params(params)
        .run()?;
    println!(
        "Synthesized {}/{} lines in {:.2?}",
        summary.succeeded,
        summary.total,
        synth_start.elapsed()
    );
    for (job, reason) in summary.failures() {
        println!("  #{} {:?}: {reason}", job.index, job.snippet);
    }

    Ok(())
}
