use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{Error, Result};

/// Characters of an utterance shown in progress and triage output.
pub const SNIPPET_CHARS: usize = 50;

/// A trimmed, non-empty line of the input text file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextLine(String);

impl TextLine {
    /// Trim `raw`; blank lines yield `None`.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One synthesis call of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisJob {
    /// 1-based position among the non-blank lines.
    pub index: usize,
    pub text: String,
    pub output_path: PathBuf,
}

impl SynthesisJob {
    pub fn snippet(&self) -> &str {
        snippet(&self.text)
    }
}

/// File name of the batch output with the given index.
pub fn output_filename(index: usize) -> String {
    format!("output_{index:03}.wav")
}

/// The first [`SNIPPET_CHARS`] characters of `text`.
pub fn snippet(text: &str) -> &str {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Split `content` into lines, trim them and drop the blank ones.
pub fn parse_text_lines(content: &str) -> Vec<TextLine> {
    content.lines().filter_map(TextLine::new).collect()
}

/// Read a UTF-8 text file with one utterance per line.
pub fn read_text_lines(path: &Path) -> Result<Vec<TextLine>> {
    let content = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    Ok(parse_text_lines(&content))
}

/// Number the lines 1..=N and give each a fixed output path.
pub fn plan_jobs(lines: &[TextLine], output_dir: &Path) -> Vec<SynthesisJob> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| SynthesisJob {
            index: i + 1,
            text: line.as_str().to_string(),
            output_path: output_dir.join(output_filename(i + 1)),
        })
        .collect()
}
