use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use crate::error::{SolverError, SolverResult};

/// A line of OCR text with its mean word confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    pub text: String,
    pub confidence: f32,
}

/// Runs the tesseract CLI on binarized images.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
}

impl TesseractEngine {
    pub fn new(executable: PathBuf, tessdata: Option<PathBuf>) -> Self {
        Self {
            executable,
            tessdata,
        }
    }

    /// Recognizes text lines in the order tesseract reports them.
    pub fn recognize(&self, img: &GrayImage) -> SolverResult<Vec<OcrLine>> {
        // Tesseract rejects zero-sized input
        if img.width() == 0 || img.height() == 0 {
            return Ok(Vec::new());
        }

        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())?;

        let mut command = Command::new(&self.executable);
        command.arg(temp_input.path()).arg("stdout");
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        // psm 3: fully automatic page segmentation, the regions hold paragraphs
        command.args(["-l", "eng", "--psm", "3", "tsv"]);

        let output = command.output().map_err(|e| {
            SolverError::Extraction(format!(
                "Failed to run {}: {}",
                self.executable.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SolverError::Extraction(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        Ok(parse_tsv_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Groups Tesseract TSV word rows into lines.
///
/// Lines are keyed by (block, paragraph, line) since `line_num` restarts in
/// every paragraph. Output order is the order lines first appear in the TSV.
pub fn parse_tsv_output(tsv: &str) -> Vec<OcrLine> {
    let mut lines: Vec<OcrLine> = Vec::new();
    let mut current_key: Option<(i32, i32, i32)> = None;
    let mut words: Vec<&str> = Vec::new();
    let mut conf_sum: f32 = 0.0;

    // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
    //             left, top, width, height, conf, text
    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // Level 5 = word
        if fields[0].trim() != "5" {
            continue;
        }

        let text = fields[11].trim();
        let conf: f32 = fields[10].trim().parse().unwrap_or(-1.0);
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (
            fields[2].trim().parse().unwrap_or(-1),
            fields[3].trim().parse().unwrap_or(-1),
            fields[4].trim().parse().unwrap_or(-1),
        );

        if current_key != Some(key) {
            push_line(&mut lines, &words, conf_sum);
            words.clear();
            conf_sum = 0.0;
            current_key = Some(key);
        }

        words.push(text);
        conf_sum += conf;
    }

    push_line(&mut lines, &words, conf_sum);
    lines
}

fn push_line(lines: &mut Vec<OcrLine>, words: &[&str], conf_sum: f32) {
    if !words.is_empty() {
        lines.push(OcrLine {
            text: words.join(" "),
            confidence: conf_sum / words.len() as f32,
        });
    }
}
