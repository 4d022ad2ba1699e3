use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

/// A single recognized text box from Tesseract's TSV output.
///
/// Coordinates are pixels relative to the recognized image.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f32,
}

/// Anything that can turn an image into positioned words.
pub trait TextRecognizer {
    fn recognize(&self, img: &GrayImage) -> Result<Vec<OcrWord>>;
}

/// Tesseract command-line engine.
#[derive(Debug, Clone)]
pub struct Tesseract {
    pub executable: PathBuf,
    pub tessdata: Option<PathBuf>,
    pub language: String,
    pub page_segmentation_mode: Option<u8>,
}

impl Tesseract {
    fn command(&self, input: &std::path::Path, output_base: &str) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(input).arg(output_base);
        if let Some(tessdata) = &self.tessdata {
            cmd.arg("--tessdata-dir").arg(tessdata);
        }
        cmd.arg("-l").arg(&self.language);
        if let Some(psm) = self.page_segmentation_mode {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd.arg("tsv");
        cmd
    }
}

impl TextRecognizer for Tesseract {
    /// Runs Tesseract on the image and returns every TSV row.
    fn recognize(&self, img: &GrayImage) -> Result<Vec<OcrWord>> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())?;

        // Tesseract appends .tsv to the output base
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let output = self
            .command(temp_input.path(), &output_base)
            .output()
            .with_context(|| format!("Failed to run {}", self.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr.trim()));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;
        let _ = std::fs::remove_file(&tsv_path);

        let words = parse_tsv_output(&tsv_content);
        log::debug!("Tesseract returned {} rows", words.len());
        Ok(words)
    }
}

/// Parses Tesseract TSV output.
///
/// All levels (page, block, paragraph, line, word) are returned; only word
/// rows carry text. Rows too short to hold a bounding box are skipped.
pub fn parse_tsv_output(tsv: &str) -> Vec<OcrWord> {
    let mut words = Vec::new();

    for line in tsv.lines().skip(1) {
        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 11 {
            continue;
        }

        let number = |i: usize| fields[i].trim().parse::<i32>().unwrap_or(0);
        words.push(OcrWord {
            text: fields.get(11).copied().unwrap_or("").to_string(),
            left: number(6),
            top: number(7),
            width: number(8),
            height: number(9),
            confidence: fields[10].trim().parse().unwrap_or(-1.0),
        });
    }

    words
}
