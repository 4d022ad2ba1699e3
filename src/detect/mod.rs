//! Button detection from OCR output.
//!
//! Recognized words are matched against the button captions, converted to
//! screen coordinates, and the candidate lowest on screen is chosen. OCR is
//! retried a few times before giving up.

use anyhow::Result;
use image::{GrayImage, RgbaImage};
use std::thread;
use std::time::Duration;

use crate::config::DetectorConfig;
use crate::ocr::{enhance_for_ocr, OcrWord, TextRecognizer};

/// A recognized word that matches a button caption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonCandidate {
    /// Lowercased caption, e.g. "drop"
    pub text: String,
    /// Center of the word in screen coordinates
    pub position: (i32, i32),
}

/// Result of a detection run.
#[derive(Debug)]
pub struct Detection {
    pub found: Option<ButtonCandidate>,
    /// Number of OCR attempts made
    pub attempts: u32,
    /// The enhanced image the last attempt recognized
    pub image: GrayImage,
    /// Every row the last attempt recognized
    pub words: Vec<OcrWord>,
    /// Matching words from the last attempt
    pub candidates: Vec<ButtonCandidate>,
}

/// The subset of config that drives detection.
#[derive(Clone, Debug)]
pub struct DetectionSettings {
    pub labels: Vec<String>,
    pub min_text_len: usize,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub posterize_bits: u8,
    pub contrast_level: f32,
    pub recapture_on_retry: bool,
}

impl From<&DetectorConfig> for DetectionSettings {
    fn from(config: &DetectorConfig) -> Self {
        Self {
            labels: config.button_labels.clone(),
            min_text_len: config.min_text_len,
            max_attempts: config.max_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            posterize_bits: config.posterize_bits,
            contrast_level: config.contrast_level,
            recapture_on_retry: config.recapture_on_retry,
        }
    }
}

/// Halves a pixel extent, rounding .5 to the nearest even number.
fn half_extent(extent: i32) -> i64 {
    (extent as f64 / 2.0).round_ties_even() as i64
}

/// Screen coordinate of a word's center along one axis, or None when it does
/// not fit the screen coordinate range.
fn center_on_screen(origin: i32, start: i32, extent: i32) -> Option<i32> {
    i32::try_from(origin as i64 + start as i64 + half_extent(extent)).ok()
}

/// True if the word is long enough to be considered at all.
pub fn is_meaningful(word: &OcrWord, min_text_len: usize) -> bool {
    word.text.trim().chars().count() >= min_text_len
}

/// Collects every word whose text equals one of the labels (case-insensitive).
///
/// `origin` is the screen position of the recognized image's top-left pixel.
pub fn find_candidates(
    words: &[OcrWord],
    origin: (i32, i32),
    settings: &DetectionSettings,
) -> Vec<ButtonCandidate> {
    words
        .iter()
        .filter(|word| is_meaningful(word, settings.min_text_len))
        .filter_map(|word| {
            let text = word.text.trim().to_lowercase();
            if !settings.labels.iter().any(|label| *label == text) {
                return None;
            }
            let x = center_on_screen(origin.0, word.left, word.width);
            let y = center_on_screen(origin.1, word.top, word.height);
            let (Some(x), Some(y)) = (x, y) else {
                log::warn!(
                    "Skipping \"{}\": position is outside the screen coordinate range",
                    word.text
                );
                return None;
            };
            log::debug!(
                "Matched \"{}\" at ({}, {}) (confidence {:.1})",
                word.text,
                x,
                y,
                word.confidence
            );
            Some(ButtonCandidate {
                text,
                position: (x, y),
            })
        })
        .collect()
}

/// Returns the candidate with the largest y. The first one wins ties.
pub fn find_lowest(candidates: &[ButtonCandidate]) -> Option<&ButtonCandidate> {
    let mut lowest = candidates.first()?;
    for candidate in candidates {
        if candidate.position.1 > lowest.position.1 {
            lowest = candidate;
        }
    }
    Some(lowest)
}

/// Runs OCR on frames from `grab` until a button is found or attempts run out.
///
/// The first frame is grabbed once; later attempts reuse it unless
/// `recapture_on_retry` is set. Recognizer and capture errors abort the run.
pub fn detect_button<F, R>(
    mut grab: F,
    recognizer: &R,
    origin: (i32, i32),
    settings: &DetectionSettings,
) -> Result<Detection>
where
    F: FnMut() -> Result<RgbaImage>,
    R: TextRecognizer + ?Sized,
{
    let max_attempts = settings.max_attempts.max(1);
    let enhance = |frame: &RgbaImage| {
        enhance_for_ocr(frame, settings.posterize_bits, settings.contrast_level)
    };

    let mut image = enhance(&grab()?);
    let mut words = Vec::new();
    let mut candidates = Vec::new();
    let mut found = None;
    let mut attempts = 0;

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            thread::sleep(settings.retry_delay);
            if settings.recapture_on_retry {
                image = enhance(&grab()?);
            }
        }

        attempts = attempt;
        log::info!("Attempt {} of {}", attempt, max_attempts);

        words = recognizer.recognize(&image)?;
        candidates = find_candidates(&words, origin, settings);
        log::debug!("Recognized {} rows", words.len());

        found = find_lowest(&candidates).cloned();
        if found.is_some() {
            break;
        }
    }

    Ok(Detection {
        found,
        attempts,
        image,
        words,
        candidates,
    })
}
