//! GSPro Button Detect
//!
//! Captures a region of the screen, runs OCR over it and prints the screen
//! coordinates of the "Drop" or "Rehit" button as `X Y` on stdout.

mod capture;
mod cli;
mod config;
mod detect;
mod ocr;
mod paths;
mod preview;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::thread;
use std::time::Duration;

use cli::Args;
use detect::{detect_button, ButtonCandidate, DetectionSettings};

/// Sets up logging to stderr with a timestamp prefix. stdout is reserved
/// for the detection result.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}

#[derive(Serialize)]
struct JsonResult<'a> {
    text: &'a str,
    x: i32,
    y: i32,
}

/// Formats the found button the way the caller expects on stdout.
fn format_result(found: &ButtonCandidate, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string(&JsonResult {
            text: &found.text,
            x: found.position.0,
            y: found.position.1,
        })?)
    } else {
        Ok(format!("{} {}", found.position.0, found.position.1))
    }
}

fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();
    let config = config::load_config(args.config.as_deref())?;
    let tesseract = ocr::build_tesseract(&config, args.tesseract.as_deref())?;

    let rect = args.screen_rect();
    rect.validate()?;
    let settings = DetectionSettings::from(&config);

    let grab = || match &args.image {
        Some(path) => capture::load_image(path),
        None => capture::capture_region(&rect),
    };

    if args.image.is_none() {
        thread::sleep(Duration::from_millis(config.settle_delay_ms));
    }

    let detection = detect_button(grab, &tesseract, rect.origin(), &settings)?;

    match &detection.found {
        Some(found) => {
            log::debug!(
                "Found \"{}\" among {} candidate(s) after {} attempt(s)",
                found.text,
                detection.candidates.len(),
                detection.attempts
            );
            println!("{}", format_result(found, args.json)?);
        }
        None => eprintln!("No matching button was found"),
    }

    if args.debug || args.save_debug.is_some() {
        let annotated = preview::annotate(&detection, rect.origin(), config.min_text_len);
        if let Some(path) = &args.save_debug {
            preview::save_preview(&annotated, path)?;
        }
        if args.debug {
            preview::show_preview(annotated, rect.width, rect.height)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_result_plain() {
        let found = ButtonCandidate {
            text: "drop".to_string(),
            position: (1412, 906),
        };
        assert_eq!(format_result(&found, false).unwrap(), "1412 906");
    }

    #[test]
    fn test_format_result_json() {
        let found = ButtonCandidate {
            text: "rehit".to_string(),
            position: (-20, 15),
        };
        assert_eq!(
            format_result(&found, true).unwrap(),
            r#"{"text":"rehit","x":-20,"y":15}"#
        );
    }
}
