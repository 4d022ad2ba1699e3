use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::engine::Tesseract;
use crate::config::DetectorConfig;
use crate::paths::get_tesseract_dir;

#[cfg(windows)]
const TESSERACT_EXE: &str = "tesseract.exe";
#[cfg(not(windows))]
const TESSERACT_EXE: &str = "tesseract";

#[cfg(windows)]
const COMMON_PATHS: &[&str] = &[
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
];
#[cfg(not(windows))]
const COMMON_PATHS: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

/// Builds the Tesseract engine from config, resolving executable and tessdata.
///
/// `override_path` comes from the command line and wins over everything else.
pub fn build_tesseract(
    config: &DetectorConfig,
    override_path: Option<&Path>,
) -> Result<Tesseract> {
    let configured = override_path.or(config.tesseract_path.as_deref());
    let executable = find_tesseract_executable(configured)?;
    let tessdata = find_tessdata_dir(config);

    log::debug!(
        "Using Tesseract {} (tessdata: {})",
        executable.display(),
        tessdata
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "default".to_string())
    );

    Ok(Tesseract {
        executable,
        tessdata,
        language: config.language.clone(),
        page_segmentation_mode: config.page_segmentation_mode,
    })
}

/// Finds the Tesseract executable.
///
/// Order: configured path, `TESSERACT_CMD`, the per-user install directory,
/// `PATH`, then the usual install locations.
pub fn find_tesseract_executable(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() || responds_to_version(path) {
            return Ok(path.to_path_buf());
        }
        return Err(anyhow!("Configured Tesseract not found: {}", path.display()));
    }

    if let Some(cmd) = std::env::var_os("TESSERACT_CMD") {
        let p = PathBuf::from(cmd);
        if p.exists() {
            return Ok(p);
        }
        log::warn!("TESSERACT_CMD points to missing file {}", p.display());
    }

    let local_exe = get_tesseract_dir().join(TESSERACT_EXE);
    if local_exe.exists() {
        return Ok(local_exe);
    }

    let on_path = PathBuf::from("tesseract");
    if responds_to_version(&on_path) {
        return Ok(on_path);
    }

    for path in COMMON_PATHS {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "Tesseract not found. Install Tesseract-OCR and add it to PATH, \
         set \"tesseract_path\" in config.json, or pass --tesseract"
    ))
}

/// Picks a tessdata directory, or None to let Tesseract use its own default
/// (which honours `TESSDATA_PREFIX`).
pub fn find_tessdata_dir(config: &DetectorConfig) -> Option<PathBuf> {
    find_tessdata_in(config, &get_tesseract_dir())
}

/// Same as `find_tessdata_dir`, with the per-user Tesseract directory given.
fn find_tessdata_in(config: &DetectorConfig, tesseract_dir: &Path) -> Option<PathBuf> {
    if let Some(dir) = &config.tessdata_dir {
        return Some(dir.clone());
    }

    let local_tessdata = tesseract_dir.join("tessdata");
    let traineddata = format!("{}.traineddata", config.language);
    if local_tessdata.join(&traineddata).exists() {
        return Some(local_tessdata);
    }

    None
}

fn responds_to_version(exe: &Path) -> bool {
    Command::new(exe)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
