use clap::Parser;
use std::path::PathBuf;

use crate::capture::ScreenRect;

#[derive(Parser, Debug)]
#[command(
    name = "gspro-button-detect",
    version,
    about = "Detects the position of buttons in GSPro",
    after_help = "https://github.com/dudewheresmycode/gspro-button-detect"
)]
pub struct Args {
    /// X position of screen to capture
    #[arg(short = 'x', long = "xpos", default_value_t = 0, allow_negative_numbers = true)]
    pub xpos: i32,

    /// Y position of screen to capture
    #[arg(short = 'y', long = "ypos", default_value_t = 0, allow_negative_numbers = true)]
    pub ypos: i32,

    /// Width of screen to capture
    #[arg(
        short = 'w',
        long,
        default_value_t = 640,
        value_parser = clap::value_parser!(u32).range(1..=i32::MAX as i64)
    )]
    pub width: u32,

    /// Height of screen to capture
    #[arg(
        short = 't',
        long,
        default_value_t = 480,
        value_parser = clap::value_parser!(u32).range(1..=i32::MAX as i64)
    )]
    pub height: u32,

    /// Show debug window
    #[arg(short, long)]
    pub debug: bool,

    /// Config file (defaults to config.json next to the executable)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Tesseract executable, overrides config and discovery
    #[arg(long)]
    pub tesseract: Option<PathBuf>,

    /// Read the region from an image file instead of the screen
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Save the annotated debug image to this PNG file
    #[arg(long)]
    pub save_debug: Option<PathBuf>,

    /// Print the result as JSON instead of "X Y"
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn screen_rect(&self) -> ScreenRect {
        ScreenRect::new(self.xpos, self.ypos, self.width, self.height)
    }
}
