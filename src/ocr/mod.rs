pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::{OcrWord, TextRecognizer};
pub use preprocess::enhance_for_ocr;
pub use setup::build_tesseract;
