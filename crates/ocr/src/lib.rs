//! Moodscan OCR
//!
//! Turns an encoded image into trimmed text plus a 0-100 confidence score.
//! Every extraction runs on its own engine instance, which is torn down
//! before the call returns no matter how it ends.
//!
//! - **Extractor:** scoped engine lifetime and result normalization
//! - **Tesseract:** engine backed by the `tesseract` command-line tool

pub mod extractor;
pub mod tesseract;

pub use extractor::*;
pub use tesseract::{TesseractEngine, TesseractFactory};
