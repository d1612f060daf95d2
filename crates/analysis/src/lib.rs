//! Moodscan Analysis
//!
//! The top-level coordinator. Text arrives through one of three channels:
//!
//! - **Text:** typed or pasted, used as-is
//! - **File:** images go through OCR, everything else is decoded as text
//! - **Camera:** a confirmed capture session frame, always through OCR
//!
//! Each path ends in the sentiment classifier and produces an
//! [`AnalysisResult`] tagged with where the text came from.

pub mod input;
pub mod orchestrator;
pub mod result;
pub mod store;

pub use input::*;
pub use orchestrator::*;
pub use result::*;
pub use store::*;
