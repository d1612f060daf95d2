//! Scoped text extraction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use moodscan_common::error::MoodscanResult;
use moodscan_platform_core::{EngineFactory, Recognition, RecognitionEngine};

/// Text recognized in one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text with surrounding whitespace removed. May be empty.
    pub text: String,
    /// Engine confidence rounded to an integer in 0..=100.
    pub confidence: u8,
}

impl OcrResult {
    fn from_recognition(recognition: Recognition) -> Self {
        let confidence = if recognition.confidence.is_finite() {
            recognition.confidence.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        Self {
            text: recognition.text.trim().to_string(),
            confidence,
        }
    }

    /// Whether the engine found no usable text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Holds one engine instance and terminates it exactly once.
///
/// Termination happens on drop, so early returns, errors, and a cancelled
/// extraction future all release the engine.
struct EngineLease {
    engine: Box<dyn RecognitionEngine>,
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        self.engine.terminate();
        tracing::debug!("Recognition engine terminated");
    }
}

/// Extracts text from images using a fresh engine per call.
#[derive(Clone)]
pub struct OcrExtractor {
    factory: Arc<dyn EngineFactory>,
}

impl OcrExtractor {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self { factory }
    }

    /// Name of the underlying engine.
    pub fn engine_name(&self) -> &str {
        self.factory.name()
    }

    /// Recognize text in `image`.
    ///
    /// Fails with `EngineUnavailable` when no engine can be created and
    /// `RecognitionFailed` when the engine errors. Empty text is a valid
    /// result, not an error.
    pub async fn extract(&self, image: &[u8]) -> MoodscanResult<OcrResult> {
        tracing::debug!(engine = self.factory.name(), bytes = image.len(), "Starting OCR");

        let mut lease = EngineLease {
            engine: self.factory.create().await?,
        };
        let recognition = lease.engine.recognize(image).await;
        drop(lease);
        let recognition = recognition?;

        let result = OcrResult::from_recognition(recognition);
        tracing::info!(
            engine = self.factory.name(),
            chars = result.text.len(),
            confidence = result.confidence,
            "OCR complete"
        );
        Ok(result)
    }
}
