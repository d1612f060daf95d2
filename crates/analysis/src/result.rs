//! Analysis result types.

use serde::{Deserialize, Serialize};

use moodscan_sentiment::{Classification, Sentiment};

/// Where the analyzed text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Text,
    File,
    Camera,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Text => "text",
            Source::File => "file",
            Source::Camera => "camera",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one analysis request. Immutable once built.
///
/// `ocr_confidence` is set exactly when the text was recognized from an
/// image (an image file or a camera capture).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    text: String,
    sentiment: Sentiment,
    confidence: u8,
    summary: String,
    source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    ocr_confidence: Option<u8>,
}

impl AnalysisResult {
    pub(crate) fn new(
        text: String,
        classification: Classification,
        source: Source,
        ocr_confidence: Option<u8>,
    ) -> Self {
        Self {
            text,
            sentiment: classification.sentiment,
            confidence: classification.confidence,
            summary: classification.summary,
            source,
            ocr_confidence,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }

    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn ocr_confidence(&self) -> Option<u8> {
        self.ocr_confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodscan_sentiment::classify;

    #[test]
    fn serializes_without_absent_ocr_confidence() {
        let result = AnalysisResult::new(
            "great".to_string(),
            classify("great"),
            Source::Text,
            None,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source"], "text");
        assert_eq!(json["sentiment"], "positive");
        assert!(json.get("ocr_confidence").is_none());
    }

    #[test]
    fn serializes_ocr_confidence_when_present() {
        let result = AnalysisResult::new(
            "awful".to_string(),
            classify("awful"),
            Source::Camera,
            Some(72),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source"], "camera");
        assert_eq!(json["ocr_confidence"], 72);
    }
}
