//! Analysis orchestration.
//!
//! [`Analyzer`] resolves each input to plain text, classifies it, reports
//! the outcome through the event sink and, when auto-save is on, hands the
//! result to the record store. It also owns the single capture session a
//! user may have open at a time.

use std::sync::{Arc, Mutex, MutexGuard};

use moodscan_capture_engine::{CaptureConfig, CaptureSession, SessionState};
use moodscan_common::error::{MoodscanError, MoodscanResult};
use moodscan_common::notify::{EventSink, Notice, TracingSink};
use moodscan_ocr::OcrExtractor;
use moodscan_platform_core::CameraDevice;
use moodscan_sentiment::Classifier;

use crate::input::AnalysisInput;
use crate::result::{AnalysisResult, Source};
use crate::store::{AnalysisRecord, RecordStore};

/// Text resolved from an input, with the OCR score when recognition was involved.
struct Resolved {
    text: String,
    ocr_confidence: Option<u8>,
}

/// Top-level coordinator for analysis requests.
pub struct Analyzer {
    ocr: OcrExtractor,
    classifier: Classifier,
    camera: Arc<dyn CameraDevice>,
    capture_config: CaptureConfig,
    events: Arc<dyn EventSink>,
    store: Option<Arc<dyn RecordStore>>,
    auto_save: bool,
    active_capture: Mutex<Option<CaptureSession>>,
}

impl Analyzer {
    pub fn new(ocr: OcrExtractor, camera: Arc<dyn CameraDevice>) -> Self {
        Self {
            ocr,
            classifier: Classifier::new(),
            camera,
            capture_config: CaptureConfig::default(),
            events: Arc::new(TracingSink),
            store: None,
            auto_save: true,
            active_capture: Mutex::new(None),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Persist successful analyses to `store` while auto-save is on.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    pub fn with_capture_config(mut self, config: CaptureConfig) -> Self {
        self.capture_config = config;
        self
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Analyze one input.
    ///
    /// Every outcome is reported to the event sink. A failure produces no
    /// result; a failure to save a result is reported but does not fail
    /// the analysis.
    pub async fn analyze(&self, input: AnalysisInput) -> MoodscanResult<AnalysisResult> {
        let source = input.source();

        let resolved = match self.resolve(input).await {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!(%source, error = %err, "Analysis failed");
                self.events.notify(failure_notice(&err, source));
                return Err(err);
            }
        };

        let classification = self.classifier.classify(&resolved.text);
        let result = AnalysisResult::new(
            resolved.text,
            classification,
            source,
            resolved.ocr_confidence,
        );

        tracing::info!(
            %source,
            sentiment = %result.sentiment(),
            confidence = result.confidence(),
            ocr_confidence = ?result.ocr_confidence(),
            "Analysis complete"
        );
        self.events.notify(Notice::info(
            "Analysis Complete",
            format!(
                "{} sentiment detected ({}% confidence)",
                result.sentiment().label(),
                result.confidence()
            ),
        ));

        self.persist(&result).await;
        Ok(result)
    }

    /// Confirm a capture session and analyze the confirmed image.
    pub async fn analyze_capture(&self, session: &CaptureSession) -> MoodscanResult<AnalysisResult> {
        let image = session.confirm()?;
        self.analyze(AnalysisInput::Camera(image)).await
    }

    /// Open a capture session on the configured camera.
    ///
    /// Only one session may be open at a time. A previous session that has
    /// closed or failed is replaced; one that is still live makes this an
    /// invalid-state error.
    pub fn open_capture(&self) -> MoodscanResult<CaptureSession> {
        let mut active = self.active_capture();

        if let Some(previous) = active.as_ref() {
            match previous.state() {
                SessionState::Closed => {}
                SessionState::Error => previous.close(),
                state => return Err(MoodscanError::invalid_state("open capture", state)),
            }
        }

        let session = CaptureSession::new(
            self.camera.clone(),
            self.capture_config,
            self.events.clone(),
        );
        session.open()?;
        *active = Some(session.clone());
        Ok(session)
    }

    /// Close the open capture session, if any.
    pub fn close_capture(&self) {
        if let Some(session) = self.active_capture().take() {
            session.close();
        }
    }

    async fn resolve(&self, input: AnalysisInput) -> MoodscanResult<Resolved> {
        match input {
            AnalysisInput::Text(text) => {
                if text.trim().is_empty() {
                    return Err(MoodscanError::EmptyInput);
                }
                Ok(Resolved {
                    text,
                    ocr_confidence: None,
                })
            }
            AnalysisInput::File(file) if file.is_image() => {
                tracing::debug!(name = %file.name, content_type = %file.content_type, "Recognizing image file");
                self.recognize(&file.bytes).await
            }
            AnalysisInput::File(file) => Ok(Resolved {
                text: file.decode_text(),
                ocr_confidence: None,
            }),
            AnalysisInput::Camera(image) => {
                tracing::debug!(width = image.width, height = image.height, "Recognizing captured image");
                self.recognize(&image.bytes).await
            }
        }
    }

    async fn recognize(&self, image: &[u8]) -> MoodscanResult<Resolved> {
        let ocr = self.ocr.extract(image).await?;
        if ocr.is_empty() {
            return Err(MoodscanError::NoTextExtracted);
        }
        Ok(Resolved {
            text: ocr.text,
            ocr_confidence: Some(ocr.confidence),
        })
    }

    async fn persist(&self, result: &AnalysisResult) {
        if !self.auto_save {
            return;
        }
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let record = AnalysisRecord::from_result(result);
        let id = record.id;
        match store.insert(record).await {
            Ok(()) => tracing::debug!(%id, "Analysis saved"),
            Err(err) => {
                tracing::warn!(%id, error = %err, "Failed to save analysis");
                self.events
                    .notify(Notice::destructive("Save Failed", err.to_string()));
            }
        }
    }

    fn active_capture(&self) -> MutexGuard<'_, Option<CaptureSession>> {
        self.active_capture
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn failure_notice(err: &MoodscanError, source: Source) -> Notice {
    match (err, source) {
        (MoodscanError::EmptyInput, _) => {
            Notice::destructive("No text provided", "Please enter text to analyze.")
        }
        (MoodscanError::NoTextExtracted, Source::Camera) => Notice::destructive(
            "No text found",
            "Unable to extract text from the captured image.",
        ),
        (MoodscanError::NoTextExtracted, _) => {
            Notice::destructive("No text found", "Unable to extract text from the image.")
        }
        (_, Source::Camera) => {
            Notice::destructive("Processing Error", "Failed to process the captured image.")
        }
        (_, Source::File) => {
            Notice::destructive("Processing Error", "Failed to process the uploaded file.")
        }
        (_, Source::Text) => Notice::destructive("Processing Error", "Failed to analyze the text."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_notices_follow_source() {
        let notice = failure_notice(&MoodscanError::NoTextExtracted, Source::Camera);
        assert_eq!(notice.description, "Unable to extract text from the captured image.");

        let notice = failure_notice(&MoodscanError::NoTextExtracted, Source::File);
        assert_eq!(notice.description, "Unable to extract text from the image.");

        let notice = failure_notice(&MoodscanError::recognition("boom"), Source::File);
        assert_eq!(notice.title, "Processing Error");
        assert_eq!(notice.description, "Failed to process the uploaded file.");

        let notice = failure_notice(&MoodscanError::EmptyInput, Source::Text);
        assert_eq!(notice.title, "No text provided");
    }
}
