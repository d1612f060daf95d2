pub mod camera;
pub mod check;
pub mod config;
pub mod delete;
pub mod file;
pub mod history;
pub mod text;

use std::path::PathBuf;
use std::sync::Arc;

use moodscan_analysis::{AnalysisResult, Analyzer, JsonlRecordStore};
use moodscan_capture_engine::{detect_camera, CaptureConfig};
use moodscan_common::config::AppConfig;
use moodscan_common::notify::{EventSink, SilentSink, TracingSink};
use moodscan_ocr::{OcrExtractor, TesseractFactory};

/// Settings shared by every command.
pub struct Context {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub json: bool,
}

impl Context {
    pub fn store(&self) -> JsonlRecordStore {
        JsonlRecordStore::new(self.config.history_path())
    }

    pub fn events(&self) -> Arc<dyn EventSink> {
        if self.config.notifications.enabled {
            Arc::new(TracingSink)
        } else {
            Arc::new(SilentSink)
        }
    }

    pub fn tesseract(&self) -> TesseractFactory {
        TesseractFactory::from_config(&self.config.ocr)
    }

    /// An analyzer wired to tesseract, the history file, and `camera_source`.
    pub fn analyzer(&self, camera_source: Option<&std::path::Path>) -> Analyzer {
        Analyzer::new(
            OcrExtractor::new(Arc::new(self.tesseract())),
            detect_camera(camera_source),
        )
        .with_events(self.events())
        .with_store(Arc::new(self.store()))
        .with_auto_save(self.config.analysis.auto_save)
        .with_capture_config(CaptureConfig::from(&self.config.capture))
    }

    pub fn print_result(&self, result: &AnalysisResult) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(result)?);
            return Ok(());
        }

        println!("Sentiment: {}", result.sentiment().label());
        println!("Confidence: {}%", result.confidence());
        println!("Summary: {}", result.summary());
        println!("Source: {}", result.source());
        if let Some(ocr) = result.ocr_confidence() {
            println!("OCR confidence: {ocr}%");
        }
        println!();
        println!("Text:");
        for line in result.text().lines() {
            println!("  {line}");
        }
        Ok(())
    }
}
