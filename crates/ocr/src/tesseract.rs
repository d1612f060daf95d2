//! Recognition engine backed by the `tesseract` CLI.
//!
//! Each engine instance owns a private scratch directory. The image is
//! written there, tesseract is run with TSV output, and the word rows are
//! stitched back into lines. Terminating the engine removes the directory.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;

use moodscan_common::config::OcrConfig;
use moodscan_common::error::{MoodscanError, MoodscanResult};
use moodscan_platform_core::{EngineFactory, Recognition, RecognitionEngine};

/// TSV `level` value for word rows.
const WORD_LEVEL: i32 = 5;

/// Creates [`TesseractEngine`] instances.
#[derive(Debug, Clone)]
pub struct TesseractFactory {
    binary: PathBuf,
    language: String,
}

impl TesseractFactory {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.tesseract_path.clone(), config.language.clone())
    }

    /// First line of `tesseract --version`, or `EngineUnavailable`.
    pub async fn version(&self) -> MoodscanResult<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MoodscanError::engine_unavailable(format!(
                    "failed to run {} (is tesseract installed?): {e}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MoodscanError::engine_unavailable(format!(
                "tesseract --version failed: {}",
                stderr.trim()
            )));
        }

        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or("tesseract")
            .trim()
            .to_string())
    }
}

#[async_trait]
impl EngineFactory for TesseractFactory {
    async fn create(&self) -> MoodscanResult<Box<dyn RecognitionEngine>> {
        let version = self.version().await?;
        let workdir = tempfile::Builder::new()
            .prefix("moodscan-ocr-")
            .tempdir()
            .map_err(|e| {
                MoodscanError::engine_unavailable(format!("failed to create OCR workspace: {e}"))
            })?;

        tracing::debug!(%version, workdir = %workdir.path().display(), "Tesseract engine created");

        Ok(Box::new(TesseractEngine {
            binary: self.binary.clone(),
            language: self.language.clone(),
            workdir: Some(workdir),
        }))
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// One tesseract-backed engine instance.
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
    workdir: Option<TempDir>,
}

#[async_trait]
impl RecognitionEngine for TesseractEngine {
    async fn recognize(&mut self, image: &[u8]) -> MoodscanResult<Recognition> {
        let workdir = self
            .workdir
            .as_ref()
            .ok_or_else(|| MoodscanError::recognition("engine already terminated"))?;

        let input = workdir.path().join("input");
        tokio::fs::write(&input, image)
            .await
            .map_err(|e| MoodscanError::recognition(format!("failed to stage image: {e}")))?;

        let output = Command::new(&self.binary)
            .arg(&input)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("tsv")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MoodscanError::recognition(format!("failed to run tesseract: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MoodscanError::recognition(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }

        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }

    fn terminate(&mut self) {
        if let Some(workdir) = self.workdir.take() {
            let path = workdir.path().to_path_buf();
            if let Err(e) = workdir.close() {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove OCR workspace");
            }
        }
    }
}

/// Rebuild text and mean word confidence from tesseract TSV output.
///
/// Words on the same (page, block, paragraph, line) are joined by spaces,
/// lines by newlines. Rows with negative confidence carry no text and are
/// skipped.
pub fn parse_tsv(tsv: &str) -> Recognition {
    let mut lines: BTreeMap<(i32, i32, i32, i32), Vec<&str>> = BTreeMap::new();
    let mut confidence_sum = 0.0f32;
    let mut words = 0usize;

    for row in tsv.lines().skip(1) {
        let cols = row.split('\t').collect::<Vec<_>>();
        if cols.len() < 12 {
            continue;
        }
        let level: i32 = cols[0].parse().unwrap_or(0);
        if level != WORD_LEVEL {
            continue;
        }
        let conf: f32 = cols[10].trim().parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (
            cols[1].parse().unwrap_or(0),
            cols[2].parse().unwrap_or(0),
            cols[3].parse().unwrap_or(0),
            cols[4].parse().unwrap_or(0),
        );
        lines.entry(key).or_default().push(text);
        confidence_sum += conf;
        words += 1;
    }

    let text = lines
        .values()
        .map(|line| line.join(" "))
        .collect::<Vec<_>>()
        .join("\n");
    let confidence = if words == 0 {
        0.0
    } else {
        confidence_sum / words as f32
    };

    Recognition { text, confidence }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn row(level: i32, line: i32, word: i32, conf: &str, text: &str) -> String {
        format!("{level}\t1\t1\t1\t{line}\t{word}\t0\t0\t10\t10\t{conf}\t{text}")
    }

    #[test]
    fn joins_words_into_lines() {
        let tsv = [
            HEADER.to_string(),
            row(1, 0, 0, "-1", ""),
            row(4, 1, 0, "-1", ""),
            row(5, 1, 1, "90", "What"),
            row(5, 1, 2, "80", "a"),
            row(5, 1, 3, "70", "great"),
            row(5, 2, 1, "60", "day"),
        ]
        .join("\n");

        let recognition = parse_tsv(&tsv);
        assert_eq!(recognition.text, "What a great\nday");
        assert!((recognition.confidence - 75.0).abs() < 1e-4);
    }

    #[test]
    fn skips_rows_without_confidence() {
        let tsv = [
            HEADER.to_string(),
            row(5, 1, 1, "-1", " "),
            row(5, 1, 2, "95.5", "ok"),
        ]
        .join("\n");

        let recognition = parse_tsv(&tsv);
        assert_eq!(recognition.text, "ok");
        assert!((recognition.confidence - 95.5).abs() < 1e-4);
    }

    #[test]
    fn empty_output_has_zero_confidence() {
        let recognition = parse_tsv(HEADER);
        assert_eq!(recognition.text, "");
        assert_eq!(recognition.confidence, 0.0);
    }

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let factory = TesseractFactory::new("/nonexistent/moodscan-tesseract", "eng");
        let err = factory.create().await.err().unwrap();
        assert!(matches!(err, MoodscanError::EngineUnavailable { .. }));
    }

    #[tokio::test]
    async fn terminated_engine_refuses_work() {
        let mut engine = TesseractEngine {
            binary: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            workdir: Some(tempfile::tempdir().unwrap()),
        };
        engine.terminate();
        engine.terminate();

        let err = engine.recognize(b"img").await.unwrap_err();
        assert!(matches!(err, MoodscanError::RecognitionFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancelled_recognition_kills_tesseract() {
        use std::os::unix::fs::PermissionsExt;
        use std::sync::Arc;
        use std::time::Duration;

        use crate::extractor::OcrExtractor;

        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let script = dir.path().join("tesseract");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then echo 'tesseract 5.3.0'; exit 0; fi\nsleep 1\ntouch '{}'\n",
                marker.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = OcrExtractor::new(Arc::new(TesseractFactory::new(&script, "eng")));
        let outcome =
            tokio::time::timeout(Duration::from_millis(200), extractor.extract(b"img")).await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }
}
