//! Provenance-tagged analysis input.

use std::path::Path;

use moodscan_capture_engine::CapturedImage;
use moodscan_common::error::{MoodscanError, MoodscanResult};

use crate::result::Source;

const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// An uploaded file with its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk and work out its content type.
    pub async fn from_path(path: &Path) -> MoodscanResult<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MoodscanError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                MoodscanError::Io(e)
            }
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = detect_content_type(&bytes, path);
        tracing::debug!(%name, %content_type, bytes = bytes.len(), "File loaded");
        Ok(Self::new(name, content_type, bytes))
    }

    /// Whether the declared content type is an image.
    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }

    /// File contents as text. Invalid UTF-8 sequences become U+FFFD.
    pub fn decode_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Content type from magic bytes, then extension, then `text/plain`.
pub fn detect_content_type(bytes: &[u8], path: &Path) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let mime = match ext.as_str() {
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        _ => DEFAULT_CONTENT_TYPE,
    };
    mime.to_string()
}

/// Text to analyze, tagged with how it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisInput {
    /// Direct entry.
    Text(String),
    /// An uploaded file.
    File(FileInput),
    /// A confirmed camera capture.
    Camera(CapturedImage),
}

impl AnalysisInput {
    pub fn source(&self) -> Source {
        match self {
            AnalysisInput::Text(_) => Source::Text,
            AnalysisInput::File(_) => Source::File,
            AnalysisInput::Camera(_) => Source::Camera,
        }
    }
}

impl From<FileInput> for AnalysisInput {
    fn from(file: FileInput) -> Self {
        AnalysisInput::File(file)
    }
}

impl From<CapturedImage> for AnalysisInput {
    fn from(image: CapturedImage) -> Self {
        AnalysisInput::Camera(image)
    }
}
