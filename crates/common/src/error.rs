//! Error types shared across Moodscan crates.

use std::path::PathBuf;

/// Why a camera device could not be acquired.
///
/// Stored as the capture session's last error, and convertible into
/// [`MoodscanError`] for propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceErrorKind {
    /// The user or the OS refused camera access.
    PermissionDenied,
    /// No camera is attached.
    DeviceNotFound,
    /// The camera is held by another process or session.
    DeviceBusy,
    /// The platform has no camera capability at all.
    UnsupportedPlatform,
    /// Anything the host did not classify.
    Unknown,
}

impl DeviceErrorKind {
    /// Human-readable message shown to the user for this failure.
    pub fn message(&self) -> &'static str {
        match self {
            DeviceErrorKind::PermissionDenied => {
                "Camera access denied. Please allow camera permissions in your system settings."
            }
            DeviceErrorKind::DeviceNotFound => "No camera found on this device.",
            DeviceErrorKind::DeviceBusy => "Camera is already in use by another application.",
            DeviceErrorKind::UnsupportedPlatform => {
                "Camera capture is not supported on this platform."
            }
            DeviceErrorKind::Unknown => "Unable to access camera. Please check permissions.",
        }
    }
}

impl std::fmt::Display for DeviceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Top-level error type for Moodscan operations.
#[derive(Debug, thiserror::Error)]
pub enum MoodscanError {
    #[error("Permission denied: camera access was refused")]
    PermissionDenied,

    #[error("Device not found: no camera is available")]
    DeviceNotFound,

    #[error("Device busy: camera is held by another consumer")]
    DeviceBusy,

    #[error("Unsupported platform: no camera capability")]
    UnsupportedPlatform,

    #[error("Device error: camera could not be opened")]
    DeviceUnknown,

    #[error("Recognition engine unavailable: {message}")]
    EngineUnavailable { message: String },

    #[error("Recognition failed: {message}")]
    RecognitionFailed { message: String },

    #[error("No text could be extracted from the image")]
    NoTextExtracted,

    #[error("No input text provided")]
    EmptyInput,

    #[error("Record store error: {message}")]
    RecordStore { message: String },

    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MoodscanError.
pub type MoodscanResult<T> = Result<T, MoodscanError>;

impl MoodscanError {
    pub fn engine_unavailable(msg: impl Into<String>) -> Self {
        Self::EngineUnavailable {
            message: msg.into(),
        }
    }

    pub fn recognition(msg: impl Into<String>) -> Self {
        Self::RecognitionFailed {
            message: msg.into(),
        }
    }

    pub fn record_store(msg: impl Into<String>) -> Self {
        Self::RecordStore {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_state(operation: &'static str, state: impl std::fmt::Debug) -> Self {
        Self::InvalidState {
            operation,
            state: format!("{state:?}"),
        }
    }

    /// The device failure this error represents, if any.
    pub fn device_kind(&self) -> Option<DeviceErrorKind> {
        match self {
            Self::PermissionDenied => Some(DeviceErrorKind::PermissionDenied),
            Self::DeviceNotFound => Some(DeviceErrorKind::DeviceNotFound),
            Self::DeviceBusy => Some(DeviceErrorKind::DeviceBusy),
            Self::UnsupportedPlatform => Some(DeviceErrorKind::UnsupportedPlatform),
            Self::DeviceUnknown => Some(DeviceErrorKind::Unknown),
            _ => None,
        }
    }
}

impl From<DeviceErrorKind> for MoodscanError {
    fn from(kind: DeviceErrorKind) -> Self {
        match kind {
            DeviceErrorKind::PermissionDenied => Self::PermissionDenied,
            DeviceErrorKind::DeviceNotFound => Self::DeviceNotFound,
            DeviceErrorKind::DeviceBusy => Self::DeviceBusy,
            DeviceErrorKind::UnsupportedPlatform => Self::UnsupportedPlatform,
            DeviceErrorKind::Unknown => Self::DeviceUnknown,
        }
    }
}
