//! Moodscan platform core contracts.
//!
//! Camera access and text recognition are host services with no portable
//! native equivalent. This crate pins them down as narrow capability traits
//! so the capture session and OCR extractor can run against real backends
//! or test fakes without knowing which.

use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};

use moodscan_common::error::{DeviceErrorKind, MoodscanResult};

pub use moodscan_common::config::FacingMode;

/// Requested stream parameters. Width and height are ideals, not minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub facing_mode: FacingMode,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            facing_mode: FacingMode::Environment,
        }
    }
}

/// A camera that can be asked for an exclusive stream.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Request exclusive access to the camera.
    ///
    /// Each call is one acquisition attempt. The returned handle owns the
    /// stream until [`DeviceHandle::stop`] is called.
    async fn request(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn DeviceHandle>, DeviceErrorKind>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// An acquired camera stream.
pub trait DeviceHandle: Send {
    /// Negotiated stream size in pixels.
    fn stream_size(&self) -> (u32, u32);

    /// Grab the current frame.
    fn read_frame(&mut self) -> MoodscanResult<RgbImage>;

    /// Release the device. Must be safe to call more than once.
    fn stop(&mut self);
}

/// Raw output of a recognition engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// Recognized text, untrimmed.
    pub text: String,
    /// Engine-native confidence on a 0-100 scale.
    pub confidence: f32,
}

/// One live instance of a text-recognition engine.
#[async_trait]
pub trait RecognitionEngine: Send {
    /// Recognize text in an encoded image.
    async fn recognize(&mut self, image: &[u8]) -> MoodscanResult<Recognition>;

    /// Tear the instance down and free its resources.
    fn terminate(&mut self);
}

/// Creates fresh recognition engine instances.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Instantiate a new engine. Fails with `EngineUnavailable` when the
    /// engine cannot be started.
    async fn create(&self) -> MoodscanResult<Box<dyn RecognitionEngine>>;

    /// Engine name for logging.
    fn name(&self) -> &str;
}
