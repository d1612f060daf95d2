//! Camera backends.
//!
//! The capture session only sees [`CameraDevice`]. This module provides the
//! concrete devices available to the command-line tool and picks one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use moodscan_common::error::DeviceErrorKind;
use moodscan_platform_core::{CameraDevice, DeviceHandle, StreamConstraints};

pub mod still;

pub use still::StillImageCamera;

/// A camera for hosts without any capture capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedCamera;

#[async_trait]
impl CameraDevice for UnsupportedCamera {
    async fn request(
        &self,
        _constraints: &StreamConstraints,
    ) -> Result<Box<dyn DeviceHandle>, DeviceErrorKind> {
        Err(DeviceErrorKind::UnsupportedPlatform)
    }

    fn name(&self) -> &str {
        "unsupported"
    }
}

/// Pick the camera backend for this host.
///
/// With a `source` image the still-image camera serves frames from that
/// file. Without one there is no native camera integration, so every
/// request fails as unsupported.
pub fn detect_camera(source: Option<&Path>) -> Arc<dyn CameraDevice> {
    match source {
        Some(path) => Arc::new(StillImageCamera::new(PathBuf::from(path))),
        None => Arc::new(UnsupportedCamera),
    }
}
