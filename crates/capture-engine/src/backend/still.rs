//! A camera that serves frames from an image file.
//!
//! Behaves like an exclusive device: one handle at a time, released by
//! `stop()` or drop. Frames larger than the requested size are scaled down
//! to fit, the way a real camera negotiates its stream resolution.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use moodscan_common::error::{DeviceErrorKind, MoodscanError, MoodscanResult};
use moodscan_platform_core::{CameraDevice, DeviceHandle, StreamConstraints};

/// Camera backed by a still image on disk.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
    in_use: Arc<AtomicBool>,
}

impl StillImageCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a handle is currently held.
    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::SeqCst)
    }

    async fn load_frame(&self, constraints: &StreamConstraints) -> Result<RgbImage, DeviceErrorKind> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DeviceErrorKind::DeviceNotFound,
            std::io::ErrorKind::PermissionDenied => DeviceErrorKind::PermissionDenied,
            _ => DeviceErrorKind::Unknown,
        })?;

        let image = image::load_from_memory(&bytes).map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Still image is not decodable");
            DeviceErrorKind::Unknown
        })?;

        Ok(fit_within(image, constraints.width, constraints.height).to_rgb8())
    }
}

fn fit_within(image: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if width == 0 || height == 0 || (image.width() <= width && image.height() <= height) {
        return image;
    }
    image.resize(width, height, FilterType::Triangle)
}

#[async_trait]
impl CameraDevice for StillImageCamera {
    async fn request(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn DeviceHandle>, DeviceErrorKind> {
        if self
            .in_use
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DeviceErrorKind::DeviceBusy);
        }

        match self.load_frame(constraints).await {
            Ok(frame) => {
                tracing::debug!(
                    path = %self.path.display(),
                    width = frame.width(),
                    height = frame.height(),
                    "Still camera opened"
                );
                Ok(Box::new(StillImageHandle {
                    frame,
                    in_use: self.in_use.clone(),
                    stopped: false,
                }))
            }
            Err(kind) => {
                self.in_use.store(false, Ordering::SeqCst);
                Err(kind)
            }
        }
    }

    fn name(&self) -> &str {
        "still-image"
    }
}

struct StillImageHandle {
    frame: RgbImage,
    in_use: Arc<AtomicBool>,
    stopped: bool,
}

impl DeviceHandle for StillImageHandle {
    fn stream_size(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn read_frame(&mut self) -> MoodscanResult<RgbImage> {
        if self.stopped {
            return Err(MoodscanError::invalid_state("read frame", "stopped"));
        }
        Ok(self.frame.clone())
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.in_use.store(false, Ordering::SeqCst);
        }
    }
}

impl Drop for StillImageHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn write_png(dir: &tempfile::TempDir, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join("frame.png");
        RgbImage::from_pixel(width, height, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn serves_frames_until_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let camera = StillImageCamera::new(write_png(&dir, 40, 20));

        let mut handle = camera.request(&StreamConstraints::default()).await.ok().unwrap();
        assert_eq!(handle.stream_size(), (40, 20));
        assert!(camera.is_in_use());
        assert_eq!(handle.read_frame().unwrap().dimensions(), (40, 20));

        handle.stop();
        handle.stop();
        assert!(!camera.is_in_use());
        assert!(handle.read_frame().is_err());
    }

    #[tokio::test]
    async fn second_request_is_busy() {
        let dir = tempfile::tempdir().unwrap();
        let camera = StillImageCamera::new(write_png(&dir, 8, 8));

        let first = camera.request(&StreamConstraints::default()).await.ok().unwrap();
        let second = camera.request(&StreamConstraints::default()).await.err();
        assert_eq!(second, Some(DeviceErrorKind::DeviceBusy));

        drop(first);
        assert!(camera.request(&StreamConstraints::default()).await.is_ok());
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let camera = StillImageCamera::new("/nonexistent/moodscan/frame.png");
        let err = camera.request(&StreamConstraints::default()).await.err();
        assert_eq!(err, Some(DeviceErrorKind::DeviceNotFound));
        assert!(!camera.is_in_use());
    }

    #[tokio::test]
    async fn undecodable_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        std::fs::write(&path, b"not an image").unwrap();

        let camera = StillImageCamera::new(path);
        let err = camera.request(&StreamConstraints::default()).await.err();
        assert_eq!(err, Some(DeviceErrorKind::Unknown));
    }

    #[tokio::test]
    async fn large_frames_are_scaled_to_constraints() {
        let dir = tempfile::tempdir().unwrap();
        let camera = StillImageCamera::new(write_png(&dir, 400, 200));
        let constraints = StreamConstraints {
            width: 100,
            height: 100,
            ..Default::default()
        };

        let handle = camera.request(&constraints).await.ok().unwrap();
        assert_eq!(handle.stream_size(), (100, 50));
    }
}
