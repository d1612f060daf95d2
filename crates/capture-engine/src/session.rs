//! Camera capture session management.
//!
//! A session owns at most one camera handle and at most one pending frame.
//! All transitions go through the shared state behind a mutex, which is the
//! single source of truth for whether an acquisition is in flight.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use moodscan_common::config::CaptureDefaults;
use moodscan_common::error::{DeviceErrorKind, MoodscanError, MoodscanResult};
use moodscan_common::notify::{EventSink, Notice};
use moodscan_platform_core::{CameraDevice, DeviceHandle, StreamConstraints};

use crate::frame::{encode_jpeg, CapturedImage, CAPTURE_CONTENT_TYPE};

/// Configuration for a capture session.
#[derive(Debug, Clone, Copy)]
pub struct CaptureConfig {
    /// Stream parameters requested from the camera.
    pub constraints: StreamConstraints,

    /// JPEG quality for captured frames.
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            constraints: StreamConstraints::default(),
            jpeg_quality: 80,
        }
    }
}

impl From<&CaptureDefaults> for CaptureConfig {
    fn from(defaults: &CaptureDefaults) -> Self {
        Self {
            constraints: StreamConstraints {
                width: defaults.width,
                height: defaults.height,
                facing_mode: defaults.facing_mode,
            },
            jpeg_quality: defaults.jpeg_quality,
        }
    }
}

/// State of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session created, camera not requested yet.
    Idle,
    /// Camera requested, waiting for the host.
    Acquiring,
    /// Camera streaming, nothing captured.
    Streaming,
    /// A frame is held for review.
    Captured,
    /// Session torn down. Terminal.
    Closed,
    /// Camera acquisition failed. Only `close()` is valid.
    Error,
}

struct SessionInner {
    state: SessionState,
    device: Option<Box<dyn DeviceHandle>>,
    preview: Option<Vec<u8>>,
    frame_size: (u32, u32),
    last_error: Option<DeviceErrorKind>,
}

struct Shared {
    camera: Arc<dyn CameraDevice>,
    config: CaptureConfig,
    events: Arc<dyn EventSink>,
    inner: Mutex<SessionInner>,
    state_tx: watch::Sender<SessionState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, inner: &mut SessionInner, next: SessionState) {
        tracing::debug!(from = ?inner.state, to = ?next, "Capture session transition");
        inner.state = next;
        self.state_tx.send_replace(next);
    }

    fn finish_acquisition(&self, result: Result<Box<dyn DeviceHandle>, DeviceErrorKind>) {
        let mut inner = self.lock();
        match result {
            Ok(mut handle) if inner.state != SessionState::Acquiring => {
                handle.stop();
                tracing::info!(
                    state = ?inner.state,
                    "Released camera acquired after session was closed"
                );
            }
            Ok(handle) => {
                inner.frame_size = handle.stream_size();
                let (width, height) = inner.frame_size;
                inner.device = Some(handle);
                self.transition(&mut inner, SessionState::Streaming);
                tracing::info!(camera = self.camera.name(), width, height, "Camera streaming");
            }
            Err(kind) if inner.state != SessionState::Acquiring => {
                tracing::debug!(?kind, "Camera acquisition failed after session was closed");
            }
            Err(kind) => {
                inner.last_error = Some(kind);
                self.transition(&mut inner, SessionState::Error);
                drop(inner);
                tracing::warn!(camera = self.camera.name(), ?kind, "Camera acquisition failed");
                self.events
                    .notify(Notice::destructive("Camera Error", kind.message()));
            }
        }
    }

    fn release(&self, inner: &mut SessionInner) {
        if let Some(mut device) = inner.device.take() {
            device.stop();
            tracing::info!(camera = self.camera.name(), "Camera released");
        }
        inner.preview = None;
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(mut device) = inner.device.take() {
            device.stop();
            tracing::debug!("Camera released on session drop");
        }
    }
}

/// A camera capture session.
///
/// Cloning yields another handle to the same session. The camera is
/// released by `close()`, `confirm()`, or when the last handle and any
/// pending acquisition are gone.
#[derive(Clone)]
pub struct CaptureSession {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("camera", &self.shared.camera.name())
            .field("state", &self.state())
            .finish()
    }
}

impl CaptureSession {
    /// Create an idle session. No camera is requested until [`open`](Self::open).
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        config: CaptureConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            shared: Arc::new(Shared {
                camera,
                config,
                events,
                inner: Mutex::new(SessionInner {
                    state: SessionState::Idle,
                    device: None,
                    preview: None,
                    frame_size: (0, 0),
                    last_error: None,
                }),
                state_tx,
            }),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.shared.lock().state
    }

    /// The failure that put the session into [`SessionState::Error`].
    pub fn last_error(&self) -> Option<DeviceErrorKind> {
        self.shared.lock().last_error
    }

    /// Encoded bytes of the frame awaiting review, if any.
    pub fn preview(&self) -> Option<Vec<u8>> {
        self.shared.lock().preview.clone()
    }

    /// Negotiated stream size, `(0, 0)` before streaming.
    pub fn frame_size(&self) -> (u32, u32) {
        self.shared.lock().frame_size
    }

    /// Request the camera.
    ///
    /// Returns as soon as the session is `Acquiring`; the request itself
    /// runs on the Tokio runtime. Use [`ready`](Self::ready) to wait for
    /// the outcome.
    pub fn open(&self) -> MoodscanResult<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            MoodscanError::Other(anyhow::anyhow!("capture session needs a Tokio runtime: {e}"))
        })?;

        {
            let mut inner = self.shared.lock();
            if inner.state != SessionState::Idle {
                return Err(MoodscanError::invalid_state("open", inner.state));
            }
            self.shared.transition(&mut inner, SessionState::Acquiring);
        }

        tracing::info!(
            camera = self.shared.camera.name(),
            width = self.shared.config.constraints.width,
            height = self.shared.config.constraints.height,
            facing = ?self.shared.config.constraints.facing_mode,
            "Requesting camera"
        );

        let shared = self.shared.clone();
        runtime.spawn(async move {
            let result = shared.camera.request(&shared.config.constraints).await;
            shared.finish_acquisition(result);
        });
        Ok(())
    }

    /// Wait until a pending `open()` has resolved.
    ///
    /// Succeeds once the camera is streaming. An acquisition failure is
    /// returned as its device error; a closed or never-opened session is
    /// an invalid state.
    pub async fn ready(&self) -> MoodscanResult<()> {
        let mut rx = self.shared.state_tx.subscribe();
        let state = *rx
            .wait_for(|state| *state != SessionState::Acquiring)
            .await
            .map_err(|e| MoodscanError::Other(anyhow::anyhow!("session state channel closed: {e}")))?;

        match state {
            SessionState::Streaming | SessionState::Captured => Ok(()),
            SessionState::Error => Err(self
                .last_error()
                .unwrap_or(DeviceErrorKind::Unknown)
                .into()),
            other => Err(MoodscanError::invalid_state("wait for camera", other)),
        }
    }

    /// Grab the current frame and hold it for review.
    pub fn capture(&self) -> MoodscanResult<()> {
        let mut inner = self.shared.lock();
        if inner.state != SessionState::Streaming {
            return Err(MoodscanError::invalid_state("capture", inner.state));
        }
        let state = inner.state;
        let Some(device) = inner.device.as_mut() else {
            return Err(MoodscanError::invalid_state("capture without a camera", state));
        };

        let frame = device.read_frame()?;
        let jpeg = encode_jpeg(&frame, self.shared.config.jpeg_quality)?;

        tracing::info!(
            width = frame.width(),
            height = frame.height(),
            bytes = jpeg.len(),
            "Frame captured"
        );
        inner.frame_size = frame.dimensions();
        inner.preview = Some(jpeg);
        self.shared.transition(&mut inner, SessionState::Captured);
        Ok(())
    }

    /// Discard the held frame and go back to streaming on the same camera.
    pub fn retake(&self) -> MoodscanResult<()> {
        let mut inner = self.shared.lock();
        if inner.state != SessionState::Captured {
            return Err(MoodscanError::invalid_state("retake", inner.state));
        }
        inner.preview = None;
        self.shared.transition(&mut inner, SessionState::Streaming);
        tracing::debug!("Frame discarded for retake");
        Ok(())
    }

    /// Accept the held frame and close the session.
    pub fn confirm(&self) -> MoodscanResult<CapturedImage> {
        let mut inner = self.shared.lock();
        if inner.state != SessionState::Captured {
            return Err(MoodscanError::invalid_state("confirm", inner.state));
        }
        let state = inner.state;
        let Some(bytes) = inner.preview.take() else {
            return Err(MoodscanError::invalid_state("confirm without a frame", state));
        };
        let (width, height) = inner.frame_size;

        self.shared.release(&mut inner);
        self.shared.transition(&mut inner, SessionState::Closed);
        tracing::info!(bytes = bytes.len(), "Capture confirmed");

        Ok(CapturedImage {
            bytes,
            content_type: CAPTURE_CONTENT_TYPE.to_string(),
            width,
            height,
        })
    }

    /// Release everything and close. Valid from any state; repeated calls
    /// are no-ops. A camera still being acquired is released when it lands.
    pub fn close(&self) {
        let mut inner = self.shared.lock();
        if inner.state == SessionState::Closed {
            return;
        }
        let was = inner.state;
        self.shared.release(&mut inner);
        self.shared.transition(&mut inner, SessionState::Closed);
        tracing::info!(from = ?was, "Capture session closed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use moodscan_common::notify::CollectingSink;
    use tokio::sync::Notify;

    use super::*;

    struct FakeHandle {
        stops: Arc<AtomicUsize>,
        reads: Arc<AtomicUsize>,
    }

    impl DeviceHandle for FakeHandle {
        fn stream_size(&self) -> (u32, u32) {
            (32, 18)
        }

        fn read_frame(&mut self) -> MoodscanResult<RgbImage> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst) as u8;
            Ok(RgbImage::from_pixel(32, 18, Rgb([n.wrapping_mul(40), 90, 120])))
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeCamera {
        requests: AtomicUsize,
        stops: Arc<AtomicUsize>,
        reads: Arc<AtomicUsize>,
        resolved: AtomicUsize,
        failure: Option<DeviceErrorKind>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl CameraDevice for FakeCamera {
        async fn request(
            &self,
            _constraints: &StreamConstraints,
        ) -> Result<Box<dyn DeviceHandle>, DeviceErrorKind> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.resolved.fetch_add(1, Ordering::SeqCst);
            match self.failure {
                Some(kind) => Err(kind),
                None => Ok(Box::new(FakeHandle {
                    stops: self.stops.clone(),
                    reads: self.reads.clone(),
                })),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn session_with(camera: FakeCamera) -> (CaptureSession, Arc<FakeCamera>, Arc<CollectingSink>) {
        let camera = Arc::new(camera);
        let sink = Arc::new(CollectingSink::new());
        let session = CaptureSession::new(camera.clone(), CaptureConfig::default(), sink.clone());
        (session, camera, sink)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn close_from_idle_makes_no_request() {
        let (session, camera, _) = session_with(FakeCamera::default());

        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(camera.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn open_moves_to_streaming() {
        let (session, camera, _) = session_with(FakeCamera::default());

        session.open().unwrap();
        session.ready().await.unwrap();
        assert_eq!(session.state(), SessionState::Streaming);
        assert_eq!(session.frame_size(), (32, 18));
        assert_eq!(camera.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retake_reuses_the_same_device() {
        let (session, camera, _) = session_with(FakeCamera::default());
        session.open().unwrap();
        session.ready().await.unwrap();

        session.capture().unwrap();
        assert_eq!(session.state(), SessionState::Captured);
        assert!(session.preview().is_some());

        session.retake().unwrap();
        assert_eq!(session.state(), SessionState::Streaming);
        assert!(session.preview().is_none());

        session.capture().unwrap();
        assert_eq!(camera.requests.load(Ordering::SeqCst), 1);
        assert_eq!(camera.reads.load(Ordering::SeqCst), 2);
        assert_eq!(camera.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn confirm_returns_jpeg_and_releases_device() {
        let (session, camera, _) = session_with(FakeCamera::default());
        session.open().unwrap();
        session.ready().await.unwrap();
        session.capture().unwrap();

        let image = session.confirm().unwrap();
        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(&image.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!((image.width, image.height), (32, 18));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.preview().is_none());
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);

        session.close();
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn close_while_acquiring_releases_late_device() {
        let gate = Arc::new(Notify::new());
        let (session, camera, _) = session_with(FakeCamera {
            gate: Some(gate.clone()),
            ..Default::default()
        });

        session.open().unwrap();
        assert_eq!(session.state(), SessionState::Acquiring);
        wait_until(|| camera.requests.load(Ordering::SeqCst) == 1).await;

        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(camera.stops.load(Ordering::SeqCst), 0);

        gate.notify_one();
        wait_until(|| camera.stops.load(Ordering::SeqCst) == 1).await;
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.ready().await.is_err());
    }

    #[tokio::test]
    async fn close_while_acquiring_ignores_late_failure() {
        let gate = Arc::new(Notify::new());
        let (session, camera, sink) = session_with(FakeCamera {
            gate: Some(gate.clone()),
            failure: Some(DeviceErrorKind::PermissionDenied),
            ..Default::default()
        });

        session.open().unwrap();
        wait_until(|| camera.requests.load(Ordering::SeqCst) == 1).await;
        session.close();

        gate.notify_one();
        wait_until(|| camera.resolved.load(Ordering::SeqCst) == 1).await;
        tokio::task::yield_now().await;

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.last_error(), None);
        assert!(sink.notices().is_empty());
        assert_eq!(camera.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn acquisition_failure_lands_in_error() {
        let (session, _, sink) = session_with(FakeCamera {
            failure: Some(DeviceErrorKind::DeviceBusy),
            ..Default::default()
        });

        session.open().unwrap();
        let err = session.ready().await.unwrap_err();
        assert!(matches!(err, MoodscanError::DeviceBusy));
        assert_eq!(session.state(), SessionState::Error);
        assert_eq!(session.last_error(), Some(DeviceErrorKind::DeviceBusy));

        let notices = sink.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Camera Error");
        assert_eq!(notices[0].description, DeviceErrorKind::DeviceBusy.message());

        assert!(session.capture().is_err());
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn out_of_order_calls_are_rejected() {
        let gate = Arc::new(Notify::new());
        let (session, camera, _) = session_with(FakeCamera {
            gate: Some(gate.clone()),
            ..Default::default()
        });

        assert!(matches!(
            session.capture(),
            Err(MoodscanError::InvalidState { .. })
        ));
        assert!(session.retake().is_err());
        assert!(session.confirm().is_err());

        session.open().unwrap();
        assert!(matches!(
            session.open(),
            Err(MoodscanError::InvalidState { .. })
        ));
        assert!(session.capture().is_err());

        gate.notify_one();
        session.ready().await.unwrap();
        assert!(session.retake().is_err());
        assert!(session.confirm().is_err());
        assert_eq!(camera.requests.load(Ordering::SeqCst), 1);

        session.close();
        assert!(session.open().is_err());
    }

    #[tokio::test]
    async fn dropping_last_handle_releases_device() {
        let (session, camera, _) = session_with(FakeCamera::default());
        session.open().unwrap();
        session.ready().await.unwrap();

        drop(session);
        wait_until(|| camera.stops.load(Ordering::SeqCst) == 1).await;
    }

    #[test]
    fn open_outside_runtime_is_an_error() {
        let (session, camera, _) = session_with(FakeCamera::default());
        assert!(session.open().is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(camera.requests.load(Ordering::SeqCst), 0);
    }
}
