//! Moodscan Capture Engine
//!
//! Runs camera capture sessions: acquire a device, grab a frame, let the
//! caller retake or confirm it, and hand back an encoded image. Device
//! release is guaranteed on every path, including a `close()` that races a
//! pending acquisition.
//!
//! # Architecture
//!
//! ```text
//!            open()              capture()
//!   Idle ───────────► Acquiring ─────► Streaming ◄──────┐
//!    │                   │               │    ▲          │ retake()
//!    │                   ▼               ▼    │          │
//!    │                 Error           Captured ─────────┘
//!    │                   │               │
//!    │      close()      ▼    close()    ▼ confirm()
//!    └─────────────────► Closed ◄────────┘
//! ```

pub mod backend;
pub mod frame;
pub mod session;

pub use backend::{detect_camera, StillImageCamera, UnsupportedCamera};
pub use frame::*;
pub use session::*;
