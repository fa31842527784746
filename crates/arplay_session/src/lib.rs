//! Platform-neutral AR session layer
//!
//! This crate provides:
//! - [`ArSession`]: the session protocol (frames, hit tests, anchors)
//! - [`SimulatedSession`]: deterministic synthetic backend
//! - [`ArRuntime`] / [`RuntimeSession`]: adapter over an external AR platform
//! - [`detect_ar_mode`]: capability probe that never fails
//! - [`SessionFactory`]: picks a backend and returns it as `Box<dyn ArSession>`

mod capability;
mod error;
mod factory;
mod runtime;
mod session;
mod simulated;
mod types;

pub use capability::{availability_message, detect_ar_mode, ArMode, CapabilityReport, Downgrade};
pub use error::{ArSessionError, PlatformError};
pub use factory::SessionFactory;
pub use runtime::{ArRuntime, RuntimeSession};
pub use session::ArSession;
pub use simulated::{SimulatedSession, CAMERA_HEIGHT, SIMULATED_PLANE_ID, SIMULATED_PLATFORM};
pub use types::{
    Anchor, AnchorId, ArCamera, ArFrame, ArPlane, CameraFacing, HitTestResult, LightEstimate, PlaneOrientation,
    SessionConfig, SessionState, TrackingState,
};
