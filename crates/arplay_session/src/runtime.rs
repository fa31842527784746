//! Sessions backed by an external AR runtime
//!
//! [`ArRuntime`] is the fixed contract a platform integration implements
//! (camera pipeline, tracking and plane detection live behind it).
//! [`RuntimeSession`] adapts any runtime to the [`ArSession`] protocol: it
//! owns the state machine, the anchor registry and result ranking, so a
//! runtime only has to answer queries.

use arplay_math::{Quat, Vec3};
use async_trait::async_trait;

use crate::error::{ArSessionError, PlatformError};
use crate::session::ArSession;
use crate::types::{Anchor, AnchorId, AnchorSet, ArFrame, HitTestResult, SessionConfig, SessionState};

/// Platform services a real AR session is built on
#[async_trait(?Send)]
pub trait ArRuntime {
    /// Platform name, e.g. "WebXR"
    fn platform(&self) -> &str;

    /// Whether an immersive AR session can be created
    async fn is_supported(&self) -> Result<bool, PlatformError>;

    async fn request_session(&mut self, config: &SessionConfig) -> Result<(), PlatformError>;

    /// Release the platform session; must tolerate being called when none is open
    async fn end_session(&mut self);

    /// Latest tracking data, if the platform produced a frame
    fn poll_frame(&mut self, timestamp_ms: f64) -> Option<ArFrame>;

    fn hit_test(&self, x: f32, y: f32) -> Vec<HitTestResult>;

    async fn create_anchor(&mut self, id: &AnchorId, position: Vec3, rotation: Quat) -> Result<(), PlatformError>;

    fn remove_anchor(&mut self, id: &AnchorId);
}

/// [`ArSession`] over a boxed [`ArRuntime`]
pub struct RuntimeSession {
    runtime: Box<dyn ArRuntime>,
    config: SessionConfig,
    state: SessionState,
    frame: Option<ArFrame>,
    anchors: AnchorSet,
    last_timestamp_ms: f64,
}

impl RuntimeSession {
    pub fn new(runtime: Box<dyn ArRuntime>, config: SessionConfig) -> Self {
        Self {
            runtime,
            config,
            state: SessionState::Uninitialized,
            frame: None,
            anchors: AnchorSet::new("anchor"),
            last_timestamp_ms: 0.0,
        }
    }

    fn platform_name(&self) -> String {
        self.runtime.platform().to_string()
    }
}

#[async_trait(?Send)]
impl ArSession for RuntimeSession {
    fn platform(&self) -> &str {
        self.runtime.platform()
    }

    fn state(&self) -> SessionState {
        self.state
    }

    async fn is_supported(&self) -> bool {
        match self.runtime.is_supported().await {
            Ok(supported) => supported,
            Err(e) => {
                log::warn!("{} support check failed: {}", self.runtime.platform(), e);
                false
            }
        }
    }

    async fn start(&mut self) -> Result<(), ArSessionError> {
        if self.state.is_active() {
            return Ok(());
        }

        match self.runtime.is_supported().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(ArSessionError::NotSupported {
                    platform: self.platform_name(),
                    reason: "immersive AR is not available on this device".to_string(),
                });
            }
            Err(e) => {
                return Err(ArSessionError::NotSupported {
                    platform: self.platform_name(),
                    reason: e.to_string(),
                });
            }
        }

        if let Err(e) = self.runtime.request_session(&self.config).await {
            return Err(ArSessionError::StartFailed {
                platform: self.platform_name(),
                reason: e.to_string(),
            });
        }

        self.state = SessionState::Started;
        log::info!("{} AR session started", self.runtime.platform());
        Ok(())
    }

    async fn stop(&mut self) {
        if self.state.is_active() {
            self.runtime.end_session().await;
            log::info!("{} AR session stopped", self.runtime.platform());
        }
        self.state = SessionState::Ended;
        self.frame = None;
        self.anchors.clear();
    }

    fn update(&mut self, timestamp_ms: f64) {
        if !self.state.is_active() {
            return;
        }
        self.last_timestamp_ms = timestamp_ms;
        self.frame = self.runtime.poll_frame(timestamp_ms);
        if self.frame.is_some() {
            self.state = SessionState::Running;
        }
    }

    fn current_frame(&self) -> Option<&ArFrame> {
        self.frame.as_ref()
    }

    fn hit_test(&self, x: f32, y: f32) -> Vec<HitTestResult> {
        if !self.state.is_active() {
            return Vec::new();
        }
        let mut results = self.runtime.hit_test(x, y);
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }

    async fn create_anchor(&mut self, position: Vec3, rotation: Quat) -> Result<Anchor, ArSessionError> {
        if !self.state.is_active() {
            return Err(ArSessionError::NotRunning {
                platform: self.platform_name(),
            });
        }

        let id = self.anchors.next_id();
        if let Err(e) = self.runtime.create_anchor(&id, position, rotation).await {
            return Err(ArSessionError::AnchorFailed {
                platform: self.platform_name(),
                reason: e.to_string(),
            });
        }
        Ok(self.anchors.insert(id, position, rotation, self.last_timestamp_ms))
    }

    fn remove_anchor(&mut self, id: &AnchorId) -> bool {
        if !self.anchors.remove(id) {
            log::warn!("remove_anchor: unknown anchor {}", id);
            return false;
        }
        self.runtime.remove_anchor(id);
        true
    }

    fn anchors(&self) -> Vec<&Anchor> {
        self.anchors.all()
    }

    fn anchor(&self, id: &AnchorId) -> Option<&Anchor> {
        self.anchors.get(id)
    }
}

/// Runtime standing in for a platform with no AR at all
///
/// Used when real mode is forced without a runtime, so `start` reports
/// `NotSupported` through the normal path.
pub(crate) struct UnavailableRuntime;

#[async_trait(?Send)]
impl ArRuntime for UnavailableRuntime {
    fn platform(&self) -> &str {
        "Unavailable"
    }

    async fn is_supported(&self) -> Result<bool, PlatformError> {
        Ok(false)
    }

    async fn request_session(&mut self, _config: &SessionConfig) -> Result<(), PlatformError> {
        Err(PlatformError::new("no AR runtime"))
    }

    async fn end_session(&mut self) {}

    fn poll_frame(&mut self, _timestamp_ms: f64) -> Option<ArFrame> {
        None
    }

    fn hit_test(&self, _x: f32, _y: f32) -> Vec<HitTestResult> {
        Vec::new()
    }

    async fn create_anchor(&mut self, _id: &AnchorId, _position: Vec3, _rotation: Quat) -> Result<(), PlatformError> {
        Err(PlatformError::new("no AR runtime"))
    }

    fn remove_anchor(&mut self, _id: &AnchorId) {}
}
