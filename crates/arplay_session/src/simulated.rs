//! Deterministic session for hosts without AR hardware
//!
//! The simulated world is fixed: a camera 1.6 m above the origin looking down
//! -Z, one 2 x 2 m floor plane centred 2 m ahead, and hit tests that always
//! land 1 m in front of the camera on that plane.

use arplay_math::{mat4, Quat, Vec2, Vec3};
use async_trait::async_trait;

use crate::error::ArSessionError;
use crate::session::ArSession;
use crate::types::{
    Anchor, AnchorId, AnchorSet, ArCamera, ArFrame, ArPlane, HitTestResult, LightEstimate, PlaneOrientation,
    SessionConfig, SessionState, TrackingState,
};

pub const SIMULATED_PLATFORM: &str = "Simulated";
pub const SIMULATED_PLANE_ID: &str = "simulated_plane";

pub const CAMERA_HEIGHT: f32 = 1.6;
const PLANE_CENTER: Vec3 = Vec3::new(0.0, 0.0, -2.0);
const HIT_POSITION: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Session that produces synthetic frames
pub struct SimulatedSession {
    config: SessionConfig,
    state: SessionState,
    frame: Option<ArFrame>,
    anchors: AnchorSet,
    last_timestamp_ms: f64,
}

impl Default for SimulatedSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SimulatedSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Uninitialized,
            frame: None,
            anchors: AnchorSet::new("simulated_anchor"),
            last_timestamp_ms: 0.0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The single plane every simulated frame reports
    pub fn plane() -> ArPlane {
        ArPlane {
            id: SIMULATED_PLANE_ID.to_string(),
            transform: mat4::translation(PLANE_CENTER),
            extent: Vec2::new(2.0, 2.0),
            orientation: PlaneOrientation::Horizontal,
            center: PLANE_CENTER,
            tracking: true,
        }
    }

    pub fn camera() -> ArCamera {
        ArCamera {
            transform: mat4::translation(Vec3::new(0.0, CAMERA_HEIGHT, 0.0)),
            projection: mat4::perspective(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, 0.1, 100.0),
            tracking_state: TrackingState::Normal,
        }
    }

    fn build_frame(timestamp_ms: f64) -> ArFrame {
        ArFrame {
            timestamp_ms,
            camera: Self::camera(),
            planes: vec![Self::plane()],
            light_estimate: Some(LightEstimate {
                ambient_intensity: 0.8,
                color_temperature: Some(6500.0),
                primary_light_direction: Some(Vec3::new(0.0, -1.0, -0.5).normalized()),
                primary_light_intensity: Some(1.0),
            }),
        }
    }
}

#[async_trait(?Send)]
impl ArSession for SimulatedSession {
    fn platform(&self) -> &str {
        SIMULATED_PLATFORM
    }

    fn state(&self) -> SessionState {
        self.state
    }

    async fn is_supported(&self) -> bool {
        true
    }

    async fn start(&mut self) -> Result<(), ArSessionError> {
        if self.state.is_active() {
            log::debug!("Simulated session already started");
            return Ok(());
        }
        self.state = SessionState::Started;
        log::info!("Simulated AR session started");
        Ok(())
    }

    async fn stop(&mut self) {
        if self.state.is_active() {
            log::info!("Simulated AR session stopped");
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
        self.frame = Some(Self::build_frame(timestamp_ms));
        self.state = SessionState::Running;
    }

    fn current_frame(&self) -> Option<&ArFrame> {
        self.frame.as_ref()
    }

    fn hit_test(&self, _x: f32, _y: f32) -> Vec<HitTestResult> {
        if !self.state.is_active() {
            return Vec::new();
        }
        vec![HitTestResult {
            position: HIT_POSITION,
            rotation: Quat::IDENTITY,
            distance: 1.0,
            plane: Some(Self::plane()),
        }]
    }

    async fn create_anchor(&mut self, position: Vec3, rotation: Quat) -> Result<Anchor, ArSessionError> {
        if !self.state.is_active() {
            return Err(ArSessionError::NotRunning {
                platform: SIMULATED_PLATFORM.to_string(),
            });
        }
        let id = self.anchors.next_id();
        let anchor = self.anchors.insert(id, position, rotation, self.last_timestamp_ms);
        log::debug!("Created anchor {} at {}", anchor.id, position);
        Ok(anchor)
    }

    fn remove_anchor(&mut self, id: &AnchorId) -> bool {
        let removed = self.anchors.remove(id);
        if !removed {
            log::warn!("remove_anchor: unknown anchor {}", id);
        }
        removed
    }

    fn anchors(&self) -> Vec<&Anchor> {
        self.anchors.all()
    }

    fn anchor(&self, id: &AnchorId) -> Option<&Anchor> {
        self.anchors.get(id)
    }
}
