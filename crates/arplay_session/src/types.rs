//! Value types exchanged through the session protocol

use arplay_math::{mat4, Mat4, Quat, Transform, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Quality of the platform's tracking
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    NotAvailable,
    Limited,
    #[default]
    Normal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneOrientation {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    Front,
    #[default]
    Back,
}

/// Features requested when a session starts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub plane_detection: bool,
    pub light_estimation: bool,
    pub depth_sensing: bool,
    pub camera_facing: CameraFacing,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            plane_detection: true,
            light_estimation: false,
            depth_sensing: false,
            camera_facing: CameraFacing::Back,
        }
    }
}

/// Session lifecycle
///
/// `Uninitialized -> Started -> Running -> Ended`, and `Ended -> Started` on restart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Uninitialized,
    /// Started, no frame received yet
    Started,
    Running,
    Ended,
}

impl SessionState {
    /// Started or running
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Started | SessionState::Running)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArCamera {
    /// Camera-to-world matrix
    pub transform: Mat4,
    pub projection: Mat4,
    pub tracking_state: TrackingState,
}

impl ArCamera {
    pub fn pose(&self) -> Transform {
        Transform::from_matrix(self.transform)
    }

    pub fn position(&self) -> Vec3 {
        mat4::get_translation(self.transform)
    }

    /// Viewing direction (-Z of the camera)
    pub fn forward(&self) -> Vec3 {
        (-mat4::get_column(self.transform, 2)).normalized()
    }

    pub fn up(&self) -> Vec3 {
        mat4::get_column(self.transform, 1).normalized()
    }
}

/// A detected real-world surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArPlane {
    /// Stable while the plane is tracked
    pub id: String,
    pub transform: Mat4,
    /// Width and length
    pub extent: Vec2,
    pub orientation: PlaneOrientation,
    pub center: Vec3,
    pub tracking: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightEstimate {
    /// 0..1
    pub ambient_intensity: f32,
    /// Kelvin
    pub color_temperature: Option<f32>,
    pub primary_light_direction: Option<Vec3>,
    pub primary_light_intensity: Option<f32>,
}

/// One tick of AR data; produced fresh by every update
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArFrame {
    pub timestamp_ms: f64,
    pub camera: ArCamera,
    pub planes: Vec<ArPlane>,
    pub light_estimate: Option<LightEstimate>,
}

impl ArFrame {
    pub fn plane(&self, id: &str) -> Option<&ArPlane> {
        self.planes.iter().find(|p| p.id == id)
    }
}

/// A surface intersection for a screen point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitTestResult {
    pub position: Vec3,
    /// Surface orientation
    pub rotation: Quat,
    /// Distance from the camera
    pub distance: f32,
    pub plane: Option<ArPlane>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(String);

impl AnchorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persistent world-space pose
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: AnchorId,
    pub transform: Mat4,
    pub tracking: bool,
    pub created_at_ms: f64,
}

impl Anchor {
    pub fn position(&self) -> Vec3 {
        mat4::get_translation(self.transform)
    }

    pub fn pose(&self) -> Transform {
        Transform::from_matrix(self.transform)
    }
}

/// Anchors owned by one session, in creation order
#[derive(Debug)]
pub(crate) struct AnchorSet {
    prefix: &'static str,
    anchors: Vec<Anchor>,
    next_id: u64,
}

impl AnchorSet {
    pub(crate) fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            anchors: Vec::new(),
            next_id: 0,
        }
    }

    /// Reserve the next id; ids are never reused within a session
    pub(crate) fn next_id(&mut self) -> AnchorId {
        let id = AnchorId(format!("{}_{}", self.prefix, self.next_id));
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, id: AnchorId, position: Vec3, rotation: Quat, now_ms: f64) -> Anchor {
        let anchor = Anchor {
            id,
            transform: mat4::compose(position, rotation, Vec3::ONE),
            tracking: true,
            created_at_ms: now_ms,
        };
        self.anchors.push(anchor.clone());
        anchor
    }

    pub(crate) fn remove(&mut self, id: &AnchorId) -> bool {
        let before = self.anchors.len();
        self.anchors.retain(|a| &a.id != id);
        self.anchors.len() != before
    }

    pub(crate) fn get(&self, id: &AnchorId) -> Option<&Anchor> {
        self.anchors.iter().find(|a| &a.id == id)
    }

    pub(crate) fn all(&self) -> Vec<&Anchor> {
        self.anchors.iter().collect()
    }

    pub(crate) fn clear(&mut self) {
        self.anchors.clear();
    }
}
