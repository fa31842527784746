//! Engine-level component records: placement, collision and render descriptions

use arplay_math::{Transform, Vec3};
use arplay_physics::Collider;
use serde::{Serialize, Deserialize};

use crate::Entity;

/// Local transform plus a non-owning link to the parent entity
///
/// The world position is derived by walking `parent` links; see
/// [`crate::World::world_transform`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformComponent {
    pub local: Transform,
    pub parent: Option<Entity>,
}

impl TransformComponent {
    pub fn new(local: Transform) -> Self {
        Self { local, parent: None }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(Transform::from_position(position))
    }
}

/// Collision volume used for picking and overlap checks
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColliderComponent {
    pub collider: Collider,
}

impl ColliderComponent {
    pub fn new(collider: Collider) -> Self {
        Self { collider }
    }

    pub fn contains_point(&self, local_point: Vec3) -> bool {
        self.collider.contains_point(local_point)
    }

    pub fn bounding_radius(&self) -> f32 {
        self.collider.bounding_radius()
    }
}

/// Reference to an externally loaded model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshComponent {
    pub model_id: String,
    pub material_id: String,
    pub visible: bool,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

impl MeshComponent {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            material_id: "default".to_string(),
            visible: true,
            cast_shadows: true,
            receive_shadows: true,
        }
    }

    pub fn with_material(mut self, material_id: impl Into<String>) -> Self {
        self.material_id = material_id.into();
        self
    }
}

/// Built-in geometry kinds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    #[default]
    Cube,
    Sphere,
    Plane,
    Cylinder,
    Cone,
}

/// Render description for a basic shape
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveShapeComponent {
    pub shape_type: ShapeType,
    /// RGBA, each component 0.0-1.0
    pub color: [f32; 4],
    pub size: Vec3,
}

impl Default for PrimitiveShapeComponent {
    fn default() -> Self {
        Self {
            shape_type: ShapeType::Cube,
            color: [1.0, 1.0, 1.0, 1.0],
            size: Vec3::ONE,
        }
    }
}

impl PrimitiveShapeComponent {
    pub fn new(shape_type: ShapeType, color: [f32; 4], size: Vec3) -> Self {
        Self { shape_type, color, size }
    }

    /// Parse a `#rrggbb` color; anything else yields opaque white
    pub fn color_from_hex(hex: &str) -> [f32; 4] {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return [1.0, 1.0, 1.0, 1.0];
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .unwrap_or(1.0)
        };
        [channel(0), channel(2), channel(4), 1.0]
    }
}
