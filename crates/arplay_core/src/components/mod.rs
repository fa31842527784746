//! Component records attached to entities

mod engine;
mod game;

pub use engine::{ColliderComponent, MeshComponent, PrimitiveShapeComponent, ShapeType, TransformComponent};
pub use game::{
    AnimationComponent, AnimationKind, GamePhase, GameStateComponent, LifetimeComponent, MovePattern,
    ScoreComponent, SpawnPadComponent, TargetComponent, VelocityComponent,
};
