//! Gameplay component records for target-shooting mini-games
//!
//! Every time value is in milliseconds of world time ([`crate::World::time_ms`]).
//! Records never read a wall clock themselves; callers pass `now`.

use std::f32::consts::TAU;

use arplay_math::Vec3;
use serde::{Serialize, Deserialize};

/// How a target moves relative to its origin
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovePattern {
    /// Small vertical bob
    Stationary,
    /// Vertical sine bounce
    #[default]
    Bounce,
    /// Horizontal orbit around the origin
    Circle,
}

impl MovePattern {
    pub const ALL: [MovePattern; 3] = [MovePattern::Stationary, MovePattern::Bounce, MovePattern::Circle];

    /// Offset from the target origin `t_secs` seconds after spawning
    pub fn offset(self, speed: f32, t_secs: f32) -> Vec3 {
        match self {
            MovePattern::Stationary => Vec3::new(0.0, (t_secs * 2.0).sin() * 0.02, 0.0),
            MovePattern::Bounce => Vec3::new(0.0, (t_secs * speed * TAU).sin() * 0.3, 0.0),
            MovePattern::Circle => {
                let angle = t_secs * speed;
                Vec3::new(angle.cos() * 0.2, 0.0, angle.sin() * 0.2)
            }
        }
    }
}

/// Something the player can shoot
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetComponent {
    pub points: u32,
    pub speed: f32,
    pub pattern: MovePattern,
    /// Anchor point the move pattern is applied around
    pub origin: Vec3,
    pub is_hit: bool,
    pub spawn_time_ms: f64,
    /// Set when hit; the entity is removed once world time reaches it
    pub destroy_at_ms: Option<f64>,
}

impl Default for TargetComponent {
    fn default() -> Self {
        Self {
            points: 10,
            speed: 0.5,
            pattern: MovePattern::Bounce,
            origin: Vec3::ZERO,
            is_hit: false,
            spawn_time_ms: 0.0,
            destroy_at_ms: None,
        }
    }
}

impl TargetComponent {
    pub fn new(points: u32, speed: f32, pattern: MovePattern) -> Self {
        Self {
            points,
            speed,
            pattern,
            ..Default::default()
        }
    }

    pub fn with_origin(mut self, origin: Vec3, spawn_time_ms: f64) -> Self {
        self.origin = origin;
        self.spawn_time_ms = spawn_time_ms;
        self
    }

    /// Seconds since spawning
    pub fn age_secs(&self, now_ms: f64) -> f32 {
        ((now_ms - self.spawn_time_ms).max(0.0) / 1000.0) as f32
    }

    /// Mark as hit and schedule removal; returns false if already hit
    pub fn mark_hit(&mut self, now_ms: f64, destroy_delay_ms: f64) -> bool {
        if self.is_hit {
            return false;
        }
        self.is_hit = true;
        self.destroy_at_ms = Some(now_ms + destroy_delay_ms);
        true
    }

    pub fn should_destroy(&self, now_ms: f64) -> bool {
        self.destroy_at_ms.is_some_and(|at| now_ms >= at)
    }
}

/// Running score with a combo multiplier
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub current: f32,
    pub hits: u32,
    pub missed: u32,
    pub combo: u32,
    pub high: f32,
}

impl ScoreComponent {
    /// Award `points × (1 + combo × 0.1)`, then extend the combo
    ///
    /// Returns the points actually awarded.
    pub fn add_points(&mut self, points: u32) -> f32 {
        let awarded = points as f32 * (1.0 + self.combo as f32 * 0.1);
        self.current += awarded;
        self.hits += 1;
        self.combo += 1;
        if self.current > self.high {
            self.high = self.current;
        }
        awarded
    }

    pub fn reset_combo(&mut self) {
        self.combo = 0;
    }

    pub fn miss_target(&mut self) {
        self.missed += 1;
        self.reset_combo();
    }

    /// Clear the round but keep the high score
    pub fn reset(&mut self) {
        *self = Self {
            high: self.high,
            ..Default::default()
        };
    }
}

/// Where targets appear
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPadComponent {
    pub spawn_interval_ms: f64,
    pub last_spawn_ms: f64,
    pub max_active_targets: usize,
    pub is_active: bool,
}

impl Default for SpawnPadComponent {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 2000.0,
            last_spawn_ms: 0.0,
            max_active_targets: 5,
            is_active: false,
        }
    }
}

impl SpawnPadComponent {
    pub fn can_spawn(&self, now_ms: f64, active_targets: usize) -> bool {
        self.is_active
            && active_targets < self.max_active_targets
            && now_ms - self.last_spawn_ms >= self.spawn_interval_ms
    }
}

/// Phase of a round
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Menu,
    /// Waiting for the player to place the spawn pad
    Placing,
    Playing,
    Paused,
    GameOver,
}

/// Round timer and phase
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameStateComponent {
    pub phase: GamePhase,
    /// Time played so far in this round
    pub game_time_ms: f64,
    pub duration_ms: f64,
    pub start_time_ms: f64,
}

impl Default for GameStateComponent {
    fn default() -> Self {
        Self {
            phase: GamePhase::Menu,
            game_time_ms: 0.0,
            duration_ms: 60_000.0,
            start_time_ms: 0.0,
        }
    }
}

impl GameStateComponent {
    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn start(&mut self, now_ms: f64) {
        self.phase = GamePhase::Playing;
        self.start_time_ms = now_ms;
        self.game_time_ms = 0.0;
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    pub fn end(&mut self) {
        self.phase = GamePhase::GameOver;
    }

    /// Advance the round clock; ends the round when time runs out
    pub fn update(&mut self, now_ms: f64) {
        if self.phase == GamePhase::Playing {
            self.game_time_ms = now_ms - self.start_time_ms;
            if self.game_time_ms >= self.duration_ms {
                self.end();
            }
        }
    }

    pub fn remaining_ms(&self) -> f64 {
        (self.duration_ms - self.game_time_ms).max(0.0)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}

/// Linear motion with damping
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VelocityComponent {
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Per-step multiplier applied to velocity
    pub damping: f32,
}

impl Default for VelocityComponent {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl VelocityComponent {
    pub fn new(velocity: Vec3) -> Self {
        Self {
            velocity,
            acceleration: Vec3::ZERO,
            damping: 0.95,
        }
    }
}

/// Destroys the entity after a fixed duration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifetimeComponent {
    pub duration_ms: f64,
    pub created_at_ms: f64,
}

impl Default for LifetimeComponent {
    fn default() -> Self {
        Self::new(5000.0, 0.0)
    }
}

impl LifetimeComponent {
    pub fn new(duration_ms: f64, created_at_ms: f64) -> Self {
        Self { duration_ms, created_at_ms }
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.created_at_ms >= self.duration_ms
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.duration_ms - (now_ms - self.created_at_ms)).max(0.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationKind {
    #[default]
    Scale,
    Rotate,
    Fade,
    Bounce,
}

/// Simple timed animation description
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationComponent {
    pub kind: AnimationKind,
    pub duration_ms: f64,
    pub start_ms: f64,
    pub looping: bool,
    pub scale: f32,
    pub alpha: f32,
}

impl Default for AnimationComponent {
    fn default() -> Self {
        Self::new(AnimationKind::Scale, 1000.0, 0.0)
    }
}

impl AnimationComponent {
    pub fn new(kind: AnimationKind, duration_ms: f64, start_ms: f64) -> Self {
        Self {
            kind,
            duration_ms,
            start_ms,
            looping: false,
            scale: 1.0,
            alpha: 1.0,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Progress in `[0, 1]`; wraps around when looping
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        let elapsed = (now_ms - self.start_ms).max(0.0);
        let p = if self.looping {
            (elapsed % self.duration_ms) / self.duration_ms
        } else {
            (elapsed / self.duration_ms).min(1.0)
        };
        p as f32
    }

    pub fn is_complete(&self, now_ms: f64) -> bool {
        !self.looping && now_ms - self.start_ms >= self.duration_ms
    }
}
