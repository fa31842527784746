//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`ARPLAY_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use arplay_input::GestureConfig;
use arplay_session::{ArMode, CameraFacing, SessionConfig};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// World clock configuration
    #[serde(default)]
    pub world: WorldConfig,
    /// AR session configuration
    #[serde(default)]
    pub session: SessionSettings,
    /// Gesture thresholds
    #[serde(default)]
    pub input: InputConfig,
    /// Screen size and camera field of view used for picking
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Target game tuning
    #[serde(default)]
    pub game: GameConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`ARPLAY_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Optional local overrides
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // ARPLAY_GAME__DURATION_MS=30000 -> game.duration_ms = 30000
        figment = figment.merge(Env::prefixed("ARPLAY_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// World clock configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Fixed update rate in Hz
    pub fixed_timestep_hz: f32,
    /// Longest frame delta accepted by the world, in seconds
    pub max_delta_seconds: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            fixed_timestep_hz: 60.0,
            max_delta_seconds: 0.1,
        }
    }
}

impl WorldConfig {
    /// Fixed step length in seconds
    pub fn fixed_timestep(&self) -> f32 {
        if self.fixed_timestep_hz > 0.0 {
            1.0 / self.fixed_timestep_hz
        } else {
            log::warn!("Invalid fixed_timestep_hz {}, using 60", self.fixed_timestep_hz);
            1.0 / 60.0
        }
    }
}

/// AR session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Skip capability probing and use this mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_mode: Option<ArMode>,
    pub plane_detection: bool,
    pub light_estimation: bool,
    pub depth_sensing: bool,
    pub camera_facing: CameraFacing,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            force_mode: None,
            plane_detection: session.plane_detection,
            light_estimation: session.light_estimation,
            depth_sensing: session.depth_sensing,
            camera_facing: session.camera_facing,
        }
    }
}

impl SessionSettings {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            plane_detection: self.plane_detection,
            light_estimation: self.light_estimation,
            depth_sensing: self.depth_sensing,
            camera_facing: self.camera_facing,
        }
    }
}

/// Gesture thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Max gap between taps for a double tap (ms)
    pub double_tap_ms: f64,
    /// Min hold for a long press (ms)
    pub long_press_ms: f64,
    /// Max pointer travel for a tap (pixels)
    pub tap_move_threshold: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        let gestures = GestureConfig::default();
        Self {
            double_tap_ms: gestures.double_tap_ms,
            long_press_ms: gestures.long_press_ms,
            tap_move_threshold: gestures.tap_move_threshold,
        }
    }
}

impl InputConfig {
    pub fn to_gesture_config(&self) -> GestureConfig {
        GestureConfig {
            double_tap_ms: self.double_tap_ms,
            long_press_ms: self.long_press_ms,
            tap_move_threshold: self.tap_move_threshold,
        }
    }
}

/// Screen size and field of view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            fov_degrees: 60.0,
        }
    }
}

impl ViewportConfig {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

/// Target game tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Round length
    pub duration_ms: f64,
    pub spawn_interval_ms: f64,
    pub max_active_targets: usize,
    /// Base points per target before the combo bonus
    pub target_points: u32,
    /// Move pattern speed
    pub target_speed: f32,
    /// Unhit targets expire after this long
    pub target_lifetime_ms: f64,
    /// Picking radius for targets without a collider
    pub target_radius: f32,
    /// Horizontal spread around the spawn pad
    pub spawn_radius: f32,
    /// Delay between a hit and removal, for the hit animation
    pub hit_destroy_delay_ms: f64,
    /// Seed for spawn offsets and move patterns
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            duration_ms: 60_000.0,
            spawn_interval_ms: 2000.0,
            max_active_targets: 5,
            target_points: 10,
            target_speed: 0.3,
            target_lifetime_ms: 10_000.0,
            target_radius: 0.1,
            spawn_radius: 0.25,
            hit_destroy_delay_ms: 300.0,
            rng_seed: 7,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
