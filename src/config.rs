use std::time::Duration;

use crate::game::camera::CameraSettings;
use crate::game::constants::{entity, frame, net, world};
use crate::util::vec2::Vec2;

/// Client configuration supplied at construction time
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Render rate in Hz
    pub target_fps: u32,
    /// Start with the debug camera active and its flag on
    pub debug_mode: bool,
    /// Screen size in pixels
    pub viewport_size: Vec2,
    /// World boundary corners
    pub world_min: Vec2,
    pub world_max: Vec2,
    /// Default agent extent in world units
    pub agent_size: Vec2,
    pub bullet_radius: f32,
    pub grid_cell_size: Vec2,
    /// Player the follow camera locks onto; first agent seen when unset
    pub local_player: Option<String>,
    /// Mock transport publish period
    pub mock_snapshot_period: Duration,
    pub camera: CameraSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target_fps: frame::TARGET_FPS,
            debug_mode: false,
            viewport_size: Vec2::new(world::VIEWPORT_WIDTH, world::VIEWPORT_HEIGHT),
            world_min: Vec2::new(world::MIN_X, world::MIN_Y),
            world_max: Vec2::new(world::MAX_X, world::MAX_Y),
            agent_size: Vec2::new(entity::AGENT_WIDTH, entity::AGENT_HEIGHT),
            bullet_radius: entity::BULLET_RADIUS,
            grid_cell_size: Vec2::splat(world::GRID_CELL),
            local_player: None,
            mock_snapshot_period: Duration::from_millis(net::MOCK_SNAPSHOT_MS),
            camera: CameraSettings::default(),
        }
    }
}

/// Configuration validation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("target_fps must be 1-1000, got {0}")]
    InvalidFps(u32),
    #[error("world_min must be below world_max on both axes")]
    InvertedWorld,
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("zoom range [{0}, {1}] is empty or non-positive")]
    InvalidZoomRange(f32, f32),
}

/// Parse an environment variable, warning and returning `None` when invalid
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", name, raw);
            None
        }
    }
}

impl ClientConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(fps) = env_parse::<u32>("TARGET_FPS") {
            if (1..=1000).contains(&fps) {
                config.target_fps = fps;
            } else {
                tracing::warn!("TARGET_FPS must be 1-1000, using default");
            }
        }

        if let Some(debug) = env_parse::<bool>("DEBUG_MODE") {
            config.debug_mode = debug;
        }

        if let Some(width) = env_parse::<f32>("VIEWPORT_WIDTH") {
            config.viewport_size.x = width;
        }
        if let Some(height) = env_parse::<f32>("VIEWPORT_HEIGHT") {
            config.viewport_size.y = height;
        }

        if let Some(x) = env_parse::<f32>("WORLD_MIN_X") {
            config.world_min.x = x;
        }
        if let Some(y) = env_parse::<f32>("WORLD_MIN_Y") {
            config.world_min.y = y;
        }
        if let Some(x) = env_parse::<f32>("WORLD_MAX_X") {
            config.world_max.x = x;
        }
        if let Some(y) = env_parse::<f32>("WORLD_MAX_Y") {
            config.world_max.y = y;
        }

        if let Ok(key) = std::env::var("LOCAL_PLAYER") {
            if !key.is_empty() {
                config.local_player = Some(key);
            }
        }

        if let Some(ms) = env_parse::<u64>("MOCK_SNAPSHOT_MS") {
            if ms > 0 {
                config.mock_snapshot_period = Duration::from_millis(ms);
            } else {
                tracing::warn!("MOCK_SNAPSHOT_MS must be > 0, using default");
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == 0 || self.target_fps > 1000 {
            return Err(ConfigError::InvalidFps(self.target_fps));
        }
        if self.world_min.x >= self.world_max.x || self.world_min.y >= self.world_max.y {
            return Err(ConfigError::InvertedWorld);
        }
        if self.viewport_size.x <= 0.0 || self.viewport_size.y <= 0.0 {
            return Err(ConfigError::NonPositive("viewport_size"));
        }
        if self.agent_size.x <= 0.0 || self.agent_size.y <= 0.0 {
            return Err(ConfigError::NonPositive("agent_size"));
        }
        if self.bullet_radius <= 0.0 {
            return Err(ConfigError::NonPositive("bullet_radius"));
        }
        if self.grid_cell_size.x <= 0.0 || self.grid_cell_size.y <= 0.0 {
            return Err(ConfigError::NonPositive("grid_cell_size"));
        }
        let (min, max) = (self.camera.min_scale, self.camera.max_scale);
        if min <= 0.0 || min > max {
            return Err(ConfigError::InvalidZoomRange(min, max));
        }
        Ok(())
    }

    /// Wall-clock time between rendered frames
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.target_fps, 60);
        assert!(!config.debug_mode);
        assert_eq!(config.camera.min_scale, 0.125);
        assert_eq!(config.camera.max_scale, 3.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default() {
        let config = ClientConfig::load_or_default();
        assert!(config.target_fps > 0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ClientConfig {
            target_fps: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidFps(0)));

        config.target_fps = 30;
        config.world_max = config.world_min;
        assert_eq!(config.validate(), Err(ConfigError::InvertedWorld));

        config = ClientConfig::default();
        config.bullet_radius = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositive("bullet_radius")));

        config = ClientConfig::default();
        config.camera.min_scale = 4.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidZoomRange(..))));
    }

    #[test]
    fn test_frame_period() {
        let config = ClientConfig {
            target_fps: 50,
            ..Default::default()
        };
        assert_eq!(config.frame_period(), Duration::from_millis(20));
    }
}
