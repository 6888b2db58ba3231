use movie_swipe_models::{CatalogType, SwipeDirection, SwipeRequirement};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub swipe: SwipeConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub screen: ScreenConfig,
    #[serde(default)]
    pub user: UserConfig,
}

/// Movie provider (TMDB) connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub catalog: CatalogType,
}

/// Gesture thresholds and queue sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeConfig {
    /// Replenishment starts when the queue drops below this many cards
    #[serde(default = "default_low_water_mark")]
    pub low_water_mark: usize,
    /// A replenishment cycle stops once existing + new cards exceed this
    #[serde(default = "default_target_queue_size")]
    pub target_queue_size: usize,
    /// Upper bound on pages fetched by one cycle
    #[serde(default = "default_max_pages_per_cycle")]
    pub max_pages_per_cycle: u32,
    #[serde(default)]
    pub requirement: SwipeRequirement,
    /// Release speed (px/s) needed when `requirement = "velocity"`
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: f64,
    /// Release displacement (px) needed when `requirement = "distance"`
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f64,
    #[serde(default = "default_allowed_directions")]
    pub allowed_directions: Vec<SwipeDirection>,
    /// Movement (px) in either axis before a touch counts as a drag
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f64,
    /// Number of committed cards kept for undo
    #[serde(default = "default_restore_history")]
    pub restore_history: usize,
    /// Exit speed (px/s) of button-triggered swipes
    #[serde(default = "default_programmatic_velocity")]
    pub programmatic_velocity: f64,
    /// Maximum perpendicular disturbance (px/s) added to button-triggered swipes
    #[serde(default = "default_programmatic_jitter")]
    pub programmatic_jitter: f64,
}

/// Damped spring parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpringProfile {
    pub stiffness: f64,
    pub damping: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
    /// Speed (px/s) under which an axis may come to rest
    #[serde(default = "default_rest_speed")]
    pub rest_speed: f64,
    /// Distance (px) from target under which an axis may come to rest
    #[serde(default = "default_rest_displacement")]
    pub rest_displacement: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Card sticks to the finger
    #[serde(default = "default_follow_profile")]
    pub follow: SpringProfile,
    /// Soft return to origin
    #[serde(default = "default_settle_profile")]
    pub settle: SpringProfile,
    /// Snappy exit off screen
    #[serde(default = "default_fling_profile")]
    pub fling: SpringProfile,
    #[serde(default = "default_max_rotation_degrees")]
    pub max_rotation_degrees: f64,
    /// Settle and fling animations snap to their target after this long
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: u64,
}

/// Logical screen size in pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScreenConfig {
    #[serde(default = "default_screen_width")]
    pub width: f64,
    #[serde(default = "default_screen_height")]
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_api_key() -> String {
    "YOUR_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_low_water_mark() -> usize {
    15
}

fn default_target_queue_size() -> usize {
    17
}

fn default_max_pages_per_cycle() -> u32 {
    10
}

fn default_velocity_threshold() -> f64 {
    800.0
}

fn default_distance_threshold() -> f64 {
    120.0
}

pub fn default_allowed_directions() -> Vec<SwipeDirection> {
    vec![SwipeDirection::Left, SwipeDirection::Right]
}

fn default_dead_zone() -> f64 {
    2.0
}

fn default_restore_history() -> usize {
    10
}

fn default_programmatic_velocity() -> f64 {
    1200.0
}

fn default_programmatic_jitter() -> f64 {
    60.0
}

fn default_mass() -> f64 {
    1.0
}

fn default_rest_speed() -> f64 {
    2.0
}

fn default_rest_displacement() -> f64 {
    0.5
}

fn default_follow_profile() -> SpringProfile {
    SpringProfile {
        stiffness: 1000.0,
        damping: 60.0,
        mass: default_mass(),
        rest_speed: default_rest_speed(),
        rest_displacement: default_rest_displacement(),
    }
}

fn default_settle_profile() -> SpringProfile {
    SpringProfile {
        stiffness: 150.0,
        damping: 18.0,
        mass: default_mass(),
        rest_speed: default_rest_speed(),
        rest_displacement: default_rest_displacement(),
    }
}

fn default_fling_profile() -> SpringProfile {
    SpringProfile {
        stiffness: 220.0,
        damping: 16.0,
        mass: default_mass(),
        rest_speed: default_rest_speed(),
        rest_displacement: default_rest_displacement(),
    }
}

fn default_max_rotation_degrees() -> f64 {
    35.0
}

fn default_max_duration_ms() -> u64 {
    2000
}

fn default_screen_width() -> f64 {
    390.0
}

fn default_screen_height() -> f64 {
    844.0
}

fn default_user_id() -> String {
    "local".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
            catalog: CatalogType::default(),
        }
    }
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            low_water_mark: default_low_water_mark(),
            target_queue_size: default_target_queue_size(),
            max_pages_per_cycle: default_max_pages_per_cycle(),
            requirement: SwipeRequirement::default(),
            velocity_threshold: default_velocity_threshold(),
            distance_threshold: default_distance_threshold(),
            allowed_directions: default_allowed_directions(),
            dead_zone: default_dead_zone(),
            restore_history: default_restore_history(),
            programmatic_velocity: default_programmatic_velocity(),
            programmatic_jitter: default_programmatic_jitter(),
        }
    }
}

impl SwipeConfig {
    /// Threshold matching the configured requirement mode
    pub fn threshold(&self) -> f64 {
        match self.requirement {
            SwipeRequirement::Velocity => self.velocity_threshold,
            SwipeRequirement::Distance => self.distance_threshold,
        }
    }

    pub fn is_allowed(&self, direction: SwipeDirection) -> bool {
        direction != SwipeDirection::None && self.allowed_directions.contains(&direction)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            follow: default_follow_profile(),
            settle: default_settle_profile(),
            fling: default_fling_profile(),
            max_rotation_degrees: default_max_rotation_degrees(),
            max_duration_ms: default_max_duration_ms(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: default_screen_width(),
            height: default_screen_height(),
        }
    }
}

impl ScreenConfig {
    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let swipe = &self.swipe;
        if swipe.low_water_mark == 0 {
            return Err(anyhow::anyhow!("low_water_mark must be greater than zero"));
        }
        if swipe.target_queue_size <= swipe.low_water_mark {
            return Err(anyhow::anyhow!(
                "target_queue_size ({}) must be greater than low_water_mark ({})",
                swipe.target_queue_size,
                swipe.low_water_mark
            ));
        }
        if swipe.max_pages_per_cycle == 0 {
            return Err(anyhow::anyhow!("max_pages_per_cycle must be greater than zero"));
        }
        if swipe.velocity_threshold <= 0.0 || swipe.distance_threshold <= 0.0 {
            return Err(anyhow::anyhow!("swipe thresholds must be positive"));
        }
        if swipe.dead_zone < 0.0 {
            return Err(anyhow::anyhow!("dead_zone must be non-negative"));
        }
        if !swipe.allowed_directions.iter().any(|d| *d != SwipeDirection::None) {
            return Err(anyhow::anyhow!("allowed_directions must name at least one direction"));
        }

        for (name, profile) in [
            ("follow", &self.animation.follow),
            ("settle", &self.animation.settle),
            ("fling", &self.animation.fling),
        ] {
            if profile.stiffness <= 0.0 || profile.mass <= 0.0 || profile.damping <= 0.0 {
                return Err(anyhow::anyhow!("animation.{} has a non-physical spring profile", name));
            }
            if profile.rest_speed <= 0.0 || profile.rest_displacement <= 0.0 {
                return Err(anyhow::anyhow!("animation.{} rest thresholds must be positive", name));
            }
        }
        if self.animation.max_rotation_degrees <= 0.0 {
            return Err(anyhow::anyhow!("max_rotation_degrees must be positive"));
        }
        if self.animation.max_duration_ms == 0 {
            return Err(anyhow::anyhow!("animation.max_duration_ms must be greater than zero"));
        }

        if self.screen.width <= 0.0 || self.screen.height <= 0.0 {
            return Err(anyhow::anyhow!("screen dimensions must be positive"));
        }
        if self.user.user_id.trim().is_empty() {
            return Err(anyhow::anyhow!("user_id cannot be empty"));
        }
        Ok(())
    }

    pub fn is_provider_configured(&self) -> bool {
        !self.provider.api_key.is_empty() && self.provider.api_key != "YOUR_API_KEY"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.provider.api_key = "test_key".to_string();
        config.provider.catalog = CatalogType::TopRated;
        config.swipe.requirement = SwipeRequirement::Distance;
        config.swipe.allowed_directions = vec![SwipeDirection::Left, SwipeDirection::Right, SwipeDirection::Up];

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.provider.api_key, "test_key");
        assert_eq!(loaded.provider.catalog, CatalogType::TopRated);
        assert_eq!(loaded.swipe.requirement, SwipeRequirement::Distance);
        assert_eq!(loaded.swipe.allowed_directions.len(), 3);
        assert_eq!(loaded.animation.fling, config.animation.fling);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [provider]
            api_key = "abc"

            [swipe]
            low_water_mark = 5
            target_queue_size = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.swipe.low_water_mark, 5);
        assert_eq!(config.swipe.velocity_threshold, 800.0);
        assert_eq!(config.swipe.allowed_directions, default_allowed_directions());
        assert_eq!(config.animation.max_rotation_degrees, 35.0);
        assert_eq!(config.user.user_id, "local");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        assert!(!config.is_provider_configured());

        config.swipe.target_queue_size = 3;
        assert!(config.validate().is_err());
        config.swipe.target_queue_size = 17;

        config.swipe.allowed_directions = vec![SwipeDirection::None];
        assert!(config.validate().is_err());
        config.swipe.allowed_directions = default_allowed_directions();

        config.animation.settle.stiffness = 0.0;
        assert!(config.validate().is_err());
        config.animation.settle.stiffness = 150.0;

        config.swipe.target_queue_size = config.swipe.low_water_mark;
        assert!(config.validate().is_err());
        config.swipe.target_queue_size = 17;

        config.provider.api_key = "real_key".to_string();
        assert!(config.validate().is_ok());
        assert!(config.is_provider_configured());
    }

    #[test]
    fn test_validate_rejects_springs_that_never_rest() {
        let mut config = Config::default();

        config.animation.fling.rest_speed = 0.0;
        assert!(config.validate().is_err());
        config.animation.fling = default_fling_profile();

        config.animation.fling.rest_displacement = 0.0;
        assert!(config.validate().is_err());
        config.animation.fling = default_fling_profile();

        config.animation.settle.damping = 0.0;
        assert!(config.validate().is_err());
        config.animation.settle = default_settle_profile();

        config.animation.max_duration_ms = 0;
        assert!(config.validate().is_err());
        config.animation.max_duration_ms = 2000;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_follows_requirement() {
        let mut swipe = SwipeConfig::default();
        assert_eq!(swipe.threshold(), 800.0);
        swipe.requirement = SwipeRequirement::Distance;
        assert_eq!(swipe.threshold(), 120.0);
        assert!(swipe.is_allowed(SwipeDirection::Left));
        assert!(!swipe.is_allowed(SwipeDirection::Up));
        assert!(!swipe.is_allowed(SwipeDirection::None));
    }
}
