pub mod config;
pub mod paths;

pub use config::{AnimationConfig, Config, ProviderConfig, ScreenConfig, SpringProfile, SwipeConfig, UserConfig, default_allowed_directions};
pub use paths::{PathManager, container_base_path};
