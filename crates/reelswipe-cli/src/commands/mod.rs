pub mod cards;
pub mod clear;
pub mod config;
pub mod prompts;
pub mod rate;
pub mod ratings;
pub mod search;
pub mod swipe;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use movie_swipe_config::{Config, PathManager};
use movie_swipe_sources::{JsonRatingStore, TmdbProvider};
use std::sync::Arc;

/// Paths plus the validated configuration every command starts from
pub struct Session {
    pub paths: PathManager,
    pub config: Config,
}

impl Session {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
        tracing::debug!(config_file = %config_file.display(), "Configuration loaded");
        Ok(Self { paths, config })
    }

    pub fn provider(&self) -> Result<Arc<TmdbProvider>> {
        if !self.config.is_provider_configured() {
            return Err(eyre!("No TMDB API key configured. Run 'reelswipe config set-api-key' first."));
        }
        let provider = TmdbProvider::new(&self.config.provider).map_err(|e| eyre!("Failed to create TMDB client: {}", e))?;
        Ok(Arc::new(provider))
    }

    pub fn rating_store(&self) -> Result<Arc<JsonRatingStore>> {
        self.paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create data directories: {}", e))?;
        Ok(Arc::new(JsonRatingStore::new(&self.paths.ratings_dir())))
    }

    pub fn user_id(&self) -> &str {
        &self.config.user.user_id
    }
}
