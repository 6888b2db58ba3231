use crate::error::SourceError;
use crate::tmdb::api::{self, TmdbEndpoint};
use crate::traits::MovieProvider;
use async_trait::async_trait;
use movie_swipe_config::ProviderConfig;
use movie_swipe_models::{CatalogType, Credits, MovieCandidate};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// TMDB v3 implementation of [`MovieProvider`]
#[derive(Clone)]
pub struct TmdbProvider {
    client: Arc<Client>,
    endpoint: TmdbEndpoint,
}

impl TmdbProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, SourceError> {
        if config.api_key.is_empty() || config.api_key == "YOUR_API_KEY" {
            return Err(SourceError::NotConfigured("TMDB api_key".to_string()));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("reelswipe/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            endpoint: TmdbEndpoint {
                base_url: config.base_url.clone(),
                image_base_url: config.image_base_url.clone(),
                api_key: config.api_key.clone(),
                language: config.language.clone(),
            },
        })
    }
}

#[async_trait]
impl MovieProvider for TmdbProvider {
    fn provider_name(&self) -> &str {
        "tmdb"
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieCandidate>, SourceError> {
        api::search_movies(&self.client, &self.endpoint, query).await
    }

    async fn fetch_page(&self, catalog: CatalogType, page: u32) -> Result<Vec<MovieCandidate>, SourceError> {
        api::fetch_page(&self.client, &self.endpoint, catalog, page).await
    }

    async fn get_credits(&self, movie_id: u64) -> Result<Credits, SourceError> {
        api::get_credits(&self.client, &self.endpoint, movie_id).await
    }

    async fn get_reviews(&self, movie_id: u64) -> Result<Vec<String>, SourceError> {
        api::get_reviews(&self.client, &self.endpoint, movie_id).await
    }

    async fn get_movie_details(&self, movie_id: u64) -> Result<MovieCandidate, SourceError> {
        // Base record, credits and reviews are independent requests
        let (movie, credits, reviews) = futures::try_join!(
            api::get_movie(&self.client, &self.endpoint, movie_id),
            api::get_credits(&self.client, &self.endpoint, movie_id),
            api::get_reviews(&self.client, &self.endpoint, movie_id),
        )?;
        debug!(movie_id, cast = credits.cast.len(), reviews = reviews.len(), "Fetched movie details");
        Ok(movie.with_details(credits, reviews))
    }
}
