use async_trait::async_trait;
use movie_swipe_models::{CatalogType, Credits, MovieCandidate, RatingRecord, RatingUpsert};
use crate::error::SourceError;

/// Paginated movie catalog with per-movie detail lookups
///
/// Retries are the implementation's concern; callers treat every error as final.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieCandidate>, SourceError>;

    /// One listing page, without cast, crew or reviews
    async fn fetch_page(&self, catalog: CatalogType, page: u32) -> Result<Vec<MovieCandidate>, SourceError>;

    async fn get_credits(&self, movie_id: u64) -> Result<Credits, SourceError>;

    async fn get_reviews(&self, movie_id: u64) -> Result<Vec<String>, SourceError>;

    /// Full detail for a single movie, including credits and reviews
    async fn get_movie_details(&self, movie_id: u64) -> Result<MovieCandidate, SourceError>;
}

/// Per-user like/dislike/star persistence
///
/// `upsert_rating` is idempotent per (user, movie_id): a second call replaces the
/// first record instead of adding another.
#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn list_ratings(&self, user_id: &str) -> Result<Vec<RatingRecord>, SourceError>;

    async fn upsert_rating(&self, user_id: &str, rating: RatingUpsert) -> Result<RatingRecord, SourceError>;
}
